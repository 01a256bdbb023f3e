//! Analyses of hierarchical orthologous groups (HOGs) from OrthoXML documents
//!
//! An [`OrthoXmlTree`] holds the species with their genes, the taxonomy and
//! the group trees of one document. A group tree alternates between
//! ortholog groups (speciation events) and paralog groups (duplication
//! events), with gene references as leaves.
//!
//! The crate provides
//!
//! - pairwise ortholog and paralog relations of genes ([`relations`])
//! - maximal orthologous groups with one gene per species ([`selector`])
//! - the number of genes at every level of the taxonomy ([`census`])
//! - the conversion of rootHOGs into Newick trees, either from an in-memory
//!   tree or from a stream of element events ([`newick`])
//!
//! Reading XML is not part of this crate. Any XML reader can build the
//! [`models`] or feed its events into a [`NewickConverter`].
//!
//! # Examples
//!
//! ```
//! use orthoxml::{Gene, Group, GroupNode, OrthoXmlTree, Species, Taxon, TreeOptions};
//! use orthoxml::newick::NewickOptions;
//!
//! let species = vec![
//!     Species::new("HUMAN", "9606", vec![Gene::new("h1"), Gene::new("h2")]),
//!     Species::new("MOUSE", "10090", vec![Gene::new("m1")]),
//! ];
//! let taxonomy = Taxon::new("40674", "Mammalia", vec![
//!     Taxon::leaf("9606", "Homo sapiens"),
//!     Taxon::leaf("10090", "Mus musculus"),
//! ]);
//! let groups = vec![GroupNode::Ortholog(
//!     Group::new()
//!         .with_id("HOG:1")
//!         .with_taxon_id("40674")
//!         .with_child(GroupNode::Paralog(
//!             Group::new().with_taxon_id("9606").with_gene_ref("h1").with_gene_ref("h2"),
//!         ))
//!         .with_gene_ref("m1"),
//! )];
//!
//! let tree = OrthoXmlTree::new(species, Some(taxonomy), groups, None, &TreeOptions::default());
//!
//! assert_eq!(tree.ortholog_pairs().unwrap(), vec![("h1", "m1"), ("h2", "m1")]);
//! assert_eq!(tree.paralog_pairs().unwrap(), vec![("h1", "h2")]);
//! assert_eq!(tree.maximal_ogs().unwrap()[0].genes(), &["h1", "m1"]);
//! assert_eq!(tree.gene_stats().unwrap().get("40674"), Some(3));
//!
//! let newick = tree.to_newick(NewickOptions::default()).unwrap();
//! assert_eq!(newick.get("HOG:1"), Some("((h1,h2)9606,m1)40674;"));
//! ```
#![warn(missing_docs)]

use thiserror::Error;

pub mod census;
pub mod models;
pub mod newick;
pub mod output;
pub mod relations;
pub mod selector;
pub mod tree;
pub mod utils;

#[cfg(test)]
pub(crate) mod fixtures;

pub use census::GeneCensus;
pub use models::{Gene, GeneRef, Group, GroupKind, GroupNode, Score, Species, Taxon};
pub use newick::{NewickConverter, NewickOptions, NewickTrees};
pub use relations::{GenePair, Relations, Strategy};
pub use selector::MaximalOg;
pub use tree::{OrthoXmlTree, TaxonomyPolicy, TreeOptions, TreeStats};

/// Element name of a speciation node
pub const ORTHOLOG_GROUP: &str = "orthologGroup";
/// Element name of a duplication node
pub const PARALOG_GROUP: &str = "paralogGroup";
/// Element name of a reference to a [`Gene`] inside a group
pub const GENE_REF: &str = "geneRef";
/// Element name of a [`Gene`] declaration
pub const GENE: &str = "gene";
/// Element name of a [`Species`] declaration
pub const SPECIES: &str = "species";
/// Element name of the container of all group roots
pub const GROUPS: &str = "groups";

/// Taxon ID of the synthesized root taxon of documents without taxonomy
pub const PLACEHOLDER_TAXON_ID: &str = "placeholder_root";

/// Default field separator of delimited output
pub const DEFAULT_SEPARATOR: &str = ",";

/// Main Error type for this crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum OrthoXmlError {
    /// A group references a gene that is not declared in the document
    #[error("gene reference {0} does not exist")]
    MissingGene(String),
    /// The open and close events of a stream do not match
    #[error("unbalanced element events: {0}")]
    UnbalancedEvents(String),
    /// A score that is used for filtering is not a number
    #[error("score {score_id} has a non-numeric value: {value}")]
    MalformedScore {
        /// The ID of the score
        score_id: String,
        /// The raw value of the score
        value: String,
    },
    /// The operation is not supported for the current state of the tree
    #[error("not supported: {0}")]
    Unsupported(String),
    /// Failed to open or create a file
    #[error("unable to open file: {0}")]
    CannotOpenFile(String),
    /// Failed to write output
    #[error("unable to write output")]
    Io(#[from] std::io::Error),
}

/// Shortcut for `Result<T, OrthoXmlError>`
pub type OrthoXmlResult<T> = Result<T, OrthoXmlError>;

/// Returns the element name without namespace prefix
///
/// Streaming sources report names either as `prefix:name` or
/// in Clark notation (`{namespace}name`).
///
/// # Examples
///
/// ```
/// use orthoxml::local_name;
///
/// assert_eq!(local_name("{http://orthoXML.org/2011/}geneRef"), "geneRef");
/// assert_eq!(local_name("ortho:geneRef"), "geneRef");
/// assert_eq!(local_name("geneRef"), "geneRef");
/// ```
pub fn local_name(tag: &str) -> &str {
    let tag = match tag.rsplit_once('}') {
        Some((_, name)) => name,
        None => tag,
    };
    match tag.rsplit_once(':') {
        Some((_, name)) => name,
        None => tag,
    }
}
