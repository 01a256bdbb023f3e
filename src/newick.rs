//! Conversion of rootHOGs into Newick trees
//!
//! The conversion is driven by a stream of element [`Event`]s, the way
//! a streaming XML reader reports them. The [`NewickConverter`] keeps a stack
//! of open groups and renders each group as soon as it is closed. It never
//! needs the full document in memory.
//!
//! An in-memory [`OrthoXmlTree`](`crate::OrthoXmlTree`) produces the same
//! stream with [`OrthoXmlTree::events`](`crate::OrthoXmlTree::events`).
//!
//! # Examples
//!
//! ```
//! use orthoxml::newick::{convert, Event, NewickOptions, NodeAnnotation};
//!
//! let events = vec![
//!     Event::open("groups", &[]),
//!     Event::open("orthologGroup", &[("id", "HOG:1"), ("taxonId", "40674")]),
//!     Event::open("geneRef", &[("id", "human1")]),
//!     Event::close("geneRef"),
//!     Event::open("paralogGroup", &[("taxonId", "10090")]),
//!     Event::open("geneRef", &[("id", "mouse1")]),
//!     Event::close("geneRef"),
//!     Event::open("geneRef", &[("id", "mouse2")]),
//!     Event::close("geneRef"),
//!     Event::close("paralogGroup"),
//!     Event::close("orthologGroup"),
//!     Event::close("groups"),
//! ];
//!
//! let trees = convert(events.clone(), NewickOptions::default()).unwrap();
//! assert_eq!(trees.get("HOG:1"), Some("(human1,(mouse1,mouse2)10090)40674;"));
//!
//! let options = NewickOptions::default().with_annotation(NodeAnnotation::Nhx);
//! let trees = convert(events, options).unwrap();
//! assert_eq!(
//!     trees.get("HOG:1"),
//!     Some("(human1,(mouse1,mouse2)[&&NHX:S=10090:D=Y])[&&NHX:S=40674];")
//! );
//! ```
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, error};

use crate::{OrthoXmlError, OrthoXmlResult};

mod converter;
mod events;

pub use converter::NewickConverter;
pub use events::{Attributes, Event, TreeEvents};

/// File extension of written Newick trees
const NEWICK_EXTENSION: &str = "nwk";

/// The gene attribute used as leaf label
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LeafLabel {
    /// The document-unique gene ID
    #[default]
    Id,
    /// The external gene identifier (`geneId`)
    GeneId,
    /// The external protein identifier (`protId`)
    ProtId,
}

/// The label of internal nodes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum NodeAnnotation {
    /// The raw taxon ID of the group
    #[default]
    TaxonId,
    /// An NHX tag with the taxon ID and a duplication marker for paralog groups
    Nhx,
}

/// Settings of the [`NewickConverter`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NewickOptions {
    leaf_label: LeafLabel,
    annotation: NodeAnnotation,
    collect_species: bool,
}

impl NewickOptions {
    /// Constructs the default options
    ///
    /// Leaves are labeled by gene ID, internal nodes by taxon ID and
    /// no gene-to-species mapping is collected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the gene attribute used as leaf label
    ///
    /// Genes without this attribute are labeled by their ID.
    #[must_use]
    pub fn with_leaf_label(mut self, leaf_label: LeafLabel) -> Self {
        self.leaf_label = leaf_label;
        self
    }

    /// Sets the label of internal nodes
    #[must_use]
    pub fn with_annotation(mut self, annotation: NodeAnnotation) -> Self {
        self.annotation = annotation;
        self
    }

    /// Collects the species of every gene during the conversion
    #[must_use]
    pub fn with_species(mut self, collect_species: bool) -> Self {
        self.collect_species = collect_species;
        self
    }

    /// The gene attribute used as leaf label
    pub fn leaf_label(&self) -> LeafLabel {
        self.leaf_label
    }

    /// The label of internal nodes
    pub fn annotation(&self) -> NodeAnnotation {
        self.annotation
    }

    /// Whether the gene-to-species mapping is collected
    pub fn collects_species(&self) -> bool {
        self.collect_species
    }
}

/// The Newick trees of all rootHOGs of a document
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NewickTrees {
    trees: BTreeMap<String, String>,
    gene_species: Option<HashMap<String, String>>,
}

impl NewickTrees {
    /// Returns the tree of the rootHOG `hog_id`
    pub fn get(&self, hog_id: &str) -> Option<&str> {
        self.trees.get(hog_id).map(String::as_str)
    }

    /// Iterates all rootHOG IDs with their tree, ordered by ID
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.trees
            .iter()
            .map(|(id, tree)| (id.as_str(), tree.as_str()))
    }

    /// The number of trees
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// Returns `true` if there are no trees
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// The species name of every gene
    ///
    /// Only available if [`NewickOptions::with_species`] was set.
    pub fn gene_species(&self) -> Option<&HashMap<String, String>> {
        self.gene_species.as_ref()
    }

    /// Consumes `self` and returns the trees by rootHOG ID
    pub fn into_trees(self) -> BTreeMap<String, String> {
        self.trees
    }

    /// Writes every tree into its own file `<rootHOG id>.nwk` in `dir`
    ///
    /// The directory is created if it does not exist. Characters of the
    /// rootHOG ID that are not alphanumeric, `.`, `-` or `_` are replaced
    /// by `_` in the file name.
    ///
    /// Returns the number of written files.
    ///
    /// # Errors
    ///
    /// - [`OrthoXmlError::CannotOpenFile`] if the directory or a file cannot be created
    /// - [`OrthoXmlError::Io`] if writing fails
    pub fn write_files<P: AsRef<Path>>(&self, dir: P) -> OrthoXmlResult<usize> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|_| {
            error!("Unable to create directory {}", dir.display());
            OrthoXmlError::CannotOpenFile(dir.display().to_string())
        })?;
        for (hog_id, tree) in &self.trees {
            let path = dir.join(format!("{}.{}", file_stem(hog_id), NEWICK_EXTENSION));
            let file = File::create(&path).map_err(|_| {
                error!("Unable to create file {}", path.display());
                OrthoXmlError::CannotOpenFile(path.display().to_string())
            })?;
            let mut writer = BufWriter::new(file);
            writeln!(writer, "{tree}")?;
            writer.flush()?;
        }
        debug!("Wrote {} Newick files to {}", self.trees.len(), dir.display());
        Ok(self.trees.len())
    }
}

/// Converts an event stream into Newick trees
///
/// # Errors
///
/// [`OrthoXmlError::UnbalancedEvents`] if the open and close events do not match
pub fn convert<I: IntoIterator<Item = Event>>(
    events: I,
    options: NewickOptions,
) -> OrthoXmlResult<NewickTrees> {
    let mut converter = NewickConverter::new(options);
    for event in events {
        converter.feed(&event)?;
    }
    converter.finish()
}

/// Quotes a label if it contains characters with a meaning in Newick
///
/// Quotes inside the label are doubled.
///
/// # Examples
///
/// ```
/// use orthoxml::newick::escape_label;
///
/// assert_eq!(escape_label("HUMAN1"), "HUMAN1");
/// assert_eq!(escape_label("Homo sapiens"), "'Homo sapiens'");
/// assert_eq!(escape_label("it's"), "'it''s'");
/// ```
pub fn escape_label(label: &str) -> String {
    if label.chars().any(|c| {
        matches!(
            c,
            ' ' | ',' | ';' | '\t' | '\n' | '\r' | '(' | ')' | ':' | '[' | ']' | '\''
        )
    }) {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_string()
    }
}

fn file_stem(hog_id: &str) -> String {
    hog_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
