//! Species, genes, taxonomy and the nested ortholog/paralog groups
//!
//! An OrthoXML document declares [`Species`] that own their [`Gene`]s, an
//! optional [`Taxon`] tree and a forest of groups. The groups form a
//! polymorphic tree of [`GroupNode`]s:
//!
//! - [`GroupNode::Ortholog`]: the children diverged by speciation
//! - [`GroupNode::Paralog`]: the children diverged by duplication
//! - [`GroupNode::GeneRef`]: a leaf, referencing a [`Gene`] by its ID
//!
//! Group nodes never own genes. They only hold the gene ID as a string,
//! so every analysis must check that the referenced gene actually exists.
//!
//! The taxonomy and the group trees are independent of each other. They are
//! only loosely connected via the taxon IDs of the groups.

mod gene;
mod group;
mod species;
mod taxon;

pub use gene::Gene;
pub use group::{GeneRef, Group, GroupKind, GroupNode, Score};
pub use species::Species;
pub use taxon::{Taxon, TaxonIter};
