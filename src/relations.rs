//! Pairwise ortholog and paralog relations of genes
//!
//! The relation of two genes is defined by the type of their lowest common
//! ancestor in the group tree. If it is an ortholog group, the genes
//! diverged by speciation and are orthologs. If it is a paralog group, they
//! diverged by duplication and are paralogs.
//!
//! Both strategies traverse the group tree once in post-order. Whenever a
//! group of the requested [`GroupKind`] is completed, every gene of one
//! child is paired with every gene of each later child. Groups of the
//! other kind only pass the pairs of their children on.
//!
//! - [`pairs_recursive`] uses plain recursion and is bounded by the depth of
//!   the tree.
//! - [`PairIter`] uses an explicit stack and yields the pairs lazily. It
//!   handles arbitrarily deep trees.
//!
//! Both strategies yield the same pairs in the same order: the pairs of all
//! children in document order, followed by the pairs that cross the children.
//!
//! # Examples
//!
//! ```
//! use std::collections::HashSet;
//! use orthoxml::{Group, GroupKind, GroupNode};
//! use orthoxml::relations::{extract, Strategy};
//!
//! let hog = GroupNode::Ortholog(
//!     Group::new()
//!         .with_child(GroupNode::Paralog(Group::new().with_gene_ref("h1").with_gene_ref("h2")))
//!         .with_gene_ref("m1"),
//! );
//! let genes: HashSet<&str> = ["h1", "h2", "m1"].into_iter().collect();
//!
//! let orthologs = extract(&hog, GroupKind::Ortholog, &genes, Strategy::Iterative).unwrap();
//! assert_eq!(orthologs.pairs(), &[("h1", "m1"), ("h2", "m1")]);
//!
//! let paralogs = extract(&hog, GroupKind::Paralog, &genes, Strategy::Recursive).unwrap();
//! assert_eq!(paralogs.pairs(), &[("h1", "h2")]);
//! assert_eq!(paralogs.genes(), orthologs.genes());
//! ```

use std::collections::{HashMap, HashSet};

use crate::models::{Gene, GroupKind, GroupNode};
use crate::OrthoXmlResult;

mod iterative;
mod recursive;

pub use iterative::{pairs_iterative, Involving, PairIter};
pub use recursive::pairs_recursive;

/// Two genes in a pairwise relation, identified by their IDs
pub type GenePair<'a> = (&'a str, &'a str);

/// Checks whether a referenced gene exists in the document
///
/// Every gene reference of the group tree is checked during the
/// extraction. A reference to an unknown gene aborts the extraction.
pub trait GeneLookup {
    /// Returns `true` if a gene with the ID `id` exists
    fn contains_gene(&self, id: &str) -> bool;
}

impl GeneLookup for HashMap<String, Gene> {
    fn contains_gene(&self, id: &str) -> bool {
        self.contains_key(id)
    }
}

impl GeneLookup for HashMap<&str, &str> {
    fn contains_gene(&self, id: &str) -> bool {
        self.contains_key(id)
    }
}

impl GeneLookup for HashSet<String> {
    fn contains_gene(&self, id: &str) -> bool {
        self.contains(id)
    }
}

impl GeneLookup for HashSet<&str> {
    fn contains_gene(&self, id: &str) -> bool {
        self.contains(id)
    }
}

/// The evaluation strategy of the relation extraction
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Natural post-order recursion
    Recursive,
    /// Explicit work stack, safe for deeply nested trees
    #[default]
    Iterative,
}

/// All genes of a group subtree and the relations between them
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Relations<'a> {
    pub(crate) genes: Vec<&'a str>,
    pub(crate) pairs: Vec<GenePair<'a>>,
}

impl<'a> Relations<'a> {
    /// The IDs of all genes of the subtree, in document order
    ///
    /// The genes do not depend on the kind of extracted relations.
    pub fn genes(&self) -> &[&'a str] {
        &self.genes
    }

    /// All extracted pairs
    pub fn pairs(&self) -> &[GenePair<'a>] {
        &self.pairs
    }

    /// Consumes `self` and returns the pairs
    pub fn into_pairs(self) -> Vec<GenePair<'a>> {
        self.pairs
    }

    /// Returns the pairs that contain the gene `gene_id`
    pub fn involving(&self, gene_id: &str) -> Vec<GenePair<'a>> {
        self.pairs
            .iter()
            .filter(|pair| involves(pair, gene_id))
            .copied()
            .collect()
    }
}

pub(crate) fn involves(pair: &GenePair<'_>, gene_id: &str) -> bool {
    pair.0 == gene_id || pair.1 == gene_id
}

/// Extracts all genes and all relations of one kind from the subtree
///
/// # Errors
///
/// [`OrthoXmlError::MissingGene`](`crate::OrthoXmlError::MissingGene`) if a
/// gene reference does not exist in `lookup`. A group without any pairs is
/// not an error.
pub fn extract<'a, L: GeneLookup + ?Sized>(
    root: &'a GroupNode,
    kind: GroupKind,
    lookup: &L,
    strategy: Strategy,
) -> OrthoXmlResult<Relations<'a>> {
    match strategy {
        Strategy::Recursive => pairs_recursive(root, kind, lookup),
        Strategy::Iterative => pairs_iterative(root, kind, lookup),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixtures;
    use crate::models::Group;
    use crate::OrthoXmlError;

    fn as_set<'a>(pairs: &[GenePair<'a>]) -> HashSet<GenePair<'a>> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn two_level_tree() {
        let hog = fixtures::two_level_hog();
        let genes = fixtures::two_level_genes();

        for strategy in [Strategy::Recursive, Strategy::Iterative] {
            // every gene of one child pairs with every gene of the other: 2 x 2
            let orthologs = extract(&hog, GroupKind::Ortholog, &genes, strategy).unwrap();
            assert_eq!(
                orthologs.pairs(),
                &[
                    ("HUMAN1", "HUMAN2"),
                    ("HUMAN1", "MOUSE2"),
                    ("MOUSE1", "HUMAN2"),
                    ("MOUSE1", "MOUSE2")
                ][..]
            );

            let paralogs = extract(&hog, GroupKind::Paralog, &genes, strategy).unwrap();
            assert_eq!(
                paralogs.pairs(),
                &[("HUMAN1", "MOUSE1"), ("HUMAN2", "MOUSE2")][..]
            );
        }
    }

    #[test]
    fn two_paralog_children_with_two_genes() {
        // (|children| choose 2) crossed for orthologs, per-child pairs for paralogs
        let hog = GroupNode::Ortholog(
            Group::new()
                .with_child(GroupNode::Paralog(
                    Group::new().with_gene_ref("a1").with_gene_ref("b1"),
                ))
                .with_child(GroupNode::Paralog(Group::new().with_gene_ref("c1"))),
        );
        let genes: HashSet<&str> = ["a1", "b1", "c1"].into_iter().collect();
        let orthologs = extract(&hog, GroupKind::Ortholog, &genes, Strategy::Iterative).unwrap();
        assert_eq!(orthologs.pairs(), &[("a1", "c1"), ("b1", "c1")][..]);
        let paralogs = extract(&hog, GroupKind::Paralog, &genes, Strategy::Iterative).unwrap();
        assert_eq!(paralogs.pairs(), &[("a1", "b1")][..]);
    }

    #[test]
    fn genes_do_not_depend_on_kind() {
        let hog = fixtures::nested_hog();
        let genes = fixtures::nested_genes();
        for strategy in [Strategy::Recursive, Strategy::Iterative] {
            let orthologs = extract(&hog, GroupKind::Ortholog, &genes, strategy).unwrap();
            let paralogs = extract(&hog, GroupKind::Paralog, &genes, strategy).unwrap();
            assert_eq!(orthologs.genes(), paralogs.genes());
            assert_eq!(orthologs.genes(), hog.gene_ids().as_slice());
        }
    }

    #[test]
    fn strategies_are_identical() {
        let genes = fixtures::nested_genes();
        let hog = fixtures::nested_hog();
        for kind in [GroupKind::Ortholog, GroupKind::Paralog] {
            let rec = extract(&hog, kind, &genes, Strategy::Recursive).unwrap();
            let iter = extract(&hog, kind, &genes, Strategy::Iterative).unwrap();
            assert_eq!(rec, iter);
            assert_eq!(as_set(rec.pairs()).len(), rec.pairs().len());
        }
    }

    #[test]
    fn strategies_are_identical_on_generated_trees() {
        for seed in 1..20u64 {
            let (hog, genes) = fixtures::generated_hog(seed, 6);
            for kind in [GroupKind::Ortholog, GroupKind::Paralog] {
                let rec = pairs_recursive(&hog, kind, &genes).unwrap();
                let iter = pairs_iterative(&hog, kind, &genes).unwrap();
                assert_eq!(as_set(rec.pairs()), as_set(iter.pairs()));
                assert_eq!(rec.pairs(), iter.pairs());
                assert_eq!(rec.genes(), iter.genes());
            }
        }
    }

    #[test]
    fn every_gene_pair_has_exactly_one_relation() {
        let (hog, genes) = fixtures::generated_hog(7, 6);
        let orthologs = pairs_iterative(&hog, GroupKind::Ortholog, &genes).unwrap();
        let paralogs = pairs_iterative(&hog, GroupKind::Paralog, &genes).unwrap();
        let n = orthologs.genes().len();
        assert_eq!(orthologs.pairs().len() + paralogs.pairs().len(), n * (n - 1) / 2);
    }

    #[test]
    fn missing_gene_is_an_error() {
        let hog = GroupNode::Ortholog(
            Group::new()
                .with_gene_ref("a1")
                .with_child(GroupNode::Paralog(Group::new().with_gene_ref("ghost"))),
        );
        let genes: HashSet<&str> = ["a1"].into_iter().collect();
        for strategy in [Strategy::Recursive, Strategy::Iterative] {
            for kind in [GroupKind::Ortholog, GroupKind::Paralog] {
                match extract(&hog, kind, &genes, strategy) {
                    Err(OrthoXmlError::MissingGene(id)) => assert_eq!(id, "ghost"),
                    other => panic!("expected MissingGene, got {:?}", other),
                }
            }
        }
    }

    #[test]
    fn group_without_pairs_is_not_an_error() {
        let hog = GroupNode::Ortholog(Group::new().with_gene_ref("a1"));
        let genes: HashSet<&str> = ["a1"].into_iter().collect();
        let res = extract(&hog, GroupKind::Ortholog, &genes, Strategy::Recursive).unwrap();
        assert!(res.pairs().is_empty());
        assert_eq!(res.genes(), &["a1"]);
    }

    #[test]
    fn bare_gene_ref_root() {
        let root = GroupNode::gene_ref("a1");
        let genes: HashSet<&str> = ["a1"].into_iter().collect();
        for strategy in [Strategy::Recursive, Strategy::Iterative] {
            let res = extract(&root, GroupKind::Ortholog, &genes, strategy).unwrap();
            assert!(res.pairs().is_empty());
            assert_eq!(res.genes(), &["a1"]);
        }
        let empty: HashSet<&str> = HashSet::new();
        assert!(extract(&root, GroupKind::Paralog, &empty, Strategy::Iterative).is_err());
    }

    #[test]
    fn filter_by_gene() {
        let hog = fixtures::two_level_hog();
        let genes = fixtures::two_level_genes();
        let all = extract(&hog, GroupKind::Ortholog, &genes, Strategy::Recursive).unwrap();
        let filtered = all.involving("HUMAN1");
        assert_eq!(filtered, vec![("HUMAN1", "HUMAN2"), ("HUMAN1", "MOUSE2")]);

        let lazy: Vec<GenePair> = PairIter::new(&hog, GroupKind::Ortholog, &genes)
            .involving("HUMAN1")
            .collect::<OrthoXmlResult<_>>()
            .unwrap();
        assert_eq!(lazy, filtered);
        assert!(all.involving("unknown").is_empty());
    }
}
