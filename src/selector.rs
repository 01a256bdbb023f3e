//! Selection of maximal orthologous groups from a rootHOG
//!
//! A maximal orthologous group (OG) contains at most one gene per species
//! and no two genes that are paralogs of each other. It is selected in a
//! single post-order pass over the group tree:
//!
//! - A gene reference selects its own gene.
//! - An ortholog group merges the selections of its children in document
//!   order. The first child that contributes a species keeps it.
//! - A paralog group merges the selections of its children ordered by
//!   their size, largest first. Children of the same size keep their
//!   document order. Again, the first child that contributes a species
//!   keeps it.
//!
//! The genes of the result are listed in the order in which they claimed
//! their species.
use std::collections::{HashMap, HashSet};

use tracing::error;

use crate::models::{Group, GroupKind, GroupNode};
use crate::{OrthoXmlError, OrthoXmlResult};

/// The maximal orthologous group of one rootHOG
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaximalOg<'a> {
    hog_id: Option<&'a str>,
    genes: Vec<&'a str>,
}

impl<'a> MaximalOg<'a> {
    /// The ID of the rootHOG, if it has one
    pub fn hog_id(&self) -> Option<&'a str> {
        self.hog_id
    }

    /// The IDs of the selected genes, one per species
    pub fn genes(&self) -> &[&'a str] {
        &self.genes
    }

    /// The number of selected genes
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Returns `true` if no gene was selected
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

/// Selected genes of a subtree, paired with their species
type Selection<'a, 'v> = Vec<(&'a str, &'v str)>;

/// A group whose children are still being selected
struct Frame<'a, 'v> {
    kind: GroupKind,
    group: &'a Group,
    next: usize,
    parts: Vec<Selection<'a, 'v>>,
}

impl<'a, 'v> Frame<'a, 'v> {
    fn new(kind: GroupKind, group: &'a Group) -> Self {
        Self {
            kind,
            group,
            next: 0,
            parts: Vec::new(),
        }
    }
}

/// Selects the maximal orthologous group of `root`
///
/// `species` maps every gene ID to the name (or any other unique
/// identifier) of its species.
///
/// # Errors
///
/// [`OrthoXmlError::MissingGene`] if a referenced gene is not in `species`
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use orthoxml::{Group, GroupNode};
/// use orthoxml::selector::maximal_og;
///
/// let hog = GroupNode::Ortholog(
///     Group::new()
///         .with_id("HOG:1")
///         .with_child(GroupNode::Paralog(
///             Group::new().with_gene_ref("human1").with_gene_ref("human2"),
///         ))
///         .with_gene_ref("mouse1"),
/// );
/// let species: HashMap<&str, &str> = [
///     ("human1", "HUMAN"),
///     ("human2", "HUMAN"),
///     ("mouse1", "MOUSE"),
/// ]
/// .into_iter()
/// .collect();
///
/// let og = maximal_og(&hog, &species).unwrap();
/// assert_eq!(og.hog_id(), Some("HOG:1"));
/// assert_eq!(og.genes(), &["human1", "mouse1"]);
/// ```
pub fn maximal_og<'a, 'v>(
    root: &'a GroupNode,
    species: &HashMap<&str, &'v str>,
) -> OrthoXmlResult<MaximalOg<'a>> {
    let genes = select(root, species)?
        .into_iter()
        .map(|(gene, _)| gene)
        .collect();
    Ok(MaximalOg {
        hog_id: root.group().and_then(Group::id),
        genes,
    })
}

fn leaf<'a, 'v>(
    gene_id: &'a str,
    species: &HashMap<&str, &'v str>,
) -> OrthoXmlResult<Selection<'a, 'v>> {
    match species.get(gene_id) {
        Some(name) => Ok(vec![(gene_id, *name)]),
        None => {
            error!("Gene {} has no species", gene_id);
            Err(OrthoXmlError::MissingGene(gene_id.to_string()))
        }
    }
}

fn merge<'a, 'v>(kind: GroupKind, mut parts: Vec<Selection<'a, 'v>>) -> Selection<'a, 'v> {
    if kind == GroupKind::Paralog {
        // stable, so equal sizes stay in document order
        parts.sort_by(|a, b| b.len().cmp(&a.len()));
    }
    let mut claimed: HashSet<&str> = HashSet::new();
    let mut res = Vec::new();
    for (gene, species) in parts.into_iter().flatten() {
        if claimed.insert(species) {
            res.push((gene, species));
        }
    }
    res
}

/// Post-order selection with an explicit stack
fn select<'a, 'v>(
    root: &'a GroupNode,
    species: &HashMap<&str, &'v str>,
) -> OrthoXmlResult<Selection<'a, 'v>> {
    let (kind, group) = match root {
        GroupNode::GeneRef(gene) => return leaf(gene.id(), species),
        GroupNode::Ortholog(group) => (GroupKind::Ortholog, group),
        GroupNode::Paralog(group) => (GroupKind::Paralog, group),
    };
    let mut stack = vec![Frame::new(kind, group)];

    while let Some(frame) = stack.last_mut() {
        let group = frame.group;
        match group.children().get(frame.next) {
            Some(child) => {
                frame.next += 1;
                match child {
                    GroupNode::GeneRef(gene) => frame.parts.push(leaf(gene.id(), species)?),
                    GroupNode::Ortholog(child_group) => {
                        stack.push(Frame::new(GroupKind::Ortholog, child_group));
                    }
                    GroupNode::Paralog(child_group) => {
                        stack.push(Frame::new(GroupKind::Paralog, child_group));
                    }
                }
            }
            None => {
                let parts = std::mem::take(&mut frame.parts);
                let kind = frame.kind;
                stack.pop();
                let selection = merge(kind, parts);
                match stack.last_mut() {
                    Some(parent) => parent.parts.push(selection),
                    None => return Ok(selection),
                }
            }
        }
    }
    Ok(Vec::new())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixtures;

    fn species_of<'a>(pairs: &[(&'a str, &'a str)]) -> HashMap<&'a str, &'a str> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn nested_hog() {
        let hog = fixtures::nested_hog();
        let species = fixtures::species_map();
        let og = maximal_og(&hog, &species).unwrap();
        assert_eq!(og.hog_id(), Some("HOG:0001"));
        assert_eq!(og.genes(), &["HUMAN1", "MOUSE1", "RAT1", "CHICK1"]);
    }

    #[test]
    fn paralog_prefers_larger_selection() {
        let hog = GroupNode::Paralog(
            Group::new()
                .with_child(GroupNode::Ortholog(
                    Group::new().with_gene_ref("h1").with_gene_ref("m1"),
                ))
                .with_child(GroupNode::Ortholog(
                    Group::new()
                        .with_gene_ref("h2")
                        .with_gene_ref("m2")
                        .with_gene_ref("r2"),
                )),
        );
        let species = species_of(&[
            ("h1", "HUMAN"),
            ("m1", "MOUSE"),
            ("h2", "HUMAN"),
            ("m2", "MOUSE"),
            ("r2", "RAT"),
        ]);
        let og = maximal_og(&hog, &species).unwrap();
        assert_eq!(og.genes(), &["h2", "m2", "r2"]);
        assert_eq!(og.hog_id(), None);
    }

    #[test]
    fn paralog_tie_keeps_document_order() {
        let hog = GroupNode::Paralog(
            Group::new()
                .with_child(GroupNode::Ortholog(
                    Group::new().with_gene_ref("h1").with_gene_ref("m1"),
                ))
                .with_child(GroupNode::Ortholog(
                    Group::new().with_gene_ref("h2").with_gene_ref("r2"),
                )),
        );
        let species = species_of(&[
            ("h1", "HUMAN"),
            ("m1", "MOUSE"),
            ("h2", "HUMAN"),
            ("r2", "RAT"),
        ]);
        // HUMAN is contested and goes to the first child, RAT is not
        let og = maximal_og(&hog, &species).unwrap();
        assert_eq!(og.genes(), &["h1", "m1", "r2"]);
    }

    #[test]
    fn ortholog_first_child_wins() {
        let hog = GroupNode::Ortholog(
            Group::new()
                .with_gene_ref("m1")
                .with_child(GroupNode::Ortholog(
                    Group::new().with_gene_ref("h1").with_gene_ref("m2"),
                )),
        );
        let species = species_of(&[("m1", "MOUSE"), ("h1", "HUMAN"), ("m2", "MOUSE")]);
        let og = maximal_og(&hog, &species).unwrap();
        assert_eq!(og.genes(), &["m1", "h1"]);
    }

    #[test]
    fn gene_ref_root() {
        let root = GroupNode::gene_ref("h1");
        let species = species_of(&[("h1", "HUMAN")]);
        let og = maximal_og(&root, &species).unwrap();
        assert_eq!(og.genes(), &["h1"]);
        assert_eq!(og.len(), 1);
    }

    #[test]
    fn missing_species_is_an_error() {
        let hog = GroupNode::Ortholog(Group::new().with_gene_ref("h1").with_gene_ref("x"));
        let species = species_of(&[("h1", "HUMAN")]);
        match maximal_og(&hog, &species) {
            Err(OrthoXmlError::MissingGene(id)) => assert_eq!(id, "x"),
            other => panic!("expected MissingGene, got {:?}", other),
        }
    }

    #[test]
    fn one_gene_per_species_on_generated_trees() {
        for seed in 1..20u64 {
            let (hog, genes) = fixtures::generated_hog(seed, 6);
            let owned = fixtures::generated_species(&genes);
            let species: HashMap<&str, &str> =
                owned.iter().map(|(gene, sp)| (*gene, sp.as_str())).collect();

            let og = maximal_og(&hog, &species).unwrap();
            assert!(!og.is_empty());
            let covered: HashSet<&str> = og.genes().iter().map(|gene| species[gene]).collect();
            assert_eq!(covered.len(), og.len());
        }
    }

    #[test]
    fn deep_tree_does_not_exhaust_the_stack() {
        let mut node = GroupNode::Ortholog(Group::new().with_gene_ref("h1").with_gene_ref("m1"));
        for idx in 0..10_000 {
            let group = Group::new().with_child(node);
            node = if idx % 2 == 0 {
                GroupNode::Paralog(group)
            } else {
                GroupNode::Ortholog(group)
            };
        }
        let species = species_of(&[("h1", "HUMAN"), ("m1", "MOUSE")]);
        let og = maximal_og(&node, &species).unwrap();
        assert_eq!(og.genes(), &["h1", "m1"]);
    }
}
