use tracing::error;

use crate::models::{Group, GroupKind, GroupNode};
use crate::relations::{involves, GeneLookup, GenePair, Relations};
use crate::utils::{Bounds, CrossPairs};
use crate::{OrthoXmlError, OrthoXmlResult};

/// Extracts all genes and relations of one kind using an explicit work stack
///
/// This is [`PairIter`], collected.
///
/// # Errors
///
/// [`OrthoXmlError::MissingGene`] if a gene reference does not exist in `lookup`
pub fn pairs_iterative<'a, L: GeneLookup + ?Sized>(
    root: &'a GroupNode,
    kind: GroupKind,
    lookup: &L,
) -> OrthoXmlResult<Relations<'a>> {
    let mut iter = PairIter::new(root, kind, lookup);
    let pairs = iter.by_ref().collect::<OrthoXmlResult<Vec<_>>>()?;
    Ok(Relations {
        genes: iter.genes,
        pairs,
    })
}

/// A group that is currently being traversed
struct Frame<'a> {
    group: &'a Group,
    matches: bool,
    next: usize,
    bounds: Bounds,
}

/// Lazily yields all pairs of one kind from a group subtree
///
/// The subtree is traversed in post-order with an explicit stack, so
/// the depth of the tree is only limited by the available memory.
/// The pairs are yielded in a deterministic order: first the pairs of each
/// child in document order, then the pairs crossing the children.
///
/// If a gene reference does not exist, the iterator yields
/// a single [`OrthoXmlError::MissingGene`] and stops.
///
/// # Examples
///
/// ```
/// use std::collections::HashSet;
/// use orthoxml::{Group, GroupKind, GroupNode};
/// use orthoxml::relations::PairIter;
///
/// let hog = GroupNode::Ortholog(
///     Group::new().with_gene_ref("a").with_gene_ref("b").with_gene_ref("c")
/// );
/// let genes: HashSet<&str> = ["a", "b", "c"].into_iter().collect();
///
/// let mut pairs = PairIter::new(&hog, GroupKind::Ortholog, &genes);
/// assert_eq!(pairs.next().unwrap().unwrap(), ("a", "b"));
/// assert_eq!(pairs.next().unwrap().unwrap(), ("a", "c"));
/// assert_eq!(pairs.next().unwrap().unwrap(), ("b", "c"));
/// assert!(pairs.next().is_none());
/// ```
pub struct PairIter<'a, 'l, L: GeneLookup + ?Sized> {
    kind: GroupKind,
    lookup: &'l L,
    root: Option<&'a GroupNode>,
    stack: Vec<Frame<'a>>,
    genes: Vec<&'a str>,
    pending: Option<CrossPairs>,
    failed: bool,
}

impl<'a, 'l, L: GeneLookup + ?Sized> PairIter<'a, 'l, L> {
    /// Constructs a new iterator over the relations of `kind` in `root`
    pub fn new(root: &'a GroupNode, kind: GroupKind, lookup: &'l L) -> Self {
        Self {
            kind,
            lookup,
            root: Some(root),
            stack: Vec::new(),
            genes: Vec::new(),
            pending: None,
            failed: false,
        }
    }

    /// Returns only the pairs that contain the gene `gene_id`
    ///
    /// The traversal itself is unchanged, so errors are still reported.
    pub fn involving(self, gene_id: &str) -> Involving<'a, 'l, '_, L> {
        Involving {
            inner: self,
            gene_id,
        }
    }

    /// The IDs of all genes that were visited so far, in document order
    ///
    /// After the iterator is exhausted, these are all genes of the subtree.
    pub fn genes(&self) -> &[&'a str] {
        &self.genes
    }

    fn enter(&mut self, node: &'a GroupNode) -> OrthoXmlResult<()> {
        match node {
            GroupNode::GeneRef(gene) => {
                if !self.lookup.contains_gene(gene.id()) {
                    error!("Gene reference {} does not exist", gene.id());
                    return Err(OrthoXmlError::MissingGene(gene.id().to_string()));
                }
                self.genes.push(gene.id());
            }
            GroupNode::Ortholog(group) | GroupNode::Paralog(group) => {
                self.stack.push(Frame {
                    group,
                    matches: node.kind() == Some(self.kind),
                    next: 0,
                    bounds: Bounds::new(),
                });
            }
        }
        Ok(())
    }
}

impl<'a, 'l, L: GeneLookup + ?Sized> Iterator for PairIter<'a, 'l, L> {
    type Item = OrthoXmlResult<GenePair<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(cross) = self.pending.as_mut() {
                if let Some((idx1, idx2)) = cross.next() {
                    return Some(Ok((self.genes[idx1], self.genes[idx2])));
                }
                self.pending = None;
            }

            let node = if let Some(root) = self.root.take() {
                root
            } else {
                let frame = self.stack.last_mut()?;
                let group = frame.group;
                match group.children().get(frame.next) {
                    Some(child) => {
                        frame.next += 1;
                        frame.bounds.push(self.genes.len());
                        child
                    }
                    None => {
                        // all children are done, the frame is complete
                        if let Some(frame) = self.stack.pop() {
                            if frame.matches {
                                self.pending =
                                    Some(CrossPairs::from_bounds(frame.bounds, self.genes.len()));
                            }
                        }
                        continue;
                    }
                }
            };

            if let Err(err) = self.enter(node) {
                self.failed = true;
                self.stack.clear();
                return Some(Err(err));
            }
        }
    }
}

/// Yields the pairs of a [`PairIter`] that contain one gene
///
/// Created by [`PairIter::involving`]
pub struct Involving<'a, 'l, 'g, L: GeneLookup + ?Sized> {
    inner: PairIter<'a, 'l, L>,
    gene_id: &'g str,
}

impl<'a, 'l, 'g, L: GeneLookup + ?Sized> Iterator for Involving<'a, 'l, 'g, L> {
    type Item = OrthoXmlResult<GenePair<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(pair) if !involves(&pair, self.gene_id) => continue,
                res => return Some(res),
            }
        }
    }
}
