use tracing::error;

use crate::models::{GroupKind, GroupNode};
use crate::relations::{GeneLookup, Relations};
use crate::utils::{Bounds, CrossPairs};
use crate::{OrthoXmlError, OrthoXmlResult};

/// Extracts all genes and relations of one kind using recursion
///
/// The recursion depth equals the depth of the group tree. Use
/// [`pairs_iterative`](`crate::relations::pairs_iterative`) for
/// very deeply nested trees.
///
/// # Errors
///
/// [`OrthoXmlError::MissingGene`] if a gene reference does not exist in `lookup`
pub fn pairs_recursive<'a, L: GeneLookup + ?Sized>(
    root: &'a GroupNode,
    kind: GroupKind,
    lookup: &L,
) -> OrthoXmlResult<Relations<'a>> {
    let mut relations = Relations::default();
    collect(root, kind, lookup, &mut relations)?;
    Ok(relations)
}

/// Appends the genes of `node` to `relations` and adds all pairs of the subtree
///
/// The genes of every child form a contiguous segment at the end of
/// `relations.genes`, so the pairs of a matching group are the pairs
/// that cross these segments.
fn collect<'a, L: GeneLookup + ?Sized>(
    node: &'a GroupNode,
    kind: GroupKind,
    lookup: &L,
    relations: &mut Relations<'a>,
) -> OrthoXmlResult<()> {
    match node {
        GroupNode::GeneRef(gene) => {
            if !lookup.contains_gene(gene.id()) {
                error!("Gene reference {} does not exist", gene.id());
                return Err(OrthoXmlError::MissingGene(gene.id().to_string()));
            }
            relations.genes.push(gene.id());
        }
        GroupNode::Ortholog(group) | GroupNode::Paralog(group) => {
            let mut bounds = Bounds::new();
            for child in group.children() {
                bounds.push(relations.genes.len());
                collect(child, kind, lookup, relations)?;
            }
            if node.kind() == Some(kind) {
                let genes = &relations.genes;
                let cross = CrossPairs::from_bounds(bounds, genes.len());
                relations
                    .pairs
                    .extend(cross.map(|(idx1, idx2)| (genes[idx1], genes[idx2])));
            }
        }
    }
    Ok(())
}
