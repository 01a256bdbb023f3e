use std::fmt::Display;

use tracing::error;

use crate::{OrthoXmlError, OrthoXmlResult};

/// The evolutionary event that separates the children of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// Speciation, the children are orthologs of each other
    Ortholog,
    /// Duplication, the children are paralogs of each other
    Paralog,
}

impl Display for GroupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupKind::Ortholog => write!(f, "ortholog"),
            GroupKind::Paralog => write!(f, "paralog"),
        }
    }
}

/// A reference to a [`Gene`](`crate::Gene`) by its document-unique ID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeneRef {
    id: String,
}

impl GeneRef {
    /// Initializes a new reference to the gene with ID `id`
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self { id: id.into() }
    }

    /// The ID of the referenced gene
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// A score attached to a group, e.g. the `CompletenessScore`
///
/// The value is stored as it appears in the document. It is parsed
/// only when the score is used, e.g. for filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    id: String,
    value: String,
}

impl Score {
    /// Initializes a new score
    pub fn new<S: Into<String>, T: Into<String>>(id: S, value: T) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }

    /// The ID of the score
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The raw value of the score
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the numeric value of the score
    ///
    /// # Errors
    ///
    /// [`OrthoXmlError::MalformedScore`] if the value is not a number
    ///
    /// # Examples
    ///
    /// ```
    /// use orthoxml::Score;
    ///
    /// assert_eq!(Score::new("CompletenessScore", "0.75").as_f64().unwrap(), 0.75);
    /// assert!(Score::new("CompletenessScore", "high").as_f64().is_err());
    /// ```
    pub fn as_f64(&self) -> OrthoXmlResult<f64> {
        self.value.trim().parse::<f64>().map_err(|_| {
            error!("Score {} has non-numeric value {}", self.id, self.value);
            OrthoXmlError::MalformedScore {
                score_id: self.id.clone(),
                value: self.value.clone(),
            }
        })
    }
}

/// The content of an ortholog or paralog group
///
/// The kind of the group is not part of the `Group` itself, but is
/// encoded by the [`GroupNode`] variant that holds it.
///
/// All children (gene references and nested groups) are stored in
/// document order. [`Group::gene_refs`], [`Group::ortholog_groups`] and
/// [`Group::paralog_groups`] provide typed views on them.
///
/// # Examples
///
/// ```
/// use orthoxml::{Group, GroupNode};
///
/// let group = Group::new()
///     .with_id("HOG:0001")
///     .with_taxon_id("2759")
///     .with_gene_ref("1")
///     .with_child(GroupNode::Paralog(Group::new().with_gene_ref("2").with_gene_ref("3")));
///
/// assert_eq!(group.children().len(), 2);
/// assert_eq!(group.gene_refs().count(), 1);
/// assert_eq!(group.paralog_groups().count(), 1);
/// assert_eq!(group.ortholog_groups().count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct Group {
    id: Option<String>,
    taxon_id: Option<String>,
    scores: Vec<Score>,
    children: Vec<GroupNode>,
}

impl Group {
    /// Constructs a new, empty group
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the group ID, e.g. the ID of a rootHOG
    #[must_use]
    pub fn with_id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the taxon label of the group
    #[must_use]
    pub fn with_taxon_id<S: Into<String>>(mut self, taxon_id: S) -> Self {
        self.taxon_id = Some(taxon_id.into());
        self
    }

    /// Adds a score to the group
    #[must_use]
    pub fn with_score(mut self, score: Score) -> Self {
        self.scores.push(score);
        self
    }

    /// Appends a reference to the gene with ID `id`
    #[must_use]
    pub fn with_gene_ref<S: Into<String>>(mut self, id: S) -> Self {
        self.children.push(GroupNode::GeneRef(GeneRef::new(id)));
        self
    }

    /// Appends a child node
    #[must_use]
    pub fn with_child(mut self, child: GroupNode) -> Self {
        self.children.push(child);
        self
    }

    /// Appends a child node
    pub fn push(&mut self, child: GroupNode) {
        self.children.push(child);
    }

    /// The ID of the group
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The taxon label of the group
    pub fn taxon_id(&self) -> Option<&str> {
        self.taxon_id.as_deref()
    }

    /// All scores of the group
    pub fn scores(&self) -> &[Score] {
        &self.scores
    }

    /// Returns the first score with the given ID
    pub fn score(&self, score_id: &str) -> Option<&Score> {
        self.scores.iter().find(|score| score.id == score_id)
    }

    /// All children in document order
    pub fn children(&self) -> &[GroupNode] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<GroupNode> {
        &mut self.children
    }

    /// The direct gene references of the group
    pub fn gene_refs(&self) -> impl Iterator<Item = &GeneRef> {
        self.children.iter().filter_map(|child| match child {
            GroupNode::GeneRef(gene) => Some(gene),
            _ => None,
        })
    }

    /// The direct ortholog subgroups
    pub fn ortholog_groups(&self) -> impl Iterator<Item = &Group> {
        self.children.iter().filter_map(|child| match child {
            GroupNode::Ortholog(group) => Some(group),
            _ => None,
        })
    }

    /// The direct paralog subgroups
    pub fn paralog_groups(&self) -> impl Iterator<Item = &Group> {
        self.children.iter().filter_map(|child| match child {
            GroupNode::Paralog(group) => Some(group),
            _ => None,
        })
    }

    /// Returns `true` if the group has neither gene references nor subgroups
    ///
    /// Such a group does not carry any information.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// A copy of the group without its children
    fn shell(&self) -> Self {
        Group {
            id: self.id.clone(),
            taxon_id: self.taxon_id.clone(),
            scores: self.scores.clone(),
            children: Vec::with_capacity(self.children.len()),
        }
    }

    fn same_shell(&self, other: &Group) -> bool {
        self.id == other.id
            && self.taxon_id == other.taxon_id
            && self.scores == other.scores
            && self.children.len() == other.children.len()
    }
}

type Wrap = fn(Group) -> GroupNode;

// Clone, PartialEq and Drop walk the tree with an explicit stack, the
// derived versions recurse once per nesting level
impl Clone for Group {
    fn clone(&self) -> Self {
        let mut stack: Vec<(std::slice::Iter<'_, GroupNode>, Group, Option<Wrap>)> =
            vec![(self.children.iter(), self.shell(), None)];
        loop {
            let next = match stack.last_mut() {
                Some(frame) => frame.0.next(),
                None => return Group::default(),
            };
            match next {
                Some(GroupNode::GeneRef(gene)) => {
                    if let Some(frame) = stack.last_mut() {
                        frame.1.children.push(GroupNode::GeneRef(gene.clone()));
                    }
                }
                Some(GroupNode::Ortholog(group)) => {
                    stack.push((
                        group.children.iter(),
                        group.shell(),
                        Some(GroupNode::Ortholog as Wrap),
                    ));
                }
                Some(GroupNode::Paralog(group)) => {
                    stack.push((
                        group.children.iter(),
                        group.shell(),
                        Some(GroupNode::Paralog as Wrap),
                    ));
                }
                None => {
                    let (_, copy, wrap) = match stack.pop() {
                        Some(frame) => frame,
                        None => return Group::default(),
                    };
                    match (wrap, stack.last_mut()) {
                        (Some(wrap), Some(parent)) => parent.1.children.push(wrap(copy)),
                        _ => return copy,
                    }
                }
            }
        }
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((left, right)) = stack.pop() {
            if !left.same_shell(right) {
                return false;
            }
            for pair in left.children.iter().zip(&right.children) {
                match pair {
                    (GroupNode::GeneRef(a), GroupNode::GeneRef(b)) => {
                        if a != b {
                            return false;
                        }
                    }
                    (GroupNode::Ortholog(a), GroupNode::Ortholog(b))
                    | (GroupNode::Paralog(a), GroupNode::Paralog(b)) => stack.push((a, b)),
                    _ => return false,
                }
            }
        }
        true
    }
}

impl Eq for Group {}

// Deeply nested groups would overflow the stack with the
// recursive default drop glue
impl Drop for Group {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            if let Some(group) = node.group_mut() {
                stack.append(&mut group.children);
            }
        }
    }
}

/// A node of the group tree
///
/// The variant encodes the type of evolutionary event at this node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupNode {
    /// A leaf, referencing a gene
    GeneRef(GeneRef),
    /// A speciation node
    Ortholog(Group),
    /// A duplication node
    Paralog(Group),
}

impl GroupNode {
    /// Constructs a leaf node, referencing the gene with ID `id`
    pub fn gene_ref<S: Into<String>>(id: S) -> Self {
        GroupNode::GeneRef(GeneRef::new(id))
    }

    /// The kind of the group, `None` for gene references
    pub fn kind(&self) -> Option<GroupKind> {
        match self {
            GroupNode::GeneRef(_) => None,
            GroupNode::Ortholog(_) => Some(GroupKind::Ortholog),
            GroupNode::Paralog(_) => Some(GroupKind::Paralog),
        }
    }

    /// The group content, `None` for gene references
    pub fn group(&self) -> Option<&Group> {
        match self {
            GroupNode::GeneRef(_) => None,
            GroupNode::Ortholog(group) | GroupNode::Paralog(group) => Some(group),
        }
    }

    /// Mutable group content, `None` for gene references
    pub fn group_mut(&mut self) -> Option<&mut Group> {
        match self {
            GroupNode::GeneRef(_) => None,
            GroupNode::Ortholog(group) | GroupNode::Paralog(group) => Some(group),
        }
    }

    /// Returns `true` for [`GroupNode::Ortholog`] nodes, i.e. potential rootHOGs
    pub fn is_ortholog_group(&self) -> bool {
        matches!(self, GroupNode::Ortholog(_))
    }

    /// The IDs of all genes referenced in the subtree, in document order
    ///
    /// # Examples
    ///
    /// ```
    /// use orthoxml::{Group, GroupNode};
    ///
    /// let hog = GroupNode::Ortholog(
    ///     Group::new()
    ///         .with_gene_ref("1")
    ///         .with_child(GroupNode::Paralog(Group::new().with_gene_ref("2").with_gene_ref("3")))
    /// );
    /// assert_eq!(hog.gene_ids(), vec!["1", "2", "3"]);
    /// ```
    pub fn gene_ids(&self) -> Vec<&str> {
        let mut res = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                GroupNode::GeneRef(gene) => res.push(gene.id()),
                GroupNode::Ortholog(group) | GroupNode::Paralog(group) => {
                    stack.extend(group.children.iter().rev());
                }
            }
        }
        res
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn typed_views_keep_document_order() {
        let group = Group::new()
            .with_gene_ref("1")
            .with_child(GroupNode::Ortholog(Group::new().with_gene_ref("2")))
            .with_gene_ref("3")
            .with_child(GroupNode::Paralog(Group::new().with_gene_ref("4")))
            .with_child(GroupNode::Ortholog(Group::new().with_gene_ref("5")));

        let refs: Vec<&str> = group.gene_refs().map(GeneRef::id).collect();
        assert_eq!(refs, vec!["1", "3"]);
        assert_eq!(group.ortholog_groups().count(), 2);
        assert_eq!(group.paralog_groups().count(), 1);

        let node = GroupNode::Paralog(group);
        assert_eq!(node.gene_ids(), vec!["1", "2", "3", "4", "5"]);
        assert_eq!(node.kind(), Some(GroupKind::Paralog));
    }

    #[test]
    fn score_lookup() {
        let group = Group::new()
            .with_score(Score::new("CompletenessScore", "0.4"))
            .with_score(Score::new("Other", "x"));
        assert_eq!(group.score("CompletenessScore").unwrap().as_f64().unwrap(), 0.4);
        assert!(group.score("Other").unwrap().as_f64().is_err());
        assert!(group.score("Missing").is_none());
    }

    #[test]
    fn drop_deep_tree() {
        let mut node = GroupNode::gene_ref("leaf");
        for idx in 0..100_000 {
            let group = Group::new().with_child(node);
            node = if idx % 2 == 0 {
                GroupNode::Ortholog(group)
            } else {
                GroupNode::Paralog(group)
            };
        }
        assert_eq!(node.gene_ids(), vec!["leaf"]);
        drop(node);
    }

    #[test]
    fn clone_and_compare_deep_tree() {
        let mut node = GroupNode::gene_ref("leaf");
        for idx in 0..100_000 {
            let group = Group::new().with_gene_ref(format!("g{idx}")).with_child(node);
            node = if idx % 2 == 0 {
                GroupNode::Ortholog(group)
            } else {
                GroupNode::Paralog(group)
            };
        }
        let copy = node.clone();
        assert!(copy == node);
        assert_eq!(copy.gene_ids().len(), 100_001);
        assert_eq!(copy.gene_ids().last(), Some(&"leaf"));
    }

    #[test]
    fn clone_keeps_structure() {
        let group = Group::new()
            .with_id("HOG:1")
            .with_taxon_id("40674")
            .with_score(Score::new("CompletenessScore", "0.9"))
            .with_gene_ref("1")
            .with_child(GroupNode::Paralog(Group::new().with_gene_ref("2").with_gene_ref("3")))
            .with_child(GroupNode::Ortholog(Group::new().with_taxon_id("9606").with_gene_ref("4")));
        let copy = group.clone();
        assert!(copy == group);
        assert_eq!(copy.id(), Some("HOG:1"));
        assert_eq!(copy.score("CompletenessScore"), group.score("CompletenessScore"));
        assert_eq!(copy.paralog_groups().count(), 1);
        assert_eq!(copy.ortholog_groups().next().unwrap().taxon_id(), Some("9606"));

        let node = GroupNode::Ortholog(group.clone());
        assert!(node != GroupNode::Paralog(group.clone()));
        assert!(group != group.clone().with_gene_ref("5"));
    }

    #[test]
    fn empty_group() {
        assert!(Group::new().is_empty());
        assert!(!Group::new().with_gene_ref("1").is_empty());
        assert!(GroupNode::gene_ref("1").group().is_none());
    }
}
