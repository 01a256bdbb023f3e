use std::collections::VecDeque;

use smallvec::SmallVec;

use crate::models::{Group, GroupNode};
use crate::tree::OrthoXmlTree;
use crate::{GENE, GENE_REF, GROUPS, ORTHOLOG_GROUP, PARALOG_GROUP, SPECIES};

/// Name-value pairs of an opened element
pub type Attributes = SmallVec<[(String, String); 4]>;

/// An element boundary of a depth-first document traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// An element was opened
    Open {
        /// The element name, optionally with namespace prefix
        tag: String,
        /// The attributes of the element
        attributes: Attributes,
    },
    /// An element was closed
    Close {
        /// The element name, optionally with namespace prefix
        tag: String,
    },
}

impl Event {
    /// Constructs an [`Event::Open`]
    pub fn open<S: Into<String>>(tag: S, attributes: &[(&str, &str)]) -> Self {
        Event::Open {
            tag: tag.into(),
            attributes: attributes
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }

    /// Constructs an [`Event::Close`]
    pub fn close<S: Into<String>>(tag: S) -> Self {
        Event::Close { tag: tag.into() }
    }

    /// The element name as reported by the source
    pub fn tag(&self) -> &str {
        match self {
            Event::Open { tag, .. } | Event::Close { tag } => tag,
        }
    }

    /// The element name without namespace
    pub fn local_name(&self) -> &str {
        crate::local_name(self.tag())
    }

    /// Returns the value of the attribute `name`
    ///
    /// Always `None` for [`Event::Close`].
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            Event::Open { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| crate::local_name(key) == name)
                .map(|(_, value)| value.as_str()),
            Event::Close { .. } => None,
        }
    }
}

/// Streams an [`OrthoXmlTree`] as element events
///
/// The events mirror the layout of an OrthoXML document: all `species`
/// elements with their `gene`s first, followed by the `groups` element
/// with all group trees in document order.
///
/// The traversal uses an explicit stack and works for trees of any depth.
///
/// # Examples
///
/// ```
/// use orthoxml::{Gene, Group, GroupNode, OrthoXmlTree, Species, TreeOptions};
/// use orthoxml::newick::Event;
///
/// let tree = OrthoXmlTree::new(
///     vec![Species::new("HUMAN", "9606", vec![Gene::new("1")])],
///     None,
///     vec![GroupNode::Ortholog(Group::new().with_id("HOG:1").with_gene_ref("1"))],
///     None,
///     &TreeOptions::default(),
/// );
/// let events: Vec<Event> = tree.events().collect();
///
/// assert_eq!(events.len(), 10);
/// assert_eq!(events[0], Event::open("species", &[("name", "HUMAN"), ("NCBITaxId", "9606")]));
/// assert_eq!(events[5], Event::open("orthologGroup", &[("id", "HOG:1")]));
/// assert_eq!(events[9], Event::close("groups"));
/// ```
pub struct TreeEvents<'a> {
    queue: VecDeque<Event>,
    roots: std::slice::Iter<'a, GroupNode>,
    stack: Vec<(&'a GroupNode, usize)>,
    done: bool,
}

impl<'a> TreeEvents<'a> {
    pub(crate) fn new(tree: &'a OrthoXmlTree) -> Self {
        let mut queue = VecDeque::new();
        for species in tree.species() {
            queue.push_back(Event::open(
                SPECIES,
                &[("name", species.name()), ("NCBITaxId", species.taxon_id())],
            ));
            for gene in species.genes() {
                let mut attributes = vec![("id", gene.id())];
                if let Some(gene_id) = gene.gene_id() {
                    attributes.push(("geneId", gene_id));
                }
                if let Some(prot_id) = gene.prot_id() {
                    attributes.push(("protId", prot_id));
                }
                queue.push_back(Event::open(GENE, &attributes));
                queue.push_back(Event::close(GENE));
            }
            queue.push_back(Event::close(SPECIES));
        }
        queue.push_back(Event::open(GROUPS, &[]));

        Self {
            queue,
            roots: tree.groups().iter(),
            stack: Vec::new(),
            done: false,
        }
    }

    fn open(&mut self, node: &'a GroupNode) -> Event {
        let (tag, group) = match node {
            GroupNode::GeneRef(gene) => {
                self.queue.push_back(Event::close(GENE_REF));
                return Event::open(GENE_REF, &[("id", gene.id())]);
            }
            GroupNode::Ortholog(group) => (ORTHOLOG_GROUP, group),
            GroupNode::Paralog(group) => (PARALOG_GROUP, group),
        };
        for score in group.scores() {
            self.queue
                .push_back(Event::open("score", &[("id", score.id()), ("value", score.value())]));
            self.queue.push_back(Event::close("score"));
        }
        self.stack.push((node, 0));
        Event::open(tag, &group_attributes(group))
    }
}

fn group_attributes(group: &Group) -> Vec<(&str, &str)> {
    let mut attributes = Vec::with_capacity(2);
    if let Some(id) = group.id() {
        attributes.push(("id", id));
    }
    if let Some(taxon_id) = group.taxon_id() {
        attributes.push(("taxonId", taxon_id));
    }
    attributes
}

impl<'a> Iterator for TreeEvents<'a> {
    type Item = Event;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(event) = self.queue.pop_front() {
            return Some(event);
        }

        if let Some((node, next)) = self.stack.last_mut() {
            let node: &'a GroupNode = *node;
            let child = node.group().and_then(|group| group.children().get(*next));
            if let Some(child) = child {
                *next += 1;
                return Some(self.open(child));
            }
            self.stack.pop();
            return Some(Event::close(match node {
                GroupNode::Paralog(_) => PARALOG_GROUP,
                _ => ORTHOLOG_GROUP,
            }));
        }

        match self.roots.next() {
            Some(root) => Some(self.open(root)),
            None if !self.done => {
                self.done = true;
                Some(Event::close(GROUPS))
            }
            None => None,
        }
    }
}
