use std::collections::{BTreeMap, HashMap};

use tracing::{debug, error, trace, warn};

use crate::models::GroupKind;
use crate::newick::{escape_label, Event, LeafLabel, NewickOptions, NewickTrees, NodeAnnotation};
use crate::{OrthoXmlError, OrthoXmlResult, GENE, GENE_REF, ORTHOLOG_GROUP, PARALOG_GROUP, SPECIES};

/// Replaces characters that delimit NHX tags or Newick nodes by `_`
fn nhx_value(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            ':' | '=' | '[' | ']' | '(' | ')' | ',' | ';' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}

/// A group that was opened but not yet closed
#[derive(Debug)]
struct Frame {
    kind: GroupKind,
    id: Option<String>,
    taxon_id: Option<String>,
    children: Vec<String>,
}

impl Frame {
    /// Renders the subtree as `(child1,child2,...)label`
    fn render(&self, annotation: NodeAnnotation) -> String {
        let mut newick = String::with_capacity(
            self.children.iter().map(String::len).sum::<usize>() + self.children.len() + 24,
        );
        newick.push('(');
        newick.push_str(&self.children.join(","));
        newick.push(')');
        match annotation {
            NodeAnnotation::TaxonId => {
                if let Some(taxon_id) = &self.taxon_id {
                    newick.push_str(&escape_label(taxon_id));
                }
            }
            NodeAnnotation::Nhx => {
                let mut tags = Vec::with_capacity(2);
                if let Some(taxon_id) = &self.taxon_id {
                    tags.push(format!("S={}", nhx_value(taxon_id)));
                }
                if self.kind == GroupKind::Paralog {
                    tags.push("D=Y".to_string());
                }
                if !tags.is_empty() {
                    newick.push_str("[&&NHX:");
                    newick.push_str(&tags.join(":"));
                    newick.push(']');
                }
            }
        }
        newick
    }
}

/// Builds Newick trees from a stream of element events
///
/// The converter is a state machine with a stack of open groups. It is
/// either outside of any rootHOG (empty stack) or inside the subtree of
/// a rootHOG.
///
/// - Opening an `orthologGroup` or `paralogGroup` pushes a new frame.
/// - Opening a `geneRef` appends a leaf to the top frame. `geneRef`s
///   outside of a rootHOG are ignored.
/// - Closing a group renders its frame and appends it to the parent frame.
///   If there is no parent, the tree of the rootHOG is complete.
///
/// Only ortholog groups are rootHOGs. Top-level paralog groups are skipped
/// with their whole subtree.
///
/// Leaves are labeled with the attribute selected in [`NewickOptions`],
/// taken from the `gene` elements that precede the groups. Genes that
/// were not declared, or lack the attribute, are labeled by their ID.
///
/// # Examples
///
/// ```
/// use orthoxml::newick::{Event, LeafLabel, NewickConverter, NewickOptions};
///
/// let options = NewickOptions::default().with_leaf_label(LeafLabel::ProtId);
/// let mut converter = NewickConverter::new(options);
///
/// converter.feed(&Event::open("gene", &[("id", "1"), ("protId", "P53_HUMAN")])).unwrap();
/// converter.feed(&Event::close("gene")).unwrap();
/// converter.feed(&Event::open("orthologGroup", &[("id", "HOG:1")])).unwrap();
/// converter.feed(&Event::open("geneRef", &[("id", "1")])).unwrap();
/// converter.feed(&Event::close("geneRef")).unwrap();
/// converter.feed(&Event::open("geneRef", &[("id", "2")])).unwrap();
/// converter.feed(&Event::close("geneRef")).unwrap();
/// converter.feed(&Event::close("orthologGroup")).unwrap();
///
/// let trees = converter.finish().unwrap();
/// assert_eq!(trees.get("HOG:1"), Some("(P53_HUMAN,2);"));
/// ```
#[derive(Debug)]
pub struct NewickConverter {
    options: NewickOptions,
    stack: Vec<Frame>,
    skipped: usize,
    labels: HashMap<String, String>,
    current_species: Option<String>,
    gene_species: Option<HashMap<String, String>>,
    trees: BTreeMap<String, String>,
    root_hogs: usize,
}

impl NewickConverter {
    /// Constructs a new converter
    pub fn new(options: NewickOptions) -> Self {
        Self {
            options,
            stack: Vec::new(),
            skipped: 0,
            labels: HashMap::new(),
            current_species: None,
            gene_species: options.collects_species().then(HashMap::new),
            trees: BTreeMap::new(),
            root_hogs: 0,
        }
    }

    /// Returns `true` if the converter is inside a rootHOG
    pub fn in_root_hog(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Processes the next event of the stream
    ///
    /// # Errors
    ///
    /// [`OrthoXmlError::UnbalancedEvents`] if a group is closed that is not open
    pub fn feed(&mut self, event: &Event) -> OrthoXmlResult<()> {
        match event {
            Event::Open { .. } => {
                self.open(event);
                Ok(())
            }
            Event::Close { .. } => self.close(event.local_name()),
        }
    }

    fn open(&mut self, event: &Event) {
        match event.local_name() {
            SPECIES => self.current_species = event.attribute("name").map(str::to_string),
            GENE => self.declare_gene(event),
            ORTHOLOG_GROUP => self.open_group(GroupKind::Ortholog, event),
            PARALOG_GROUP => self.open_group(GroupKind::Paralog, event),
            GENE_REF => self.add_leaf(event),
            _ => {}
        }
    }

    fn declare_gene(&mut self, event: &Event) {
        let Some(id) = event.attribute("id") else {
            warn!("Ignoring gene without id");
            return;
        };
        let label = match self.options.leaf_label() {
            LeafLabel::Id => None,
            LeafLabel::GeneId => event.attribute("geneId"),
            LeafLabel::ProtId => event.attribute("protId"),
        };
        if let Some(label) = label {
            self.labels.insert(id.to_string(), label.to_string());
        }
        if let (Some(gene_species), Some(species)) =
            (self.gene_species.as_mut(), self.current_species.as_ref())
        {
            gene_species.insert(id.to_string(), species.clone());
        }
    }

    fn open_group(&mut self, kind: GroupKind, event: &Event) {
        if self.skipped > 0 {
            self.skipped += 1;
            return;
        }
        if self.stack.is_empty() {
            if kind == GroupKind::Paralog {
                warn!("Skipping top-level paralogGroup, it is not a rootHOG");
                self.skipped = 1;
                return;
            }
            self.root_hogs += 1;
        }
        self.stack.push(Frame {
            kind,
            id: event.attribute("id").map(str::to_string),
            taxon_id: event.attribute("taxonId").map(str::to_string),
            children: Vec::new(),
        });
    }

    fn add_leaf(&mut self, event: &Event) {
        if self.skipped > 0 {
            return;
        }
        let Some(id) = event.attribute("id") else {
            warn!("Ignoring geneRef without id");
            return;
        };
        let label = self.labels.get(id).map_or(id, String::as_str);
        match self.stack.last_mut() {
            Some(frame) => frame.children.push(escape_label(label)),
            None => trace!("Ignoring geneRef {} outside of a rootHOG", id),
        }
    }

    fn close(&mut self, tag: &str) -> OrthoXmlResult<()> {
        let kind = match tag {
            SPECIES => {
                self.current_species = None;
                return Ok(());
            }
            ORTHOLOG_GROUP => GroupKind::Ortholog,
            PARALOG_GROUP => GroupKind::Paralog,
            _ => return Ok(()),
        };
        if self.skipped > 0 {
            self.skipped -= 1;
            return Ok(());
        }

        let frame = match self.stack.pop() {
            Some(frame) if frame.kind == kind => frame,
            Some(frame) => {
                error!("Closing {} while a {} group is open", tag, frame.kind);
                return Err(OrthoXmlError::UnbalancedEvents(format!(
                    "closing {tag} while a {} group is open",
                    frame.kind
                )));
            }
            None => {
                error!("Closing {} without an open group", tag);
                return Err(OrthoXmlError::UnbalancedEvents(format!(
                    "closing {tag} without an open group"
                )));
            }
        };

        let subtree = frame.render(self.options.annotation());
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(subtree),
            None => {
                let key = self.unique_key(frame.id.as_deref());
                self.trees.insert(key, subtree + ";");
            }
        }
        Ok(())
    }

    /// The key of the current rootHOG, never one that is already taken
    ///
    /// A rootHOG without an ID is keyed by its 1-based position. Taken keys
    /// get the position appended, e.g. `HOG:1_3`.
    fn unique_key(&self, id: Option<&str>) -> String {
        let key = match id {
            Some(id) => id.to_string(),
            None => self.root_hogs.to_string(),
        };
        if !self.trees.contains_key(&key) {
            return key;
        }
        let mut unique = format!("{key}_{}", self.root_hogs);
        while self.trees.contains_key(&unique) {
            unique.push('_');
        }
        warn!("rootHOG key {} is already taken, using {}", key, unique);
        unique
    }

    /// Completes the conversion and returns all trees
    ///
    /// # Errors
    ///
    /// [`OrthoXmlError::UnbalancedEvents`] if groups are still open
    pub fn finish(self) -> OrthoXmlResult<NewickTrees> {
        let open = self.stack.len() + self.skipped;
        if open > 0 {
            error!("{} groups are still open at the end of the stream", open);
            return Err(OrthoXmlError::UnbalancedEvents(format!(
                "{open} groups are still open at the end of the stream"
            )));
        }
        debug!("Converted {} rootHOGs to Newick", self.trees.len());
        Ok(NewickTrees {
            trees: self.trees,
            gene_species: self.gene_species,
        })
    }
}
