//! The document-level aggregate of an OrthoXML document
use std::collections::{HashMap, HashSet};
use std::fmt::Display;

use tracing::{debug, warn};

use crate::census::GeneCensus;
use crate::models::{Gene, GroupKind, GroupNode, Species, Taxon};
use crate::newick::{self, NewickOptions, NewickTrees, TreeEvents};
use crate::relations::{GeneLookup, GenePair, PairIter};
use crate::selector::{maximal_og, MaximalOg};
use crate::{OrthoXmlError, OrthoXmlResult};

/// Handling of documents without taxonomy
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TaxonomyPolicy {
    /// Synthesize a single placeholder root taxon
    #[default]
    Placeholder,
    /// Keep the taxonomy absent
    Absent,
}

/// Settings for the construction of an [`OrthoXmlTree`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TreeOptions {
    taxonomy: TaxonomyPolicy,
}

impl TreeOptions {
    /// Constructs the default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the handling of documents without taxonomy
    #[must_use]
    pub fn with_taxonomy_policy(mut self, policy: TaxonomyPolicy) -> Self {
        self.taxonomy = policy;
        self
    }

    /// The handling of documents without taxonomy
    pub fn taxonomy_policy(&self) -> TaxonomyPolicy {
        self.taxonomy
    }
}

/// Basic counts of an [`OrthoXmlTree`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeStats {
    /// The number of distinct gene IDs
    pub genes: usize,
    /// The number of species
    pub species: usize,
    /// The number of group roots, including bare gene references
    pub groups: usize,
    /// The number of taxa, `0` without taxonomy
    pub taxa: usize,
    /// The OrthoXML version of the document
    pub version: Option<String>,
}

impl Display for TreeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "genes: {}, species: {}, groups: {}, taxa: {}, version: {}",
            self.genes,
            self.species,
            self.groups,
            self.taxa,
            self.version.as_deref().unwrap_or("-")
        )
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// `OrthoXmlTree` holds all data of one OrthoXML document
///
/// It owns the species with their genes, the taxonomy and the forest of
/// group trees. All analyses borrow the tree immutably, so a single tree
/// can be shared between threads.
///
/// # Gene index
///
/// Genes are looked up by their ID through an index that is built once on
/// construction. If the same ID is declared more than once, the last
/// declaration wins. Each overwrite is logged as a warning, but is not an
/// error.
///
/// # Examples
///
/// ```
/// use orthoxml::{Gene, Group, GroupNode, OrthoXmlTree, Species, TreeOptions};
///
/// let species = vec![
///     Species::new("HUMAN", "9606", vec![Gene::new("h1"), Gene::new("h2")]),
///     Species::new("MOUSE", "10090", vec![Gene::new("m1")]),
/// ];
/// let groups = vec![GroupNode::Ortholog(
///     Group::new()
///         .with_id("HOG:1")
///         .with_child(GroupNode::Paralog(Group::new().with_gene_ref("h1").with_gene_ref("h2")))
///         .with_gene_ref("m1"),
/// )];
///
/// let tree = OrthoXmlTree::new(species, None, groups, None, &TreeOptions::default());
///
/// assert_eq!(tree.ortholog_pairs().unwrap(), vec![("h1", "m1"), ("h2", "m1")]);
/// assert_eq!(tree.paralog_pairs().unwrap(), vec![("h1", "h2")]);
/// assert_eq!(tree.species_of("m1").unwrap().name(), "MOUSE");
/// assert!(tree.taxonomy().unwrap().is_placeholder());
/// ```
///
/// # Structure
///
/// ```mermaid
/// erDiagram
///     ORTHOXMLTREE ||--|{ SPECIES : contains
///     ORTHOXMLTREE ||--o| TAXON : taxonomy
///     ORTHOXMLTREE ||--o{ GROUPNODE : groups
///     SPECIES ||--|{ GENE : owns
///     TAXON ||--o{ TAXON : children
///     GROUPNODE ||--o{ GROUPNODE : children
///     GROUPNODE }o--o| GENE : references
///     SPECIES {
///         str name
///         str taxon_id
///     }
///     GENE {
///         str id
///         str gene_id
///         str prot_id
///     }
///     TAXON {
///         str id
///         str name
///     }
///     GROUPNODE {
///         GroupKind kind
///         str id
///         str taxon_id
///         Scores scores
///     }
/// ```
#[derive(Debug, Clone)]
pub struct OrthoXmlTree {
    species: Vec<Species>,
    genes: HashMap<String, (usize, usize)>,
    taxonomy: Option<Taxon>,
    groups: Vec<GroupNode>,
    version: Option<String>,
    source: Option<String>,
    modified: bool,
}

impl OrthoXmlTree {
    /// Constructs a new tree from the parsed parts of a document
    ///
    /// Groups without any children are removed, recursively. A missing
    /// taxonomy is handled according to the [`TaxonomyPolicy`] of `options`.
    pub fn new(
        species: Vec<Species>,
        taxonomy: Option<Taxon>,
        groups: Vec<GroupNode>,
        version: Option<String>,
        options: &TreeOptions,
    ) -> Self {
        let taxonomy = match (taxonomy, options.taxonomy_policy()) {
            (Some(taxonomy), _) => Some(taxonomy),
            (None, TaxonomyPolicy::Placeholder) => {
                debug!("No taxonomy present, adding a placeholder root");
                Some(Taxon::placeholder())
            }
            (None, TaxonomyPolicy::Absent) => None,
        };
        Self::assemble(species, taxonomy, groups, version)
    }

    fn assemble(
        species: Vec<Species>,
        taxonomy: Option<Taxon>,
        mut groups: Vec<GroupNode>,
        version: Option<String>,
    ) -> Self {
        let mut genes = HashMap::new();
        for (sp_idx, sp) in species.iter().enumerate() {
            for (gene_idx, gene) in sp.genes().iter().enumerate() {
                if genes
                    .insert(gene.id().to_string(), (sp_idx, gene_idx))
                    .is_some()
                {
                    warn!("Gene {} is declared more than once, keeping the last one", gene.id());
                }
            }
        }

        let removed = prune(&mut groups, |_| false);
        if removed > 0 {
            debug!("Removed {} empty groups", removed);
        }
        debug!(
            "Built tree with {} species, {} genes and {} group roots",
            species.len(),
            genes.len(),
            groups.len()
        );

        Self {
            species,
            genes,
            taxonomy,
            groups,
            version,
            source: None,
            modified: false,
        }
    }

    /// Attaches the original document text
    ///
    /// The text is returned by [`OrthoXmlTree::to_orthoxml`] for as long
    /// as the tree is not modified.
    #[must_use]
    pub fn with_source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the [`Gene`] with the ID `id`
    pub fn gene(&self, id: &str) -> Option<&Gene> {
        self.genes
            .get(id)
            .map(|(sp_idx, gene_idx)| &self.species[*sp_idx].genes()[*gene_idx])
    }

    /// Iterates all genes that are reachable by their ID, in document order
    ///
    /// Genes that are shadowed by a later declaration with the same ID are skipped.
    pub fn genes(&self) -> impl Iterator<Item = &Gene> {
        self.species
            .iter()
            .enumerate()
            .flat_map(move |(sp_idx, sp)| {
                sp.genes()
                    .iter()
                    .enumerate()
                    .filter(move |(gene_idx, gene)| {
                        self.genes.get(gene.id()) == Some(&(sp_idx, *gene_idx))
                    })
                    .map(|(_, gene)| gene)
            })
    }

    /// All species in document order
    pub fn species(&self) -> &[Species] {
        &self.species
    }

    /// Returns the species that declares the gene `gene_id`
    pub fn species_of(&self, gene_id: &str) -> Option<&Species> {
        self.genes
            .get(gene_id)
            .map(|(sp_idx, _)| &self.species[*sp_idx])
    }

    /// Maps every gene ID to the name of its species
    pub fn gene_species(&self) -> HashMap<&str, &str> {
        self.genes
            .iter()
            .map(|(id, (sp_idx, _))| (id.as_str(), self.species[*sp_idx].name()))
            .collect()
    }

    /// All group roots in document order
    pub fn groups(&self) -> &[GroupNode] {
        &self.groups
    }

    /// The rootHOGs, i.e. all top-level ortholog groups
    pub fn root_hogs(&self) -> impl Iterator<Item = &GroupNode> {
        self.groups.iter().filter(|node| node.is_ortholog_group())
    }

    /// The taxonomy, or the placeholder root
    pub fn taxonomy(&self) -> Option<&Taxon> {
        self.taxonomy.as_ref()
    }

    /// The OrthoXML version of the document
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns `true` if groups were removed after construction
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Basic counts of the document
    pub fn base_stats(&self) -> TreeStats {
        TreeStats {
            genes: self.genes.len(),
            species: self.species.len(),
            groups: self.groups.len(),
            taxa: self.taxonomy.as_ref().map_or(0, Taxon::len),
            version: self.version.clone(),
        }
    }

    /// The number of genes at every level of the taxonomy
    ///
    /// Returns `None` if the tree has no taxonomy.
    pub fn gene_stats(&self) -> Option<GeneCensus> {
        self.taxonomy
            .as_ref()
            .map(|taxonomy| GeneCensus::new(taxonomy, &self.species))
    }

    /// All pairs of the given kind over every group root
    ///
    /// Bare gene references at the top level do not form any pairs.
    ///
    /// # Errors
    ///
    /// [`OrthoXmlError::MissingGene`] if a group references an unknown gene
    pub fn pairs(&self, kind: GroupKind) -> OrthoXmlResult<Vec<GenePair<'_>>> {
        let mut pairs = Vec::new();
        for root in self.group_roots() {
            for pair in PairIter::new(root, kind, self) {
                pairs.push(pair?);
            }
        }
        Ok(pairs)
    }

    /// All pairs of the given kind that contain the gene `gene_id`
    ///
    /// # Errors
    ///
    /// [`OrthoXmlError::MissingGene`] if a group references an unknown gene
    pub fn pairs_of_gene(
        &self,
        kind: GroupKind,
        gene_id: &str,
    ) -> OrthoXmlResult<Vec<GenePair<'_>>> {
        let mut pairs = Vec::new();
        for root in self.group_roots() {
            for pair in PairIter::new(root, kind, self).involving(gene_id) {
                pairs.push(pair?);
            }
        }
        Ok(pairs)
    }

    /// All ortholog pairs
    ///
    /// # Errors
    ///
    /// [`OrthoXmlError::MissingGene`] if a group references an unknown gene
    pub fn ortholog_pairs(&self) -> OrthoXmlResult<Vec<GenePair<'_>>> {
        self.pairs(GroupKind::Ortholog)
    }

    /// All ortholog pairs of the gene `gene_id`
    ///
    /// # Errors
    ///
    /// [`OrthoXmlError::MissingGene`] if a group references an unknown gene
    pub fn ortholog_pairs_of_gene(&self, gene_id: &str) -> OrthoXmlResult<Vec<GenePair<'_>>> {
        self.pairs_of_gene(GroupKind::Ortholog, gene_id)
    }

    /// All paralog pairs
    ///
    /// # Errors
    ///
    /// [`OrthoXmlError::MissingGene`] if a group references an unknown gene
    pub fn paralog_pairs(&self) -> OrthoXmlResult<Vec<GenePair<'_>>> {
        self.pairs(GroupKind::Paralog)
    }

    /// All paralog pairs of the gene `gene_id`
    ///
    /// # Errors
    ///
    /// [`OrthoXmlError::MissingGene`] if a group references an unknown gene
    pub fn paralog_pairs_of_gene(&self, gene_id: &str) -> OrthoXmlResult<Vec<GenePair<'_>>> {
        self.pairs_of_gene(GroupKind::Paralog, gene_id)
    }

    /// The maximal orthologous group of every group root
    ///
    /// See [`crate::selector`] for the selection rules.
    ///
    /// # Errors
    ///
    /// [`OrthoXmlError::MissingGene`] if a group references an unknown gene
    pub fn maximal_ogs(&self) -> OrthoXmlResult<Vec<MaximalOg<'_>>> {
        let species = self.gene_species();
        self.group_roots()
            .map(|root| maximal_og(root, &species))
            .collect()
    }

    /// Removes all ortholog groups with a score `score_id` below `threshold`
    ///
    /// Groups that are left without any children are removed as well,
    /// up to the group roots. Groups without the score are kept.
    ///
    /// Returns the number of removed groups.
    ///
    /// # Errors
    ///
    /// [`OrthoXmlError::MalformedScore`] if a matching score is not a number.
    /// All scores are checked before any group is removed, so the tree is
    /// unchanged in this case.
    ///
    /// # Examples
    ///
    /// ```
    /// use orthoxml::{Gene, Group, GroupNode, OrthoXmlTree, Score, Species, TreeOptions};
    ///
    /// let species = vec![Species::new("HUMAN", "9606", vec![Gene::new("1"), Gene::new("2")])];
    /// let groups = vec![
    ///     GroupNode::Ortholog(Group::new().with_score(Score::new("CompletenessScore", "0.9")).with_gene_ref("1")),
    ///     GroupNode::Ortholog(Group::new().with_score(Score::new("CompletenessScore", "0.1")).with_gene_ref("2")),
    /// ];
    /// let mut tree = OrthoXmlTree::new(species, None, groups, None, &TreeOptions::default());
    ///
    /// assert_eq!(tree.filter_by_score("CompletenessScore", 0.5).unwrap(), 1);
    /// assert_eq!(tree.groups().len(), 1);
    /// assert!(tree.is_modified());
    /// ```
    pub fn filter_by_score(&mut self, score_id: &str, threshold: f64) -> OrthoXmlResult<usize> {
        let mut stack: Vec<&GroupNode> = self.groups.iter().collect();
        while let Some(node) = stack.pop() {
            if let Some(group) = node.group() {
                if node.is_ortholog_group() {
                    if let Some(score) = group.score(score_id) {
                        score.as_f64()?;
                    }
                }
                stack.extend(group.children());
            }
        }

        let removed = prune(&mut self.groups, |node| {
            node.is_ortholog_group()
                && node
                    .group()
                    .and_then(|group| group.score(score_id))
                    .and_then(|score| score.as_f64().ok())
                    .map_or(false, |value| value < threshold)
        });
        if removed > 0 {
            self.modified = true;
        }
        debug!(
            "Removed {} groups with {} below {}",
            removed, score_id, threshold
        );
        Ok(removed)
    }

    /// Splits the document into one tree per rootHOG
    ///
    /// Each tree contains only the genes referenced by its rootHOG, and only
    /// species with at least one such gene. The taxonomy and the version
    /// are shared by all trees. The trees have no source attached.
    pub fn split_by_root_hogs(&self) -> Vec<OrthoXmlTree> {
        self.root_hogs()
            .map(|hog| {
                let referenced: HashSet<&str> = hog.gene_ids().into_iter().collect();
                let species = self
                    .species
                    .iter()
                    .filter_map(|sp| {
                        let genes: Vec<Gene> = sp
                            .genes()
                            .iter()
                            .filter(|gene| referenced.contains(gene.id()))
                            .cloned()
                            .collect();
                        (!genes.is_empty())
                            .then(|| Species::new(sp.name(), sp.taxon_id(), genes))
                    })
                    .collect();
                Self::assemble(
                    species,
                    self.taxonomy.clone(),
                    vec![hog.clone()],
                    self.version.clone(),
                )
            })
            .collect()
    }

    /// Returns the original document text
    ///
    /// # Errors
    ///
    /// [`OrthoXmlError::Unsupported`] if no source is attached or the tree
    /// was modified. Generating OrthoXML from the tree itself is not supported.
    pub fn to_orthoxml(&self) -> OrthoXmlResult<&str> {
        if self.modified {
            return Err(OrthoXmlError::Unsupported(
                "generating OrthoXML for a modified tree".to_string(),
            ));
        }
        self.source.as_deref().ok_or_else(|| {
            OrthoXmlError::Unsupported("generating OrthoXML without a source document".to_string())
        })
    }

    /// Streams the tree as element events, see [`TreeEvents`]
    pub fn events(&self) -> TreeEvents<'_> {
        TreeEvents::new(self)
    }

    /// Converts every rootHOG into a Newick tree
    ///
    /// See [`NewickConverter`](`crate::NewickConverter`) for the details.
    ///
    /// # Errors
    ///
    /// [`OrthoXmlError::UnbalancedEvents`] if the event stream is unbalanced.
    /// The events of an in-memory tree are always balanced.
    pub fn to_newick(&self, options: NewickOptions) -> OrthoXmlResult<NewickTrees> {
        newick::convert(self.events(), options)
    }

    fn group_roots(&self) -> impl Iterator<Item = &GroupNode> {
        self.groups.iter().filter(|node| node.group().is_some())
    }
}

impl GeneLookup for OrthoXmlTree {
    fn contains_gene(&self, id: &str) -> bool {
        self.genes.contains_key(id)
    }
}

/// A group whose children are being pruned
struct Pending {
    node: Option<GroupNode>,
    todo: std::vec::IntoIter<GroupNode>,
    kept: Vec<GroupNode>,
}

/// Removes all nodes for which `remove` returns `true`, and all groups left
/// without children
///
/// The traversal uses an explicit stack. Returns the number of removed groups.
fn prune<F: Fn(&GroupNode) -> bool>(nodes: &mut Vec<GroupNode>, remove: F) -> usize {
    let mut removed = 0;
    let mut stack = vec![Pending {
        node: None,
        todo: std::mem::take(nodes).into_iter(),
        kept: Vec::new(),
    }];

    while let Some(top) = stack.last_mut() {
        if let Some(mut child) = top.todo.next() {
            if remove(&child) {
                removed += 1;
                continue;
            }
            let grandchildren = child
                .group_mut()
                .map(|group| std::mem::take(group.children_mut()));
            match grandchildren {
                Some(grandchildren) => stack.push(Pending {
                    node: Some(child),
                    todo: grandchildren.into_iter(),
                    kept: Vec::new(),
                }),
                None => top.kept.push(child),
            }
            continue;
        }

        let Some(done) = stack.pop() else { break };
        match done.node {
            None => *nodes = done.kept,
            Some(mut node) => {
                if done.kept.is_empty() {
                    removed += 1;
                    continue;
                }
                if let Some(group) = node.group_mut() {
                    *group.children_mut() = done.kept;
                }
                if let Some(parent) = stack.last_mut() {
                    parent.kept.push(node);
                }
            }
        }
    }
    removed
}
