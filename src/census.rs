//! Number of genes at every level of the taxonomy
use std::collections::{HashMap, HashSet};
use std::io::Write;

use tracing::{debug, warn};

use crate::models::{Species, Taxon};
use crate::OrthoXmlResult;

/// The number of genes of all species at or below each taxon
///
/// Every taxon of the taxonomy is part of the census, including
/// taxa without any genes.
///
/// # Examples
///
/// ```
/// use orthoxml::{Gene, GeneCensus, Species, Taxon};
///
/// let taxonomy = Taxon::new("40674", "Mammalia", vec![
///     Taxon::leaf("9606", "Homo sapiens"),
///     Taxon::leaf("10090", "Mus musculus"),
/// ]);
/// let species = vec![
///     Species::new("HUMAN", "9606", vec![Gene::new("1"), Gene::new("2")]),
///     Species::new("MOUSE", "10090", vec![Gene::new("3")]),
/// ];
///
/// let census = GeneCensus::new(&taxonomy, &species);
/// assert_eq!(census.get("40674"), Some(3));
/// assert_eq!(census.get("9606"), Some(2));
/// assert_eq!(census.get("10090"), Some(1));
///
/// let mut csv = Vec::new();
/// census.write(&mut csv, ",").unwrap();
/// assert_eq!(
///     String::from_utf8(csv).unwrap(),
///     "taxonId,gene_count\n40674,3\n9606,2\n10090,1\n"
/// );
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GeneCensus {
    counts: HashMap<String, usize>,
    order: Vec<String>,
}

impl GeneCensus {
    /// Counts the genes of `species` for every taxon of `taxonomy`
    ///
    /// Species are attached to the taxon with the same ID. A species that
    /// matches no taxon is attributed to the root, so that the count of the
    /// root always equals the total number of genes.
    pub fn new(taxonomy: &Taxon, species: &[Species]) -> Self {
        let preorder: Vec<&Taxon> = taxonomy.iter().collect();
        let known: HashSet<&str> = preorder.iter().map(|taxon| taxon.id()).collect();

        let mut direct: HashMap<&str, usize> = HashMap::new();
        for sp in species {
            let taxon_id = if known.contains(sp.taxon_id()) {
                sp.taxon_id()
            } else {
                warn!(
                    "Species {} (taxon {}) is not part of the taxonomy, counting it at the root",
                    sp.name(),
                    sp.taxon_id()
                );
                taxonomy.id()
            };
            *direct.entry(taxon_id).or_default() += sp.len();
        }

        // reverse pre-order visits every child before its parent
        let mut counts: HashMap<String, usize> = HashMap::with_capacity(preorder.len());
        for taxon in preorder.iter().rev() {
            let own = direct.get(taxon.id()).copied().unwrap_or_default();
            let below: usize = taxon
                .children()
                .iter()
                .map(|child| counts.get(child.id()).copied().unwrap_or_default())
                .sum();
            counts.insert(taxon.id().to_string(), own + below);
        }

        debug!("Counted genes for {} taxa", counts.len());
        Self {
            counts,
            order: preorder.iter().map(|taxon| taxon.id().to_string()).collect(),
        }
    }

    /// The number of genes at or below the taxon `taxon_id`
    pub fn get(&self, taxon_id: &str) -> Option<usize> {
        self.counts.get(taxon_id).copied()
    }

    /// The number of genes of the root taxon, i.e. of all species
    pub fn total(&self) -> usize {
        self.order
            .first()
            .and_then(|root| self.get(root))
            .unwrap_or_default()
    }

    /// Iterates all taxon IDs with their gene count, in taxonomy pre-order
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.order
            .iter()
            .map(|id| (id.as_str(), self.counts.get(id).copied().unwrap_or_default()))
    }

    /// The number of taxa
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the census has no taxa
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The census as a mapping from taxon ID to gene count
    pub fn as_map(&self) -> &HashMap<String, usize> {
        &self.counts
    }

    /// Writes a header and one `taxonId<sep>count` line per taxon
    ///
    /// # Errors
    ///
    /// [`OrthoXmlError::Io`](`crate::OrthoXmlError::Io`) if writing fails
    pub fn write<W: Write>(&self, writer: &mut W, sep: &str) -> OrthoXmlResult<()> {
        writeln!(writer, "taxonId{sep}gene_count")?;
        for (id, count) in self.iter() {
            writeln!(writer, "{id}{sep}{count}")?;
        }
        Ok(())
    }
}
