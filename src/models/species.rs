use crate::models::Gene;

/// A species and all its genes
///
/// The `taxon_id` is the NCBI taxonomy ID of the species. It is used
/// to attach the species to a [`Taxon`](`crate::Taxon`) of the taxonomy.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Species {
    name: String,
    taxon_id: String,
    genes: Vec<Gene>,
}

impl Species {
    /// Initializes a new species
    ///
    /// # Examples
    ///
    /// ```
    /// use orthoxml::{Gene, Species};
    ///
    /// let species = Species::new("HUMAN", "9606", vec![Gene::new("1"), Gene::new("2")]);
    /// assert_eq!(species.len(), 2);
    /// assert_eq!(species.taxon_id(), "9606");
    /// ```
    pub fn new<S: Into<String>, T: Into<String>>(name: S, taxon_id: T, genes: Vec<Gene>) -> Self {
        Self {
            name: name.into(),
            taxon_id: taxon_id.into(),
            genes,
        }
    }

    /// The name of the species, e.g. `HUMAN`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The NCBI taxonomy ID
    pub fn taxon_id(&self) -> &str {
        &self.taxon_id
    }

    /// All genes of the species, in document order
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// The number of genes of the species
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Returns `true` if the species has no genes
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}
