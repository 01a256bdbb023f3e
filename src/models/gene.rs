use std::fmt::Display;

/// A single gene of a [`Species`](`crate::Species`)
///
/// The `id` is unique within a document and is used by groups to
/// reference the gene. The external gene and protein identifiers are
/// optional and only used for presentation, e.g. as leaf labels
/// of Newick trees.
#[derive(Default, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Gene {
    id: String,
    gene_id: Option<String>,
    prot_id: Option<String>,
}

impl Gene {
    /// Initializes a new Gene without external identifiers
    ///
    /// # Examples
    ///
    /// ```
    /// use orthoxml::Gene;
    ///
    /// let gene = Gene::new("1").with_prot_id("P12345");
    /// assert_eq!(gene.id(), "1");
    /// assert_eq!(gene.prot_id(), Some("P12345"));
    /// assert!(gene.gene_id().is_none());
    /// ```
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self {
            id: id.into(),
            gene_id: None,
            prot_id: None,
        }
    }

    /// Sets the external gene identifier
    #[must_use]
    pub fn with_gene_id<S: Into<String>>(mut self, gene_id: S) -> Self {
        self.gene_id = Some(gene_id.into());
        self
    }

    /// Sets the external protein identifier
    #[must_use]
    pub fn with_prot_id<S: Into<String>>(mut self, prot_id: S) -> Self {
        self.prot_id = Some(prot_id.into());
        self
    }

    /// The document-unique identifier of the gene
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The external gene identifier, e.g. from Ensembl
    pub fn gene_id(&self) -> Option<&str> {
        self.gene_id.as_deref()
    }

    /// The external protein identifier, e.g. from UniProt
    pub fn prot_id(&self) -> Option<&str> {
        self.prot_id.as_deref()
    }
}

impl Display for Gene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Gene({})", self.id)
    }
}
