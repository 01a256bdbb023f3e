use std::fmt::Display;

use crate::PLACEHOLDER_TAXON_ID;

/// A node of the taxonomy
///
/// Taxa form a strict tree with a single root. Each taxon owns its
/// children. A taxon without children is a leaf, usually the node
/// of a single species.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Taxon {
    id: String,
    name: String,
    children: Vec<Taxon>,
}

impl Taxon {
    /// Initializes a new taxon with the given children
    pub fn new<S: Into<String>, T: Into<String>>(id: S, name: T, children: Vec<Taxon>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            children,
        }
    }

    /// Initializes a new taxon without children
    pub fn leaf<S: Into<String>, T: Into<String>>(id: S, name: T) -> Self {
        Self::new(id, name, Vec::new())
    }

    /// The synthesized root taxon for documents without a taxonomy
    ///
    /// It is labeled with [`PLACEHOLDER_TAXON_ID`] so that it can
    /// never be confused with real data.
    pub fn placeholder() -> Self {
        Self::leaf(PLACEHOLDER_TAXON_ID, "placeholder root")
    }

    /// Returns `true` if the taxon was synthesized by [`Taxon::placeholder`]
    pub fn is_placeholder(&self) -> bool {
        self.id == PLACEHOLDER_TAXON_ID
    }

    /// The taxon identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The scientific name of the taxon
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The direct children of the taxon
    pub fn children(&self) -> &[Taxon] {
        &self.children
    }

    /// Returns `true` if the taxon has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The number of taxa in the subtree, including `self`
    ///
    /// # Examples
    ///
    /// ```
    /// use orthoxml::Taxon;
    ///
    /// let taxonomy = Taxon::new("1", "LUCA", vec![
    ///     Taxon::leaf("2", "Archaea"),
    ///     Taxon::new("3", "Bacteria", vec![Taxon::leaf("4", "ECOLI")]),
    /// ]);
    /// assert_eq!(taxonomy.len(), 4);
    /// ```
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Always `false`, a taxon contains at least itself
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Pre-order iterator over all taxa of the subtree
    pub fn iter(&self) -> TaxonIter<'_> {
        TaxonIter { stack: vec![self] }
    }

    /// Returns the taxon with the given `id` from the subtree
    pub fn find(&self, id: &str) -> Option<&Taxon> {
        self.iter().find(|taxon| taxon.id == id)
    }

    /// Returns a hierarchical text representation of the subtree
    ///
    /// # Examples
    ///
    /// ```
    /// use orthoxml::Taxon;
    ///
    /// let taxonomy = Taxon::new("1", "LUCA", vec![
    ///     Taxon::new("2", "Archaea", vec![Taxon::leaf("5", "HALSA")]),
    ///     Taxon::leaf("3", "Bacteria"),
    /// ]);
    ///
    /// assert_eq!(
    ///     taxonomy.render(),
    ///     "LUCA\n├── Archaea\n│   └── HALSA\n└── Bacteria"
    /// );
    /// ```
    pub fn render(&self) -> String {
        fn render_child(taxon: &Taxon, prefix: &str, is_last: bool, lines: &mut Vec<String>) {
            let branch = if is_last { "└── " } else { "├── " };
            lines.push(format!("{prefix}{branch}{}", taxon.name));
            let prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
            let n = taxon.children.len();
            for (idx, child) in taxon.children.iter().enumerate() {
                render_child(child, &prefix, idx + 1 == n, lines);
            }
        }

        let mut lines = vec![self.name.clone()];
        let n = self.children.len();
        for (idx, child) in self.children.iter().enumerate() {
            render_child(child, "", idx + 1 == n, &mut lines);
        }
        lines.join("\n")
    }
}

impl Display for Taxon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl<'a> IntoIterator for &'a Taxon {
    type Item = &'a Taxon;
    type IntoIter = TaxonIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterates all [`Taxon`]s of a subtree in pre-order
pub struct TaxonIter<'a> {
    stack: Vec<&'a Taxon>,
}

impl<'a> Iterator for TaxonIter<'a> {
    type Item = &'a Taxon;
    fn next(&mut self) -> Option<Self::Item> {
        let taxon = self.stack.pop()?;
        self.stack.extend(taxon.children.iter().rev());
        Some(taxon)
    }
}
