//! Small documents shared by the unit tests
use std::collections::{HashMap, HashSet};

use crate::models::{Gene, Group, GroupNode, Score, Species, Taxon};
use crate::tree::{OrthoXmlTree, TreeOptions};

/// A rootHOG with two paralog groups, each with a human and a mouse gene
pub(crate) fn two_level_hog() -> GroupNode {
    GroupNode::Ortholog(
        Group::new()
            .with_id("HOG:0001")
            .with_child(GroupNode::Paralog(
                Group::new().with_gene_ref("HUMAN1").with_gene_ref("MOUSE1"),
            ))
            .with_child(GroupNode::Paralog(
                Group::new().with_gene_ref("HUMAN2").with_gene_ref("MOUSE2"),
            )),
    )
}

pub(crate) fn two_level_genes() -> HashSet<&'static str> {
    ["HUMAN1", "HUMAN2", "MOUSE1", "MOUSE2"].into_iter().collect()
}

/// ```text
/// OG HOG:0001 (32524)
/// ├── PG (40674)
/// │   ├── OG (40674): HUMAN1 MOUSE1 RAT1
/// │   └── OG (40674): HUMAN2 MOUSE2
/// └── PG (9031): CHICK1 CHICK2
/// ```
pub(crate) fn nested_hog() -> GroupNode {
    GroupNode::Ortholog(
        Group::new()
            .with_id("HOG:0001")
            .with_taxon_id("32524")
            .with_score(Score::new("CompletenessScore", "0.9"))
            .with_child(GroupNode::Paralog(
                Group::new()
                    .with_taxon_id("40674")
                    .with_child(GroupNode::Ortholog(
                        Group::new()
                            .with_taxon_id("40674")
                            .with_gene_ref("HUMAN1")
                            .with_gene_ref("MOUSE1")
                            .with_gene_ref("RAT1"),
                    ))
                    .with_child(GroupNode::Ortholog(
                        Group::new()
                            .with_taxon_id("40674")
                            .with_gene_ref("HUMAN2")
                            .with_gene_ref("MOUSE2"),
                    )),
            ))
            .with_child(GroupNode::Paralog(
                Group::new()
                    .with_taxon_id("9031")
                    .with_gene_ref("CHICK1")
                    .with_gene_ref("CHICK2"),
            )),
    )
}

pub(crate) fn nested_genes() -> HashSet<&'static str> {
    [
        "HUMAN1", "HUMAN2", "MOUSE1", "MOUSE2", "RAT1", "CHICK1", "CHICK2",
    ]
    .into_iter()
    .collect()
}

/// Gene ID to species name for all genes of [`example_tree`]
pub(crate) fn species_map() -> HashMap<&'static str, &'static str> {
    [
        ("HUMAN1", "HUMAN"),
        ("HUMAN2", "HUMAN"),
        ("HUMAN3", "HUMAN"),
        ("MOUSE1", "MOUSE"),
        ("MOUSE2", "MOUSE"),
        ("RAT1", "RAT"),
        ("CHICK1", "CHICK"),
        ("CHICK2", "CHICK"),
        ("CHICK3", "CHICK"),
    ]
    .into_iter()
    .collect()
}

pub(crate) fn example_species() -> Vec<Species> {
    vec![
        Species::new(
            "HUMAN",
            "9606",
            vec![
                Gene::new("HUMAN1").with_prot_id("P1").with_gene_id("ENSG1"),
                Gene::new("HUMAN2").with_prot_id("P2").with_gene_id("ENSG2"),
                Gene::new("HUMAN3").with_prot_id("P3"),
            ],
        ),
        Species::new(
            "MOUSE",
            "10090",
            vec![
                Gene::new("MOUSE1").with_prot_id("Q1"),
                Gene::new("MOUSE2").with_prot_id("Q2"),
            ],
        ),
        Species::new("RAT", "10116", vec![Gene::new("RAT1").with_prot_id("R1")]),
        Species::new(
            "CHICK",
            "9031",
            vec![
                Gene::new("CHICK1").with_prot_id("C1"),
                Gene::new("CHICK2").with_prot_id("C2"),
                Gene::new("CHICK3").with_prot_id("C3"),
            ],
        ),
    ]
}

pub(crate) fn example_taxonomy() -> Taxon {
    Taxon::new(
        "32524",
        "Amniota",
        vec![
            Taxon::new(
                "40674",
                "Mammalia",
                vec![
                    Taxon::leaf("9606", "Homo sapiens"),
                    Taxon::new(
                        "9989",
                        "Rodentia",
                        vec![
                            Taxon::leaf("10090", "Mus musculus"),
                            Taxon::leaf("10116", "Rattus norvegicus"),
                        ],
                    ),
                ],
            ),
            Taxon::leaf("9031", "Gallus gallus"),
        ],
    )
}

/// The second rootHOG of [`example_tree`], with a low completeness score
pub(crate) fn low_score_hog() -> GroupNode {
    GroupNode::Ortholog(
        Group::new()
            .with_id("HOG:0002")
            .with_taxon_id("32524")
            .with_score(Score::new("CompletenessScore", "0.2"))
            .with_gene_ref("HUMAN3")
            .with_gene_ref("CHICK3"),
    )
}

/// Four species, a taxonomy and the rootHOGs [`nested_hog`] and [`low_score_hog`]
pub(crate) fn example_tree() -> OrthoXmlTree {
    OrthoXmlTree::new(
        example_species(),
        Some(example_taxonomy()),
        vec![nested_hog(), low_score_hog()],
        Some("0.5".to_string()),
        &TreeOptions::default(),
    )
}

/// Deterministic linear congruential generator for generated trees
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }
}

fn generate_node(
    rng: &mut Lcg,
    depth: usize,
    counter: &mut usize,
    genes: &mut HashSet<String>,
) -> GroupNode {
    let n_children = 1 + rng.next() % 3;
    let mut group = Group::new();
    for _ in 0..n_children {
        if depth == 0 || rng.next() % 3 == 0 {
            let id = format!("g{counter}");
            *counter += 1;
            genes.insert(id.clone());
            group.push(GroupNode::gene_ref(id));
        } else {
            group.push(generate_node(rng, depth - 1, counter, genes));
        }
    }
    if rng.next() % 2 == 0 {
        GroupNode::Ortholog(group)
    } else {
        GroupNode::Paralog(group)
    }
}

/// A random group tree of at most `depth` levels with unique gene IDs
pub(crate) fn generated_hog(seed: u64, depth: usize) -> (GroupNode, HashSet<String>) {
    let mut rng = Lcg(seed);
    let mut genes = HashSet::new();
    let mut counter = 0;
    let hog = generate_node(&mut rng, depth, &mut counter, &mut genes);
    (hog, genes)
}

/// Assigns the generated gene `g<n>` to the species `sp<n mod 4>`
pub(crate) fn generated_species(genes: &HashSet<String>) -> HashMap<&str, String> {
    genes
        .iter()
        .map(|gene| {
            let idx: usize = gene[1..].parse().unwrap_or_default();
            (gene.as_str(), format!("sp{}", idx % 4))
        })
        .collect()
}
