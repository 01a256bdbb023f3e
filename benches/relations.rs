use std::collections::HashSet;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use orthoxml::relations::{pairs_iterative, pairs_recursive, PairIter};
use orthoxml::{Group, GroupKind, GroupNode};

/// A balanced tree of alternating ortholog and paralog groups
fn balanced_hog(depth: usize, width: usize, genes: &mut HashSet<String>) -> GroupNode {
    let mut group = Group::new();
    for _ in 0..width {
        if depth == 0 {
            let id = format!("g{}", genes.len());
            genes.insert(id.clone());
            group.push(GroupNode::gene_ref(id));
        } else {
            group.push(balanced_hog(depth - 1, width, genes));
        }
    }
    if depth % 2 == 0 {
        GroupNode::Ortholog(group)
    } else {
        GroupNode::Paralog(group)
    }
}

fn deep_hog(depth: usize, genes: &mut HashSet<String>) -> GroupNode {
    let mut node = GroupNode::gene_ref("leaf");
    genes.insert("leaf".to_string());
    for idx in 0..depth {
        let id = format!("g{idx}");
        genes.insert(id.clone());
        let group = Group::new().with_gene_ref(id).with_child(node);
        node = if idx % 2 == 0 {
            GroupNode::Ortholog(group)
        } else {
            GroupNode::Paralog(group)
        };
    }
    node
}

fn strategies_benchmark(c: &mut Criterion) {
    let mut genes = HashSet::new();
    let hog = balanced_hog(5, 3, &mut genes);

    c.bench_function("orthologs recursive 3^6", |b| {
        b.iter(|| {
            pairs_recursive(black_box(&hog), GroupKind::Ortholog, &genes)
                .unwrap()
                .pairs()
                .len()
        })
    });

    c.bench_function("orthologs iterative 3^6", |b| {
        b.iter(|| {
            pairs_iterative(black_box(&hog), GroupKind::Ortholog, &genes)
                .unwrap()
                .pairs()
                .len()
        })
    });

    c.bench_function("orthologs of one gene 3^6", |b| {
        b.iter(|| {
            PairIter::new(black_box(&hog), GroupKind::Ortholog, &genes)
                .involving("g42")
                .count()
        })
    });
}

fn deep_tree_benchmark(c: &mut Criterion) {
    let mut genes = HashSet::new();
    let hog = deep_hog(2_000, &mut genes);

    c.bench_function("paralogs iterative depth 2000", |b| {
        b.iter(|| {
            PairIter::new(black_box(&hog), GroupKind::Paralog, &genes)
                .filter(Result::is_ok)
                .count()
        })
    });
}

criterion_group! {
    name = relations;
    config = Criterion::default().sample_size(20).measurement_time(Duration::from_secs(10));
    targets = strategies_benchmark, deep_tree_benchmark
}
criterion_main!(relations);
