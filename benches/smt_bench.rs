//! Sparse Merkle tree benchmarks using Criterion
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use plasma_primitives::Hash256;
use plasma_smt::{single_leaf_root, verify, SparseMerkleTree};
use primitive_types::U256;

fn key(n: u64) -> U256 {
    U256::from_big_endian(Hash256::sha256(&n.to_be_bytes()).as_bytes())
}

fn leaf(n: u64) -> Hash256 {
    Hash256::sha256_with_domain(b"leaf", &n.to_be_bytes())
}

fn bench_tree_updates(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_updates");

    for size in [1u64, 16, 256, 1024].iter() {
        group.throughput(Throughput::Elements(*size));
        group.bench_with_input(BenchmarkId::new("set", size), size, |b, &size| {
            b.iter(|| {
                let mut tree = SparseMerkleTree::new();
                for n in 0..size {
                    tree.set(key(n), leaf(n));
                }
                black_box(tree.root())
            })
        });
    }

    group.finish();
}

fn bench_proofs(c: &mut Criterion) {
    let mut group = c.benchmark_group("proofs");

    let mut tree = SparseMerkleTree::new();
    for n in 0..1024u64 {
        tree.set(key(n), leaf(n));
    }
    let root = tree.root();
    let proof = tree.create_merkle_proof(key(0)).to_bytes();

    group.bench_function("create", |b| {
        b.iter(|| black_box(tree.create_merkle_proof(black_box(key(0)))))
    });

    group.bench_function("verify", |b| {
        b.iter(|| {
            assert!(verify(
                black_box(&root),
                black_box(key(0)),
                black_box(&leaf(0)),
                black_box(&proof),
            ))
        })
    });

    group.finish();
}

fn bench_single_leaf_root(c: &mut Criterion) {
    // The deposit path derives a one-leaf block root on every deposit.
    c.bench_function("single_leaf_root", |b| {
        b.iter(|| black_box(single_leaf_root(black_box(key(7)), black_box(leaf(7)))))
    });
}

criterion_group!(benches, bench_tree_updates, bench_proofs, bench_single_leaf_root);
criterion_main!(benches);
