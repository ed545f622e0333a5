//! Lowering throughput on deep connective chains and nested `if` trees.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use p4dpdk::ast::build::*;
use p4dpdk::ast::{BinOp, Stmt};
use p4dpdk::span::Spanned;
use p4dpdk::{lower_unit, ChecksumTable, ControlBlock, LowerConfig, StmtLowering};

/// `a0 == 0 && a1 == 1 && ...`, alternating `&&` / `||`.
fn connective_chain(n: usize) -> Spanned<Stmt> {
    let leaf = |i: usize| binary(BinOp::Equ, var(&format!("a{}", i)), int(i as u64));
    let mut cond = leaf(0);
    for i in 1..n {
        let op = if i % 2 == 0 { BinOp::LOr } else { BinOp::LAnd };
        cond = binary(op, cond, leaf(i));
    }
    if_then(cond, assign(var("x"), int(1)))
}

/// `depth` levels of `if (...) { ... } else { ... }`.
fn nested_ifs(depth: usize) -> Spanned<Stmt> {
    let mut body = assign(var("x"), binary(BinOp::Add, var("x"), int(1)));
    for i in 0..depth {
        body = if_else(
            binary(BinOp::Lss, member(var("m"), &format!("f{}", i)), int(i as u64)),
            body,
            assign(var("y"), int(i as u64)),
        );
    }
    body
}

fn bench_branches(c: &mut Criterion) {
    let checksums = ChecksumTable::new();
    let config = LowerConfig::default();
    let chain_64 = connective_chain(64);
    let chain_512 = connective_chain(512);

    let mut group = c.benchmark_group("branch");
    group.bench_function("chain_64", |b| {
        b.iter(|| StmtLowering::new(&checksums, &config).lower_tree(black_box(&chain_64)))
    });
    group.bench_function("chain_512", |b| {
        b.iter(|| StmtLowering::new(&checksums, &config).lower_tree(black_box(&chain_512)))
    });
    group.finish();
}

fn bench_nested_ifs(c: &mut Criterion) {
    let checksums = ChecksumTable::new();
    let config = LowerConfig::default();
    let tree = nested_ifs(128);

    let mut group = c.benchmark_group("nested_if");
    group.bench_function("depth_128", |b| {
        b.iter(|| StmtLowering::new(&checksums, &config).lower_tree(black_box(&tree)))
    });
    group.finish();
}

fn bench_unit(c: &mut Criterion) {
    let checksums = ChecksumTable::new();
    let config = LowerConfig::default();
    let blocks: Vec<ControlBlock> = (0..8)
        .map(|i| ControlBlock::new(format!("block{}", i), nested_ifs(32)))
        .collect();

    let mut group = c.benchmark_group("unit");
    group.bench_function("sequential_8x32", |b| {
        b.iter(|| lower_unit(black_box(&blocks), &checksums, &config))
    });
    group.bench_function("parallel_8x32", |b| {
        b.iter(|| p4dpdk::lower_unit_parallel(black_box(&blocks), &checksums, &config))
    });
    group.finish();
}

criterion_group!(benches, bench_branches, bench_nested_ifs, bench_unit);
criterion_main!(benches);
