// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Definition and Resolution Benchmark
//!
//! Measures:
//! - defining a chain of composable types that reference each other by name
//! - draining the forward-resolution queues from the first type
//! - cached versus invalidated member view reads

#![allow(clippy::uninlined_format_args)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dynatype::{Container, MemberAttributes, MemberMap, TypeId};

/// Define `n` entity types; type i points at type i+1 (the last at the first).
fn define_ring(c: &mut Container, n: usize) -> Vec<TypeId> {
    let entity = c.entity_type().expect("entity type");
    (0..n)
        .map(|i| {
            let members = MemberMap::new()
                .with("id", MemberAttributes::new().ty("int").key())
                .with("label", "")
                .with(
                    "next",
                    MemberAttributes::new().ty(format!("Bench.T{}", (i + 1) % n)),
                );
            c.define(&format!("Bench.T{}", i), Some(entity), members, MemberMap::new())
                .expect("define")
        })
        .collect()
}

fn bench_define_and_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("define_resolve");
    for n in [10_usize, 100, 500] {
        group.bench_with_input(BenchmarkId::new("ring", n), &n, |b, &n| {
            b.iter(|| {
                let mut container = Container::new().expect("container");
                let ids = define_ring(&mut container, n);
                container
                    .resolve_forward_declarations(ids[0])
                    .expect("resolve");
                black_box(container.len())
            });
        });
    }
    group.finish();
}

fn bench_member_views(c: &mut Criterion) {
    let mut container = Container::new().expect("container");
    let ids = define_ring(&mut container, 50);
    container
        .resolve_forward_declarations(ids[0])
        .expect("resolve");
    let target = ids[10];

    c.bench_function("views_cached", |b| {
        b.iter(|| black_box(container.member_definitions(target).get_public_mapped_properties().len()));
    });

    c.bench_function("views_invalidated", |b| {
        let mut i = 0_u64;
        b.iter(|| {
            i += 1;
            container
                .add_member(ids[0], &format!("extra{}", i), 0, false)
                .expect("add member");
            black_box(container.member_definitions(target).as_array().len())
        });
    });
}

criterion_group!(benches, bench_define_and_resolve, bench_member_views);
criterion_main!(benches);
