//! Criterion benchmarks for the per-packet hot path: rectangle containment
//! and firewall policy evaluation.
//!
//! Topologies are dozens of nodes at most, so these exist to catch accidental
//! regressions (an allocation sneaking into `evaluate`, say), not to chase
//! microseconds.
//!
//! Run with:
//! ```bash
//! cargo bench --package fyre-core --bench containment_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fyre_core::{FirewallPolicy, Packet, PolicyDocument, Rect};

// ── Fixture builders ──────────────────────────────────────────────────────────

/// A firewall rectangle with `n` candidate rectangles spread inside it.
fn build_rects(n: usize) -> (Rect, Vec<Rect>) {
    let outer = Rect {
        x: 0,
        y: 0,
        width: 4000,
        height: 4000,
    };
    let inners = (0..n)
        .map(|i| Rect {
            x: (i as i32 % 30) * 130,
            y: (i as i32 / 30) * 70,
            width: 120,
            height: 60,
        })
        .collect();
    (outer, inners)
}

/// A policy with `ports` allowed ports and `blocked` blocked sources.
fn build_policy(ports: usize, blocked: usize) -> FirewallPolicy {
    let document = PolicyDocument {
        allowed_ports: (0..ports).map(|i| 1000 + i as u16).collect(),
        blocked_ips: (0..blocked)
            .map(|i| format!("10.0.{}.{}", i / 256, i % 256))
            .collect(),
    };
    let mut policy = FirewallPolicy::default();
    policy
        .configure(&document)
        .expect("generated document must configure");
    policy
}

fn probe_packet(port: u16) -> Packet {
    Packet::new(
        "192.168.7.7".parse().expect("source address"),
        "10.0.0.1".parse().expect("destination address"),
        port,
        49152,
        b"curl 10.0.0.1:80".to_vec(),
    )
}

// ── Benchmarks: containment ───────────────────────────────────────────────────

/// Benchmarks a single [`Rect::contains`] call, contained and not.
fn bench_contains_single(c: &mut Criterion) {
    let (outer, inners) = build_rects(1);
    let outside = Rect {
        x: 5000,
        y: 5000,
        width: 120,
        height: 60,
    };
    let mut group = c.benchmark_group("contains");

    group.bench_function("hit", |b| {
        b.iter(|| black_box(&outer).contains(black_box(&inners[0])))
    });
    group.bench_function("miss", |b| {
        b.iter(|| black_box(&outer).contains(black_box(&outside)))
    });

    group.finish();
}

/// Benchmarks scanning every node rectangle against one firewall, the shape
/// of a full-canvas membership pass.
fn bench_contains_scan(c: &mut Criterion) {
    let node_counts = [4usize, 16, 64];
    let mut group = c.benchmark_group("contains_scan");

    for &count in &node_counts {
        let (outer, inners) = build_rects(count);
        group.bench_with_input(BenchmarkId::new("nodes", count), &inners, |b, inners| {
            b.iter(|| {
                inners
                    .iter()
                    .filter(|inner| black_box(&outer).contains(inner))
                    .count()
            })
        });
    }

    group.finish();
}

// ── Benchmarks: policy evaluation ─────────────────────────────────────────────

/// Benchmarks [`FirewallPolicy::evaluate`] across rule-list sizes.
fn bench_evaluate(c: &mut Criterion) {
    let rule_counts = [1usize, 8, 64];
    let mut group = c.benchmark_group("evaluate");

    for &count in &rule_counts {
        let policy = build_policy(count, count);

        // Worst case for the linear scans: an allowed port at the end of the
        // list from a source that is not blocked.
        let accepted = probe_packet(1000 + count as u16 - 1);
        group.bench_with_input(BenchmarkId::new("rules", count), &accepted, |b, packet| {
            b.iter(|| policy.evaluate(black_box(packet)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_contains_single,
    bench_contains_scan,
    bench_evaluate,
);
criterion_main!(benches);
