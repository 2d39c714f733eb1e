//! Classification Throughput Benchmark
//!
//! Measures per-post classification and the full in-memory pipeline over a
//! synthetic archive mixing tagged, untagged, hybrid and signal-free posts.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use species_hierarchy::{Classifier, Normalizer, Post, SelfTagExtractor, SpeciesPipeline};
use std::sync::Arc;

const TEMPLATES: &[(&str, &[&str])] = &[
    ("P.willinckii moonlight#vp\nfirst frond", &["ジサクボムーンライトvp", "ビカクシダ"]),
    ("P.ridleyi nano\nsmall original", &[]),
    ("P.Elsa (willinckii x bifurcatum)\nnote", &["ジサクボエルサ"]),
    ("ビーチーの貯水葉", &["ビーチー", "ジサクボシルバー"]),
    ("beautiful plant today", &["ビカクシダ"]),
    ("P.hillii 'mutant'", &["ジサクボミューズ"]),
];

fn synthetic_posts(count: usize) -> Vec<Post> {
    (0..count)
        .map(|i| {
            let (caption, tags) = TEMPLATES[i % TEMPLATES.len()];
            Post::new(format!("post-{}", i), 1_700_000_000 + i as i64, caption, tags)
        })
        .collect()
}

fn classifier() -> Classifier {
    Classifier::new(Arc::new(Normalizer::default()), SelfTagExtractor::default())
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    let classifier = classifier();

    for size in [100usize, 1_000, 5_000] {
        let posts = synthetic_posts(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("posts", size), &posts, |b, posts| {
            b.iter(|| {
                for post in posts {
                    black_box(classifier.classify(post));
                }
            });
        });
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let pipeline = SpeciesPipeline::new(classifier());
    let posts = synthetic_posts(2_000);

    group.throughput(Throughput::Elements(posts.len() as u64));
    group.bench_function("run_2000", |b| {
        b.iter(|| black_box(pipeline.run(black_box(&posts))));
    });

    group.finish();
}

criterion_group!(benches, bench_classify, bench_pipeline);
criterion_main!(benches);
