//! Replay throughput benchmarks.
//!
//! Measures revisions committed per second for sequential and pipelined
//! replay, and the cost of the renderers on their own.
//!
//! # Running
//!
//! ```bash
//! cargo bench --bench replay_throughput
//! # With a custom filter:
//! cargo bench --bench replay_throughput -- pipelined
//! ```

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use wikigit::render::{MarkdownRenderer, Renderer, WikitextRenderer};
use wikigit::{ReplayOptions, RevisionRecord, SourceError, replay, replay_pipelined};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const PAGES: usize = 50;

const MARKDOWN: &str = "# Heading\n\nSome *emphasis*, a [link](other-page) and a list:\n\n\
                        - one\n- two\n- three\n\n| a | b |\n|---|---|\n| 1 | 2 |\n";

const WIKITEXT: &str = "== Heading ==\nSome ''emphasis'', a [[Other Page|link]] and a list:\n\
                        * one\n* two\n** three\n[https://example.org Example]\n";

/// `n` revisions cycling over [`PAGES`] pages, every tenth one a delete.
fn revisions(n: usize) -> Vec<Result<RevisionRecord, SourceError>> {
    (0..n)
        .map(|i| {
            let content = (i % 10 != 9).then(|| format!("{MARKDOWN}\nRevision {i}\n").into_bytes());
            Ok(RevisionRecord {
                title: format!("Page {}", i % PAGES),
                content,
                message: None,
                is_minor_edit: i % 3 == 0,
                author_name: "bench".to_owned(),
                author_email: "bench@wikigit".to_owned(),
                timestamp: 1_700_000_000 + i64::try_from(i).unwrap_or(i64::MAX),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Benchmark: full replay
// ---------------------------------------------------------------------------

fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");
    group.sample_size(10);

    for &n in &[100_usize, 500] {
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("sequential", n), &n, |b, &n| {
            b.iter_batched(
                || (tempfile::tempdir().expect("tempdir"), revisions(n)),
                |(dir, records)| {
                    replay(
                        records,
                        &MarkdownRenderer::new(),
                        &dir.path().join("wiki"),
                        &ReplayOptions::default(),
                    )
                    .expect("replay")
                },
                BatchSize::PerIteration,
            );
        });

        group.bench_with_input(BenchmarkId::new("pipelined", n), &n, |b, &n| {
            let options = ReplayOptions {
                prefetch: 16,
                ..ReplayOptions::default()
            };
            b.iter_batched(
                || (tempfile::tempdir().expect("tempdir"), revisions(n)),
                |(dir, records)| {
                    replay_pipelined(
                        records,
                        &MarkdownRenderer::new(),
                        &dir.path().join("wiki"),
                        &options,
                    )
                    .expect("replay")
                },
                BatchSize::PerIteration,
            );
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: renderers alone
// ---------------------------------------------------------------------------

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    let markdown = MarkdownRenderer::new();
    group.bench_function("markdown", |b| {
        b.iter(|| markdown.render(MARKDOWN.as_bytes()).expect("render"));
    });

    let wikitext = WikitextRenderer::new();
    group.bench_function("wikitext", |b| {
        b.iter(|| wikitext.render(WIKITEXT.as_bytes()).expect("render"));
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

criterion_group!(benches, bench_replay, bench_render);
criterion_main!(benches);
