//! Versioned Config Store Throughput Benchmarks
//!
//! Measures write and read throughput of `VersionedConfigStore` backed by
//! the in-memory adapter, across a range of batch sizes.

use config_store::clock::SystemClock;
use config_store::document::ConfigResource;
use config_store::store::InMemoryDocumentStore;
use config_store::versioned_store::{VersionedConfigStore, WriteConfigRequest};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use serde_json::json;
use std::sync::Arc;
use tokio::runtime::Runtime;

fn bench_write_config(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("write_config");

    for size in [1, 10, 100].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("sequential_versions", size), size, |b, &size| {
            b.to_async(&rt).iter(|| async {
                let store = VersionedConfigStore::new(InMemoryDocumentStore::new(), Arc::new(SystemClock));
                let resource = ConfigResource::new("tenant-a", "labels", "rule-config").unwrap();
                let ctx = resource.context("bench").unwrap();
                for i in 0..size {
                    let request = WriteConfigRequest::new(black_box(json!({ "counter": i })));
                    store
                        .write_config(&ctx, "bench-user", "bench@example.com", request)
                        .await
                        .unwrap();
                }
            });
        });
    }

    group.finish();
}

fn bench_get_all_configs(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("get_all_configs");

    for size in [10, 100, 1_000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("distinct_contexts", size), size, |b, &size| {
            let store = VersionedConfigStore::new(InMemoryDocumentStore::new(), Arc::new(SystemClock));
            let resource = ConfigResource::new("tenant-a", "labels", "rule-config").unwrap();
            rt.block_on(async {
                for i in 0..size {
                    let ctx = resource.context(format!("ctx-{i}")).unwrap();
                    store
                        .write_config(
                            &ctx,
                            "bench-user",
                            "bench@example.com",
                            WriteConfigRequest::new(json!({ "i": i })),
                        )
                        .await
                        .unwrap();
                }
            });

            b.to_async(&rt)
                .iter(|| async { black_box(store.get_all_configs(&resource).await.unwrap()) });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_write_config, bench_get_all_configs);
criterion_main!(benches);
