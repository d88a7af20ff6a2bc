//! Routing read-path benchmarks.
//!
//! Measures snapshot reads and end-to-end routed predictions, alone and with
//! a writer publishing new generations in the background.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use canary_gateway::models::{
    FeatureVector, InMemoryModelStore, Label, ModelHandle, PredictionError, PredictionRequest,
    Router, SeededRandom, SlotManager,
};

fn constant_model(label: Label) -> ModelHandle {
    ModelHandle::new(
        move |batch: &[FeatureVector]| -> Result<Vec<Label>, PredictionError> {
            Ok(vec![label; batch.len()])
        },
    )
}

fn setup(runtime: &tokio::runtime::Runtime) -> Arc<SlotManager> {
    runtime.block_on(async {
        let store = InMemoryModelStore::new();
        store.register("bench", 1u64, constant_model(1)).await;
        store.register("bench", 2u64, constant_model(2)).await;
        let manager = SlotManager::new(Arc::new(store), "bench");
        manager.initialize(1u64).await.expect("initialize");
        manager.update_canary(2u64).await.expect("update canary");
        manager.set_canary_probability(0.1).expect("probability");
        Arc::new(manager)
    })
}

fn request(rows: usize) -> PredictionRequest {
    PredictionRequest::new((0..rows).map(|i| vec![i as f64; 4]).collect())
}

fn bench_snapshot(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let manager = setup(&runtime);

    c.bench_function("snapshot", |b| b.iter(|| black_box(manager.snapshot())));
}

fn bench_predict(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let manager = setup(&runtime);
    let router = Router::new(manager, Arc::new(SeededRandom::new(7)));
    let mut group = c.benchmark_group("predict");

    for rows in [1, 8, 64] {
        let req = request(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_function(BenchmarkId::new("rows", rows), |b| {
            b.iter(|| black_box(router.predict(black_box(&req)).expect("predict")))
        });
    }

    group.finish();
}

fn bench_predict_under_writes(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let manager = setup(&runtime);
    let router = Router::new(manager.clone(), Arc::new(SeededRandom::new(7)));
    let req = request(8);

    let stop = Arc::new(AtomicBool::new(false));
    let writer = {
        let stop = stop.clone();
        thread::spawn(move || {
            let mut flip = false;
            while !stop.load(Ordering::Relaxed) {
                let p = if flip { 0.1 } else { 0.2 };
                manager.set_canary_probability(p).expect("probability");
                flip = !flip;
            }
        })
    };

    c.bench_function("predict_under_writes", |b| {
        b.iter(|| black_box(router.predict(&req).expect("predict")))
    });

    stop.store(true, Ordering::Relaxed);
    writer.join().expect("writer");
}

criterion_group!(benches, bench_snapshot, bench_predict, bench_predict_under_writes);
criterion_main!(benches);
