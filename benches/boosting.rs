use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use finguard::ml::gbdt::{GbdtModel, TrainDataset, TrainOptions, train_gbdt};

const ROWS: usize = 2_000;
const FEATURES: usize = 12;

fn synthetic_dataset() -> TrainDataset {
    let mut x = Vec::with_capacity(ROWS);
    let mut y = Vec::with_capacity(ROWS);
    for i in 0..ROWS {
        let row: Vec<f32> = (0..FEATURES)
            .map(|j| ((i * (j + 3) + j * 17) % 101) as f32 / 100.0)
            .collect();
        y.push(u8::from(row[0] + 0.5 * row[1] > 0.8));
        x.push(row);
    }
    TrainDataset {
        feature_len: FEATURES,
        x,
        y,
    }
}

fn trained_model(dataset: &TrainDataset) -> GbdtModel {
    let options = TrainOptions {
        n_estimators: 100,
        ..TrainOptions::default()
    };
    train_gbdt(dataset, &options).expect("train benchmark model")
}

fn bench_train(c: &mut Criterion) {
    let dataset = synthetic_dataset();
    let mut group = c.benchmark_group("train_gbdt");
    group.sample_size(10);
    for rounds in [20usize, 50] {
        let options = TrainOptions {
            n_estimators: rounds,
            ..TrainOptions::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(rounds), &options, |b, options| {
            b.iter(|| train_gbdt(black_box(&dataset), options).expect("train"));
        });
    }
    group.finish();
}

fn bench_predict_and_explain(c: &mut Criterion) {
    let dataset = synthetic_dataset();
    let model = trained_model(&dataset);
    let row = dataset.x[7].clone();
    c.bench_function("predict_proba", |b| {
        b.iter(|| model.predict_proba(black_box(&row)));
    });
    c.bench_function("attributions", |b| {
        b.iter(|| model.attributions(black_box(&row)));
    });
}

criterion_group!(benches, bench_train, bench_predict_and_explain);
criterion_main!(benches);
