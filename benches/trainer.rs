use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use regression_playground::{
    backend::CpuBackend,
    loss::MSELoss,
    model::LinearRegression,
    optimizer::{Adam, SGD},
    points::{BaseFunction, DataSynthesizer, SequentialIds},
    preprocessing::PolynomialFeatures,
    regularizers::NoRegularizer,
    trainer::{FitControl, NullSink, Trainer, TrainingCheckpoint},
};

/// 100 noisy points from the default base function, as the playground starts with.
fn sample_points() -> (Vec<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(42);
    let synth = DataSynthesizer::new(BaseFunction::default(), 0.5);
    let points = synth.generate(100, &mut SequentialIds::default(), &mut rng);
    points.iter().map(|p| (p.x, p.y)).unzip()
}

fn bench_fit_by_degree(c: &mut Criterion) {
    let (xs, ys) = sample_points();

    for degree in [1usize, 3, 6].iter() {
        let features = PolynomialFeatures::new(*degree);
        let dataset = features.dataset(&xs, &ys).expect("Failed to build dataset");

        c.bench_with_input(BenchmarkId::new("fit_adam_1000", degree), degree, |b, &d| {
            let trainer = Trainer::builder(MSELoss, Adam::<CpuBackend>::new(0.01), NoRegularizer)
                .max_epochs(1000)
                .build();

            b.iter(|| {
                let mut history: Vec<TrainingCheckpoint> = Vec::new();
                trainer
                    .fit(
                        LinearRegression::<CpuBackend>::new(d + 1),
                        black_box(&dataset),
                        &features,
                        &FitControl::unbounded(),
                        &mut history,
                    )
                    .expect("Failed to fit model");
                history
            });
        });
    }
}

fn bench_fit_without_checkpoints(c: &mut Criterion) {
    let (xs, ys) = sample_points();
    let features = PolynomialFeatures::new(3);
    let dataset = features.dataset(&xs, &ys).expect("Failed to build dataset");
    let trainer = Trainer::builder(MSELoss, SGD::<CpuBackend>::new(1e-6), NoRegularizer)
        .max_epochs(1000)
        .build();

    c.bench_function("fit_sgd_1000_null_sink", |b| {
        b.iter(|| {
            trainer
                .fit(
                    LinearRegression::<CpuBackend>::new(4),
                    black_box(&dataset),
                    &features,
                    &FitControl::unbounded(),
                    &mut NullSink,
                )
                .expect("Failed to fit model")
        });
    });
}

criterion_group!(benches, bench_fit_by_degree, bench_fit_without_checkpoints);
criterion_main!(benches);
