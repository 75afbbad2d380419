use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use emg_fir_eval::{
    ErrorDistance, ErrorMethod, EvaluationConfig, Evaluator, ModelCoefficients, ModelParams, Trim,
};
use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};

const TRIAL_LENGTHS: &[usize] = &[1_000, 4_000, 16_000];
const CHANNEL_COUNTS: &[usize] = &[1, 4, 8];
const BATCH_SIZES: &[usize] = &[1, 8, 32];

fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize) -> Array2<f64> {
    Array2::from_shape_fn((rows, cols), |_| rng.gen_range(0.0..1.0))
}

fn benchmark_single_trial(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_trial");
    let mut rng = StdRng::seed_from_u64(7);
    let params = ModelParams::new(15, 2, 0.0, 5).unwrap();

    for &samples in TRIAL_LENGTHS {
        for &channels in CHANNEL_COUNTS {
            let emg = random_matrix(&mut rng, samples, channels);
            let torque = random_matrix(&mut rng, samples, 1);
            let coefficients =
                ModelCoefficients::new(random_matrix(&mut rng, params.design_columns(channels).unwrap(), 1));
            let evaluator = Evaluator::default();

            group.throughput(Throughput::Elements((samples * channels) as u64));
            group.bench_with_input(
                BenchmarkId::new("evaluate", format!("{}ch_{}samples", channels, samples)),
                &(emg, torque),
                |b, (emg, torque)| {
                    b.iter(|| {
                        evaluator
                            .evaluate_single(
                                black_box(&coefficients),
                                black_box(emg),
                                black_box(torque),
                                &params,
                                &Trim::default(),
                            )
                            .unwrap()
                    });
                },
            );
        }
    }

    group.finish();
}

fn benchmark_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");
    let mut rng = StdRng::seed_from_u64(11);
    let params = ModelParams::new(10, 1, 0.0, 0).unwrap();
    let channels = 4;
    let samples = 4_000;
    let coefficients = ModelCoefficients::new(random_matrix(&mut rng, params.design_columns(channels).unwrap(), 2));
    let evaluator = Evaluator::new(
        EvaluationConfig::default()
            .with_edist(ErrorDistance::Distance)
            .with_emeth(ErrorMethod::Mav),
    );

    for &trials in BATCH_SIZES {
        let emg = Array2::from_shape_fn((trials, 1), |_| random_matrix(&mut rng, samples, channels));
        let torque = Array2::from_shape_fn((trials, 1), |_| random_matrix(&mut rng, samples, 2));

        group.throughput(Throughput::Elements(trials as u64));
        group.bench_with_input(BenchmarkId::new("evaluate", trials), &(emg, torque), |b, (emg, torque)| {
            b.iter(|| {
                evaluator
                    .evaluate_batch(&coefficients, black_box(emg), black_box(torque), &params, &Trim::new(50, 50))
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_single_trial, benchmark_batch);
criterion_main!(benches);
