//! End-to-end behavior of the pipeline stages through the public API.

use rust_trading_pipeline::{
    evaluate_policy, run_pipeline, smooth, train_policy, InMemorySource, KalmanConfig,
    PipelineConfig, PipelineError, PnlReward, PolicyConfig, Series, SeriesEnv, TradeAction,
};

fn counting_series(n: usize) -> Series {
    Series::from_values((1..=n).map(|v| v as f64).collect()).unwrap()
}

#[test]
fn episode_semantics_on_twenty_point_series() {
    // Series [1, 2, ..., 20], window 10: reset observes [1..10], the
    // 10th step terminates, the 11th fails.
    let mut env = SeriesEnv::with_defaults(counting_series(20)).unwrap();

    let obs = env.reset();
    assert_eq!(obs.to_vec(), (1..=10).map(|v| v as f64).collect::<Vec<_>>());

    for _ in 0..9 {
        let outcome = env.step(TradeAction::Hold).unwrap();
        assert!(!outcome.done);
    }

    let outcome = env.step(TradeAction::Hold).unwrap();
    assert!(outcome.done);
    assert_eq!(
        outcome.observation.to_vec(),
        (11..=20).map(|v| v as f64).collect::<Vec<_>>()
    );

    let err = env.step(TradeAction::Hold).unwrap_err();
    assert!(matches!(err, PipelineError::EpisodeExhausted { step: 10 }));
}

#[test]
fn filter_rejects_bad_inputs() {
    let empty = Series::from_values(vec![]).unwrap();
    assert!(matches!(
        smooth(&empty, &KalmanConfig::default()).unwrap_err(),
        PipelineError::InvalidInput(_)
    ));

    // Non-finite values cannot even enter a Series.
    assert!(Series::from_values(vec![1.0, f64::INFINITY]).is_err());
}

#[test]
fn smoothed_constant_series_converges() {
    let series = Series::from_values(vec![42.0; 100]).unwrap();
    let smoothed = smooth(&series, &KalmanConfig::default()).unwrap();
    assert!((smoothed.values().last().unwrap() - 42.0).abs() < 1e-3);
}

#[test]
fn policy_round_trip_on_smoothed_series() {
    let values: Vec<f64> = (0..100).map(|i| 50.0 + (i as f64 * 0.2).sin() * 3.0).collect();
    let smoothed = smooth(
        &Series::from_values(values).unwrap(),
        &KalmanConfig::default(),
    )
    .unwrap();

    let mut env = SeriesEnv::new(smoothed, 10, Box::new(PnlReward::new(0.0))).unwrap();
    let agent = train_policy(
        &mut env,
        &PolicyConfig {
            training_steps: 1000,
            seed: 2,
            ..Default::default()
        },
    )
    .unwrap();

    let total = evaluate_policy(&agent, &mut env).unwrap();
    assert!(total.is_finite());
}

#[test]
fn pipeline_produces_all_artifacts() {
    let values: Vec<f64> = (0..90).map(|i| 10.0 + 0.05 * i as f64).collect();
    let source = InMemorySource::new(Series::from_values(values).unwrap());

    let mut config = PipelineConfig::with_seed(11);
    config.gan.iterations = 60;
    config.gan.batch_size = 16;
    config.gan.latent_dim = 8;
    config.gan.log_every = 30;
    config.policy_steps = 300;
    config.search.init_probes = 2;
    config.search.iterations = 1;
    config.synthetic_samples = 12;

    let output = run_pipeline(&source, &config).unwrap();

    assert_eq!(output.smoothed.len(), 90);
    assert_eq!(output.synthetic.len(), 12);
    assert!(output.synthetic.iter().all(|v| v.is_finite()));
    assert_eq!(output.trials.len(), 3);

    let (lr_lo, lr_hi) = config.search_space.learning_rate;
    assert!(output.best_trial.learning_rate >= lr_lo);
    assert!(output.best_trial.learning_rate <= lr_hi);

    // Same source and config, same generator output.
    let rerun = run_pipeline(&source, &config).unwrap();
    assert_eq!(output.synthetic, rerun.synthetic);
}
