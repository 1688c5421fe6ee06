//! Newton (IRLS) training and coefficient statistics.

use logreg_sgd::data::{DenseRow, InMemoryData};
use logreg_sgd::training::{
    IrlsParams, IrlsTrainer, LearningRateStrategy, MultinomialLoss, Prior, SgdParams, SgdTrainer,
    Solver, UpdateStrategy, Verbosity,
};

use crate::common::{blobs, dense};

/// Binary data where the share of positives grows with `x` and is symmetric
/// around `x = 3.5`. The pattern repeats every 40 rows.
fn graded(n_rows: usize) -> InMemoryData<DenseRow> {
    let rows = (0..n_rows)
        .map(|i| {
            let (x, shift) = (i % 8, (i / 8) % 5);
            let target = usize::from(x + shift >= 6);
            dense(i, &[x as f64 - 3.5], target)
        })
        .collect();
    InMemoryData::new(rows, 2).unwrap()
}

fn irls(prior: Prior) -> IrlsParams {
    IrlsParams {
        prior,
        verbosity: Verbosity::Silent,
        ..Default::default()
    }
}

#[test]
fn irls_objective_is_no_worse_than_sgd() {
    let data = blobs(3, 3, 20, 1.5, 7);
    let prior = Prior::Gauss { variance: 1.0 };

    let newton = IrlsTrainer::new(irls(prior)).unwrap().train(&data).unwrap();
    let sgd = SgdTrainer::new(SgdParams {
        max_epochs: 200,
        epsilon: 0.0,
        prior,
        strategy: UpdateStrategy::Lazy,
        learning_rate: LearningRateStrategy::Fixed { rate: 0.05 },
        verbosity: Verbosity::Silent,
        ..Default::default()
    })
    .unwrap()
    .train(&data)
    .unwrap();

    assert!(newton.converged());
    assert!(newton.loss() <= sgd.loss() + 1e-9);
    assert!((sgd.loss() - newton.loss()) / newton.loss() < 0.05);
}

#[test]
fn solver_dispatches_to_irls() {
    let data = graded(40);
    let params = irls(Prior::Uniform);

    let direct = IrlsTrainer::new(params.clone()).unwrap().train(&data).unwrap();
    let solver = Solver::Irls(params).train(&data).unwrap();

    assert_eq!(solver, direct);
}

#[test]
fn symmetric_data_gives_zero_intercept_and_significant_slope() {
    let data = graded(40);
    let model = IrlsTrainer::new(irls(Prior::Uniform)).unwrap().train(&data).unwrap();

    let gradient = MultinomialLoss.total_gradient(&data, model.weights());
    assert!(gradient.iter().all(|g| g.abs() < 1e-6));

    let stats = model.statistics(&data).unwrap();
    let p = stats.p_values();
    assert!(model.coefficients()[[0, 0]].abs() < 1e-6);
    assert!(p[[0, 0]] > 0.9);
    assert!(p[[0, 1]] < 0.01);
    assert!(stats.standard_errors().iter().all(|se| se.is_finite() && *se > 0.0));
}

#[test]
fn more_rows_shrink_standard_errors() {
    let small = graded(40);
    let large = graded(80);
    let params = irls(Prior::Uniform);

    let se_small = IrlsTrainer::new(params.clone())
        .unwrap()
        .train(&small)
        .unwrap()
        .statistics(&small)
        .unwrap()
        .standard_errors()[[0, 1]];
    let se_large = IrlsTrainer::new(params)
        .unwrap()
        .train(&large)
        .unwrap()
        .statistics(&large)
        .unwrap()
        .standard_errors()[[0, 1]];

    assert!(se_large < se_small);
}
