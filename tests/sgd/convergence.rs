//! Convergence, stopping and basic model quality.

use logreg_sgd::data::{DenseRow, InMemoryData, SparseRow, TrainingRow};
use logreg_sgd::training::{LearningRateStrategy, Prior, SgdParams, SgdTrainer, UpdateStrategy, Verbosity};

use crate::common::{accuracy, blobs, dense};
use logreg_sgd::assert_approx_eq;

fn params(strategy: UpdateStrategy) -> SgdParams {
    SgdParams {
        max_epochs: 60,
        strategy,
        learning_rate: LearningRateStrategy::Fixed { rate: 0.05 },
        verbosity: Verbosity::Silent,
        ..Default::default()
    }
}

#[test]
fn separates_blobs_with_either_strategy() {
    let data = blobs(3, 3, 30, 0.5, 7);
    for strategy in [UpdateStrategy::Eager, UpdateStrategy::Lazy] {
        let model = SgdTrainer::new(params(strategy)).unwrap().train(&data).unwrap();
        assert_eq!(model.n_classes(), 3);
        assert_eq!(model.n_features(), 4);
        assert!(
            accuracy(&model, &data) > 0.95,
            "{strategy:?}: accuracy {}",
            accuracy(&model, &data)
        );
    }
}

#[test]
fn probabilities_cover_all_classes() {
    let data = blobs(3, 3, 20, 0.5, 11);
    let model = SgdTrainer::new(params(UpdateStrategy::Lazy)).unwrap().train(&data).unwrap();

    for row in data.rows() {
        let proba = model.predict_proba(row);
        assert_eq!(proba.len(), 3);
        assert_approx_eq!(proba.iter().sum::<f64>(), 1.0, 1e-12);
        let argmax = (0..3)
            .max_by(|&a, &b| proba[a].total_cmp(&proba[b]))
            .unwrap();
        assert_eq!(argmax, model.predict_class(row));
    }
}

#[test]
fn loose_epsilon_converges_early() {
    let data = blobs(2, 2, 20, 0.3, 3);
    let model = SgdTrainer::new(SgdParams {
        epsilon: 0.5,
        ..params(UpdateStrategy::Lazy)
    })
    .unwrap()
    .train(&data)
    .unwrap();

    assert!(model.converged());
    assert!(model.epochs() < 60);
}

#[test]
fn early_stopping_ends_a_stalled_run() {
    // Identical features with alternating labels: the weights settle into a
    // fixed cycle and the loss stops improving.
    let rows = (0..10).map(|i| dense(i, &[0.0], i % 2)).collect();
    let data = InMemoryData::new(rows, 2).unwrap();

    let model = SgdTrainer::new(SgdParams {
        max_epochs: 1000,
        epsilon: 0.0,
        shuffle: false,
        prior: Prior::Uniform,
        learning_rate: LearningRateStrategy::Fixed { rate: 0.5 },
        early_stopping_epochs: 2,
        verbosity: Verbosity::Silent,
        ..Default::default()
    })
    .unwrap()
    .train(&data)
    .unwrap();

    assert!(!model.converged());
    assert!(model.epochs() < 1000, "ran {} epochs", model.epochs());
}

#[test]
fn annealing_schedule_trains() {
    let data = blobs(3, 3, 20, 0.5, 5);
    let model = SgdTrainer::new(SgdParams {
        learning_rate: LearningRateStrategy::Annealing {
            initial: 0.2,
            decay: 0.1,
        },
        ..params(UpdateStrategy::Lazy)
    })
    .unwrap()
    .train(&data)
    .unwrap();

    assert!(accuracy(&model, &data) > 0.95);
}

#[test]
fn zero_weight_rows_change_nothing() {
    let base: Vec<DenseRow> = (0..12)
        .map(|i| dense(i, &[i as f64 * 0.5 - 3.0, (i % 3) as f64], i % 3))
        .collect();
    let mut padded = base.clone();
    for i in 0..4 {
        padded.push(DenseRow::with_weight(100 + i, &[5.0, -5.0], i % 3, 0.0).unwrap());
    }

    let run = |rows: Vec<DenseRow>| {
        let data = InMemoryData::new(rows, 3).unwrap();
        SgdTrainer::new(SgdParams {
            max_epochs: 5,
            shuffle: false,
            prior: Prior::Uniform,
            verbosity: Verbosity::Silent,
            ..Default::default()
        })
        .unwrap()
        .train(&data)
        .unwrap()
    };

    let plain = run(base);
    let weighted = run(padded);
    assert_eq!(plain.coefficients(), weighted.coefficients());
    assert_approx_eq!(plain.loss(), weighted.loss(), 1e-12);
}

#[test]
fn sparse_rows_train_like_dense_rows() {
    let dense_rows: Vec<DenseRow> = (0..16)
        .map(|i| {
            let x = if i % 2 == 0 { 2.0 } else { 0.0 };
            dense(i, &[x, 0.0, 1.0 - x / 2.0], i % 2)
        })
        .collect();
    let sparse_rows: Vec<SparseRow> = dense_rows
        .iter()
        .map(|row| {
            let entries: Vec<(usize, f64)> = (1..row.feature_count())
                .map(|slot| (slot - 1, row.feature(slot)))
                .filter(|&(_, v)| v != 0.0)
                .collect();
            SparseRow::new(row.id(), 3, &entries, row.target()).unwrap()
        })
        .collect();

    let params = SgdParams {
        max_epochs: 20,
        verbosity: Verbosity::Silent,
        ..Default::default()
    };
    let trainer = SgdTrainer::new(params).unwrap();
    let from_dense = trainer.train(&InMemoryData::new(dense_rows, 2).unwrap()).unwrap();
    let from_sparse = trainer.train(&InMemoryData::new(sparse_rows, 2).unwrap()).unwrap();

    assert_eq!(from_dense.coefficients(), from_sparse.coefficients());
}
