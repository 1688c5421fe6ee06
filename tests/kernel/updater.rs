//! SGD update arithmetic under both strategies.

use ndarray::array;
use rstest::rstest;

use logreg_sgd::linear::{WeightMatrix, WeightVector};
use logreg_sgd::training::{SgdUpdater, UpdateStrategy};

use crate::common::{assert_weights_eq, dense, DEFAULT_TOLERANCE};

#[rstest]
#[case::eager(UpdateStrategy::Eager)]
#[case::lazy(UpdateStrategy::Lazy)]
fn single_update(#[case] strategy: UpdateStrategy) {
    let updater = strategy.create_updater();
    let mut weights = strategy.create_weights(3, 3, true);

    updater.update(&dense(0, &[1.0, 1.0], 0), &[3.0, -2.0], &mut weights, 1.0, 0);

    let expected = array![[-3.0, -3.0, -3.0], [2.0, 2.0, 2.0]];
    assert_weights_eq(&weights.weight_vector(), &expected, DEFAULT_TOLERANCE, "single update");
}

#[rstest]
#[case::eager(UpdateStrategy::Eager)]
#[case::lazy(UpdateStrategy::Lazy)]
fn four_updates_compose(#[case] strategy: UpdateStrategy) {
    let updater = strategy.create_updater();
    let mut weights = strategy.create_weights(3, 3, true);

    let steps: [(&[f64], [f64; 2], f64); 4] = [
        (&[1.0, 1.0], [3.0, -2.0], 1.0),
        (&[2.0, 3.0], [1.0, 2.0], 2.0),
        (&[1.0, 1.0], [0.0, 2.0], 2.0),
        (&[4.0, 5.0], [-3.0, -1.0], 3.0),
    ];
    for (step, (features, gradient, learning_rate)) in steps.iter().enumerate() {
        let row = dense(step, features, 0);
        updater.update(&row, gradient, &mut weights, *learning_rate, step);
    }

    let expected = array![[4.0, 29.0, 36.0], [-3.0, 2.0, 1.0]];
    assert_weights_eq(&weights.weight_vector(), &expected, DEFAULT_TOLERANCE, "four updates");
}

#[rstest]
#[case::eager(UpdateStrategy::Eager)]
#[case::lazy(UpdateStrategy::Lazy)]
fn unfitted_intercept_stays_put(#[case] strategy: UpdateStrategy) {
    let updater = strategy.create_updater();
    let mut weights = strategy.create_weights(3, 3, false);

    updater.update(&dense(0, &[1.0, 1.0], 0), &[3.0, -2.0], &mut weights, 1.0, 0);

    let expected = array![[0.0, -3.0, -3.0], [0.0, 2.0, 2.0]];
    assert_weights_eq(&weights.weight_vector(), &expected, DEFAULT_TOLERANCE, "no intercept");
}

#[test]
fn zero_features_are_not_touched() {
    for strategy in [UpdateStrategy::Eager, UpdateStrategy::Lazy] {
        let updater = strategy.create_updater();
        let mut weights = strategy.create_weights(4, 2, true);
        updater.update(&dense(0, &[0.0, 2.0, 0.0], 0), &[1.0], &mut weights, 0.5, 0);
        assert_eq!(weights.weight_vector(), array![[-0.5, 0.0, -1.0, 0.0]]);
    }
}

#[test]
fn lazy_strategy_uses_scaled_storage() {
    let weights = UpdateStrategy::Lazy.create_weights(3, 2, true);
    assert!(matches!(weights, WeightVector::Scaled(_)));
    let weights = UpdateStrategy::Eager.create_weights(3, 2, true);
    assert!(matches!(weights, WeightVector::Simple(_)));
}
