//! Weight storage: lazy scaling and prediction paths.

use ndarray::array;

use logreg_sgd::data::{IndexCache, SparseRow, TrainingRow};
use logreg_sgd::linear::{ScaledWeightVector, SimpleWeightVector, WeightMatrix, WeightVector};

use crate::common::{assert_weights_eq, dense, DEFAULT_TOLERANCE};

#[test]
fn scale_defers_to_logical_values() {
    let mut weights = ScaledWeightVector::new(3, 3, true);
    weights.update(|_, _, _| 1.0, true);
    weights.scale(3.0);

    assert_eq!(weights.scale_factor(), 3.0);
    assert!(weights.raw_weights().iter().all(|&w| w == 1.0));
    assert_weights_eq(
        &weights.weight_vector(),
        &array![[1.0, 3.0, 3.0], [1.0, 3.0, 3.0]],
        DEFAULT_TOLERANCE,
        "lazy scale",
    );
}

#[test]
fn scale_then_update_matches_across_strategies() {
    let mut eager = WeightVector::simple(3, 3, true);
    let mut lazy = WeightVector::scaled(3, 3, true);

    for weights in [&mut eager, &mut lazy] {
        weights.update(|_, c, f| (c + 2 * f) as f64 - 1.5, true);
    }
    for factor in [0.5, 3.0, 0.1] {
        // Eager storage ignores scale(); write the shrink through update() instead.
        eager.scale(factor);
        eager.update(|v, _, _| v * factor, false);
        lazy.scale(factor);

        for weights in [&mut eager, &mut lazy] {
            weights.update(|v, c, f| v + 0.25 * (c as f64) - 0.1 * f as f64, true);
        }
    }

    assert_weights_eq(
        &lazy.weight_vector(),
        &eager.weight_vector(),
        1e-12,
        "scale then update",
    );
    assert_eq!(eager.scale_factor(), 1.0);
    assert!((lazy.scale_factor() - 0.15).abs() < 1e-12);
}

#[test]
fn prediction_paths_are_bit_identical() {
    let mut simple = SimpleWeightVector::new(6, 4, true);
    simple.update(|_, c, f| ((c * 7 + f * 3) % 5) as f64 * 0.37 - 0.8, true);
    let mut scaled = ScaledWeightVector::from_array(simple.weight_vector(), true);
    scaled.scale(0.73);

    let sparse = SparseRow::new(0, 5, &[(0, 1.5), (3, -2.25), (4, 0.125)], 1).unwrap();
    let dense_row = dense(1, &[0.0, 4.0, 0.0, 0.0, -1.0], 2);

    for row in [&sparse as &dyn TrainingRow, &dense_row as &dyn TrainingRow] {
        let cache = IndexCache::new(row);
        assert_eq!(simple.predict(row), simple.predict_cached(row, &cache));
        assert_eq!(scaled.predict(row), scaled.predict_cached(row, &cache));
    }
}

#[test]
fn batch_prediction_matches_rows() {
    let mut weights = SimpleWeightVector::new(3, 3, true);
    weights.update(|_, c, f| c as f64 - f as f64 * 0.5, true);
    let rows = vec![dense(0, &[1.0, 2.0], 0), dense(1, &[-1.0, 0.0], 1), dense(2, &[0.5, 0.5], 2)];
    let data = logreg_sgd::InMemoryData::new(rows, 3).unwrap();

    let batch = weights.predict_batch(&data);
    let parallel = weights.par_predict_batch(&data);
    assert_eq!(batch, parallel);
    for (i, row) in data.rows().iter().enumerate() {
        assert_eq!(batch.row(i).to_vec(), weights.predict(row));
    }
}

#[test]
fn explicit_index_cache_restricts_support() {
    let mut weights = SimpleWeightVector::new(4, 2, true);
    weights.update(|_, _, f| (f + 1) as f64, true);
    let row = dense(0, &[1.0, 2.0, 3.0], 0);

    // Intercept and the last feature only: 1 + 4 * 3
    let cache = IndexCache::from_indices(vec![0, 3]);
    assert_eq!(weights.predict_cached(&row, &cache), vec![13.0]);
    assert_eq!(
        weights.predict_cached(&row, &cache),
        weights.predict_with_indices(&row, &[0, 3])
    );
}
