//! Hessian values and symmetry.

use logreg_sgd::data::{InMemoryData, TrainingData, TrainingRow};
use logreg_sgd::linear::{SimpleWeightVector, WeightMatrix};
use logreg_sgd::training::MultinomialLoss;

use crate::common::{dense, SingleRowData, ORACLE_TOLERANCE};
use logreg_sgd::assert_approx_eq;

/// Two user features, no fitted intercept, two non-reference classes.
fn fixture() -> (SingleRowData<logreg_sgd::DenseRow>, SimpleWeightVector) {
    let mut weights = SimpleWeightVector::new(3, 3, false);
    let values = [[0.0, 1.0, 2.0], [1.0, 2.0, 3.0]];
    weights.update(|_, c, f| values[c][f], true);
    (SingleRowData::new(dense(0, &[2.0, 3.0], 0), 3), weights)
}

#[test]
fn hessian_matches_closed_form() {
    let (data, weights) = fixture();
    let hessian = MultinomialLoss.hessian(&data, &weights);
    assert_eq!(hessian.dim(), (6, 6));

    // scores: class 0 = 0 + 2 + 6 = 8, class 1 = 1 + 4 + 9 = 14
    let denom = 1.0 + 8f64.exp() + 14f64.exp();
    let p = [8f64.exp() / denom, 14f64.exp() / denom];
    let x = [1.0, 2.0, 3.0];

    for c1 in 0..2 {
        for f1 in 0..3 {
            for c2 in 0..2 {
                for f2 in 0..3 {
                    let second = if c1 == c2 {
                        p[c1] * (1.0 - p[c1])
                    } else {
                        -p[c1] * p[c2]
                    };
                    let expected = x[f1] * x[f2] * second;
                    assert_approx_eq!(
                        hessian[[c1 * 3 + f1, c2 * 3 + f2]],
                        expected,
                        ORACLE_TOLERANCE,
                        "entry ({}, {}) x ({}, {})",
                        c1,
                        f1,
                        c2,
                        f2
                    );
                }
            }
        }
    }
}

#[test]
fn hessian_is_exactly_symmetric() {
    let (data, weights) = fixture();
    let hessian = MultinomialLoss.hessian(&data, &weights);
    for r in 0..6 {
        for c in 0..6 {
            assert_eq!(hessian[[r, c]], hessian[[c, r]], "({r}, {c})");
        }
    }
}

#[test]
fn hessian_sums_rows_and_respects_weights() {
    let (single, weights) = fixture();
    let one = MultinomialLoss.hessian(&single, &weights);

    let row = single.row(0).clone();
    let weighted = logreg_sgd::DenseRow::with_weight(1, &[2.0, 3.0], 1, 2.0).unwrap();
    assert_eq!(weighted.weight(), 2.0);
    let data = InMemoryData::new(vec![row, weighted], 3).unwrap();
    let three = MultinomialLoss.hessian(&data, &weights);

    // The target doesn't enter the Hessian: weight 1 + weight 2 = 3 copies.
    for (a, b) in one.iter().zip(three.iter()) {
        assert_approx_eq!(3.0 * a, *b, 1e-12);
    }
}

#[test]
fn sparse_support_only_fills_touched_blocks() {
    let mut weights = SimpleWeightVector::new(4, 2, true);
    weights.update(|_, _, f| 0.1 * f as f64, true);
    let row = logreg_sgd::SparseRow::new(0, 3, &[(2, 1.5)], 1).unwrap();
    let data = SingleRowData::new(row, 2);
    let hessian = MultinomialLoss.hessian(&data, &weights);

    for r in 0..4 {
        for c in 0..4 {
            let touched = (r == 0 || r == 3) && (c == 0 || c == 3);
            if !touched {
                assert_eq!(hessian[[r, c]], 0.0, "({r}, {c})");
            } else {
                assert!(hessian[[r, c]] > 0.0, "({r}, {c})");
            }
        }
    }
}
