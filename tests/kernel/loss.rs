//! Multinomial loss and gradient values.

use rstest::rstest;

use logreg_sgd::training::MultinomialLoss;

use crate::common::{assert_slice_approx_eq, dense, ORACLE_TOLERANCE};
use logreg_sgd::assert_approx_eq;

#[rstest]
#[case::confident_correct(&[3.0], 0, 0.0486)]
#[case::confident_wrong(&[-3.0], 0, 3.0486)]
#[case::three_classes_first(&[1.0, 4.0], 0, 3.0659)]
#[case::three_classes_reference(&[1.0, 4.0], 2, 4.0659)]
#[case::reference_favored(&[-1.0, -5.0], 2, 0.3182)]
fn loss_values(#[case] prediction: &[f64], #[case] target: usize, #[case] expected: f64) {
    let row = dense(0, &[1.0, 2.0], target);
    let loss = MultinomialLoss.evaluate(&row, prediction);
    assert_approx_eq!(loss, expected, ORACLE_TOLERANCE);
}

#[rstest]
#[case::confident_correct(&[3.0], 0, &[-0.0474])]
#[case::confident_wrong(&[-5.0], 0, &[-0.9933])]
#[case::reference_target(&[-4.0], 1, &[0.018])]
#[case::three_classes(&[2.0, 3.0], 1, &[0.2595, -0.2946])]
fn gradient_values(#[case] prediction: &[f64], #[case] target: usize, #[case] expected: &[f64]) {
    let row = dense(0, &[1.0], target);
    let gradient = MultinomialLoss.gradient(&row, prediction);
    assert_slice_approx_eq(&gradient, expected, ORACLE_TOLERANCE, "gradient");
}

#[test]
fn loss_is_non_negative_and_shift_stable() {
    let row = dense(0, &[0.5], 1);
    for scale in [1.0, 10.0, 100.0, 700.0, 1e6] {
        let loss = MultinomialLoss.evaluate(&row, &[scale, -scale, 0.5 * scale]);
        assert!(loss.is_finite(), "loss overflowed at scale {scale}");
        assert!(loss >= 0.0);
    }
}

#[test]
fn gradient_matches_finite_difference() {
    let row = dense(0, &[1.0], 1);
    let prediction = [0.3, -0.7, 1.1];
    let gradient = MultinomialLoss.gradient(&row, &prediction);

    let h = 1e-6;
    for c in 0..prediction.len() {
        let mut up = prediction;
        let mut down = prediction;
        up[c] += h;
        down[c] -= h;
        let numeric = (MultinomialLoss.evaluate(&row, &up) - MultinomialLoss.evaluate(&row, &down))
            / (2.0 * h);
        assert_approx_eq!(gradient[c], numeric, 1e-6, "class {}", c);
    }
}
