//! Training progress logging.
//!
//! Messages go through the [`log`] facade under the `logreg_sgd::training`
//! target. The library never installs a logger; [`Verbosity`] decides which
//! messages are emitted at all, the installed logger decides where they go.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Log target for all training messages.
pub(crate) const LOG_TARGET: &str = "logreg_sgd::training";

/// How much the trainer reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    /// Nothing.
    Silent,
    /// Warnings only.
    #[default]
    Warning,
    /// Per-epoch progress.
    Info,
    /// Per-step details.
    Debug,
}

/// Emits training progress according to a [`Verbosity`].
#[derive(Debug)]
pub struct TrainingLogger {
    verbosity: Verbosity,
    start: Option<Instant>,
    max_epochs: usize,
}

impl TrainingLogger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            start: None,
            max_epochs: 0,
        }
    }

    #[inline]
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    #[inline]
    pub fn enabled(&self, level: Verbosity) -> bool {
        level != Verbosity::Silent && self.verbosity >= level
    }

    pub fn start_training(&mut self, max_epochs: usize, n_rows: usize, n_features: usize, n_classes: usize) {
        self.start = Some(Instant::now());
        self.max_epochs = max_epochs;
        if self.enabled(Verbosity::Info) {
            log::info!(
                target: LOG_TARGET,
                "training on {} rows, {} feature slots, {} classes for up to {} epochs",
                n_rows,
                n_features,
                n_classes,
                max_epochs
            );
        }
    }

    pub fn log_epoch(&self, epoch: usize, loss: f64, learning_rate: f64, max_change: f64) {
        if self.enabled(Verbosity::Info) {
            log::info!(
                target: LOG_TARGET,
                "[{}/{}] loss={:.6} lr={:.6} max_change={:.3e}",
                epoch + 1,
                self.max_epochs,
                loss,
                learning_rate,
                max_change
            );
        }
    }

    pub fn log_step(&self, epoch: usize, step: usize, row_id: usize, loss: f64) {
        if self.enabled(Verbosity::Debug) {
            log::debug!(
                target: LOG_TARGET,
                "epoch {} step {}: row {} loss={:.6}",
                epoch,
                step,
                row_id,
                loss
            );
        }
    }

    /// One Newton iteration of the IRLS trainer.
    pub fn log_iteration(&self, iteration: usize, objective: f64, step_size: f64, max_change: f64) {
        if self.enabled(Verbosity::Info) {
            log::info!(
                target: LOG_TARGET,
                "[{}/{}] objective={:.6} step={} max_change={:.3e}",
                iteration + 1,
                self.max_epochs,
                objective,
                step_size,
                max_change
            );
        }
    }

    pub fn log_step_halving(&self, iteration: usize, step_size: f64, objective: f64) {
        if self.enabled(Verbosity::Debug) {
            log::debug!(
                target: LOG_TARGET,
                "iteration {}: objective {:.6} did not improve, halving step to {}",
                iteration,
                objective,
                step_size
            );
        }
    }

    pub fn log_converged(&self, epoch: usize, max_change: f64, epsilon: f64) {
        if self.enabled(Verbosity::Info) {
            log::info!(
                target: LOG_TARGET,
                "converged after {} epochs (max relative change {:.3e} < {:.3e})",
                epoch + 1,
                max_change,
                epsilon
            );
        }
    }

    pub fn log_early_stopping(&self, epoch: usize, best_epoch: usize, best_loss: f64) {
        if self.enabled(Verbosity::Info) {
            log::info!(
                target: LOG_TARGET,
                "early stopping at epoch {} (best epoch {}, loss={:.6})",
                epoch + 1,
                best_epoch + 1,
                best_loss
            );
        }
    }

    pub fn warn(&self, message: &str) {
        if self.enabled(Verbosity::Warning) {
            log::warn!(target: LOG_TARGET, "{}", message);
        }
    }

    pub fn finish_training(&self, epochs: usize, converged: bool) {
        if !self.enabled(Verbosity::Info) {
            return;
        }
        let elapsed = self.start.map(|s| s.elapsed().as_secs_f64()).unwrap_or(0.0);
        log::info!(
            target: LOG_TARGET,
            "finished {} epochs in {:.3}s ({})",
            epochs,
            elapsed,
            if converged { "converged" } else { "not converged" }
        );
    }
}
