//! Early stopping on the epoch loss.
//!
//! Stops training once the monitored loss has gone `patience` consecutive
//! epochs without improving.

/// Outcome of feeding one epoch's loss to [`EarlyStopping::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EarlyStopAction {
    /// The loss improved on the best value seen so far.
    Improved,
    /// No improvement, but still within the patience window.
    Continue,
    /// `patience` consecutive epochs without improvement.
    Stop,
}

/// Patience-based early stopping where lower values are better.
///
/// A patience of `0` disables the monitor: [`update`](Self::update) never
/// returns [`EarlyStopAction::Stop`].
///
/// # Example
///
/// ```
/// use logreg_sgd::training::{EarlyStopAction, EarlyStopping};
///
/// let mut early_stop = EarlyStopping::new(2);
///
/// assert_eq!(early_stop.update(1.0), EarlyStopAction::Improved);
/// assert_eq!(early_stop.update(1.1), EarlyStopAction::Continue);
/// assert_eq!(early_stop.update(1.2), EarlyStopAction::Stop);
/// assert_eq!(early_stop.best_epoch(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    /// Number of epochs without improvement before stopping.
    patience: usize,
    /// Best loss seen so far.
    best_value: Option<f64>,
    /// Epoch at which the best loss was observed.
    best_epoch: usize,
    /// Number of values seen.
    current_epoch: usize,
}

impl EarlyStopping {
    /// Create a monitor with the given patience.
    pub fn new(patience: usize) -> Self {
        Self {
            patience,
            best_value: None,
            best_epoch: 0,
            current_epoch: 0,
        }
    }

    /// Whether the monitor can ever stop training.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.patience > 0
    }

    /// Record the loss of the current epoch.
    pub fn update(&mut self, value: f64) -> EarlyStopAction {
        let improved = match self.best_value {
            None => true,
            Some(best) => value < best,
        };

        if improved {
            self.best_value = Some(value);
            self.best_epoch = self.current_epoch;
        }
        self.current_epoch += 1;

        if improved {
            EarlyStopAction::Improved
        } else if self.is_enabled() && self.current_epoch - self.best_epoch > self.patience {
            EarlyStopAction::Stop
        } else {
            EarlyStopAction::Continue
        }
    }

    /// Record a value and report whether training should stop.
    pub fn should_stop(&mut self, value: f64) -> bool {
        self.update(value) == EarlyStopAction::Stop
    }

    /// Best loss observed.
    pub fn best_value(&self) -> Option<f64> {
        self.best_value
    }

    /// Epoch at which the best loss was observed.
    pub fn best_epoch(&self) -> usize {
        self.best_epoch
    }

    /// Number of epochs recorded so far.
    pub fn current_epoch(&self) -> usize {
        self.current_epoch
    }

    /// Forget all recorded values.
    pub fn reset(&mut self) {
        self.best_value = None;
        self.best_epoch = 0;
        self.current_epoch = 0;
    }
}
