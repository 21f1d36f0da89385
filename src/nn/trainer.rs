use std::fs;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{NnError, Result};
use crate::nn::learning_rate::LearningRate;
use crate::nn::network::Network;
use crate::nn::train_item::TrainItem;
use crate::statistics::sample::Sample;
use crate::timed::TimedContext;

/// Settings for a training run.
/// A negative `epochs` switches to best-of-N training with |epochs| as the patience window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingHyperParameters {
    pub epochs: i64,
    pub mini_batch_size: usize,
    pub eta: f64,
    pub eta_decay_fraction: f64,
    pub lambda: f64,
    pub print_cost: bool,
    pub worker_threads: usize,
}

impl Default for TrainingHyperParameters {
    fn default() -> Self {
        TrainingHyperParameters {
            epochs: 30,
            mini_batch_size: 10,
            eta: 0.5,
            eta_decay_fraction: 0.,
            lambda: 0.,
            print_cost: false,
            worker_threads: 1,
        }
    }
}

/// How long training runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochBudget {
    /// Exactly this many iterations.
    Fixed(usize),
    /// Until `patience` iterations pass without a better validation cost and eta can no longer decay.
    BestOfN { patience: usize },
}

impl TrainingHyperParameters {
    pub fn budget(&self) -> EpochBudget {
        if self.epochs < 0 {
            EpochBudget::BestOfN { patience: self.epochs.unsigned_abs() as usize }
        } else {
            EpochBudget::Fixed(self.epochs as usize)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(NnError::InvalidConfig("epochs must not be zero".to_string()));
        }

        if self.mini_batch_size == 0 {
            return Err(NnError::InvalidConfig("mini batch size must be positive".to_string()));
        }

        if !self.eta.is_finite() || self.eta < 0. {
            return Err(NnError::InvalidConfig(format!("eta must be finite and non-negative, got {}", self.eta)));
        }

        if !self.lambda.is_finite() || !self.eta_decay_fraction.is_finite() {
            return Err(NnError::InvalidConfig("lambda and eta decay fraction must be finite".to_string()));
        }

        if self.worker_threads == 0 {
            return Err(NnError::InvalidConfig("worker threads must be positive".to_string()));
        }

        Ok(())
    }

    /// Reads hyperparameters from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let tp: TrainingHyperParameters = serde_json::from_str(&fs::read_to_string(path)?)?;
        tp.validate()?;

        Ok(tp)
    }
}

/// What a training iteration exposes to the surrounding program.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochReport {
    pub epoch: usize,
    /// Accuracy on the held-out items, when any were supplied.
    pub accuracy: Option<f64>,
    /// Validation cost, when requested and held-out items were supplied.
    pub cost: Option<f64>,
    pub eta: f64,
    pub elapsed_seconds: f64,
}

/// Receives a report after every training iteration.
pub trait Reporter {
    fn report(&mut self, report: &EpochReport);
}

impl<F: FnMut(&EpochReport)> Reporter for F {
    fn report(&mut self, report: &EpochReport) {
        self(report)
    }
}

/// Reports each iteration through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&mut self, report: &EpochReport) {
        match (report.accuracy, report.cost) {
            (Some(accuracy), Some(cost)) => info!(epoch = report.epoch, accuracy, cost, seconds = report.elapsed_seconds, "Epoch complete"),
            (Some(accuracy), None) => info!(epoch = report.epoch, accuracy, seconds = report.elapsed_seconds, "Epoch complete"),
            _ => info!(epoch = report.epoch, seconds = report.elapsed_seconds, "Epoch finished"),
        }
    }
}

/// Summary of a finished training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOutcome {
    pub epochs_run: usize,
    /// Lowest validation cost seen in best-of-N training.
    pub best_cost: Option<f64>,
    /// True when best-of-N training put the best snapshot back into the network.
    pub restored_best: bool,
    pub final_eta: f64,
}

/// Best-of-N bookkeeping: the lowest cost, the network that produced it and the iterations since.
struct BestSnapshot {
    cost: f64,
    network: Network,
    stale_epochs: usize,
}

impl Network {
    /// Trains with mini-batch stochastic gradient descent.
    /// Each iteration shuffles `items`, updates on every mini-batch and then evaluates on `test_data`.
    /// In best-of-N mode the network ends holding the parameters with the lowest validation cost.
    pub fn train<R, P>(
        &mut self,
        items: &[TrainItem],
        tp: &TrainingHyperParameters,
        test_data: &[TrainItem],
        rng: &mut R,
        reporter: &mut P) -> Result<TrainingOutcome>
    where
        R: Rng + ?Sized,
        P: Reporter + ?Sized
    {
        tp.validate()?;

        let budget = tp.budget();
        if matches!(budget, EpochBudget::BestOfN { .. }) && test_data.is_empty() {
            return Err(NnError::InvalidConfig("best-of-N training needs held-out test items".to_string()));
        }

        for item in items.iter().chain(test_data.iter()) {
            self.check_item(item)?;
        }

        let mut learning_rate = LearningRate::new(tp.eta);
        let mut sample = Sample::create_sample(items);
        let mut timer = TimedContext::new();
        let mut best = match budget {
            EpochBudget::BestOfN { .. } => Some(BestSnapshot {
                cost: self.cost(test_data),
                network: self.clone(),
                stale_epochs: 0,
            }),
            EpochBudget::Fixed(_) => None,
        };

        let mut epoch = 0;
        let mut restored_best = false;
        loop {
            match (budget, best.as_mut()) {
                (EpochBudget::Fixed(epochs), _) if epoch >= epochs => break,
                (EpochBudget::BestOfN { patience }, Some(snapshot)) if snapshot.stale_epochs >= patience => {
                    if learning_rate.can_decay(tp.eta_decay_fraction) {
                        learning_rate.halve();
                        snapshot.stale_epochs = 0;
                        debug!(epoch, eta = learning_rate.rate(), "No improvement, halving eta");
                    } else {
                        info!(epoch, cost = snapshot.cost, "No improvement, restoring best network");
                        *self = snapshot.network.clone();
                        restored_best = true;
                        break;
                    }
                },
                _ => {}
            }

            let batches = sample.shuffled_batches(rng, tp.mini_batch_size);
            debug!(epoch, batches = batches.len(), "Training on shuffled mini-batches");
            for batch in batches.iter() {
                self.update_mini_batch_with_workers(batch, learning_rate.rate(), tp.lambda, items.len(), tp.worker_threads);
            }

            let cost = if best.is_some() || (tp.print_cost && !test_data.is_empty()) {
                Some(self.cost(test_data))
            } else {
                None
            };

            if let (Some(snapshot), Some(cost)) = (best.as_mut(), cost) {
                if cost < snapshot.cost {
                    snapshot.cost = cost;
                    snapshot.network = self.clone();
                    snapshot.stale_epochs = 0;
                } else {
                    snapshot.stale_epochs += 1;
                }
            }

            let has_test_data = !test_data.is_empty();
            reporter.report(&EpochReport {
                epoch,
                accuracy: has_test_data.then(|| self.evaluate(test_data)),
                cost: cost.filter(|_| tp.print_cost && has_test_data),
                eta: learning_rate.rate(),
                elapsed_seconds: timer.checkpoint(),
            });

            epoch += 1;
        }

        debug!(epochs = epoch, seconds = timer.total(), "Training finished");

        Ok(TrainingOutcome {
            epochs_run: epoch,
            best_cost: best.map(|snapshot| snapshot.cost),
            restored_best,
            final_eta: learning_rate.rate(),
        })
    }
}
