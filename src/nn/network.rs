use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{NnError, Result};
use crate::geoalg::f64_math::matrix::Matrix;
use crate::nn::cost_functions::*;
use crate::nn::train_item::TrainItem;
use crate::partitioner::Partitioner;

/// Persisted form of a network: layer sizes, then weights and biases per layer transition.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NetworkRecord {
    pub layers: Vec<usize>,
    pub weights: Vec<Matrix>,
    pub biases: Vec<Matrix>,
}

/// Fully connected feedforward network with sigmoid activations.
/// weights[i] is layers[i] x layers[i + 1] and biases[i] is 1 x layers[i + 1].
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "NetworkRecord", into = "NetworkRecord")]
pub struct Network {
    layers: Vec<usize>,
    weights: Vec<Matrix>,
    biases: Vec<Matrix>,
}

/// Per layer gradients of the cost, shaped like the network's own weights and biases.
#[derive(PartialEq, Debug, Clone)]
pub struct Gradients {
    pub weights: Vec<Matrix>,
    pub biases: Vec<Matrix>,
}

impl Gradients {
    /// Zeroed gradients shaped for the network.
    pub fn zeroed_for(network: &Network) -> Self {
        Gradients {
            weights: network.weights.iter().map(Matrix::zeroed_like).collect(),
            biases: network.biases.iter().map(Matrix::zeroed_like).collect(),
        }
    }

    /// Elementwise sum with other, layer by layer.
    pub fn accumulate(&mut self, other: &Gradients) {
        for (sum, nabla) in self.weights.iter_mut().zip(other.weights.iter()) {
            *sum = sum.add(nabla);
        }

        for (sum, nabla) in self.biases.iter_mut().zip(other.biases.iter()) {
            *sum = sum.add(nabla);
        }
    }
}

impl TryFrom<NetworkRecord> for Network {
    type Error = NnError;

    fn try_from(record: NetworkRecord) -> Result<Self> {
        Network::from_parts(record.layers, record.weights, record.biases)
    }
}

impl From<Network> for NetworkRecord {
    fn from(network: Network) -> Self {
        NetworkRecord {
            layers: network.layers,
            weights: network.weights,
            biases: network.biases,
        }
    }
}

fn check_layers(layers: &[usize]) -> Result<()> {
    if layers.len() < 2 {
        return Err(NnError::InvalidConfig(format!(
            "a network needs at least an input and an output layer, got {} layers", layers.len())));
    }

    if layers.contains(&0) {
        return Err(NnError::InvalidConfig(format!("layer sizes must be positive, got {layers:?}")));
    }

    Ok(())
}

impl Network {
    /// Creates a network with weights drawn from N(0, 1) / sqrt(fan in) and biases from N(0, 1).
    pub fn new<R: Rng + ?Sized>(layers: Vec<usize>, rng: &mut R) -> Result<Self> {
        check_layers(&layers)?;

        let biases = layers.windows(2)
            .map(|pair| Matrix::new_randomized_normal(1, pair[1], rng))
            .collect();

        let weights = layers.windows(2)
            .map(|pair| Matrix::new_randomized_normalized(pair[0], pair[1], rng))
            .collect();

        Ok(Network { layers, weights, biases })
    }

    /// Assembles a network from existing parameters, checking every layer shape.
    pub fn from_parts(layers: Vec<usize>, weights: Vec<Matrix>, biases: Vec<Matrix>) -> Result<Self> {
        check_layers(&layers).map_err(|e| NnError::Serialization(e.to_string()))?;

        let transitions = layers.len() - 1;
        if weights.len() != transitions || biases.len() != transitions {
            return Err(NnError::Serialization(format!(
                "{} layers need {transitions} weight and bias matrices, got {} and {}",
                layers.len(), weights.len(), biases.len())));
        }

        for (i, pair) in layers.windows(2).enumerate() {
            if weights[i].shape() != (pair[0], pair[1]) {
                return Err(NnError::Serialization(format!(
                    "weights {i} should be {} x {}, got {:?}", pair[0], pair[1], weights[i].shape())));
            }

            if biases[i].shape() != (1, pair[1]) {
                return Err(NnError::Serialization(format!(
                    "biases {i} should be 1 x {}, got {:?}", pair[1], biases[i].shape())));
            }
        }

        Ok(Network { layers, weights, biases })
    }

    pub fn layers(&self) -> &[usize] { &self.layers }

    pub fn weights(&self) -> &[Matrix] { &self.weights }

    pub fn biases(&self) -> &[Matrix] { &self.biases }

    /// Checks that an item's input fits the first layer and its classes fit the last.
    pub fn check_item(&self, item: &TrainItem) -> Result<()> {
        let input = (1, self.layers[0]);
        if item.values().shape() != input {
            return Err(NnError::ShapeMismatch { operation: "input", lhs: item.values().shape(), rhs: input });
        }

        let output = (1, self.layers[self.layers.len() - 1]);
        if (1, item.distinct()) != output {
            return Err(NnError::ShapeMismatch { operation: "target", lhs: (1, item.distinct()), rhs: output });
        }

        Ok(())
    }

    /// Output of the network for a 1 x layers[0] input.
    /// Panics if the input does not fit the first layer.
    pub fn feed_forward(&self, input: &Matrix) -> Matrix {
        assert_eq!(input.shape(), (1, self.layers[0]), "Input must be a single row as wide as the first layer.");

        let mut activation = input.clone();
        for (weights, biases) in self.weights.iter().zip(self.biases.iter()) {
            activation = activation.mul(weights).add(biases).sigmoid();
        }

        activation
    }

    /// Index of the strongest output activation.
    pub fn classify(&self, input: &Matrix) -> usize {
        self.feed_forward(input)
            .max_index()
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// Mean cross-entropy over the items. Zero for no items.
    pub fn cost(&self, items: &[TrainItem]) -> f64 {
        if items.is_empty() {
            return 0.;
        }

        let total: f64 = items.iter()
            .map(|item| cross_entropy(&self.feed_forward(item.values()), &item.one_hot_target()))
            .sum();

        total / items.len() as f64
    }

    /// Fraction of items whose strongest output is the item's label. Zero for no items.
    pub fn evaluate(&self, items: &[TrainItem]) -> f64 {
        if items.is_empty() {
            return 0.;
        }

        let correct = items.iter()
            .filter(|item| self.classify(item.values()) as f64 == item.label())
            .count();

        correct as f64 / items.len() as f64
    }

    /// Gradients of the cross-entropy cost for a single item.
    pub fn backprop(&self, item: &TrainItem) -> Gradients {
        let mut nabla = Gradients::zeroed_for(self);
        let last = self.weights.len() - 1;

        // Forward pass keeping every z and activation
        let mut activations = Vec::with_capacity(self.layers.len());
        let mut zs = Vec::with_capacity(self.weights.len());
        activations.push(item.values().clone());
        for (weights, biases) in self.weights.iter().zip(self.biases.iter()) {
            let z = activations[activations.len() - 1].mul(weights).add(biases);
            activations.push(z.sigmoid());
            zs.push(z);
        }

        let mut delta = cross_entropy_delta(&activations[last + 1], &item.one_hot_target());
        nabla.weights[last] = activations[last].transpose().mul(&delta);
        nabla.biases[last] = delta.clone();

        for l in (0..last).rev() {
            delta = delta.mul(&self.weights[l + 1].transpose())
                .elementwise_multiply(&zs[l].sigmoid_prime());

            nabla.weights[l] = activations[l].transpose().mul(&delta);
            nabla.biases[l] = delta.clone();
        }

        nabla
    }

    /// One gradient descent step with L2 weight decay over a mini-batch.
    /// `training_set_size` is the size of the full training set, not of the batch.
    pub fn update_mini_batch(&mut self, batch: &[&TrainItem], eta: f64, lambda: f64, training_set_size: usize) {
        self.update_mini_batch_with_workers(batch, eta, lambda, training_set_size, 1);
    }

    /// Same as `update_mini_batch`, computing per item gradients on up to `workers` threads.
    /// Gradients are summed in item order, so the result does not depend on `workers`.
    pub fn update_mini_batch_with_workers(&mut self, batch: &[&TrainItem], eta: f64, lambda: f64, training_set_size: usize, workers: usize) {
        if batch.is_empty() {
            return;
        }

        let nabla = self.batch_gradients(batch, workers);

        let step = eta / batch.len() as f64;
        let decay = 1. - eta * lambda / training_set_size as f64;

        for (weights, nabla_w) in self.weights.iter_mut().zip(nabla.weights.iter()) {
            *weights = weights.scale(decay).sub(&nabla_w.scale(step));
        }

        for (biases, nabla_b) in self.biases.iter_mut().zip(nabla.biases.iter()) {
            *biases = biases.sub(&nabla_b.scale(step));
        }
    }

    fn batch_gradients(&self, batch: &[&TrainItem], workers: usize) -> Gradients {
        let per_item: Vec<Gradients> = Partitioner::with_partitions(batch.len(), workers.max(1))
            .parallelized(|partition| partition.range()
                .map(|i| self.backprop(batch[i]))
                .collect());

        let mut sum = Gradients::zeroed_for(self);
        for nabla in per_item.iter() {
            sum.accumulate(nabla);
        }

        sum
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Neural network:\nlayers:")?;
        for layer in self.layers.iter() {
            write!(f, " {layer}")?;
        }

        for (i, weights) in self.weights.iter().enumerate() {
            write!(f, "\nweights layer {i} to {}:\n{weights}", i + 1)?;
        }

        for (i, biases) in self.biases.iter().enumerate() {
            write!(f, "\nbiases layer {}:\n{biases}", i + 1)?;
        }

        Ok(())
    }
}
