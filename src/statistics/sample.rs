use rand::{seq::SliceRandom, Rng};

use crate::partitioner::Partitioner;

/// A view over a data set that hands out shuffled, contiguous mini-batches.
/// Data is only ever immutably borrowed.
pub struct Sample<'a, T> {
    all_samples: &'a [T],
    order: Vec<usize>,
}

impl<'a, T> Sample<'a, T> {
    /// Creates a sample over the data in its original order.
    pub fn create_sample(data: &'a [T]) -> Sample<'a, T> {
        Sample {
            all_samples: data,
            order: (0..data.len()).collect(),
        }
    }

    pub fn len(&self) -> usize { self.all_samples.len() }

    pub fn is_empty(&self) -> bool { self.all_samples.is_empty() }

    /// Draws a fresh uniformly random permutation of the whole data set.
    /// Each call is independent of the previous order.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for (i, slot) in self.order.iter_mut().enumerate() {
            *slot = i;
        }

        self.order.shuffle(rng);
    }

    /// Splits the current order into mini-batches following `Partitioner::with_batch_size`.
    pub fn batches(&self, batch_size: usize) -> Vec<Vec<&'a T>> {
        let partitioner = Partitioner::with_batch_size(self.order.len(), batch_size);
        let all_samples = self.all_samples;

        partitioner.partitions().iter()
            .map(|partition| partition.range()
                .map(|i| &all_samples[self.order[i]])
                .collect())
            .collect()
    }

    /// Shuffles and then batches.
    pub fn shuffled_batches<R: Rng + ?Sized>(&mut self, rng: &mut R, batch_size: usize) -> Vec<Vec<&'a T>> {
        self.shuffle(rng);
        self.batches(batch_size)
    }
}
