use std::{ops::Index, thread};

use crate::partition::Partition;

/// Partitions data to be operated on, and provides for multi-threading.
#[derive(Hash, Debug, Clone, PartialEq, Default)]
pub struct Partitioner {
    partitions: Vec<Partition>
}

impl Index<usize> for Partitioner {
    type Output = Partition;

    fn index(&self, index: usize) -> &Self::Output {
        &self.partitions[index]
    }
}

impl Partitioner {
    pub fn new(partitions: Vec<Partition>) -> Self { Partitioner { partitions } }

    pub fn len(&self) -> usize { self.partitions.len() }

    pub fn is_empty(&self) -> bool { self.partitions.is_empty() }

    pub fn partitions(&self) -> &[Partition] { &self.partitions }

    /// Creates a partitioner with partitions that are mostly equal in size, with no more than a difference of 1.
    pub fn with_partitions(count: usize, partition_count: usize) -> Self {
        assert!(partition_count > 0, "Need at least one partition.");

        if count == 0 {
            return Partitioner::default();
        }

        let partition_size = count / partition_count;
        if partition_size < 1 {
        // Count is not large enough to split into partitions
            return Partitioner { partitions: vec![Partition::new(0, count - 1)] };
        }

        // Calculates left over items and distributes remainder
        let spread = count % partition_count;
        let mut partitions = Vec::with_capacity(partition_count);
        let mut cursor = 0;
        for partition_index in 0..partition_count {
            let adjusted_partition_size = partition_size + if partition_index < spread { 1 } else { 0 };
            let start = cursor;
            cursor = start + adjusted_partition_size;

            partitions.push(Partition::new(start, cursor - 1));
        }

        Partitioner { partitions }
    }

    /// Contiguous mini-batches of `batch_size`.
    /// There are round(count / batch_size) batches, at least one, and the last batch absorbs the remainder.
    /// The last batch is therefore between half and one and a half times `batch_size`.
    pub fn with_batch_size(count: usize, batch_size: usize) -> Self {
        assert!(batch_size > 0, "Batch size must be positive.");

        if count == 0 {
            return Partitioner::default();
        }

        let batch_count = ((count as f64 / batch_size as f64).round() as usize).max(1);
        let mut partitions = Vec::with_capacity(batch_count);
        for batch in 0..batch_count {
            let start = batch * batch_size;
            let end = if batch + 1 == batch_count { count - 1 } else { start + batch_size - 1 };

            partitions.push(Partition::new(start, end));
        }

        Partitioner { partitions }
    }

    /// Parallelizes work among partitions as evenly as possible.
    /// Ensures result is aggregated in correct order.
    pub fn parallelized<T, F>(&self, function: F) -> Vec<T>
    where
        F: FnOnce(&Partition) -> Vec<T> + Send + Copy,
        T: Send
    {
        match self.partitions.len() {
            0 => return vec![],
            // Since only 1 partition, do not use threading.
            1 => return function(&self.partitions[0]),
            _ => {}
        }

        let mut values: Vec<T> = Vec::new();
        thread::scope(|s| {
            let mut scope_join_handles = Vec::with_capacity(self.partitions.len());

            for partition in &self.partitions[..] {
                scope_join_handles.push(s.spawn(move || {
                    function(partition)
                }));
            }

            for scope_join_handle in scope_join_handles {
                match scope_join_handle.join() {
                    Ok(result) => values.extend(result),
                    Err(err) => std::panic::resume_unwind(err)
                }
            }
        });

        values
    }
}
