//! Parallel population of fixture batches.

use std::panic;

use tracing::debug;

use crate::descriptor::Describe;
use crate::engine::Populator;
use crate::error::PopulateResult;

/// Configuration for batch population
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Number of worker threads
    pub num_threads: usize,
    /// Batches smaller than this are populated on the calling thread
    pub batch_size: usize,
    /// Whether to spread work across threads at all
    pub enabled: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get(),
            batch_size: 10,
            enabled: true,
        }
    }
}

impl BatchConfig {
    /// Configuration that always populates on the calling thread
    pub fn sequential() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

impl Populator {
    /// Instantiate `count` values of `T`, spreading the work across worker threads.
    ///
    /// All workers draw from this populator's shared random source. The first error from any
    /// worker is returned; a panicking worker is resumed on the calling thread.
    pub fn instantiate_batch<T: Describe>(
        &self,
        count: usize,
        batch: &BatchConfig,
    ) -> PopulateResult<Vec<Option<T>>> {
        if !batch.enabled || batch.num_threads <= 1 || count == 0 || count < batch.batch_size {
            return self.instantiate_sequential(count);
        }

        let num_threads = batch.num_threads.min(count);
        let per_thread = count / num_threads;
        let remaining = count % num_threads;
        debug!(count, num_threads, "populating batch in parallel");

        let outcome = crossbeam::scope(|s| -> PopulateResult<Vec<Option<T>>> {
            let handles: Vec<_> = (0..num_threads)
                .map(|thread_id| {
                    let share = per_thread + usize::from(thread_id < remaining);
                    s.spawn(move |_| self.instantiate_sequential::<T>(share))
                })
                .collect();

            let mut values = Vec::with_capacity(count);
            for handle in handles {
                match handle.join() {
                    Ok(batch) => values.extend(batch?),
                    Err(payload) => panic::resume_unwind(payload),
                }
            }
            Ok(values)
        });

        match outcome {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    fn instantiate_sequential<T: Describe>(&self, count: usize) -> PopulateResult<Vec<Option<T>>> {
        (0..count).map(|_| self.instantiate::<T>()).collect()
    }
}
