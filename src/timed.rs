use std::time::Instant;

/// Wall clock checkpoints for a long running operation.
pub struct TimedContext {
    checkpoints: Vec<Instant>
}

impl Default for TimedContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TimedContext {
    pub fn new() -> Self {
        let start = Instant::now();
        Self { checkpoints: vec![start] }
    }

    /// Seconds since the previous checkpoint, recording a new one.
    pub fn checkpoint(&mut self) -> f64 {
        let new_checkpoint = Instant::now();
        let last_checkpoint = self.checkpoints[self.checkpoints.len() - 1];
        self.checkpoints.push(new_checkpoint);

        new_checkpoint.duration_since(last_checkpoint).as_secs_f64()
    }

    /// Seconds since the context was created.
    pub fn total(&self) -> f64 {
        self.checkpoints[0].elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time};

    use super::TimedContext;

    #[test]
    fn test_checkpoints() {
        let mut context = TimedContext::new();

        thread::sleep(time::Duration::from_millis(200));
        let first = context.checkpoint();

        thread::sleep(time::Duration::from_millis(100));
        let second = context.checkpoint();

        assert!(first >= 0.2);
        assert!(second >= 0.1);
        assert!(context.total() >= 0.3);
    }
}
