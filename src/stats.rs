//! Aggregation of repeated duration samples into summary statistics.

use std::time::Duration;

/// Summary of a sequence of duration samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleStats {
    /// Arithmetic mean of the samples.
    pub average: Duration,
    /// Population standard deviation of the samples.
    pub stddev: Duration,
}

/// Accumulates duration samples and computes [`SampleStats`] over the full
/// retained sequence.
///
/// Statistics are recomputed fresh on every [`stats`](Self::stats) call, not
/// adjusted incrementally.
#[derive(Debug, Default, Clone)]
pub struct StatsCalculator {
    sum: Duration,
    values: Vec<Duration>,
}

impl StatsCalculator {
    /// Creates an empty calculator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one sample.
    pub fn add(&mut self, value: Duration) {
        self.sum += value;
        self.values.push(value);
    }

    /// Number of samples recorded so far.
    pub fn count(&self) -> usize {
        self.values.len()
    }

    /// Computes mean and population standard deviation.
    ///
    /// # Panics
    ///
    /// Panics if no samples have been added; statistics over an empty
    /// sequence are a caller contract violation.
    pub fn stats(&self) -> SampleStats {
        let count = self.values.len();
        assert!(count > 0, "stats() on an empty sample sequence");

        let average = self.sum / count as u32;
        let mean_secs = average.as_secs_f64();
        let variance = self
            .values
            .iter()
            .map(|v| {
                let delta = v.as_secs_f64() - mean_secs;
                delta * delta
            })
            .sum::<f64>()
            / count as f64;

        SampleStats {
            average,
            stddev: Duration::from_secs_f64(variance.sqrt()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_sample_has_zero_stddev() {
        let mut calc = StatsCalculator::new();
        calc.add(Duration::from_micros(250));
        let stats = calc.stats();
        assert_eq!(stats.average, Duration::from_micros(250));
        assert_eq!(stats.stddev, Duration::ZERO);
    }

    #[test]
    fn identical_samples_have_zero_stddev() {
        let mut calc = StatsCalculator::new();
        for _ in 0..10 {
            calc.add(Duration::from_millis(3));
        }
        let stats = calc.stats();
        assert_eq!(stats.average, Duration::from_millis(3));
        assert_eq!(stats.stddev, Duration::ZERO);
    }

    #[test]
    fn mean_and_population_stddev() {
        let mut calc = StatsCalculator::new();
        calc.add(Duration::from_secs(2));
        calc.add(Duration::from_secs(4));
        let stats = calc.stats();
        assert_eq!(stats.average, Duration::from_secs(3));
        // Population stddev of {2, 4} is 1.
        let sigma = stats.stddev.as_secs_f64();
        assert!((sigma - 1.0).abs() < 1e-9, "sigma = {sigma}");
    }

    #[test]
    #[should_panic(expected = "empty sample sequence")]
    fn empty_calculator_panics() {
        let calc = StatsCalculator::new();
        let _ = calc.stats();
    }
}
