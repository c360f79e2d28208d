//! Frame rate and per-phase time accounting

use std::time::{Duration, Instant};
use tracing::info;

/// One completed sample period
#[derive(Debug, Clone, PartialEq)]
pub struct FpsSample {
    pub fps: f64,
    /// Share of the period spent in each measured phase, in percent
    pub fractions: Vec<(&'static str, f64)>,
}

pub struct FpsCounter {
    sample_period: Duration,
    started: Instant,
    frame_count: u32,
    fractions: Vec<(&'static str, Duration)>,
}

impl FpsCounter {
    pub fn new(sample_period: Duration) -> Self {
        Self {
            sample_period,
            started: Instant::now(),
            frame_count: 0,
            fractions: Vec::new(),
        }
    }

    /// Run `f`, adding its duration to the `label` phase
    pub fn measure<T>(&mut self, label: &'static str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        match self.fractions.iter_mut().find(|(name, _)| *name == label) {
            Some((_, total)) => *total += elapsed,
            None => self.fractions.push((label, elapsed)),
        }
        result
    }

    /// Count one presented frame; logs and resets once per sample period
    pub fn track(&mut self) -> Option<FpsSample> {
        self.frame_count += 1;

        let elapsed = self.started.elapsed();
        if elapsed < self.sample_period {
            return None;
        }

        let seconds = elapsed.as_secs_f64().max(f64::EPSILON);
        let sample = FpsSample {
            fps: self.frame_count as f64 / seconds,
            fractions: self
                .fractions
                .iter()
                .map(|(label, spent)| (*label, spent.as_secs_f64() / seconds * 100.0))
                .collect(),
        };

        let fractions = sample
            .fractions
            .iter()
            .map(|(label, percent)| format!("{label}={percent:.2}"))
            .collect::<Vec<_>>()
            .join(" ");
        info!("FPS: {:.2} {}", sample.fps, fractions);

        self.frame_count = 0;
        self.started = Instant::now();
        self.fractions.clear();
        Some(sample)
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}
