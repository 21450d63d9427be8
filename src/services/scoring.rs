use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Source of recommendation scores
///
/// Scores are drawn uniformly from an inclusive range. Injected into the
/// generator so tests can pin exact values.
#[cfg_attr(test, mockall::automock)]
pub trait ScoreSource: Send + Sync {
    /// Returns a value in `low..=high`
    fn draw(&self, low: u8, high: u8) -> u8;
}

/// Fresh thread-local randomness on every draw
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomScores;

impl ScoreSource for RandomScores {
    fn draw(&self, low: u8, high: u8) -> u8 {
        rand::thread_rng().gen_range(low..=high)
    }
}

/// Reproducible sequence from a fixed seed
pub struct SeededScores {
    rng: Mutex<StdRng>,
}

impl SeededScores {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl ScoreSource for SeededScores {
    fn draw(&self, low: u8, high: u8) -> u8 {
        // A poisoned lock still holds a usable generator
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(low..=high)
    }
}
