// ── Kindred Atoms: Seam Traits ─────────────────────────────────────────────
// The two things the policy engine must never reach for globally:
// the wall clock and the random number generator. Both are injected so
// tests can time-travel and force probabilistic branches.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ── Clock ──────────────────────────────────────────────────────────────────

/// Source of "now" for every time-relative rule.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by `Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

// ── Randomness ─────────────────────────────────────────────────────────────

/// Uniform source in [0, 1). Not required to be cryptographically secure.
pub trait RandomSource: Send {
    fn next_f64(&mut self) -> f64;

    /// Uniform index into a collection of `len` items. Returns 0 for `len == 0`.
    fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }
}

/// rand's thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Reproducible generator for simulations and benchmarks.
#[derive(Debug, Clone)]
pub struct SeededRandom(StdRng);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Always yields the same value. `FixedRandom(0.0)` makes every chance
/// succeed, `FixedRandom(0.99)` makes every chance below 99% fail.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn next_f64(&mut self) -> f64 {
        self.0.clamp(0.0, 0.999_999)
    }
}
