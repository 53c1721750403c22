use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use rand::Rng;

use crate::domain::execution::Exid;

/// Allocates globally unique execution identifiers.
///
/// Identifiers follow `<domain>-<unit>-<counter>.<suffix>`. The counter is a
/// single process-wide atomic seeded from the startup minute, so values are
/// unique and strictly increasing for the process lifetime; the random
/// suffix guards against collisions across restarts within the same minute.
/// Allocation cannot fail and is safe under concurrent invocation.
pub struct ExidAllocator {
    unit: String,
    counter: AtomicU64,
}

impl ExidAllocator {
    pub fn new(unit: impl Into<String>) -> Self {
        let seed = Utc::now()
            .format("%y%m%d%H%M")
            .to_string()
            .parse()
            .unwrap_or(0);
        Self::with_seed(unit, seed)
    }

    pub fn with_seed(unit: impl Into<String>, seed: u64) -> Self {
        Self {
            unit: unit.into(),
            counter: AtomicU64::new(seed),
        }
    }

    /// Allocate the next exid for `domain`.
    pub fn allocate(&self, domain: &str) -> Exid {
        let count = self.counter.fetch_add(1, Ordering::Relaxed);
        Exid::new(format!("{}-{}-{}.{}", domain, self.unit, count, suffix()))
    }
}

const CONSONANTS: &[u8] = b"bdfghjklmnprstvz";
const VOWELS: &[u8] = b"aeiou";

/// Ten pronounceable lowercase chars, e.g. `gulisufebu`.
fn suffix() -> String {
    let mut rng = rand::rng();
    let mut s = String::with_capacity(10);
    for _ in 0..5 {
        s.push(CONSONANTS[rng.random_range(0..CONSONANTS.len())] as char);
        s.push(VOWELS[rng.random_range(0..VOWELS.len())] as char);
    }
    s
}
