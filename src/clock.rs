use std::thread::sleep;
use std::time::{Duration, Instant};

/// Source de temps des pilotes : horodatage monotone et attente bloquante
pub trait Clock {
    /// Millisecondes écoulées depuis une origine fixe (monotone)
    fn millis(&self) -> u64;

    /// Attente bloquante
    fn delay_ms(&mut self, ms: u64);
}

/// Horloge système, origine à la création
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    debut: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock { debut: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn millis(&self) -> u64 {
        self.debut.elapsed().as_millis() as u64
    }

    fn delay_ms(&mut self, ms: u64) {
        sleep(Duration::from_millis(ms));
    }
}
