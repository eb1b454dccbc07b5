use std::sync::atomic::{AtomicUsize, Ordering};

/// Process-wide simulation counters. Built once at startup and handed to the
/// units that report into it as a shared reference; readers (the status
/// reporter, tests) only ever observe monotonically increasing values.
#[derive(Debug, Default)]
pub struct Counters {
    delivered: AtomicUsize,
    generated: AtomicUsize,
    floors_passed: AtomicUsize,
}

impl Counters {
    pub fn new() -> Counters {
        Counters::default()
    }

    pub fn increment_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_generated(&self) {
        self.generated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_floors_passed(&self) {
        self.floors_passed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn generated(&self) -> usize {
        self.generated.load(Ordering::Relaxed)
    }

    pub fn floors_passed(&self) -> usize {
        self.floors_passed.load(Ordering::Relaxed)
    }

    pub fn restart(&self) {
        self.delivered.store(0, Ordering::Relaxed);
        self.generated.store(0, Ordering::Relaxed);
        self.floors_passed.store(0, Ordering::Relaxed);
    }
}

/***************************************/
/*             Unit tests              */
/***************************************/
