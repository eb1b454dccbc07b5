use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::building::call::Call;
use crate::error::SimError;

pub const MIN_WEIGHT: u32 = 10;
pub const MAX_WEIGHT: u32 = 200;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// A passenger: created once by the generator, queued on a floor, carried by
/// an elevator, and gone after disembarking. Immutable for its whole life;
/// the id tells apart passengers with identical weight and itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Human {
    id: u64,
    weight: u32,
    call: Call,
    start_floor: usize,
}

impl Human {
    /// Validates the weight range and the itinerary (start and target must
    /// differ); the drop-off call is derived from the pair.
    pub fn new(weight: u32, target_floor: usize, start_floor: usize) -> Result<Human, SimError> {
        if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&weight) {
            return Err(SimError::WeightOutOfRange {
                got: weight,
                min: MIN_WEIGHT,
                max: MAX_WEIGHT,
            });
        }

        let call = Call::between(start_floor, target_floor)?;

        Ok(Human {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            weight,
            call,
            start_floor,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// The drop-off request this passenger hands to the elevator that picks
    /// them up.
    pub fn call(&self) -> Call {
        self.call
    }

    pub fn start_floor(&self) -> usize {
        self.start_floor
    }
}

impl fmt::Display for Human {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "human #{} ({}kg, floor {} -> {})",
            self.id,
            self.weight,
            self.start_floor,
            self.call.floor()
        )
    }
}
