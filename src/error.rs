use thiserror::Error;

/// Errors surfaced while constructing or configuring the simulation. These
/// are synchronous: the offending object is never created.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("a building needs at least {min} floors, got {got}")]
    FloorCount { min: usize, got: usize },

    #[error("a building needs at least one elevator")]
    NoElevators,

    #[error("elevator capacity must be greater than zero")]
    ZeroCapacity,

    #[error("speed {got} is outside the allowed range {min}..={max}")]
    SpeedOutOfRange { got: u64, min: u64, max: u64 },

    #[error("weight {got} is outside the allowed range {min}..={max}")]
    WeightOutOfRange { got: u32, min: u32, max: u32 },

    #[error("weight range {from}..={to} is empty or outside {min}..={max}")]
    WeightRange { from: u32, to: u32, min: u32, max: u32 },

    #[error("start and target floor are both {0}")]
    SameFloor(usize),

    #[error("floor {floor} does not exist in a building with {n_floors} floors")]
    FloorOutOfRange { floor: usize, n_floors: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// A blocking wait was cut short by a stop signal. Fatal for the unit that
/// observed it; other units keep running.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("blocking wait interrupted by stop signal")]
pub struct Interrupted;
