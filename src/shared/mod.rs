pub mod macros;
pub mod stats;
pub mod structs;

pub use stats::Counters;
pub use structs::Direction;
pub use structs::State;
