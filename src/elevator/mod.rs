pub mod elevator;
pub mod elevator_tests;

pub use elevator::Elevator;
pub use elevator::ElevatorSnapshot;
