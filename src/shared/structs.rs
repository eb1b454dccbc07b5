/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;
use std::fmt;

/***************************************/
/*              Constants              */
/***************************************/
/// Base duration of one simulated operation in milliseconds. Every paced
/// step (a one-floor move, a door swing, one boarding) sleeps
/// `DEFAULT_OPERATION_TIME - speed`, so a higher speed means a shorter pause.
pub const DEFAULT_OPERATION_TIME: u64 = 1100;
pub const MIN_SPEED: u64 = 100;
pub const MAX_SPEED: u64 = 1000;

pub const GROUND_FLOOR: usize = 0;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    /// Undetermined: an idle elevator, or a queue lookup that lets the floor
    /// pick the more loaded side.
    None,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "UP"),
            Direction::Down => write!(f, "DOWN"),
            Direction::None => write!(f, "NONE"),
        }
    }
}

/// Operating phase of an elevator. Normal operation cycles
/// `Stop <-> Move <-> OpenDoor -> Load -> CloseDoor`; `End` is terminal.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum State {
    Stop,
    Move,
    OpenDoor,
    Load,
    CloseDoor,
    End,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Stop => write!(f, "STOP"),
            State::Move => write!(f, "MOVE"),
            State::OpenDoor => write!(f, "OPEN_DOOR"),
            State::Load => write!(f, "LOAD"),
            State::CloseDoor => write!(f, "CLOSE_DOOR"),
            State::End => write!(f, "END"),
        }
    }
}
