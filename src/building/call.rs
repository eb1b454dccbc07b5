use serde::Deserialize;
use serde::Serialize;
use std::fmt;

use crate::error::SimError;
use crate::shared::structs::Direction;

/// A request to stop at a floor moving in a given direction. Calls are plain
/// values: two calls for the same floor and direction are interchangeable.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Call {
    floor: usize,
    direction: Direction,
}

impl Call {
    pub fn new(floor: usize, direction: Direction) -> Call {
        Call { floor, direction }
    }

    /// Builds the call a passenger traveling from `origin` to `target` would
    /// place: the target floor, with the direction derived from the pair.
    /// The two floors must differ.
    pub fn between(origin: usize, target: usize) -> Result<Call, SimError> {
        if origin == target {
            return Err(SimError::SameFloor(origin));
        }

        let direction = if target > origin {
            Direction::Up
        } else {
            Direction::Down
        };

        Ok(Call {
            floor: target,
            direction,
        })
    }

    pub fn floor(&self) -> usize {
        self.floor
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(to {} {})", self.floor, self.direction)
    }
}
