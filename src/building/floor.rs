use log::{info, warn};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, OnceLock, Weak};

use crate::building::call::Call;
use crate::controller::controller::Controller;
use crate::human::human::Human;
use crate::shared::structs::Direction;

/// Picks the queue a directionless lookup resolves to: the strictly longer
/// queue wins, ties go up. Letting an undecided elevator serve the more
/// loaded side first keeps its first stop productive.
pub fn resolve_direction(up_len: usize, down_len: usize) -> Direction {
    if up_len >= down_len {
        Direction::Up
    } else {
        Direction::Down
    }
}

/// One floor of the building: two directional FIFO queues of waiting
/// passengers behind a single lock. A floor never blocks on a condition;
/// every operation inspects or mutates the queues and returns.
///
/// Only the head of a queue that was empty rings the call button, so one
/// pending call covers everyone already waiting behind them.
pub struct Floor {
    number: usize,
    controller: OnceLock<Weak<Controller>>,
    queues: Mutex<Queues>,
}

#[derive(Default)]
struct Queues {
    up: VecDeque<Human>,
    down: VecDeque<Human>,
}

impl Queues {
    fn resolve(&self, direction: Direction) -> Direction {
        match direction {
            Direction::None => resolve_direction(self.up.len(), self.down.len()),
            other => other,
        }
    }

    fn queue(&self, direction: Direction) -> &VecDeque<Human> {
        match direction {
            Direction::Down => &self.down,
            _ => &self.up,
        }
    }

    fn queue_mut(&mut self, direction: Direction) -> &mut VecDeque<Human> {
        match direction {
            Direction::Down => &mut self.down,
            _ => &mut self.up,
        }
    }
}

impl Floor {
    pub fn new(number: usize) -> Floor {
        Floor {
            number,
            controller: OnceLock::new(),
            queues: Mutex::new(Queues::default()),
        }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub(crate) fn attach_controller(&self, controller: &Arc<Controller>) {
        let _ = self.controller.set(Arc::downgrade(controller));
    }

    fn controller(&self) -> Option<Arc<Controller>> {
        self.controller.get().and_then(Weak::upgrade)
    }

    /// Rings the call button for `direction` on this floor.
    pub fn call_elevator(&self, direction: Direction) {
        if let Some(controller) = self.controller() {
            controller.add_call(Call::new(self.number, direction));
        }
    }

    /// Enqueues a passenger on the queue matching their travel direction,
    /// ringing the call button when that queue was empty.
    pub fn add_passenger(&self, human: Human) {
        let direction = human.call().direction();
        let mut queues = self.queues.lock().unwrap();

        match direction {
            Direction::Up | Direction::Down => {
                if queues.queue(direction).is_empty() {
                    self.call_elevator(direction);
                }
                queues.queue_mut(direction).push_back(human);
                info!("floor {}: queued {}", self.number, human);
            }
            Direction::None => {
                warn!("floor {}: dropped {} with no direction", self.number, human);
            }
        }
    }

    /// Head of the resolved queue, without removing it.
    pub fn peek_first(&self, direction: Direction) -> Option<Human> {
        let queues = self.queues.lock().unwrap();
        let direction = queues.resolve(direction);

        queues.queue(direction).front().copied()
    }

    /// Removes and returns the head of the resolved queue.
    pub fn poll_first(&self, direction: Direction) -> Option<Human> {
        let mut queues = self.queues.lock().unwrap();
        let direction = queues.resolve(direction);
        let human = queues.queue_mut(direction).pop_front();

        if let Some(human) = human {
            self.recall_for_remaining(&queues, direction);
            info!("floor {}: polled {}", self.number, human);
        }

        human
    }

    /// Removes the head of the resolved queue only if it is still the
    /// passenger identified by `id`. Another elevator loading the same floor
    /// may have taken them between a peek and this poll; in that case the
    /// queue is left untouched and the caller re-peeks.
    pub fn poll_if_first(&self, direction: Direction, id: u64) -> Option<Human> {
        let mut queues = self.queues.lock().unwrap();
        let direction = queues.resolve(direction);

        if queues.queue(direction).front().map(Human::id) != Some(id) {
            return None;
        }

        let human = queues.queue_mut(direction).pop_front();
        if let Some(human) = human {
            self.recall_for_remaining(&queues, direction);
            info!("floor {}: polled {}", self.number, human);
        }

        human
    }

    /// Number of passengers waiting in the resolved queue.
    pub fn queue_len(&self, direction: Direction) -> usize {
        let queues = self.queues.lock().unwrap();
        let direction = queues.resolve(direction);

        queues.queue(direction).len()
    }

    /// Copy of the resolved queue in arrival order, for reporting.
    pub fn queue_snapshot(&self, direction: Direction) -> Vec<Human> {
        let queues = self.queues.lock().unwrap();
        let direction = queues.resolve(direction);

        queues.queue(direction).iter().copied().collect()
    }

    /// The pending call for this queue goes away when its head passenger is
    /// picked up, so if more passengers are waiting the floor rings again.
    /// The acceptance check follows the remaining head's own call.
    fn recall_for_remaining(&self, queues: &Queues, direction: Direction) {
        let next = match queues.queue(direction).front() {
            Some(human) => *human,
            None => return,
        };

        if let Some(controller) = self.controller() {
            if controller.can_call_elevator(next.call()) {
                controller.add_call(Call::new(self.number, direction));
            }
        }
    }
}
