/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, info};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::building::call::Call;
use crate::elevator::elevator::Elevator;
use crate::error::Interrupted;
use crate::shared::structs::{Direction, State};

/// Pause between dispatch retries while every elevator is busy.
const DISPATCH_RETRY: Duration = Duration::from_millis(50);

/**
 * Assigns pending calls to idle elevators.
 *
 * The controller owns the building-wide pending call queue. Floors append
 * calls; the dispatch loop hands each call to the nearest idle elevator and
 * re-queues it when none is available, so no call is ever dropped. `add_call`
 * wakes an idle loop through the wake channel; `turn_off` aborts any blocking
 * wait through the stop channel.
 *
 * Lock order across the crate is `floor -> controller -> elevator`: the
 * controller may inspect or call into elevators while holding its own locks,
 * floors may call into the controller while holding their queue lock, and an
 * elevator releases its core lock before calling either.
 */
pub struct Controller {
    calls: Mutex<VecDeque<Call>>,
    elevators: Mutex<Vec<Arc<Elevator>>>,
    running: AtomicBool,
    wake_tx: cbc::Sender<()>,
    wake_rx: cbc::Receiver<()>,
    stop_tx: cbc::Sender<()>,
    stop_rx: cbc::Receiver<()>,
}

/***************************************/
/*             Public API              */
/***************************************/
impl Controller {
    pub fn new() -> Controller {
        let (wake_tx, wake_rx) = cbc::unbounded::<()>();
        let (stop_tx, stop_rx) = cbc::unbounded::<()>();

        Controller {
            calls: Mutex::new(VecDeque::new()),
            elevators: Mutex::new(Vec::new()),
            running: AtomicBool::new(false),
            wake_tx,
            wake_rx,
            stop_tx,
            stop_rx,
        }
    }

    pub(crate) fn set_elevators(&self, elevators: Vec<Arc<Elevator>>) {
        *self.elevators.lock().unwrap() = elevators;
    }

    /// Appends a pending call and wakes the dispatch loop.
    pub fn add_call(&self, call: Call) {
        self.calls.lock().unwrap().push_back(call);
        let _ = self.wake_tx.send(());

        info!("controller: call added {}", call);
    }

    /// Removes every pending entry equal to `call`. Used by an elevator
    /// picking up a passenger to retract the floor's call.
    pub fn remove_call(&self, call: Call) {
        self.calls.lock().unwrap().retain(|c| *c != call);

        info!("controller: call removed {}", call);
    }

    /// Copy of the pending queue in arrival order, for reporting.
    pub fn pending_calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().iter().copied().collect()
    }

    /// True when no elevator is already sitting at the call's floor with a
    /// compatible (equal or undecided) direction and its doors open. Ringing
    /// in that situation would be redundant: the open elevator takes the
    /// waiting passengers anyway.
    pub fn can_call_elevator(&self, call: Call) -> bool {
        let elevators = self.elevators.lock().unwrap();

        !elevators.iter().any(|elevator| {
            let direction = elevator.direction();
            (direction == call.direction() || direction == Direction::None)
                && elevator.current_floor() == call.floor()
                && matches!(elevator.state(), State::Load | State::OpenDoor)
        })
    }

    /// Pops the oldest pending call and assigns it to the idle elevator
    /// closest to the call's floor (the earliest in the elevator list on
    /// equal distance). Returns false when no elevator was idle and the call
    /// went back into the queue.
    pub fn dispatch_call(&self) -> bool {
        let mut calls = self.calls.lock().unwrap();
        let call = match calls.pop_front() {
            Some(call) => call,
            None => return true,
        };

        let chosen = {
            let elevators = self.elevators.lock().unwrap();
            let mut best: Option<(usize, Arc<Elevator>)> = None;

            for elevator in elevators.iter() {
                if elevator.direction() != Direction::None || elevator.state() != State::Stop {
                    continue;
                }

                let distance = elevator.current_floor().abs_diff(call.floor());
                // strict `<` keeps the earliest elevator on equal distance
                if best.as_ref().map_or(true, |(d, _)| distance < *d) {
                    best = Some((distance, Arc::clone(elevator)));
                }
            }

            best
        };

        match chosen {
            Some((_, elevator)) => {
                elevator.add_call(call);
                info!("controller: dispatched {} to elevator {}", call, elevator.id());
                true
            }
            None => {
                calls.push_back(call);
                debug!("controller: no idle elevator for {}, re-queued", call);
                false
            }
        }
    }

    /// Blocks until the pending queue is non-empty. A stop signal aborts the
    /// wait instead.
    fn wait_for_call(&self) -> Result<(), Interrupted> {
        loop {
            if !self.is_running() {
                return Err(Interrupted);
            }
            if !self.calls.lock().unwrap().is_empty() {
                return Ok(());
            }

            cbc::select! {
                recv(self.stop_rx) -> _ => return Err(Interrupted),
                recv(self.wake_rx) -> _ => {}
            }
        }
    }

    /// Cancellable pause before retrying a dispatch that found every
    /// elevator busy.
    fn retry_pause(&self) -> Result<(), Interrupted> {
        cbc::select! {
            recv(self.stop_rx) -> _ => Err(Interrupted),
            default(DISPATCH_RETRY) => Ok(()),
        }
    }

    /// Dispatch loop: wait for pending calls, assign them, repeat until
    /// turned off.
    pub fn run(&self) {
        self.turn_on();

        while self.is_running() {
            if self.wait_for_call().is_err() {
                break;
            }
            if !self.dispatch_call() && self.retry_pause().is_err() {
                break;
            }
        }

        self.turn_off();
    }

    pub fn turn_on(&self) {
        self.running.store(true, Ordering::SeqCst);

        info!("controller has been started");
    }

    pub fn turn_off(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("controller has been stopped");
        }
        let _ = self.stop_tx.send(());
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Default for Controller {
    fn default() -> Controller {
        Controller::new()
    }
}
