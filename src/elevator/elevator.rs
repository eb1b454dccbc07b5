/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{error, info, warn};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::building::call::Call;
use crate::building::floor::Floor;
use crate::controller::controller::Controller;
use crate::error::{Interrupted, SimError};
use crate::human::human::Human;
use crate::shared::stats::Counters;
use crate::shared::structs::{Direction, State};
use crate::shared::structs::{DEFAULT_OPERATION_TIME, GROUND_FLOOR, MAX_SPEED, MIN_SPEED};

/**
 * The elevator state machine.
 *
 * Each elevator runs on its own thread. While it holds assigned calls it
 * moves one floor at a time toward the nearest one, opening its doors where
 * a call has arrived or a compatible passenger is waiting, and it parks in
 * `Stop` on an empty call list until `add_call` wakes it. Every paced
 * operation watches the stop channel; a stop signal aborts the wait and the
 * elevator terminates in `End`, never to resume.
 *
 * # Fields
 * - `core`:        position, direction, state, passengers and assigned
 *                  calls, guarded by one mutex with short critical sections.
 * - `wake_tx/rx`:  wakes the `Stop` wait when a call is assigned.
 * - `stop_tx/rx`:  aborts any blocking wait; observed at every pacing point.
 * - `links`:       floors, controller and counters, wired once by the
 *                  building.
 *
 * The core lock is last in the crate-wide order `floor -> controller ->
 * elevator`: the elevator snapshots its core and releases the lock before
 * calling into a floor or the controller.
 */
pub struct Elevator {
    id: usize,
    capacity: u32,
    move_speed: u64,
    door_speed: u64,
    delivered: AtomicUsize,
    running: AtomicBool,
    core: Mutex<Core>,
    wake_tx: cbc::Sender<()>,
    wake_rx: cbc::Receiver<()>,
    stop_tx: cbc::Sender<()>,
    stop_rx: cbc::Receiver<()>,
    links: OnceLock<Links>,
}

struct Core {
    current_floor: usize,
    direction: Direction,
    state: State,
    passengers: Vec<Human>,
    calls: Vec<Call>,
}

struct Links {
    floors: Vec<Arc<Floor>>,
    controller: Weak<Controller>,
    counters: Arc<Counters>,
}

impl Core {
    /// Direction of the first assigned call; `None` without calls.
    fn destination_direction(&self) -> Direction {
        self.calls
            .first()
            .map(Call::direction)
            .unwrap_or(Direction::None)
    }

    fn free_space(&self, capacity: u32) -> u32 {
        let load: u32 = self.passengers.iter().map(Human::weight).sum();
        capacity.saturating_sub(load)
    }
}

/// Read-only view of one elevator for reporting.
#[derive(Debug, Clone)]
pub struct ElevatorSnapshot {
    pub id: usize,
    pub state: State,
    pub direction: Direction,
    pub free_space: u32,
    pub delivered: usize,
    pub calls: Vec<Call>,
    pub passengers: Vec<Human>,
}

impl fmt::Display for ElevatorSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "state: {}; direction: {}; free space: {}; delivered: {}; calls: {}; passengers: {}",
            self.state,
            self.direction,
            self.free_space,
            self.delivered,
            self.calls.len(),
            self.passengers.len()
        )
    }
}

/***************************************/
/*             Public API              */
/***************************************/
impl Elevator {
    pub fn new(
        id: usize,
        capacity: u32,
        start_floor: usize,
        move_speed: u64,
        door_speed: u64,
    ) -> Result<Elevator, SimError> {
        if capacity == 0 {
            return Err(SimError::ZeroCapacity);
        }
        for speed in [move_speed, door_speed] {
            if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
                return Err(SimError::SpeedOutOfRange {
                    got: speed,
                    min: MIN_SPEED,
                    max: MAX_SPEED,
                });
            }
        }

        let (wake_tx, wake_rx) = cbc::unbounded::<()>();
        let (stop_tx, stop_rx) = cbc::unbounded::<()>();

        Ok(Elevator {
            id,
            capacity,
            move_speed,
            door_speed,
            delivered: AtomicUsize::new(0),
            running: AtomicBool::new(false),
            core: Mutex::new(Core {
                current_floor: start_floor,
                direction: Direction::None,
                state: State::Stop,
                passengers: Vec::new(),
                calls: Vec::new(),
            }),
            wake_tx,
            wake_rx,
            stop_tx,
            stop_rx,
            links: OnceLock::new(),
        })
    }

    /// Wires the elevator into its building. Called exactly once before the
    /// elevator thread starts.
    pub(crate) fn attach(
        &self,
        floors: Vec<Arc<Floor>>,
        controller: &Arc<Controller>,
        counters: Arc<Counters>,
    ) {
        let _ = self.links.set(Links {
            floors,
            controller: Arc::downgrade(controller),
            counters,
        });
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn current_floor(&self) -> usize {
        self.core.lock().unwrap().current_floor
    }

    pub fn direction(&self) -> Direction {
        self.core.lock().unwrap().direction
    }

    pub fn state(&self) -> State {
        self.core.lock().unwrap().state
    }

    /// Direction of the first assigned call; `None` without calls.
    pub fn destination_direction(&self) -> Direction {
        self.core.lock().unwrap().destination_direction()
    }

    pub fn free_space(&self) -> u32 {
        self.core.lock().unwrap().free_space(self.capacity)
    }

    pub fn passengers(&self) -> Vec<Human> {
        self.core.lock().unwrap().passengers.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.core.lock().unwrap().calls.clone()
    }

    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> ElevatorSnapshot {
        let core = self.core.lock().unwrap();

        ElevatorSnapshot {
            id: self.id,
            state: core.state,
            direction: core.direction,
            free_space: core.free_space(self.capacity),
            delivered: self.delivered.load(Ordering::Relaxed),
            calls: core.calls.clone(),
            passengers: core.passengers.clone(),
        }
    }

    /// Assigns a call. An idle elevator adopts the direction toward the call
    /// before its loop wakes up; a call targeting the current floor resolves
    /// down.
    pub fn add_call(&self, call: Call) {
        {
            let mut core = self.core.lock().unwrap();
            core.calls.push(call);
            if core.direction == Direction::None {
                core.direction = if call.floor() > core.current_floor {
                    Direction::Up
                } else {
                    Direction::Down
                };
            }
        }
        let _ = self.wake_tx.send(());

        info!("elevator {}: called {}", self.id, call);
    }

    pub fn turn_on(&self) {
        self.running.store(true, Ordering::SeqCst);

        info!("elevator {} has been started", self.id);
    }

    pub fn turn_off(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("elevator {} has been stopped", self.id);
        }
        let _ = self.stop_tx.send(());
    }

    /// State machine loop. Runs until the elevator is turned off or a
    /// blocking wait is interrupted; both paths leave the elevator in `End`.
    pub fn run(&self) {
        self.turn_on();

        while self.is_running() {
            if self.step().is_err() {
                self.interrupted();
                return;
            }
        }

        self.turn_off();
        self.end();
    }

    /***************************************/
    /*          State machine steps        */
    /***************************************/
    /// One iteration: park without calls, open up where a call has arrived
    /// or a passenger waits, otherwise move one floor toward the nearest
    /// call.
    fn step(&self) -> Result<(), Interrupted> {
        if self.calls().is_empty() {
            return self.wait_for_calls();
        }

        let arrived = self.remove_executed_calls();
        let current = self.current_floor();
        let target = self.next_target().unwrap_or(current);
        let boarding = self.check_floor();

        if arrived || boarding {
            self.open_door()?;
            self.load()?;
            self.close_door()?;
        } else if target > current {
            self.go_up()?;
        } else if target < current {
            self.go_down()?;
        }

        Ok(())
    }

    /// Parks the elevator until a call is assigned: idle (`Stop`, direction
    /// `None`), blocked on the wake channel.
    pub(crate) fn wait_for_calls(&self) -> Result<(), Interrupted> {
        {
            let mut core = self.core.lock().unwrap();
            core.direction = Direction::None;
            core.state = State::Stop;
        }
        info!("elevator {}: stopped, waiting for calls", self.id);

        loop {
            if !self.is_running() {
                return Err(Interrupted);
            }
            if !self.core.lock().unwrap().calls.is_empty() {
                return Ok(());
            }

            cbc::select! {
                recv(self.stop_rx) -> _ => return Err(Interrupted),
                recv(self.wake_rx) -> _ => {}
            }
        }
    }

    /// Drops every assigned call targeting the current floor. True when at
    /// least one call was completed by arriving here.
    pub(crate) fn remove_executed_calls(&self) -> bool {
        let mut core = self.core.lock().unwrap();
        let floor = core.current_floor;
        let before = core.calls.len();
        core.calls.retain(|call| call.floor() != floor);

        core.calls.len() != before
    }

    /// Floor of the nearest assigned call, the earliest assignment winning
    /// ties.
    fn next_target(&self) -> Option<usize> {
        let core = self.core.lock().unwrap();
        let current = core.current_floor;
        let mut best: Option<usize> = None;

        for call in &core.calls {
            let better = match best {
                Some(floor) => call.floor().abs_diff(current) < floor.abs_diff(current),
                None => true,
            };
            if better {
                best = Some(call.floor());
            }
        }

        best
    }

    /// True when the current floor holds a passenger this elevator should
    /// board on its way through: the destination direction is decided,
    /// matches the travel direction, and the waiting head travels the same
    /// way and fits the free capacity.
    pub(crate) fn check_floor(&self) -> bool {
        let (floor_number, direction, destination, free) = {
            let core = self.core.lock().unwrap();
            (
                core.current_floor,
                core.direction,
                core.destination_direction(),
                core.free_space(self.capacity),
            )
        };

        if destination == Direction::None || destination != direction {
            return false;
        }

        match self.floor_at(floor_number).peek_first(direction) {
            Some(human) => human.weight() <= free && human.call().direction() == direction,
            None => false,
        }
    }

    pub(crate) fn go_up(&self) -> Result<(), Interrupted> {
        {
            let mut core = self.core.lock().unwrap();
            debug_assert!(core.current_floor + 1 < self.links().floors.len());
            core.direction = Direction::Up;
            core.state = State::Move;
            core.current_floor += 1;
        }
        self.counters().increment_floors_passed();
        self.pace(self.move_speed)?;

        info!("elevator {}: moved up to floor {}", self.id, self.current_floor());
        Ok(())
    }

    pub(crate) fn go_down(&self) -> Result<(), Interrupted> {
        {
            let mut core = self.core.lock().unwrap();
            debug_assert!(core.current_floor > GROUND_FLOOR);
            core.direction = Direction::Down;
            core.state = State::Move;
            core.current_floor -= 1;
        }
        self.counters().increment_floors_passed();
        self.pace(self.move_speed)?;

        info!("elevator {}: moved down to floor {}", self.id, self.current_floor());
        Ok(())
    }

    pub(crate) fn open_door(&self) -> Result<(), Interrupted> {
        self.set_state(State::OpenDoor);
        self.pace(self.door_speed)?;

        info!("elevator {}: door open", self.id);
        Ok(())
    }

    pub(crate) fn close_door(&self) -> Result<(), Interrupted> {
        self.set_state(State::CloseDoor);
        self.pace(self.door_speed)?;

        info!("elevator {}: door closed", self.id);
        Ok(())
    }

    /// The full door-open protocol: drop off passengers for this floor,
    /// settle the travel direction, board whoever fits.
    pub(crate) fn load(&self) -> Result<(), Interrupted> {
        self.set_state(State::Load);

        self.handle_disembark()?;
        self.handle_load_direction();
        self.handle_embark()?;
        self.recall_left_behind();

        info!("elevator {}: finished loading", self.id);
        Ok(())
    }

    fn handle_disembark(&self) -> Result<(), Interrupted> {
        let leaving: Vec<Human> = {
            let core = self.core.lock().unwrap();
            core.passengers
                .iter()
                .filter(|human| human.call().floor() == core.current_floor)
                .copied()
                .collect()
        };

        for human in leaving {
            self.disembark(human)?;
        }

        Ok(())
    }

    pub(crate) fn disembark(&self, human: Human) -> Result<(), Interrupted> {
        {
            let mut core = self.core.lock().unwrap();
            core.passengers.retain(|p| p.id() != human.id());
        }
        self.delivered.fetch_add(1, Ordering::Relaxed);
        self.counters().increment_delivered();
        self.pace(self.door_speed)?;

        info!("elevator {}: dropped off {}", self.id, human);
        Ok(())
    }

    /// An empty cab follows its next call; an empty cab with no calls has no
    /// direction until someone boards.
    fn handle_load_direction(&self) {
        let mut core = self.core.lock().unwrap();

        if core.passengers.is_empty() && core.calls.is_empty() {
            core.direction = Direction::None;
        } else if core.passengers.is_empty() {
            core.direction = core.destination_direction();
        }
    }

    /// Boards waiting passengers head-first while they are compatible with
    /// the ride: same way as the destination, same way as the travel
    /// direction when no destination is set yet, or any way at all when the
    /// elevator is direction-less and adopts theirs. A passenger who does
    /// not fit stops the boarding and their floor call is re-announced for
    /// another elevator.
    fn handle_embark(&self) -> Result<(), Interrupted> {
        loop {
            let (floor_number, direction, destination, free) = {
                let core = self.core.lock().unwrap();
                if core.state != State::Load {
                    return Ok(());
                }
                (
                    core.current_floor,
                    core.direction,
                    core.destination_direction(),
                    core.free_space(self.capacity),
                )
            };
            let floor = self.floor_at(floor_number);

            let candidate = match floor.peek_first(direction) {
                Some(human) => human,
                None => return Ok(()),
            };
            let wants = candidate.call().direction();

            let compatible = (destination != Direction::None && destination == wants)
                || (destination == Direction::None && wants == direction)
                || direction == Direction::None;
            if !compatible {
                return Ok(());
            }

            if candidate.weight() > free {
                if let Some(controller) = self.controller() {
                    controller.add_call(Call::new(floor_number, wants));
                }
                info!(
                    "elevator {}: no space for {}, re-announced their floor call",
                    self.id, candidate
                );
                return Ok(());
            }

            // The peeked passenger may have boarded another elevator in the
            // meantime; polling by id only ever removes the vetted one.
            let boarding_direction = if direction == Direction::None {
                wants
            } else {
                direction
            };
            match floor.poll_if_first(boarding_direction, candidate.id()) {
                Some(human) => self.pick_up(human)?,
                None => continue,
            }
        }
    }

    /// Everyone still waiting on this floor after boarding keeps a pending
    /// call: arriving here consumed the call that covered the floor, and
    /// boarding may have served only one of the two queues. The acceptance
    /// check suppresses the ring for the direction this elevator is itself
    /// loading.
    fn recall_left_behind(&self) {
        let floor_number = self.current_floor();
        let floor = self.floor_at(floor_number);
        let controller = match self.controller() {
            Some(controller) => controller,
            None => return,
        };

        for direction in [Direction::Up, Direction::Down] {
            if floor.queue_len(direction) == 0 {
                continue;
            }
            let call = Call::new(floor_number, direction);
            if controller.can_call_elevator(call) {
                controller.add_call(call);
            }
        }
    }

    /// Boards a polled passenger: adopt their direction when idle, retract
    /// the floor call they were waiting on, take over their drop-off call.
    /// Passengers are only ever mutated from the elevator's own thread, so
    /// the capacity check made by the embark loop still holds here.
    pub(crate) fn pick_up(&self, human: Human) -> Result<(), Interrupted> {
        let floor_number = {
            let mut core = self.core.lock().unwrap();
            if core.direction == Direction::None {
                core.direction = human.call().direction();
            }
            core.passengers.push(human);
            debug_assert!(
                core.passengers.iter().map(Human::weight).sum::<u32>() <= self.capacity
            );
            core.current_floor
        };

        if let Some(controller) = self.controller() {
            controller.remove_call(Call::new(floor_number, human.call().direction()));
        }
        self.add_call(human.call());
        self.pace(self.door_speed)?;

        info!("elevator {}: picked up {}", self.id, human);
        Ok(())
    }

    /// Terminal transition; the elevator never leaves `End`.
    pub(crate) fn end(&self) {
        {
            let mut core = self.core.lock().unwrap();
            core.direction = Direction::None;
            core.state = State::End;
        }

        warn!("elevator {} has finished its way", self.id);
    }

    /***************************************/
    /*           Private helpers           */
    /***************************************/
    fn interrupted(&self) {
        error!("elevator {}: blocking wait interrupted", self.id);
        self.end();
        self.turn_off();
    }

    /// Simulates an operation taking physical time. Cancellable: a stop
    /// signal aborts the wait and the caller must terminate.
    fn pace(&self, speed: u64) -> Result<(), Interrupted> {
        let wait = Duration::from_millis(DEFAULT_OPERATION_TIME - speed);

        cbc::select! {
            recv(self.stop_rx) -> _ => Err(Interrupted),
            default(wait) => Ok(()),
        }
    }

    fn set_state(&self, state: State) {
        self.core.lock().unwrap().state = state;
    }

    fn links(&self) -> &Links {
        self.links
            .get()
            .expect("elevator used before being attached to a building")
    }

    fn floor_at(&self, number: usize) -> &Arc<Floor> {
        &self.links().floors[number]
    }

    fn controller(&self) -> Option<Arc<Controller>> {
        self.links().controller.upgrade()
    }

    fn counters(&self) -> &Counters {
        &self.links().counters
    }
}
