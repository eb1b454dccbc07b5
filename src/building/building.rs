use log::info;
use std::sync::{Arc, Mutex};
use std::thread;
use std::thread::JoinHandle;

use crate::building::floor::Floor;
use crate::config::BuildingConfig;
use crate::controller::controller::Controller;
use crate::elevator::elevator::Elevator;
use crate::error::SimError;
use crate::human::human::Human;
use crate::shared::stats::Counters;

pub const MIN_FLOORS: usize = 2;
pub const MIN_ELEVATORS: usize = 1;

/**
 * Composition root: owns the floors, the elevators and the controller for
 * the lifetime of the process and wires them together. The building itself
 * runs no concurrent logic; `start` spawns one named thread per unit and
 * `stop` turns them all off.
 */
pub struct Building {
    n_floors: usize,
    floors: Vec<Arc<Floor>>,
    elevators: Vec<Arc<Elevator>>,
    controller: Arc<Controller>,
    counters: Arc<Counters>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Building {
    /// Validates the whole configuration and wires floors, elevators and the
    /// controller. Nothing is constructed when any value is out of range.
    pub fn new(config: &BuildingConfig, counters: Arc<Counters>) -> Result<Building, SimError> {
        if config.n_floors < MIN_FLOORS {
            return Err(SimError::FloorCount {
                min: MIN_FLOORS,
                got: config.n_floors,
            });
        }
        if config.n_elevators < MIN_ELEVATORS {
            return Err(SimError::NoElevators);
        }
        if config.start_floor >= config.n_floors {
            return Err(SimError::FloorOutOfRange {
                floor: config.start_floor,
                n_floors: config.n_floors,
            });
        }

        let floors: Vec<Arc<Floor>> = (0..config.n_floors)
            .map(|number| Arc::new(Floor::new(number)))
            .collect();

        let mut elevators = Vec::with_capacity(config.n_elevators);
        for id in 0..config.n_elevators {
            elevators.push(Arc::new(Elevator::new(
                id,
                config.capacity,
                config.start_floor,
                config.move_speed,
                config.door_speed,
            )?));
        }

        let controller = Arc::new(Controller::new());
        controller.set_elevators(elevators.clone());
        for floor in &floors {
            floor.attach_controller(&controller);
        }
        for elevator in &elevators {
            elevator.attach(floors.clone(), &controller, Arc::clone(&counters));
        }

        Ok(Building {
            n_floors: config.n_floors,
            floors,
            elevators,
            controller,
            counters,
            handles: Mutex::new(Vec::new()),
        })
    }

    /// Spawns the controller thread and one thread per elevator.
    pub fn start(&self) -> Result<(), SimError> {
        let mut handles = self.handles.lock().unwrap();

        for elevator in &self.elevators {
            let unit = Arc::clone(elevator);
            let handle = thread::Builder::new()
                .name(format!("elevator-{}", elevator.id()))
                .spawn(move || unit.run())?;
            handles.push(handle);
        }

        let controller = Arc::clone(&self.controller);
        let handle = thread::Builder::new()
            .name("controller".into())
            .spawn(move || controller.run())?;
        handles.push(handle);

        info!(
            "building started: {} floors, {} elevators",
            self.n_floors,
            self.elevators.len()
        );
        Ok(())
    }

    /// Turns every unit off. Threads exit after their current cycle.
    pub fn stop(&self) {
        self.controller.turn_off();
        for elevator in &self.elevators {
            elevator.turn_off();
        }

        info!("building stopped");
    }

    /// Waits for every spawned unit to exit. Call after `stop`.
    pub fn join(&self) {
        let handles: Vec<JoinHandle<()>> = self.handles.lock().unwrap().drain(..).collect();
        for handle in handles {
            let _ = handle.join();
        }
    }

    /// The only write entry point for new demand: queues a passenger on
    /// their start floor, bounds-checked against this building.
    pub fn add_passenger(&self, human: Human) -> Result<(), SimError> {
        for floor in [human.start_floor(), human.call().floor()] {
            if floor >= self.n_floors {
                return Err(SimError::FloorOutOfRange {
                    floor,
                    n_floors: self.n_floors,
                });
            }
        }

        self.floors[human.start_floor()].add_passenger(human);
        Ok(())
    }

    pub fn n_floors(&self) -> usize {
        self.n_floors
    }

    pub fn floors(&self) -> &[Arc<Floor>] {
        &self.floors
    }

    pub fn floor(&self, number: usize) -> Option<&Arc<Floor>> {
        self.floors.get(number)
    }

    pub fn elevators(&self) -> &[Arc<Elevator>] {
        &self.elevators
    }

    pub fn controller(&self) -> &Arc<Controller> {
        &self.controller
    }

    pub fn counters(&self) -> &Arc<Counters> {
        &self.counters
    }
}
