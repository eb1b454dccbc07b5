use crossbeam_channel as cbc;
use log::{info, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::building::building::Building;
use crate::config::GeneratorConfig;
use crate::error::{Interrupted, SimError};
use crate::human::human::{Human, MAX_WEIGHT, MIN_WEIGHT};
use crate::shared::structs::{DEFAULT_OPERATION_TIME, MAX_SPEED, MIN_SPEED};

/**
 * Produces random passengers on a timer and feeds them into the building.
 * Start floor and target floor are uniform and distinct, the weight is
 * uniform in the configured range. Purely a demand source: all it ever does
 * to the core is call `Building::add_passenger`.
 */
pub struct HumanGenerator {
    building: Arc<Building>,
    weight_from: u32,
    weight_to: u32,
    generate_speed: u64,
    rng: Mutex<SmallRng>,
    running: AtomicBool,
    stop_tx: cbc::Sender<()>,
    stop_rx: cbc::Receiver<()>,
}

impl HumanGenerator {
    pub fn new(building: Arc<Building>, config: &GeneratorConfig) -> Result<HumanGenerator, SimError> {
        if !(MIN_SPEED..=MAX_SPEED).contains(&config.generate_speed) {
            return Err(SimError::SpeedOutOfRange {
                got: config.generate_speed,
                min: MIN_SPEED,
                max: MAX_SPEED,
            });
        }
        if config.weight_from < MIN_WEIGHT
            || config.weight_to > MAX_WEIGHT
            || config.weight_from > config.weight_to
        {
            return Err(SimError::WeightRange {
                from: config.weight_from,
                to: config.weight_to,
                min: MIN_WEIGHT,
                max: MAX_WEIGHT,
            });
        }

        let (stop_tx, stop_rx) = cbc::unbounded::<()>();

        Ok(HumanGenerator {
            building,
            weight_from: config.weight_from,
            weight_to: config.weight_to,
            generate_speed: config.generate_speed,
            rng: Mutex::new(SmallRng::from_entropy()),
            running: AtomicBool::new(false),
            stop_tx,
            stop_rx,
        })
    }

    /// Creates one random passenger and queues them on their start floor.
    pub fn generate(&self) -> Result<(), SimError> {
        let n_floors = self.building.n_floors();
        let (weight, start, target) = {
            let mut rng = self.rng.lock().unwrap();
            let start = rng.gen_range(0..n_floors);
            let mut target = rng.gen_range(0..n_floors);
            while target == start {
                target = rng.gen_range(0..n_floors);
            }
            (rng.gen_range(self.weight_from..=self.weight_to), start, target)
        };

        let human = Human::new(weight, target, start)?;
        self.building.add_passenger(human)?;
        self.building.counters().increment_generated();

        info!("generated {}", human);
        Ok(())
    }

    pub fn run(&self) {
        self.turn_on();

        while self.is_running() {
            if let Err(e) = self.generate() {
                warn!("generator: {}", e);
            }
            if self.pace().is_err() {
                break;
            }
        }

        self.turn_off();
    }

    fn pace(&self) -> Result<(), Interrupted> {
        let wait = Duration::from_millis(DEFAULT_OPERATION_TIME - self.generate_speed);

        cbc::select! {
            recv(self.stop_rx) -> _ => Err(Interrupted),
            default(wait) => Ok(()),
        }
    }

    pub fn turn_on(&self) {
        self.running.store(true, Ordering::SeqCst);

        info!("human generator has been started");
    }

    pub fn turn_off(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("human generator has been stopped");
        }
        let _ = self.stop_tx.send(());
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
