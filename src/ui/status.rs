use crossbeam_channel as cbc;
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::building::building::Building;
use crate::config::ReporterConfig;
use crate::error::{Interrupted, SimError};
use crate::shared::structs::{Direction, DEFAULT_OPERATION_TIME, MAX_SPEED, MIN_SPEED};

/// Periodic console view of the simulation. Strictly read-only: it renders
/// the counters, the pending calls and one line per elevator from the public
/// accessors, and keeps rendering even after a unit has terminated.
pub struct StatusReporter {
    building: Arc<Building>,
    render_speed: u64,
    running: AtomicBool,
    stop_tx: cbc::Sender<()>,
    stop_rx: cbc::Receiver<()>,
}

impl StatusReporter {
    pub fn new(building: Arc<Building>, config: &ReporterConfig) -> Result<StatusReporter, SimError> {
        if !(MIN_SPEED..=MAX_SPEED).contains(&config.render_speed) {
            return Err(SimError::SpeedOutOfRange {
                got: config.render_speed,
                min: MIN_SPEED,
                max: MAX_SPEED,
            });
        }

        let (stop_tx, stop_rx) = cbc::unbounded::<()>();

        Ok(StatusReporter {
            building,
            render_speed: config.render_speed,
            running: AtomicBool::new(false),
            stop_tx,
            stop_rx,
        })
    }

    /// One full report as a string.
    pub fn render(&self) -> String {
        let counters = self.building.counters();
        let mut out = String::new();

        let _ = writeln!(out, "Delivered: {}", counters.delivered());
        let _ = writeln!(out, "Generated: {}", counters.generated());
        let _ = writeln!(out, "Floors passed: {}", counters.floors_passed());

        let pending: Vec<String> = self
            .building
            .controller()
            .pending_calls()
            .iter()
            .map(|call| call.to_string())
            .collect();
        let _ = writeln!(out, "Pending calls: [{}]", pending.join(", "));

        for elevator in self.building.elevators() {
            let _ = writeln!(out, "{} {}", elevator.id(), elevator.snapshot());
        }
        for floor in self.building.floors() {
            let _ = writeln!(
                out,
                "floor {}: {} up / {} down",
                floor.number(),
                floor.queue_len(Direction::Up),
                floor.queue_len(Direction::Down)
            );
        }

        out
    }

    pub fn run(&self) {
        self.turn_on();

        while self.is_running() {
            if self.pace().is_err() {
                break;
            }
            // Home the cursor and clear before redrawing.
            print!("\x1B[H\x1B[2J");
            println!("{}", self.render());
        }

        self.turn_off();
    }

    fn pace(&self) -> Result<(), Interrupted> {
        let wait = Duration::from_millis(DEFAULT_OPERATION_TIME - self.render_speed);

        cbc::select! {
            recv(self.stop_rx) -> _ => Err(Interrupted),
            default(wait) => Ok(()),
        }
    }

    pub fn turn_on(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    pub fn turn_off(&self) {
        self.running.store(false, Ordering::SeqCst);
        let _ = self.stop_tx.send(());
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/***************************************/
/*             Unit tests              */
/***************************************/
