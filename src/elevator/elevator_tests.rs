/*
 * Unit tests for the elevator state machine
 *
 * The unit tests follows the Arrange, Act, Assert pattern. The harness wires
 * one elevator to real floors and a real (non-running) controller, so the
 * load protocol exercises the same paths as in a live building; fast speeds
 * keep the paced waits at 100ms.
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod elevator_tests {
    use std::sync::Arc;
    use std::thread::spawn;
    use std::time::{Duration, Instant};

    use crate::building::call::Call;
    use crate::building::floor::Floor;
    use crate::controller::controller::Controller;
    use crate::elevator::elevator::Elevator;
    use crate::error::SimError;
    use crate::human::human::Human;
    use crate::shared::stats::Counters;
    use crate::shared::structs::{Direction, State, MAX_SPEED};

    fn setup(
        n_floors: usize,
        capacity: u32,
        start_floor: usize,
    ) -> (Arc<Elevator>, Arc<Controller>, Vec<Arc<Floor>>, Arc<Counters>) {
        let counters = Arc::new(Counters::new());
        let floors: Vec<Arc<Floor>> = (0..n_floors).map(|n| Arc::new(Floor::new(n))).collect();
        let controller = Arc::new(Controller::new());
        let elevator =
            Arc::new(Elevator::new(0, capacity, start_floor, MAX_SPEED, MAX_SPEED).unwrap());

        controller.set_elevators(vec![Arc::clone(&elevator)]);
        for floor in &floors {
            floor.attach_controller(&controller);
        }
        elevator.attach(floors.clone(), &controller, Arc::clone(&counters));

        (elevator, controller, floors, counters)
    }

    fn human(weight: u32, target: usize, start: usize) -> Human {
        Human::new(weight, target, start).unwrap()
    }

    fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        condition()
    }

    #[test]
    fn new_validates_capacity_and_speeds() {
        assert!(matches!(
            Elevator::new(0, 0, 0, MAX_SPEED, MAX_SPEED),
            Err(SimError::ZeroCapacity)
        ));
        assert!(matches!(
            Elevator::new(0, 500, 0, 99, MAX_SPEED),
            Err(SimError::SpeedOutOfRange { .. })
        ));
        assert!(matches!(
            Elevator::new(0, 500, 0, MAX_SPEED, 1001),
            Err(SimError::SpeedOutOfRange { .. })
        ));
    }

    #[test]
    fn add_call_adopts_a_direction_while_idle() {
        // Arrange
        let (elevator, _controller, _floors, _counters) = setup(6, 500, 2);

        // Act + Assert: first call decides the direction
        elevator.add_call(Call::new(5, Direction::Up));
        assert_eq!(elevator.direction(), Direction::Up);
        assert_eq!(elevator.destination_direction(), Direction::Up);

        // a later call does not steal it
        elevator.add_call(Call::new(0, Direction::Down));
        assert_eq!(elevator.direction(), Direction::Up);
        assert_eq!(elevator.calls().len(), 2);
    }

    #[test]
    fn call_for_the_current_floor_resolves_down() {
        let (elevator, _controller, _floors, _counters) = setup(6, 500, 2);

        elevator.add_call(Call::new(2, Direction::Up));

        assert_eq!(elevator.direction(), Direction::Down);
    }

    #[test]
    fn arrived_calls_are_removed_at_the_current_floor() {
        // Arrange
        let (elevator, _controller, _floors, _counters) = setup(6, 500, 2);
        elevator.add_call(Call::new(2, Direction::Up));
        elevator.add_call(Call::new(4, Direction::Up));

        // Act + Assert
        assert!(elevator.remove_executed_calls());
        assert_eq!(elevator.calls(), vec![Call::new(4, Direction::Up)]);
        assert!(!elevator.remove_executed_calls());
    }

    #[test]
    fn check_floor_boards_only_compatible_fitting_passengers() {
        // Arrange: elevator at floor 2 heading up toward its call
        let (elevator, _controller, floors, _counters) = setup(6, 100, 2);

        // no destination yet -> nothing to board
        floors[2].add_passenger(human(60, 4, 2));
        assert!(!elevator.check_floor());

        // destination up, compatible passenger fits
        elevator.add_call(Call::new(5, Direction::Up));
        assert!(elevator.check_floor());
    }

    #[test]
    fn check_floor_ignores_the_opposite_queue() {
        let (elevator, _controller, floors, _counters) = setup(6, 100, 2);
        floors[2].add_passenger(human(60, 4, 2));

        // destination down: the up queue is none of this elevator's business
        elevator.add_call(Call::new(0, Direction::Down));

        assert!(!elevator.check_floor());
    }

    #[test]
    fn check_floor_respects_free_capacity() {
        let (elevator, _controller, floors, _counters) = setup(6, 100, 2);
        floors[2].add_passenger(human(150, 4, 2));
        elevator.add_call(Call::new(5, Direction::Up));

        assert!(!elevator.check_floor());
    }

    #[test]
    fn transports_a_passenger_door_to_door() {
        // Arrange: passenger waiting where the elevator already is
        let (elevator, controller, floors, counters) = setup(6, 500, 2);
        let passenger = human(80, 5, 2);
        floors[2].add_passenger(passenger);
        assert!(controller.dispatch_call());

        // Act: the boarding stop
        assert!(elevator.remove_executed_calls());
        elevator.open_door().unwrap();
        elevator.load().unwrap();
        elevator.close_door().unwrap();

        // Assert: aboard, floor empty, floor call retracted, drop-off taken over
        assert_eq!(elevator.passengers(), vec![passenger]);
        assert_eq!(elevator.calls(), vec![Call::new(5, Direction::Up)]);
        assert_eq!(elevator.direction(), Direction::Up);
        assert_eq!(elevator.free_space(), 420);
        assert_eq!(floors[2].queue_len(Direction::Up), 0);
        assert!(controller.pending_calls().is_empty());

        // Act: ride to the target floor
        elevator.go_up().unwrap();
        elevator.go_up().unwrap();
        elevator.go_up().unwrap();
        assert_eq!(elevator.current_floor(), 5);
        assert_eq!(counters.floors_passed(), 3);

        // Act: the drop-off stop
        assert!(elevator.remove_executed_calls());
        elevator.open_door().unwrap();
        elevator.load().unwrap();
        elevator.close_door().unwrap();

        // Assert: delivered exactly once, nobody left anywhere
        assert!(elevator.passengers().is_empty());
        assert!(elevator.calls().is_empty());
        assert_eq!(elevator.direction(), Direction::None);
        assert_eq!(elevator.delivered(), 1);
        assert_eq!(counters.delivered(), 1);
        assert_eq!(elevator.state(), State::CloseDoor);
    }

    #[test]
    fn defers_the_second_passenger_when_full() {
        // Arrange: two passengers who cannot share a 100kg elevator
        let (elevator, controller, floors, _counters) = setup(6, 100, 0);
        let first = human(60, 3, 0);
        let second = human(60, 2, 0);
        floors[0].add_passenger(first);
        floors[0].add_passenger(second);
        assert!(controller.dispatch_call());

        // Act
        assert!(elevator.remove_executed_calls());
        elevator.open_door().unwrap();
        elevator.load().unwrap();
        elevator.close_door().unwrap();

        // Assert: exactly one aboard, the other still waiting
        assert_eq!(elevator.passengers(), vec![first]);
        assert_eq!(elevator.free_space(), 40);
        assert_eq!(floors[0].queue_len(Direction::Up), 1);
        assert_eq!(
            floors[0].peek_first(Direction::Up).map(|h| h.id()),
            Some(second.id())
        );

        // The floor call was re-announced so another (or the same, later)
        // elevator comes back for them; the sum of boarded weights never
        // exceeded the capacity on the way here.
        assert_eq!(controller.pending_calls(), vec![Call::new(0, Direction::Up)]);
    }

    #[test]
    fn run_wakes_from_stop_and_serves_a_call() {
        // Arrange
        let (elevator, _controller, _floors, _counters) = setup(6, 500, 0);
        let unit = Arc::clone(&elevator);
        let elevator_thread = spawn(move || unit.run());

        // Act: wake the parked elevator with a call one floor up
        assert!(wait_for(Duration::from_secs(3), || elevator.is_running()));
        elevator.add_call(Call::new(1, Direction::Up));

        // Assert: it walks over, completes the call and parks again
        assert!(wait_for(Duration::from_secs(5), || {
            elevator.current_floor() == 1 && elevator.state() == State::Stop
        }));
        assert!(elevator.calls().is_empty());

        // Cleanup
        elevator.turn_off();
        elevator_thread.join().unwrap();
        assert_eq!(elevator.state(), State::End);
        assert!(!elevator.is_running());
    }

    #[test]
    fn turn_off_terminates_a_parked_elevator() {
        // Arrange
        let (elevator, _controller, _floors, _counters) = setup(6, 500, 0);
        let unit = Arc::clone(&elevator);
        let elevator_thread = spawn(move || unit.run());
        assert!(wait_for(Duration::from_secs(3), || elevator.is_running()));

        // Act
        elevator.turn_off();
        elevator_thread.join().unwrap();

        // Assert: interrupted waits are fatal, the elevator rests in End
        assert_eq!(elevator.state(), State::End);
        assert_eq!(elevator.direction(), Direction::None);
        assert!(!elevator.is_running());
    }

    #[test]
    fn turn_off_aborts_a_paced_move() {
        // Arrange: a long ride ahead
        let (elevator, _controller, _floors, _counters) = setup(6, 500, 0);
        elevator.add_call(Call::new(5, Direction::Up));
        let unit = Arc::clone(&elevator);
        let elevator_thread = spawn(move || unit.run());
        assert!(wait_for(Duration::from_secs(3), || {
            elevator.state() == State::Move
        }));

        // Act
        elevator.turn_off();
        elevator_thread.join().unwrap();

        // Assert
        assert_eq!(elevator.state(), State::End);
        assert!(!elevator.is_running());
    }

    #[test]
    fn snapshot_reflects_the_accessors() {
        // Arrange
        let (elevator, _controller, _floors, _counters) = setup(6, 500, 2);
        elevator.add_call(Call::new(5, Direction::Up));

        // Act
        let snapshot = elevator.snapshot();

        // Assert
        assert_eq!(snapshot.id, elevator.id());
        assert_eq!(elevator.capacity(), 500);
        assert_eq!(snapshot.state, State::Stop);
        assert_eq!(snapshot.direction, Direction::Up);
        assert_eq!(snapshot.free_space, 500);
        assert_eq!(snapshot.delivered, 0);
        assert_eq!(snapshot.calls, vec![Call::new(5, Direction::Up)]);
        assert!(snapshot.passengers.is_empty());
    }
}
