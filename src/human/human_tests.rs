/*
 * Unit tests for passengers and the passenger generator
 *
 * The unit tests follows the Arrange, Act, Assert pattern.
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod human_tests {
    use std::sync::Arc;

    use crate::building::building::Building;
    use crate::config::{BuildingConfig, GeneratorConfig};
    use crate::error::SimError;
    use crate::human::generator::HumanGenerator;
    use crate::human::human::{Human, MAX_WEIGHT, MIN_WEIGHT};
    use crate::shared::stats::Counters;
    use crate::shared::structs::Direction;

    #[test]
    fn rejects_weight_outside_bounds() {
        assert!(matches!(
            Human::new(MIN_WEIGHT - 1, 3, 0),
            Err(SimError::WeightOutOfRange { .. })
        ));
        assert!(matches!(
            Human::new(MAX_WEIGHT + 1, 3, 0),
            Err(SimError::WeightOutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_equal_start_and_target() {
        assert!(matches!(Human::new(80, 2, 2), Err(SimError::SameFloor(2))));
    }

    #[test]
    fn call_points_at_the_target_floor() {
        let up = Human::new(80, 5, 2).unwrap();
        assert_eq!(up.start_floor(), 2);
        assert_eq!(up.call().floor(), 5);
        assert_eq!(up.call().direction(), Direction::Up);

        let down = Human::new(80, 0, 2).unwrap();
        assert_eq!(down.call().floor(), 0);
        assert_eq!(down.call().direction(), Direction::Down);
    }

    #[test]
    fn every_passenger_gets_their_own_id() {
        let a = Human::new(80, 5, 2).unwrap();
        let b = Human::new(80, 5, 2).unwrap();

        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
    }

    fn test_building() -> Arc<Building> {
        let config = BuildingConfig {
            n_floors: 3,
            n_elevators: 1,
            ..BuildingConfig::default()
        };

        Arc::new(Building::new(&config, Arc::new(Counters::new())).unwrap())
    }

    #[test]
    fn generator_rejects_bad_weight_ranges() {
        let building = test_building();

        let too_light = GeneratorConfig {
            weight_from: MIN_WEIGHT - 5,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            HumanGenerator::new(Arc::clone(&building), &too_light),
            Err(SimError::WeightRange { .. })
        ));

        let inverted = GeneratorConfig {
            weight_from: 150,
            weight_to: 100,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            HumanGenerator::new(building, &inverted),
            Err(SimError::WeightRange { .. })
        ));
    }

    #[test]
    fn generate_queues_one_passenger_somewhere() {
        // Arrange
        let building = test_building();
        let generator =
            HumanGenerator::new(Arc::clone(&building), &GeneratorConfig::default()).unwrap();

        // Act
        generator.generate().unwrap();

        // Assert
        let waiting: usize = building
            .floors()
            .iter()
            .map(|f| f.queue_len(Direction::Up) + f.queue_len(Direction::Down))
            .sum();
        assert_eq!(waiting, 1);
        assert_eq!(building.counters().generated(), 1);
        assert_eq!(building.controller().pending_calls().len(), 1);
    }
}
