use std::str::FromStr;

use serde::Serialize;

use crate::config::{
    DroneConfig, DroneEnduranceConfig, DroneLinearConfig, DroneNonlinearConfig, Phase, StatsType,
    TruckConfig,
};
use crate::errors::ConfigError;

#[derive(Clone, Debug, Serialize)]
pub struct Customer {
    pub x: f64,
    pub y: f64,
    pub demand: f64,
    pub dronable: bool,
    pub truck_service_time: f64,
    pub drone_service_time: f64,
}

impl Customer {
    pub fn depot() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            demand: 0.0,
            dronable: true,
            truck_service_time: 0.0,
            drone_service_time: 0.0,
        }
    }
}

/// The immutable problem instance. Constructed once at startup and threaded by
/// reference through the driver, evaluators and neighborhoods.
#[derive(Debug, Serialize)]
pub struct Problem {
    pub iterations: usize,
    pub tabu_size: usize,
    pub verbose: bool,

    pub trucks_count: usize,
    pub drones_count: usize,

    /// All customers, depot at index 0.
    pub customers: Vec<Customer>,

    #[serde(skip)]
    pub distances: Vec<Vec<f64>>,

    pub maximum_waiting_time: f64, // hard-coded value

    pub truck: TruckConfig,
    pub drone: DroneConfig,
}

impl Problem {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        iterations: usize,
        tabu_size: usize,
        verbose: bool,
        trucks_count: usize,
        drones_count: usize,
        customers: Vec<Customer>,
        truck: TruckConfig,
        drone: DroneConfig,
    ) -> Self {
        let size = customers.len();
        let mut distances = vec![vec![0.0; size]; size];
        for i in 0..size {
            for j in i + 1..size {
                let dx = customers[i].x - customers[j].x;
                let dy = customers[i].y - customers[j].y;
                let d = dx.hypot(dy);
                distances[i][j] = d;
                distances[j][i] = d;
            }
        }

        Self {
            iterations,
            tabu_size,
            verbose,
            trucks_count,
            drones_count,
            customers,
            distances,
            maximum_waiting_time: 3600.0,
            truck,
            drone,
        }
    }

    /// Reads a problem from the whitespace-delimited input stream.
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let mut tokens = Tokens::new(input);

        let customers_count = tokens.next::<usize>("customers count")?;
        let trucks_count = tokens.next::<usize>("trucks count")?;
        let drones_count = tokens.next::<usize>("drones count")?;

        let x = tokens.next_vec::<f64>(customers_count, "x coordinates")?;
        let y = tokens.next_vec::<f64>(customers_count, "y coordinates")?;
        let demands = tokens.next_vec::<f64>(customers_count, "demands")?;

        let mut dronable = Vec::with_capacity(customers_count);
        for _ in 0..customers_count {
            dronable.push(tokens.next_flag("dronable flags")?);
        }

        let truck_service_time = tokens.next_vec::<f64>(customers_count, "truck service times")?;
        let drone_service_time = tokens.next_vec::<f64>(customers_count, "drone service times")?;

        let mut customers = Vec::with_capacity(customers_count + 1);
        customers.push(Customer::depot());
        for i in 0..customers_count {
            customers.push(Customer {
                x: x[i],
                y: y[i],
                demand: demands[i],
                dronable: dronable[i],
                truck_service_time: truck_service_time[i],
                drone_service_time: drone_service_time[i],
            });
        }

        let iterations = tokens.next::<usize>("iterations")?;
        let tabu_size = tokens.next::<usize>("tabu size")?;
        let verbose = tokens.next_flag("verbose flag")?;

        let truck_maximum_velocity = tokens.next::<f64>("truck maximum velocity")?;
        let truck_capacity = tokens.next::<f64>("truck capacity")?;
        let coefficients_count = tokens.next::<usize>("truck coefficients count")?;
        let coefficients = tokens.next_vec::<f64>(coefficients_count, "truck coefficients")?;

        let truck = TruckConfig {
            maximum_velocity: truck_maximum_velocity,
            capacity: truck_capacity,
            coefficients,
        };

        let drone_class = tokens.next_token("drone class")?.to_string();
        let capacity = tokens.next::<f64>("drone capacity")?;
        let speed_type = StatsType::parse(tokens.next_token("drone speed type")?);
        let range_type = StatsType::parse(tokens.next_token("drone range type")?);

        let drone = match drone_class.as_str() {
            "DroneLinearConfig" => DroneConfig::Linear(DroneLinearConfig {
                capacity,
                speed_type,
                range_type,
                takeoff_speed: tokens.next::<f64>("takeoff speed")?,
                cruise_speed: tokens.next::<f64>("cruise speed")?,
                landing_speed: tokens.next::<f64>("landing speed")?,
                altitude: tokens.next::<f64>("altitude")?,
                battery: tokens.next::<f64>("battery")?,
                beta: tokens.next::<f64>("beta")?,
                gamma: tokens.next::<f64>("gamma")?,
            }),
            "DroneNonlinearConfig" => DroneConfig::Nonlinear(DroneNonlinearConfig {
                capacity,
                speed_type,
                range_type,
                takeoff_speed: tokens.next::<f64>("takeoff speed")?,
                cruise_speed: tokens.next::<f64>("cruise speed")?,
                landing_speed: tokens.next::<f64>("landing speed")?,
                altitude: tokens.next::<f64>("altitude")?,
                battery: tokens.next::<f64>("battery")?,
                k1: tokens.next::<f64>("k1")?,
                k2: tokens.next::<f64>("k2")?,
                c1: tokens.next::<f64>("c1")?,
                c2: tokens.next::<f64>("c2")?,
                c4: tokens.next::<f64>("c4")?,
                c5: tokens.next::<f64>("c5")?,
            }),
            "DroneEnduranceConfig" => DroneConfig::Endurance(DroneEnduranceConfig {
                capacity,
                speed_type,
                range_type,
                fixed_time: tokens.next::<f64>("fixed time")?,
                fixed_distance: tokens.next::<f64>("fixed distance")?,
                speed: tokens.next::<f64>("drone speed")?,
            }),
            _ => return Err(ConfigError::UnknownDroneClass { class: drone_class }),
        };

        // A customer only stays dronable if a dedicated round trip from the
        // depot fits the drone's capacity, battery and endurance limits.
        for customer in customers.iter_mut().skip(1) {
            if !customer.dronable {
                continue;
            }

            let leg = customer.x.hypot(customer.y);
            let cruise = Phase::Cruise { distance: leg };
            let vertical = drone.phase_time(Phase::Takeoff) + drone.phase_time(Phase::Landing);
            let round_trip_time = 2.0 * (vertical + drone.phase_time(cruise))
                + customer.drone_service_time;
            let round_trip_energy = drone.phase_energy(Phase::Takeoff, customer.demand)
                + drone.phase_energy(cruise, customer.demand)
                + drone.phase_energy(Phase::Landing, customer.demand)
                + drone.phase_energy(Phase::Takeoff, 0.0)
                + drone.phase_energy(cruise, 0.0)
                + drone.phase_energy(Phase::Landing, 0.0);

            customer.dronable = customer.demand <= drone.capacity()
                && drone.feasible(round_trip_time, 2.0 * leg)
                && round_trip_energy <= drone.battery_capacity();
        }

        Ok(Self::new(
            iterations,
            tabu_size,
            verbose,
            trucks_count,
            drones_count,
            customers,
            truck,
            drone,
        ))
    }
}

struct Tokens<'a> {
    iterator: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            iterator: input.split_whitespace(),
        }
    }

    fn next_token(&mut self, expected: &'static str) -> Result<&'a str, ConfigError> {
        self.iterator
            .next()
            .ok_or(ConfigError::UnexpectedEnd { expected })
    }

    fn next<T: FromStr>(&mut self, expected: &'static str) -> Result<T, ConfigError> {
        let token = self.next_token(expected)?;
        token.parse::<T>().map_err(|_| ConfigError::InvalidToken {
            token: token.to_string(),
            expected,
        })
    }

    fn next_flag(&mut self, expected: &'static str) -> Result<bool, ConfigError> {
        match self.next_token(expected)? {
            "0" => Ok(false),
            "1" => Ok(true),
            token => Err(ConfigError::InvalidToken {
                token: token.to_string(),
                expected,
            }),
        }
    }

    fn next_vec<T: FromStr>(
        &mut self,
        count: usize,
        expected: &'static str,
    ) -> Result<Vec<T>, ConfigError> {
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(self.next::<T>(expected)?);
        }
        Ok(values)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn linear_input() -> String {
        [
            "3 2 1",
            "0 100 -50",       // x
            "60 0 80",         // y
            "1 2 3",           // demands
            "1 0 1",           // dronable
            "60 60 60",        // truck service times
            "30 30 30",        // drone service times
            "500 10 0",        // iterations, tabu size, verbose
            "15 20",           // truck maximum velocity, capacity
            "3 0.1 0.2 0.3",   // truck coefficients
            "DroneLinearConfig",
            "3 high low",
            "10 20 5 50 100000 100 50",
        ]
        .join("\n")
    }

    #[test]
    fn parse_linear() {
        let problem = Problem::parse(&linear_input()).unwrap();

        assert_eq!(problem.customers.len(), 4);
        assert_eq!(problem.trucks_count, 2);
        assert_eq!(problem.drones_count, 1);
        assert_eq!(problem.iterations, 500);
        assert_eq!(problem.tabu_size, 10);
        assert!(!problem.verbose);
        assert_eq!(problem.maximum_waiting_time, 3600.0);

        let depot = &problem.customers[0];
        assert_eq!((depot.x, depot.y, depot.demand), (0.0, 0.0, 0.0));
        assert!(depot.dronable);

        assert!(problem.customers[1].dronable);
        assert!(!problem.customers[2].dronable);
        assert_eq!(problem.customers[3].demand, 3.0);
        assert_eq!(problem.customers[1].truck_service_time, 60.0);
        assert_eq!(problem.customers[1].drone_service_time, 30.0);

        assert_eq!(problem.truck.maximum_velocity, 15.0);
        assert_eq!(problem.truck.coefficients, vec![0.1, 0.2, 0.3]);

        match &problem.drone {
            DroneConfig::Linear(config) => {
                assert_eq!(config.battery, 100000.0);
                assert_eq!(config.speed_type, StatsType::High);
                assert_eq!(config.range_type, StatsType::Low);
            }
            other => panic!("Expected a linear config, found {other:?}"),
        }
    }

    #[test]
    fn parse_endurance() {
        let input = linear_input().replace(
            "DroneLinearConfig\n3 high low\n10 20 5 50 100000 100 50",
            "DroneEnduranceConfig\n3 low high\n1800 10000 15",
        );
        let problem = Problem::parse(&input).unwrap();
        match &problem.drone {
            DroneConfig::Endurance(config) => {
                assert_eq!(config.fixed_time, 1800.0);
                assert_eq!(config.fixed_distance, 10000.0);
                assert_eq!(config.speed, 15.0);
            }
            other => panic!("Expected an endurance config, found {other:?}"),
        }
    }

    #[test]
    fn parse_prunes_out_of_range_customers() {
        // An endurance drone capped at 100 m of flight cannot reach customer 1
        // (120 m round trip), let alone customer 3.
        let input = linear_input().replace(
            "DroneLinearConfig\n3 high low\n10 20 5 50 100000 100 50",
            "DroneEnduranceConfig\n3 high high\n100000 100 15",
        );
        let problem = Problem::parse(&input).unwrap();
        assert!(!problem.customers[1].dronable);
        assert!(!problem.customers[3].dronable);
    }

    #[test]
    fn parse_unknown_drone_class() {
        let input = linear_input().replace("DroneLinearConfig", "DroneSolarConfig");
        match Problem::parse(&input) {
            Err(ConfigError::UnknownDroneClass { class }) => assert_eq!(class, "DroneSolarConfig"),
            other => panic!("Expected an unknown class error, found {other:?}"),
        }
    }

    #[test]
    fn parse_truncated_input() {
        let result = Problem::parse("3 2");
        assert!(matches!(result, Err(ConfigError::UnexpectedEnd { .. })));
    }

    #[test]
    fn parse_invalid_flag() {
        let input = linear_input().replace("1 0 1", "1 2 1");
        assert!(matches!(
            Problem::parse(&input),
            Err(ConfigError::InvalidToken { .. })
        ));
    }

    #[test]
    fn distance_matrix_is_symmetric() {
        let problem = Problem::parse(&linear_input()).unwrap();
        let size = problem.customers.len();
        for i in 0..size {
            assert_eq!(problem.distances[i][i], 0.0);
            for j in 0..size {
                assert_eq!(problem.distances[i][j], problem.distances[j][i]);
                assert!(problem.distances[i][j] >= 0.0);
            }
        }

        // depot (0, 0) to customer 1 at (0, 60)
        assert!((problem.distances[0][1] - 60.0).abs() < 1e-9);
        // customer 1 (0, 60) to customer 2 (100, 0)
        let expected = (100.0f64 * 100.0 + 60.0 * 60.0).sqrt();
        assert!((problem.distances[1][2] - expected).abs() < 1e-9);
    }
}
