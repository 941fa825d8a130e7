use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct TruckConfig {
    pub maximum_velocity: f64,
    pub capacity: f64,

    /// Piecewise travel-time coefficients. Parsed and carried through to the
    /// run report; the travel-time computation itself uses `maximum_velocity`.
    pub coefficients: Vec<f64>,
}

impl TruckConfig {
    pub fn travel_time(&self, distance: f64) -> f64 {
        distance / self.maximum_velocity
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum StatsType {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "high")]
    High,
}

impl StatsType {
    pub fn parse(token: &str) -> Self {
        if token == "low" {
            Self::Low
        } else {
            Self::High
        }
    }
}

/// One flight phase of a drone leg. Cruise carries the horizontal distance to
/// cover; hover carries how long the drone holds position.
#[derive(Copy, Clone, Debug)]
pub enum Phase {
    Takeoff,
    Cruise { distance: f64 },
    Landing,
    Hover { duration: f64 },
}

#[derive(Clone, Debug, Serialize)]
pub struct DroneLinearConfig {
    pub capacity: f64,
    pub speed_type: StatsType,
    pub range_type: StatsType,
    pub takeoff_speed: f64,
    pub cruise_speed: f64,
    pub landing_speed: f64,
    pub altitude: f64,
    pub battery: f64,
    pub beta: f64,
    pub gamma: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct DroneNonlinearConfig {
    pub capacity: f64,
    pub speed_type: StatsType,
    pub range_type: StatsType,
    pub takeoff_speed: f64,
    pub cruise_speed: f64,
    pub landing_speed: f64,
    pub altitude: f64,
    pub battery: f64,
    pub k1: f64,
    pub k2: f64,
    pub c1: f64,
    pub c2: f64,
    pub c4: f64,
    pub c5: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct DroneEnduranceConfig {
    pub capacity: f64,
    pub speed_type: StatsType,
    pub range_type: StatsType,
    pub fixed_time: f64,
    pub fixed_distance: f64,
    pub speed: f64,
}

/// The drone energy model. Linear and nonlinear variants spend battery per
/// phase; the endurance variant spends nothing and is instead capped by total
/// flight time and distance.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "model")]
pub enum DroneConfig {
    Linear(DroneLinearConfig),
    Nonlinear(DroneNonlinearConfig),
    Endurance(DroneEnduranceConfig),
}

impl DroneConfig {
    /// Drone frame weight [kg]
    const W: f64 = 1.5;
    const G: f64 = 9.8;

    pub fn capacity(&self) -> f64 {
        match self {
            Self::Linear(config) => config.capacity,
            Self::Nonlinear(config) => config.capacity,
            Self::Endurance(config) => config.capacity,
        }
    }

    pub fn battery_capacity(&self) -> f64 {
        match self {
            Self::Linear(config) => config.battery,
            Self::Nonlinear(config) => config.battery,
            Self::Endurance(_) => f64::INFINITY,
        }
    }

    pub fn fixed_time(&self) -> f64 {
        match self {
            Self::Linear(_) | Self::Nonlinear(_) => f64::INFINITY,
            Self::Endurance(config) => config.fixed_time,
        }
    }

    pub fn fixed_distance(&self) -> f64 {
        match self {
            Self::Linear(_) | Self::Nonlinear(_) => f64::INFINITY,
            Self::Endurance(config) => config.fixed_distance,
        }
    }

    pub fn feasible(&self, route_time: f64, route_distance: f64) -> bool {
        route_time <= self.fixed_time() && route_distance <= self.fixed_distance()
    }

    pub fn phase_time(&self, phase: Phase) -> f64 {
        match phase {
            Phase::Takeoff => match self {
                Self::Linear(config) => config.altitude / config.takeoff_speed,
                Self::Nonlinear(config) => config.altitude / config.takeoff_speed,
                Self::Endurance(_) => 0.0,
            },
            Phase::Cruise { distance } => match self {
                Self::Linear(config) => distance / config.cruise_speed,
                Self::Nonlinear(config) => distance / config.cruise_speed,
                Self::Endurance(config) => distance / config.speed,
            },
            Phase::Landing => match self {
                Self::Linear(config) => config.altitude / config.landing_speed,
                Self::Nonlinear(config) => config.altitude / config.landing_speed,
                Self::Endurance(_) => 0.0,
            },
            Phase::Hover { duration } => duration,
        }
    }

    pub fn phase_energy(&self, phase: Phase, payload: f64) -> f64 {
        self.phase_time(phase) * self._power(phase, payload)
    }

    fn _power(&self, phase: Phase, payload: f64) -> f64 {
        match self {
            Self::Linear(config) => config.beta.mul_add(payload, config.gamma),
            Self::Nonlinear(config) => match phase {
                Phase::Takeoff => Self::_vertical_power(config, config.takeoff_speed, payload),
                Phase::Landing => Self::_vertical_power(config, config.landing_speed, payload),
                Phase::Hover { .. } => Self::_vertical_power(config, 0.0, payload),
                Phase::Cruise { .. } => {
                    let weight = (Self::W + payload) * Self::G;
                    let speed = config.cruise_speed;
                    let deg_10 = std::f64::consts::PI / 18.0;
                    let thrust = weight - config.c5 * (speed * deg_10.cos()).powi(2);
                    (config.c1 + config.c2)
                        * (thrust * thrust + (config.c4 * speed * speed).powi(2)).powf(0.75)
                        + config.c4 * speed.powi(3)
                }
            },
            Self::Endurance(_) => 0.0,
        }
    }

    fn _vertical_power(config: &DroneNonlinearConfig, speed: f64, payload: f64) -> f64 {
        let weight = Self::W + payload;
        let half = speed / 2.0;
        (config.k1 * Self::G * weight).mul_add(
            half + (half * half + Self::G * weight / (config.k2 * config.k2)).sqrt(),
            config.c2 * (Self::G * weight).powf(1.5),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear() -> DroneConfig {
        DroneConfig::Linear(DroneLinearConfig {
            capacity: 3.0,
            speed_type: StatsType::High,
            range_type: StatsType::High,
            takeoff_speed: 10.0,
            cruise_speed: 20.0,
            landing_speed: 5.0,
            altitude: 50.0,
            battery: 1e5,
            beta: 100.0,
            gamma: 50.0,
        })
    }

    fn nonlinear() -> DroneConfig {
        DroneConfig::Nonlinear(DroneNonlinearConfig {
            capacity: 3.0,
            speed_type: StatsType::High,
            range_type: StatsType::High,
            takeoff_speed: 10.0,
            cruise_speed: 20.0,
            landing_speed: 5.0,
            altitude: 50.0,
            battery: 1e5,
            k1: 0.8554,
            k2: 0.3051,
            c1: 2.8037,
            c2: 0.3177,
            c4: 0.0296,
            c5: 0.0279,
        })
    }

    fn endurance() -> DroneConfig {
        DroneConfig::Endurance(DroneEnduranceConfig {
            capacity: 3.0,
            speed_type: StatsType::High,
            range_type: StatsType::Low,
            fixed_time: 1800.0,
            fixed_distance: 10000.0,
            speed: 15.0,
        })
    }

    #[test]
    fn linear_phase_times() {
        let drone = linear();
        assert_eq!(drone.phase_time(Phase::Takeoff), 5.0);
        assert_eq!(drone.phase_time(Phase::Landing), 10.0);
        assert_eq!(drone.phase_time(Phase::Cruise { distance: 100.0 }), 5.0);
        assert_eq!(drone.phase_time(Phase::Hover { duration: 7.0 }), 7.0);
    }

    #[test]
    fn linear_phase_energy() {
        let drone = linear();
        // (beta * payload + gamma) * duration
        let expected = (100.0 * 2.0 + 50.0) * 5.0;
        let energy = drone.phase_energy(Phase::Takeoff, 2.0);
        assert!((energy - expected).abs() < 1e-9);

        let expected = (100.0 * 0.5 + 50.0) * 4.0;
        let energy = drone.phase_energy(Phase::Cruise { distance: 80.0 }, 0.5);
        assert!((energy - expected).abs() < 1e-9);
    }

    #[test]
    fn nonlinear_power_increases_with_payload() {
        let drone = nonlinear();
        for phase in [
            Phase::Takeoff,
            Phase::Landing,
            Phase::Cruise { distance: 100.0 },
            Phase::Hover { duration: 10.0 },
        ] {
            let light = drone.phase_energy(phase, 0.0);
            let heavy = drone.phase_energy(phase, 3.0);
            assert!(light > 0.0);
            assert!(heavy > light);
        }
    }

    #[test]
    fn endurance_spends_no_energy() {
        let drone = endurance();
        assert_eq!(drone.phase_energy(Phase::Takeoff, 2.0), 0.0);
        assert_eq!(drone.phase_energy(Phase::Cruise { distance: 500.0 }, 2.0), 0.0);
        assert_eq!(drone.phase_time(Phase::Takeoff), 0.0);
        assert_eq!(drone.phase_time(Phase::Cruise { distance: 150.0 }), 10.0);
        assert!(drone.battery_capacity().is_infinite());
    }

    #[test]
    fn endurance_feasibility_caps() {
        let drone = endurance();
        assert!(drone.feasible(1800.0, 10000.0));
        assert!(!drone.feasible(1800.1, 0.0));
        assert!(!drone.feasible(0.0, 10000.1));

        let unlimited = linear();
        assert!(unlimited.feasible(1e12, 1e12));
    }
}
