use std::fmt;
use std::rc::Rc;

use crate::config::Phase;
use crate::problem::Problem;

#[derive(Debug)]
pub struct RouteData {
    pub customers: Vec<usize>,

    /// Total distance of the closed tour.
    pub distance: f64,

    /// Total demand carried on the route.
    pub weight: f64,
}

impl RouteData {
    fn _construct(problem: &Problem, customers: Vec<usize>) -> Self {
        assert_eq!(customers.first(), Some(&0));
        assert_eq!(customers.last(), Some(&0));
        assert!(customers.len() >= 3);

        let mut distance = 0.0;
        let mut weight = 0.0;
        for i in 0..customers.len() - 1 {
            distance += problem.distances[customers[i]][customers[i + 1]];
            weight += problem.customers[customers[i]].demand;
        }

        Self {
            customers,
            distance,
            weight,
        }
    }
}

pub trait Route: Sized {
    fn new(problem: &Problem, customers: Vec<usize>) -> Rc<Self>;
    fn single(problem: &Problem, customer: usize) -> Rc<Self> {
        Self::new(problem, vec![0, customer, 0])
    }

    fn matrix<'a>(
        truck_routes: &'a [Vec<Rc<TruckRoute>>],
        drone_routes: &'a [Vec<Rc<DroneRoute>>],
    ) -> &'a [Vec<Rc<Self>>];
    fn matrix_mut<'a>(
        truck_routes: &'a mut Vec<Vec<Rc<TruckRoute>>>,
        drone_routes: &'a mut Vec<Vec<Rc<DroneRoute>>>,
    ) -> &'a mut Vec<Vec<Rc<Self>>>;

    /// Whether this vehicle type may serve the given customer.
    fn servable(problem: &Problem, customer: usize) -> bool;

    fn data(&self) -> &RouteData;
    fn working_time(&self) -> f64;
    fn capacity_violation(&self) -> f64;

    fn push(&self, problem: &Problem, customer: usize) -> Rc<Self> {
        let customers = &self.data().customers;
        let mut new_customers = customers.clone();
        new_customers.insert(customers.len() - 1, customer);
        Self::new(problem, new_customers)
    }
}

pub struct TruckRoute {
    _data: RouteData,
    _working_time: f64,
    _capacity_violation: f64,
}

impl fmt::Debug for TruckRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.data().customers)
    }
}

impl Route for TruckRoute {
    fn new(problem: &Problem, customers: Vec<usize>) -> Rc<Self> {
        let data = RouteData::_construct(problem, customers);

        let mut working_time = problem.truck.travel_time(data.distance);
        for &customer in &data.customers {
            working_time += problem.customers[customer].truck_service_time;
        }

        let capacity_violation = (data.weight - problem.truck.capacity).max(0.0);

        Rc::new(Self {
            _data: data,
            _working_time: working_time,
            _capacity_violation: capacity_violation,
        })
    }

    fn matrix<'a>(
        truck_routes: &'a [Vec<Rc<TruckRoute>>],
        _: &'a [Vec<Rc<DroneRoute>>],
    ) -> &'a [Vec<Rc<Self>>] {
        truck_routes
    }

    fn matrix_mut<'a>(
        truck_routes: &'a mut Vec<Vec<Rc<TruckRoute>>>,
        _: &'a mut Vec<Vec<Rc<DroneRoute>>>,
    ) -> &'a mut Vec<Vec<Rc<Self>>> {
        truck_routes
    }

    fn servable(_problem: &Problem, _customer: usize) -> bool {
        true
    }

    fn data(&self) -> &RouteData {
        &self._data
    }

    fn working_time(&self) -> f64 {
        self._working_time
    }

    fn capacity_violation(&self) -> f64 {
        self._capacity_violation
    }
}

pub struct DroneRoute {
    _data: RouteData,
    _working_time: f64,
    _capacity_violation: f64,

    /// Battery excess for linear/nonlinear drones, time/distance excess over
    /// the endurance caps otherwise.
    pub energy_violation: f64,
}

impl fmt::Debug for DroneRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.data().customers)
    }
}

impl Route for DroneRoute {
    fn new(problem: &Problem, customers: Vec<usize>) -> Rc<Self> {
        let data = RouteData::_construct(problem, customers);

        #[cfg(debug_assertions)]
        for &customer in &data.customers[1..data.customers.len() - 1] {
            if !problem.customers[customer].dronable {
                panic!(
                    "{}",
                    crate::errors::InvariantError::UndronableCustomer(customer)
                );
            }
        }

        let drone = &problem.drone;
        let takeoff = drone.phase_time(Phase::Takeoff);
        let landing = drone.phase_time(Phase::Landing);

        // Each leg flies takeoff -> cruise -> landing. The payload starts at
        // the full route demand and drops at every served customer.
        let mut working_time = 0.0;
        let mut energy = 0.0;
        let mut payload = data.weight;
        for i in 0..data.customers.len() - 1 {
            let next = data.customers[i + 1];
            let cruise = Phase::Cruise {
                distance: problem.distances[data.customers[i]][next],
            };

            working_time += takeoff
                + drone.phase_time(cruise)
                + landing
                + problem.customers[next].drone_service_time;
            energy += drone.phase_energy(Phase::Takeoff, payload)
                + drone.phase_energy(cruise, payload)
                + drone.phase_energy(Phase::Landing, payload);

            payload -= problem.customers[next].demand;
        }

        let capacity_violation = (data.weight - drone.capacity()).max(0.0);
        let energy_violation = (energy - drone.battery_capacity()).max(0.0)
            + (working_time - drone.fixed_time()).max(0.0)
            + (data.distance - drone.fixed_distance()).max(0.0);

        Rc::new(Self {
            _data: data,
            _working_time: working_time,
            _capacity_violation: capacity_violation,
            energy_violation,
        })
    }

    fn matrix<'a>(
        _: &'a [Vec<Rc<TruckRoute>>],
        drone_routes: &'a [Vec<Rc<DroneRoute>>],
    ) -> &'a [Vec<Rc<Self>>] {
        drone_routes
    }

    fn matrix_mut<'a>(
        _: &'a mut Vec<Vec<Rc<TruckRoute>>>,
        drone_routes: &'a mut Vec<Vec<Rc<DroneRoute>>>,
    ) -> &'a mut Vec<Vec<Rc<Self>>> {
        drone_routes
    }

    fn servable(problem: &Problem, customer: usize) -> bool {
        problem.customers[customer].dronable
    }

    fn data(&self) -> &RouteData {
        &self._data
    }

    fn working_time(&self) -> f64 {
        self._working_time
    }

    fn capacity_violation(&self) -> f64 {
        self._capacity_violation
    }
}
