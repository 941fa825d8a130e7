use std::rc::Rc;

use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::errors::InvariantError;
use crate::initial;
use crate::logger::Logger;
use crate::neighborhoods::{MoveXY, Neighborhood, TwoOpt};
use crate::problem::Problem;
use crate::progress::ProgressSink;
use crate::routes::{DroneRoute, Route, TruckRoute};

/// An immutable assignment of every customer to vehicle trips, with the
/// derived makespan and violation totals. Neighborhoods build new solutions
/// instead of mutating this one.
#[derive(Clone, Debug)]
pub struct Solution {
    pub problem: Rc<Problem>,

    pub truck_routes: Vec<Vec<Rc<TruckRoute>>>,
    pub drone_routes: Vec<Vec<Rc<DroneRoute>>>,

    pub truck_working_time: Vec<f64>,
    pub drone_working_time: Vec<f64>,

    /// System working time: the maximum per-vehicle total.
    pub working_time: f64,

    pub drone_energy_violation: f64,
    pub capacity_violation: f64,
}

impl Solution {
    pub fn new(
        problem: Rc<Problem>,
        truck_routes: Vec<Vec<Rc<TruckRoute>>>,
        drone_routes: Vec<Vec<Rc<DroneRoute>>>,
    ) -> Self {
        let truck_working_time: Vec<f64> = truck_routes
            .iter()
            .map(|trips| trips.iter().map(|route| route.working_time()).sum())
            .collect();
        let drone_working_time: Vec<f64> = drone_routes
            .iter()
            .map(|trips| trips.iter().map(|route| route.working_time()).sum())
            .collect();

        let working_time = truck_working_time
            .iter()
            .chain(drone_working_time.iter())
            .fold(0.0, |acc: f64, &time| acc.max(time));

        let drone_energy_violation = drone_routes
            .iter()
            .flatten()
            .map(|route| route.energy_violation)
            .sum();

        let capacity_violation = truck_routes
            .iter()
            .flatten()
            .map(|route| route.capacity_violation())
            .sum::<f64>()
            + drone_routes
                .iter()
                .flatten()
                .map(|route| route.capacity_violation())
                .sum::<f64>();

        let solution = Self {
            problem,
            truck_routes,
            drone_routes,
            truck_working_time,
            drone_working_time,
            working_time,
            drone_energy_violation,
            capacity_violation,
        };

        #[cfg(debug_assertions)]
        if let Err(error) = solution.verify() {
            panic!("{error}");
        }

        solution
    }

    /// Objective function evaluation. The base penalty model is the makespan
    /// alone; violations are exposed separately.
    pub fn cost(&self) -> f64 {
        self.working_time
    }

    /// Checks the structural invariants: route lists per fleet size, closed
    /// routes, every non-depot customer served exactly once, no undronable
    /// customer on a drone.
    pub fn verify(&self) -> Result<(), InvariantError> {
        if self.truck_routes.len() != self.problem.trucks_count {
            return Err(InvariantError::WrongVehicleCount {
                vehicle: "truck",
                expected: self.problem.trucks_count,
                actual: self.truck_routes.len(),
            });
        }
        if self.drone_routes.len() != self.problem.drones_count {
            return Err(InvariantError::WrongVehicleCount {
                vehicle: "drone",
                expected: self.problem.drones_count,
                actual: self.drone_routes.len(),
            });
        }

        let mut served = vec![false; self.problem.customers.len()];
        served[0] = true;

        fn _check_routes<R>(
            vehicle_routes: &[Vec<Rc<R>>],
            served: &mut [bool],
        ) -> Result<(), InvariantError>
        where
            R: Route,
        {
            for trips in vehicle_routes {
                for route in trips {
                    let customers = &route.data().customers;
                    if customers.first() != Some(&0) || customers.last() != Some(&0) {
                        return Err(InvariantError::OpenRoute(customers.clone()));
                    }

                    for &customer in &customers[1..customers.len() - 1] {
                        if customer == 0 || served[customer] {
                            return Err(InvariantError::DuplicatedCustomer(customer));
                        }

                        served[customer] = true;
                    }
                }
            }

            Ok(())
        }

        _check_routes(&self.truck_routes, &mut served)?;
        _check_routes(&self.drone_routes, &mut served)?;

        for trips in &self.drone_routes {
            for route in trips {
                for &customer in &route.data().customers {
                    if !self.problem.customers[customer].dronable {
                        return Err(InvariantError::UndronableCustomer(customer));
                    }
                }
            }
        }

        match served.iter().position(|&s| !s) {
            Some(customer) => Err(InvariantError::MissingCustomer(customer)),
            None => Ok(()),
        }
    }

    /// The best of the three seed constructions.
    pub fn initial(problem: &Rc<Problem>, rng: &mut StdRng) -> Rc<Self> {
        let mut result = initial::initial_12(problem, rng, true);

        let r = initial::initial_12(problem, rng, false);
        if r.cost() < result.cost() {
            result = r;
        }

        let r = initial::initial_3(problem);
        if r.cost() < result.cost() {
            result = r;
        }

        result
    }

    /// Extension point; currently the identity.
    pub fn post_optimization(solution: Rc<Self>) -> Rc<Self> {
        solution
    }

    pub fn tabu_search(
        problem: &Rc<Problem>,
        rng: &mut StdRng,
        progress: &mut dyn ProgressSink,
        logger: &mut Logger,
    ) -> Rc<Self> {
        let mut neighborhoods: Vec<Box<dyn Neighborhood>> = vec![
            Box::new(MoveXY::<2, 1>::new(problem.tabu_size)),
            Box::new(TwoOpt::new(problem.tabu_size)),
        ];

        let mut current = Self::initial(problem, rng);
        let mut result = current.clone();

        for iteration in 0..problem.iterations {
            progress.render(iteration, problem.iterations, result.cost());

            let index = rng.random_range(0..neighborhoods.len());
            let best_cost = result.cost();
            let aspiration = move |candidate: &Solution| candidate.cost() < best_cost;

            if let Some(neighbor) = neighborhoods[index].search(&current, &aspiration) {
                if neighbor.cost() < result.cost() {
                    result = neighbor.clone();
                }

                current = neighbor;
            }

            logger
                .log(iteration, &current, &result, &neighborhoods[index].name())
                .unwrap();
        }

        progress.finish();

        Self::post_optimization(result)
    }
}

/// Plain route matrices plus the derived scalars, for the final report and the
/// `evaluate` round-trip.
#[derive(Debug, Deserialize, Serialize)]
pub struct SolutionLayout {
    pub truck_routes: Vec<Vec<Vec<usize>>>,
    pub drone_routes: Vec<Vec<Vec<usize>>>,

    pub working_time: f64,
    pub drone_energy_violation: f64,
    pub capacity_violation: f64,
}

impl From<&Solution> for SolutionLayout {
    fn from(solution: &Solution) -> Self {
        fn _expand<R>(routes: &[Vec<Rc<R>>]) -> Vec<Vec<Vec<usize>>>
        where
            R: Route,
        {
            routes
                .iter()
                .map(|trips| {
                    trips
                        .iter()
                        .map(|route| route.data().customers.clone())
                        .collect()
                })
                .collect()
        }

        Self {
            truck_routes: _expand(&solution.truck_routes),
            drone_routes: _expand(&solution.drone_routes),
            working_time: solution.working_time,
            drone_energy_violation: solution.drone_energy_violation,
            capacity_violation: solution.capacity_violation,
        }
    }
}

impl Solution {
    /// Rebuilds a solution from saved route matrices, re-deriving every scalar
    /// from the problem instance.
    pub fn from_layout(problem: &Rc<Problem>, layout: &SolutionLayout) -> Self {
        let truck_routes = layout
            .truck_routes
            .iter()
            .map(|trips| {
                trips
                    .iter()
                    .map(|customers| TruckRoute::new(problem, customers.clone()))
                    .collect()
            })
            .collect();
        let drone_routes = layout
            .drone_routes
            .iter()
            .map(|trips| {
                trips
                    .iter()
                    .map(|customers| DroneRoute::new(problem, customers.clone()))
                    .collect()
            })
            .collect();

        Self::new(problem.clone(), truck_routes, drone_routes)
    }
}
