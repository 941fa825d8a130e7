use std::rc::Rc;

use super::{Candidates, MoveSignature, Neighborhood, TabuList};
use crate::routes::{DroneRoute, Route, TruckRoute};
use crate::solutions::Solution;

/// Reverses a customer segment within a single route. Dronability is
/// preserved trivially since no customer changes vehicles.
pub struct TwoOpt {
    tabu: TabuList,
}

impl TwoOpt {
    pub fn new(tabu_size: usize) -> Self {
        Self {
            tabu: TabuList::new(tabu_size),
        }
    }

    fn _reversals<R>(&self, current: &Rc<Solution>, candidates: &mut Candidates)
    where
        R: Route,
    {
        let problem = &current.problem;
        let routes = R::matrix(&current.truck_routes, &current.drone_routes);

        for (vehicle, trips) in routes.iter().enumerate() {
            for (trip, route) in trips.iter().enumerate() {
                let customers = &route.data().customers;
                let length = customers.len();
                if length < 4 {
                    continue;
                }

                for i in 1..length - 2 {
                    for j in i + 1..length - 1 {
                        let mut buffer = customers.clone();
                        buffer[i..=j].reverse();

                        let signature = MoveSignature::edges(
                            (customers[i - 1], customers[i]),
                            (customers[j], customers[j + 1]),
                        );

                        let mut truck_routes = current.truck_routes.clone();
                        let mut drone_routes = current.drone_routes.clone();
                        R::matrix_mut(&mut truck_routes, &mut drone_routes)[vehicle][trip] =
                            R::new(problem, buffer);

                        let candidate =
                            Solution::new(problem.clone(), truck_routes, drone_routes);
                        candidates.offer(candidate, signature);
                    }
                }
            }
        }
    }
}

impl Neighborhood for TwoOpt {
    fn name(&self) -> String {
        "2-opt".to_string()
    }

    fn search(
        &mut self,
        current: &Rc<Solution>,
        aspiration: &dyn Fn(&Solution) -> bool,
    ) -> Option<Rc<Solution>> {
        let mut candidates = Candidates::new(&self.tabu, aspiration);

        self._reversals::<TruckRoute>(current, &mut candidates);
        self._reversals::<DroneRoute>(current, &mut candidates);

        let (solution, signature) = candidates.take()?;
        self.tabu.push(signature);
        Some(Rc::new(solution))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::fixture;

    fn never(_: &Solution) -> bool {
        false
    }

    fn crossing_route() -> Rc<Solution> {
        let problem = fixture::problem(
            1,
            0,
            vec![
                fixture::customer(0.0, 10.0, 1.0, true),
                fixture::customer(10.0, 0.0, 1.0, true),
                fixture::customer(0.0, 12.0, 1.0, true),
                fixture::customer(12.0, 0.0, 1.0, true),
            ],
            fixture::truck(1.0, 100.0),
            fixture::linear_drone(5.0, 1e9),
        );

        // 1 and 3 sit together, as do 2 and 4; visiting 1-2-3-4 zigzags.
        let truck_routes = vec![vec![TruckRoute::new(&problem, vec![0, 1, 2, 3, 4, 0])]];
        Rc::new(Solution::new(problem, truck_routes, vec![]))
    }

    #[test]
    fn uncrosses_a_zigzag() {
        let mut operator = TwoOpt::new(10);
        let current = crossing_route();

        let neighbor = operator.search(&current, &never).unwrap();
        neighbor.verify().unwrap();
        assert!(neighbor.cost() < current.cost());
    }

    #[test]
    fn reversal_keeps_customer_set() {
        let mut operator = TwoOpt::new(10);
        let mut current = crossing_route();

        for _ in 0..10 {
            let Some(neighbor) = operator.search(&current, &never) else {
                break;
            };
            neighbor.verify().unwrap();
            current = neighbor;
        }
    }

    #[test]
    fn single_customer_routes_have_no_reversal() {
        let problem = fixture::problem(
            1,
            0,
            vec![fixture::customer(5.0, 5.0, 1.0, true)],
            fixture::truck(1.0, 100.0),
            fixture::linear_drone(5.0, 1e9),
        );
        let truck_routes = vec![vec![TruckRoute::new(&problem, vec![0, 1, 0])]];
        let current = Rc::new(Solution::new(problem, truck_routes, vec![]));

        let mut operator = TwoOpt::new(10);
        assert!(operator.search(&current, &never).is_none());
    }

    #[test]
    fn tabu_excludes_the_previous_reversal() {
        let mut operator = TwoOpt::new(10);
        let current = crossing_route();

        let first = operator.search(&current, &never).unwrap();
        // Searching the same incumbent again cannot pick the tabu move, so the
        // runner-up (or the fallback) comes back instead.
        let second = operator.search(&current, &never).unwrap();
        assert!(second.cost() >= first.cost());
    }

    #[test]
    fn aspiration_overrides_tabu() {
        let current = crossing_route();

        let mut reference = TwoOpt::new(10);
        let best = reference.search(&current, &never).unwrap();

        // Make the winning signature tabu, then allow any improvement over the
        // incumbent through aspiration: the same winner must come back.
        let mut operator = TwoOpt::new(10);
        operator.search(&current, &never).unwrap();

        let incumbent_cost = current.cost();
        let improves = move |candidate: &Solution| candidate.cost() < incumbent_cost;
        let aspired = operator.search(&current, &improves).unwrap();
        assert!((aspired.cost() - best.cost()).abs() < 1e-9);
    }
}
