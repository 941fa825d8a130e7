use std::rc::Rc;

use super::{Candidates, MoveSignature, Neighborhood, TabuList};
use crate::problem::Problem;
use crate::routes::{DroneRoute, Route, TruckRoute};
use crate::solutions::Solution;

/// Swaps a contiguous segment of `A` customers with a contiguous segment of
/// `B` customers, between two routes or within one. `B = 0` degenerates to
/// relocating the `A`-segment. Cross-vehicle swaps are filtered so that drone
/// routes only ever receive dronable customers.
pub struct MoveXY<const A: usize, const B: usize> {
    tabu: TabuList,
}

impl<const A: usize, const B: usize> MoveXY<A, B> {
    pub fn new(tabu_size: usize) -> Self {
        assert!(A >= 1);
        Self {
            tabu: TabuList::new(tabu_size),
        }
    }

    fn _inter<RI, RJ>(&self, current: &Rc<Solution>, candidates: &mut Candidates)
    where
        RI: Route,
        RJ: Route,
    {
        let problem = &current.problem;
        let routes_i = RI::matrix(&current.truck_routes, &current.drone_routes);
        let routes_j = RJ::matrix(&current.truck_routes, &current.drone_routes);

        for (vehicle_i, trips_i) in routes_i.iter().enumerate() {
            for (trip_i, route_i) in trips_i.iter().enumerate() {
                for (vehicle_j, trips_j) in routes_j.iter().enumerate() {
                    for (trip_j, route_j) in trips_j.iter().enumerate() {
                        // Interior customers are unique across routes, so equal
                        // first customers means the very same route.
                        if route_i.data().customers[1] == route_j.data().customers[1] {
                            continue;
                        }

                        for (new_i, new_j, signature) in
                            _segment_swaps::<RI, RJ>(problem, route_i, route_j, A, B)
                        {
                            let mut truck_routes = current.truck_routes.clone();
                            let mut drone_routes = current.drone_routes.clone();

                            RJ::matrix_mut(&mut truck_routes, &mut drone_routes)[vehicle_j]
                                [trip_j] = new_j;
                            {
                                let cloned_i =
                                    RI::matrix_mut(&mut truck_routes, &mut drone_routes);
                                match new_i {
                                    Some(route) => cloned_i[vehicle_i][trip_i] = route,
                                    None => {
                                        cloned_i[vehicle_i].remove(trip_i);
                                    }
                                }
                            }

                            let candidate =
                                Solution::new(problem.clone(), truck_routes, drone_routes);
                            candidates.offer(candidate, signature);
                        }
                    }
                }
            }
        }
    }

    fn _intra<R>(&self, current: &Rc<Solution>, candidates: &mut Candidates)
    where
        R: Route,
    {
        let problem = &current.problem;
        let routes = R::matrix(&current.truck_routes, &current.drone_routes);

        for (vehicle, trips) in routes.iter().enumerate() {
            for (trip, route) in trips.iter().enumerate() {
                for (new_route, signature) in _segment_swaps_within::<R>(problem, route, A, B) {
                    let mut truck_routes = current.truck_routes.clone();
                    let mut drone_routes = current.drone_routes.clone();
                    R::matrix_mut(&mut truck_routes, &mut drone_routes)[vehicle][trip] = new_route;

                    let candidate = Solution::new(problem.clone(), truck_routes, drone_routes);
                    candidates.offer(candidate, signature);
                }
            }
        }
    }
}

impl<const A: usize, const B: usize> Neighborhood for MoveXY<A, B> {
    fn name(&self) -> String {
        format!("Move ({}, {})", A, B)
    }

    fn search(
        &mut self,
        current: &Rc<Solution>,
        aspiration: &dyn Fn(&Solution) -> bool,
    ) -> Option<Rc<Solution>> {
        let mut candidates = Candidates::new(&self.tabu, aspiration);

        self._inter::<TruckRoute, TruckRoute>(current, &mut candidates);
        self._inter::<TruckRoute, DroneRoute>(current, &mut candidates);
        self._inter::<DroneRoute, TruckRoute>(current, &mut candidates);
        self._inter::<DroneRoute, DroneRoute>(current, &mut candidates);

        self._intra::<TruckRoute>(current, &mut candidates);
        self._intra::<DroneRoute>(current, &mut candidates);

        let (solution, signature) = candidates.take()?;
        self.tabu.push(signature);
        Some(Rc::new(solution))
    }
}

/// Enumerates swaps of an `a`-segment of `route_i` against a `b`-segment of
/// `route_j` (`b = 0`: insertions of the `a`-segment into every slot of
/// `route_j`). The first route is `None` when the move empties it.
fn _segment_swaps<RI, RJ>(
    problem: &Problem,
    route_i: &Rc<RI>,
    route_j: &Rc<RJ>,
    a: usize,
    b: usize,
) -> Vec<(Option<Rc<RI>>, Rc<RJ>, MoveSignature)>
where
    RI: Route,
    RJ: Route,
{
    let customers_i = &route_i.data().customers;
    let customers_j = &route_j.data().customers;
    let length_i = customers_i.len();
    let length_j = customers_j.len();

    let mut results = vec![];
    if length_i < a + 2 || length_j < b + 2 {
        return results;
    }

    for p_i in 1..length_i - a {
        let segment_i = &customers_i[p_i..p_i + a];
        if !segment_i.iter().all(|&c| RJ::servable(problem, c)) {
            continue;
        }

        if b == 0 {
            let mut remainder = customers_i[..p_i].to_vec();
            remainder.extend_from_slice(&customers_i[p_i + a..]);
            let new_i = if remainder.len() == 2 {
                None
            } else {
                Some(RI::new(problem, remainder))
            };

            for p_j in 1..length_j {
                let mut extended = customers_j[..p_j].to_vec();
                extended.extend_from_slice(segment_i);
                extended.extend_from_slice(&customers_j[p_j..]);

                results.push((
                    new_i.clone(),
                    RJ::new(problem, extended),
                    MoveSignature::customers(segment_i.to_vec()),
                ));
            }
        } else {
            for p_j in 1..length_j - b {
                let segment_j = &customers_j[p_j..p_j + b];
                if !segment_j.iter().all(|&c| RI::servable(problem, c)) {
                    continue;
                }

                let mut new_i = customers_i[..p_i].to_vec();
                new_i.extend_from_slice(segment_j);
                new_i.extend_from_slice(&customers_i[p_i + a..]);

                let mut new_j = customers_j[..p_j].to_vec();
                new_j.extend_from_slice(segment_i);
                new_j.extend_from_slice(&customers_j[p_j + b..]);

                let mut affected = segment_i.to_vec();
                affected.extend_from_slice(segment_j);

                results.push((
                    Some(RI::new(problem, new_i)),
                    RJ::new(problem, new_j),
                    MoveSignature::customers(affected),
                ));
            }
        }
    }

    results
}

/// Enumerates swaps of two disjoint segments within a single route
/// (`b = 0`: relocations of the `a`-segment to another position).
fn _segment_swaps_within<R>(
    problem: &Problem,
    route: &Rc<R>,
    a: usize,
    b: usize,
) -> Vec<(Rc<R>, MoveSignature)>
where
    R: Route,
{
    let customers = &route.data().customers;
    let length = customers.len();

    let mut results = vec![];
    if length < a + b + 2 {
        return results;
    }

    for p_a in 1..length - a {
        let segment_a = &customers[p_a..p_a + a];

        if b == 0 {
            let mut remainder = customers[..p_a].to_vec();
            remainder.extend_from_slice(&customers[p_a + a..]);

            for q in 1..remainder.len() {
                if q == p_a {
                    continue; // identity
                }

                let mut rebuilt = remainder[..q].to_vec();
                rebuilt.extend_from_slice(segment_a);
                rebuilt.extend_from_slice(&remainder[q..]);

                results.push((
                    R::new(problem, rebuilt),
                    MoveSignature::customers(segment_a.to_vec()),
                ));
            }
        } else {
            // The b-segment strictly after the a-segment...
            for p_b in p_a + a..length - b {
                let mut rebuilt = customers[..p_a].to_vec();
                rebuilt.extend_from_slice(&customers[p_b..p_b + b]);
                rebuilt.extend_from_slice(&customers[p_a + a..p_b]);
                rebuilt.extend_from_slice(segment_a);
                rebuilt.extend_from_slice(&customers[p_b + b..]);

                let mut affected = segment_a.to_vec();
                affected.extend_from_slice(&customers[p_b..p_b + b]);
                results.push((R::new(problem, rebuilt), MoveSignature::customers(affected)));
            }

            // ...and strictly before it, which differs once the sizes differ.
            if a != b && p_a > b {
                for p_b in 1..=p_a - b {
                    let mut rebuilt = customers[..p_b].to_vec();
                    rebuilt.extend_from_slice(segment_a);
                    rebuilt.extend_from_slice(&customers[p_b + b..p_a]);
                    rebuilt.extend_from_slice(&customers[p_b..p_b + b]);
                    rebuilt.extend_from_slice(&customers[p_a + a..]);

                    let mut affected = segment_a.to_vec();
                    affected.extend_from_slice(&customers[p_b..p_b + b]);
                    results.push((R::new(problem, rebuilt), MoveSignature::customers(affected)));
                }
            }
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::fixture;
    use crate::solutions::Solution;

    fn never(_: &Solution) -> bool {
        false
    }

    fn sample() -> Rc<Solution> {
        let problem = fixture::problem(
            2,
            1,
            vec![
                fixture::customer(10.0, 0.0, 1.0, true),
                fixture::customer(20.0, 5.0, 2.0, false),
                fixture::customer(-5.0, 15.0, 1.0, true),
                fixture::customer(0.0, -20.0, 3.0, true),
                fixture::customer(25.0, 25.0, 1.0, false),
                fixture::customer(-10.0, -10.0, 2.0, true),
            ],
            fixture::truck(5.0, 10.0),
            fixture::linear_drone(5.0, 1e9),
        );

        let truck_routes = vec![
            vec![TruckRoute::new(&problem, vec![0, 1, 2, 3, 0])],
            vec![TruckRoute::new(&problem, vec![0, 5, 0])],
        ];
        let drone_routes = vec![vec![
            DroneRoute::new(&problem, vec![0, 4, 0]),
            DroneRoute::new(&problem, vec![0, 6, 0]),
        ]];

        Rc::new(Solution::new(problem, truck_routes, drone_routes))
    }

    #[test]
    fn swaps_preserve_invariants() {
        let mut operator = MoveXY::<2, 1>::new(10);
        let mut current = sample();

        for _ in 0..25 {
            match operator.search(&current, &never) {
                Some(neighbor) => {
                    neighbor.verify().unwrap();
                    current = neighbor;
                }
                None => break,
            }
        }
    }

    #[test]
    fn relocations_preserve_invariants() {
        let mut operator = MoveXY::<1, 0>::new(10);
        let mut current = sample();

        for _ in 0..25 {
            match operator.search(&current, &never) {
                Some(neighbor) => {
                    neighbor.verify().unwrap();
                    current = neighbor;
                }
                None => break,
            }
        }
    }

    #[test]
    fn undronable_customers_never_reach_drones() {
        let mut operator = MoveXY::<2, 1>::new(0);
        let mut current = sample();

        for _ in 0..25 {
            let Some(neighbor) = operator.search(&current, &never) else {
                break;
            };

            for trips in &neighbor.drone_routes {
                for route in trips {
                    for &customer in &route.data().customers {
                        assert!(neighbor.problem.customers[customer].dronable);
                    }
                }
            }

            current = neighbor;
        }
    }

    #[test]
    fn returns_best_candidate_even_when_worsening() {
        let mut operator = MoveXY::<2, 1>::new(10);
        let current = sample();

        // Keep stepping from the same incumbent: every candidate pool is
        // non-empty here, so the operator must always return something.
        for _ in 0..5 {
            assert!(operator.search(&current, &never).is_some());
        }
    }

    #[test]
    fn tabu_signatures_accumulate() {
        let mut operator = MoveXY::<2, 1>::new(50);
        let mut current = sample();

        for expected in 1..=5 {
            current = operator.search(&current, &never).unwrap();
            assert!(operator.tabu.len() <= expected);
        }
        assert!(!operator.tabu.is_empty());
    }

    #[test]
    fn segment_swap_enumeration_is_exact() {
        let problem = fixture::problem(
            2,
            0,
            vec![
                fixture::customer(1.0, 0.0, 1.0, true),
                fixture::customer(2.0, 0.0, 1.0, true),
                fixture::customer(3.0, 0.0, 1.0, true),
                fixture::customer(4.0, 0.0, 1.0, true),
                fixture::customer(5.0, 0.0, 1.0, true),
            ],
            fixture::truck(1.0, 100.0),
            fixture::linear_drone(5.0, 1e9),
        );

        let route_i = TruckRoute::new(&problem, vec![0, 1, 2, 3, 0]);
        let route_j = TruckRoute::new(&problem, vec![0, 4, 5, 0]);

        // 2 segment positions in route_i, 2 single positions in route_j.
        let swaps = _segment_swaps::<TruckRoute, TruckRoute>(&problem, &route_i, &route_j, 2, 1);
        assert_eq!(swaps.len(), 4);

        for (new_i, new_j, _) in &swaps {
            let new_i = new_i.as_ref().unwrap();
            assert_eq!(new_i.data().customers.len(), 4);
            assert_eq!(new_j.data().customers.len(), 5);
        }
    }
}
