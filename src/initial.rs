use std::rc::Rc;

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::clusterize::clusterize;
use crate::problem::Problem;
use crate::routes::{DroneRoute, Route, TruckRoute};
use crate::solutions::Solution;

/// Angular clustering seed: one cluster per vehicle, trucks first. Undronable
/// customers falling into drone clusters are reassigned to trucks. `sorted`
/// orders each truck route as a nearest-neighbor chain from the depot,
/// otherwise the visit order is shuffled.
pub fn initial_12(problem: &Rc<Problem>, rng: &mut StdRng, sorted: bool) -> Rc<Solution> {
    let customers_count = problem.customers.len() - 1;
    let vehicles_count = problem.trucks_count + problem.drones_count;
    assert!(
        vehicles_count > 0 || customers_count == 0,
        "No vehicle available to serve {customers_count} customers"
    );

    let mut index = Vec::from_iter(1..=customers_count);
    let clusters = clusterize(problem, &mut index, vehicles_count.max(1));

    let mut truck_clusters: Vec<Vec<usize>> = clusters[..problem.trucks_count].to_vec();
    let mut drone_clusters: Vec<Vec<usize>> = clusters[problem.trucks_count..].to_vec();

    let mut fallback = 0;
    for cluster in &mut drone_clusters {
        cluster.retain(|&customer| {
            if problem.customers[customer].dronable {
                true
            } else {
                if problem.trucks_count == 0 {
                    panic!("Customer {customer} cannot be served by any vehicle");
                }

                truck_clusters[fallback % problem.trucks_count].push(customer);
                fallback += 1;
                false
            }
        });
    }

    for cluster in &mut truck_clusters {
        if sorted {
            _nearest_neighbor_order(problem, cluster);
        } else {
            cluster.shuffle(rng);
        }
    }

    let mut truck_routes = vec![vec![]; problem.trucks_count];
    for (truck, cluster) in truck_clusters.iter().enumerate() {
        if !cluster.is_empty() {
            let mut route = Vec::with_capacity(cluster.len() + 2);
            route.push(0);
            route.extend(cluster.iter().copied());
            route.push(0);
            truck_routes[truck].push(TruckRoute::new(problem, route));
        }
    }

    let mut drone_routes = vec![vec![]; problem.drones_count];
    for (drone, cluster) in drone_clusters.iter().enumerate() {
        for &customer in cluster {
            drone_routes[drone].push(DroneRoute::single(problem, customer));
        }
    }

    Rc::new(Solution::new(problem.clone(), truck_routes, drone_routes))
}

/// Greedy balancing seed: customers sorted by distance from the depot,
/// farthest first, each assigned to the compatible vehicle with the least
/// accumulated working time.
pub fn initial_3(problem: &Rc<Problem>) -> Rc<Solution> {
    let mut order = Vec::from_iter(1..problem.customers.len());
    order.sort_by(|&i, &j| problem.distances[0][j].total_cmp(&problem.distances[0][i]));

    let mut truck_builds: Vec<Option<Rc<TruckRoute>>> = vec![None; problem.trucks_count];
    let mut truck_time = vec![0.0; problem.trucks_count];
    let mut drone_routes: Vec<Vec<Rc<DroneRoute>>> = vec![vec![]; problem.drones_count];
    let mut drone_time = vec![0.0; problem.drones_count];

    fn _argmin(times: &[f64]) -> Option<usize> {
        times
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(index, _)| index)
    }

    for customer in order {
        let truck = _argmin(&truck_time);
        let drone = if problem.customers[customer].dronable {
            _argmin(&drone_time)
        } else {
            None
        };

        let use_truck = match (truck, drone) {
            (Some(t), Some(d)) => truck_time[t] <= drone_time[d],
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => panic!("Customer {customer} cannot be served by any vehicle"),
        };

        if use_truck {
            let t = truck.unwrap();
            let route = match &truck_builds[t] {
                Some(route) => route.push(problem, customer),
                None => TruckRoute::single(problem, customer),
            };
            truck_time[t] = route.working_time();
            truck_builds[t] = Some(route);
        } else {
            let d = drone.unwrap();
            let route = DroneRoute::single(problem, customer);
            drone_time[d] += route.working_time();
            drone_routes[d].push(route);
        }
    }

    let truck_routes: Vec<Vec<Rc<TruckRoute>>> = truck_builds
        .into_iter()
        .map(|build| build.into_iter().collect())
        .collect();

    Rc::new(Solution::new(problem.clone(), truck_routes, drone_routes))
}

fn _nearest_neighbor_order(problem: &Problem, cluster: &mut [usize]) {
    let mut start = 0;
    for i in 0..cluster.len() {
        let mut min_distance = f64::INFINITY;
        let mut min_idx = i;
        for (j, &customer) in cluster.iter().enumerate().skip(i) {
            let d = problem.distances[start][customer];
            if d < min_distance {
                min_distance = d;
                min_idx = j;
            }
        }

        start = cluster[min_idx];
        cluster.swap(i, min_idx);
    }
}
