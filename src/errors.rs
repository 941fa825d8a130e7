use std::error::Error;
use std::fmt;

/// Malformed or unrecognized problem input. Fatal: reported to the user and
/// the process exits.
#[derive(Debug)]
pub enum ConfigError {
    UnexpectedEnd { expected: &'static str },
    InvalidToken { token: String, expected: &'static str },
    UnknownDroneClass { class: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnexpectedEnd { expected } => {
                write!(f, "Unexpected end of input while reading {expected}")
            }
            Self::InvalidToken { token, expected } => {
                write!(f, "Invalid token {token:?} while reading {expected}")
            }
            Self::UnknownDroneClass { class } => {
                write!(f, "Unknown drone energy model {class:?}")
            }
        }
    }
}

impl Error for ConfigError {}

/// A constructed solution violates the structural invariants: every non-depot
/// customer served exactly once, routes closed at the depot, undronable
/// customers kept off drones. Neighborhood operators must never produce one.
#[derive(Debug)]
pub enum InvariantError {
    MissingCustomer(usize),
    DuplicatedCustomer(usize),
    OpenRoute(Vec<usize>),
    UndronableCustomer(usize),
    WrongVehicleCount {
        vehicle: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::MissingCustomer(customer) => write!(f, "Customer {customer} is not served"),
            Self::DuplicatedCustomer(customer) => {
                write!(f, "Customer {customer} is served more than once")
            }
            Self::OpenRoute(customers) => {
                write!(f, "Route {customers:?} does not start and end at the depot")
            }
            Self::UndronableCustomer(customer) => {
                write!(f, "Undronable customer {customer} is assigned to a drone")
            }
            Self::WrongVehicleCount {
                vehicle,
                expected,
                actual,
            } => {
                write!(f, "Expected {expected} {vehicle} route lists, found {actual}")
            }
        }
    }
}

impl Error for InvariantError {}

/// The terminal size probe failed. Callers swallow this and render without a
/// progress bar.
#[derive(Debug)]
pub struct EnvironmentError {
    pub message: &'static str,
}

impl fmt::Display for EnvironmentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for EnvironmentError {}
