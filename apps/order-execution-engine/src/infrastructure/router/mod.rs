//! Execution router adapters.

mod simulated;

pub use simulated::{SimulatedDexRouter, SimulatedRouterConfig};
