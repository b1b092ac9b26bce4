pub mod fleet;
pub mod routes;

pub use fleet::{generate_fleet, generate_scans};
pub use routes::route_catalog;
