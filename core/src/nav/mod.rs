pub mod controller;

pub use controller::{DateFilter, DetailState, Effects, NavigationController, Phase};
