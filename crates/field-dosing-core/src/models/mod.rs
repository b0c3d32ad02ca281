//! Domain models for the dosing calculator.

mod category;
mod profile;
mod result;
mod units;
mod weight;

pub use category::*;
pub use profile::*;
pub use result::*;
pub use units::*;
pub use weight::*;
