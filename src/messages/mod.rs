pub mod units;

pub use units::{UnitCommand, UnitDisbanded};
