pub mod hub;
pub mod interface;
pub mod ranger;
pub mod sim;

pub use hub::SensorHub;
pub use interface::{CardReader, EchoPulse, SensorFault, SensorInterface};
pub use ranger::DistanceRanger;
