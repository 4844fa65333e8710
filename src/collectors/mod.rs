mod collector;
pub mod generic;
pub mod source;
pub mod temperature;

pub use collector::SensorCollector;
pub use generic::GenericSensorCollector;
pub use source::{SysinfoSource, TemperatureSource};
pub use temperature::TemperatureCollector;
