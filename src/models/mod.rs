pub mod sensor;
pub mod snapshot;

pub use sensor::{GenericSensorDef, RawTemperature};
pub use snapshot::{GenericReading, SensorSnapshot};
