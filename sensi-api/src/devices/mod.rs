//! Device name → hardware specs.

mod catalog;
mod lookup;

pub use catalog::{normalize_name, DeviceCatalog, DeviceSpec};
pub use lookup::{parse_device_reply, DeviceLookup};
