pub mod error;
pub mod registry;
pub mod types;

pub use error::{Error, Result};
pub use registry::TrafficRegistry;
pub use types::{JobId, JobSpec, TrafficJob};
