pub mod endpoint;
pub mod task;

pub use endpoint::{EndpointDescriptor, EndpointState};
pub use task::TaskKind;

pub mod telemetry;
