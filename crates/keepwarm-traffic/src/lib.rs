pub mod builders;
pub mod config;
pub mod cycle;
pub mod discovery;
pub mod dispatch;
pub mod request;
pub mod transport;

pub use config::{normalize_domain, TrafficConfig};
pub use cycle::{CycleOutcome, CycleRunner};
pub use discovery::Discovery;
pub use dispatch::{is_success, DispatchError, DispatchOutcome, Dispatcher};
pub use request::{Payload, Target, TrafficRequest};
pub use transport::{HttpTransport, HttpTransportConfig, Transport, TransportError, TransportResponse};
