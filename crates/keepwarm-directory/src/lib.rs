pub mod http;
pub mod memory;
pub mod types;

pub use http::{HttpDirectory, HttpDirectoryConfig};
pub use memory::MemoryDirectory;
pub use types::{DirectoryError, DirectoryService, EndpointRecord};
