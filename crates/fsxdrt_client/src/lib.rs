pub mod aws;
pub mod config;
pub mod memory;
pub mod service;

pub use aws::{AwsFsxService, AwsIdentityProvider, AwsObjectStore, AwsServices};
pub use config::ClientConfig;
pub use memory::{InMemoryFsxService, InMemoryIdentityProvider, InMemoryObjectStore};
pub use service::{FsxService, IdentityProvider, ObjectStore, ServiceError};
