//! Eureka-style registry adapter.
//!
//! - [`EurekaReactiveDiscoveryClient`]: lazy instance and service-name streams
//! - [`EurekaServiceInstance`]: normalized view over one live registry record

pub mod client;
pub mod instance;

pub use client::{EurekaReactiveDiscoveryClient, InstanceStream};
pub use instance::{EurekaServiceInstance, MetadataView};
