//! Configuration service: layered global/property configuration
//! with TTL caching and validation.

pub mod cache;
pub mod global;
pub mod property;
pub mod service;

pub use cache::{Scope, TtlCache};
pub use global::GlobalConfig;
pub use property::PropertyConfigSource;
pub use service::ConfigService;
