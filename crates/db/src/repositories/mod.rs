//! Repositories: one per `travelclick_*` table, each a `Repository { pool }`
//! struct built on `sqlx::query_as::<_, T>`.

pub mod error_log;
pub mod message_log;
pub mod property_config;
pub mod sync_status;

pub use error_log::ErrorLogRepository;
pub use message_log::MessageLogRepository;
pub use property_config::PropertyConfigRepository;
pub use sync_status::SyncStatusRepository;
