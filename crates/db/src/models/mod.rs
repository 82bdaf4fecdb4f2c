//! Row types for the five `travelclick_*` tables. Each row is a
//! thin `sqlx::FromRow` struct kept close to the wire schema; conversion to
//! and from the richer `travelclick_domain` value objects lives on the row
//! type itself (`from_domain` / `into_domain`) so the repository layer stays
//! free of mapping logic.

pub mod error_log;
pub mod message_history;
pub mod message_log;
pub mod property_config;
pub mod sync_status;

pub use error_log::ErrorLogRow;
pub use message_history::MessageHistoryRow;
pub use message_log::MessageLogRow;
pub use property_config::PropertyConfigRow;
pub use sync_status::SyncStatusRow;
