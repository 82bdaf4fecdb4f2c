//! The seam between `travelclick-config` and whatever repository backs
//! property configuration. Kept as a trait so this crate never depends on
//! `travelclick-db` directly — this component layers and validates, it
//! does not own persistence.

use async_trait::async_trait;
use travelclick_common::ErrorKind;
use travelclick_domain::PropertyConfig;
use uuid::Uuid;

/// Implemented by the host (the `gateway-server` crate, backed by
/// `travelclick_db::repositories::PropertyConfigRepository`) so this crate
/// stays a pure layering/validation/caching concern, with bindings resolved
/// via constructor-level dependency injection.
#[async_trait]
pub trait PropertyConfigSource: Send + Sync {
    async fn load(&self, property_id: Uuid) -> Result<Option<PropertyConfig>, ErrorKind>;
    async fn load_by_identifier(&self, identifier: &str) -> Result<Option<PropertyConfig>, ErrorKind>;
}
