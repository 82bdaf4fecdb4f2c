//! Per-scope TTL cache: a small in-process `RwLock<HashMap>` rather than a
//! shared cache like Redis, since invalidation only ever needs to reach
//! this one process.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Property,
    Credentials,
    Cache,
}

impl Scope {
    pub fn default_ttl(self) -> Duration {
        match self {
            Scope::Global => Duration::from_secs(3600),
            Scope::Property => Duration::from_secs(300),
            Scope::Credentials => Duration::from_secs(60),
            Scope::Cache => Duration::from_secs(5),
        }
    }
}

struct Entry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// A TTL cache for one [`Scope`]. Readers see a consistent snapshot of each
/// entry (cloned out from under the lock), never a partially-updated value.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, Entry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn for_scope(scope: Scope) -> Self {
        Self::new(scope.default_ttl())
    }

    pub fn get(&self, key: &K, now: DateTime<Utc>) -> Option<V> {
        let entries = self.entries.read().expect("cache lock poisoned");
        entries.get(key).and_then(|entry| {
            if entry.expires_at > now {
                Some(entry.value.clone())
            } else {
                None
            }
        })
    }

    pub fn put(&self, key: K, value: V, now: DateTime<Utc>) {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        entries.insert(
            key,
            Entry {
                value,
                expires_at: now + chrono::Duration::from_std(self.ttl).unwrap_or_default(),
            },
        );
    }

    /// Invalidate on update.
    pub fn invalidate(&self, key: &K) {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        entries.remove(key);
    }

    pub fn invalidate_all(&self) {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn returns_value_before_expiry_and_none_after() {
        let cache: TtlCache<String, i32> = TtlCache::new(Duration::from_secs(10));
        cache.put("a".to_string(), 42, at(0));
        assert_eq!(cache.get(&"a".to_string(), at(5)), Some(42));
        assert_eq!(cache.get(&"a".to_string(), at(11)), None);
    }

    #[test]
    fn invalidate_removes_entry_immediately() {
        let cache: TtlCache<String, i32> = TtlCache::new(Duration::from_secs(100));
        cache.put("a".to_string(), 1, at(0));
        cache.invalidate(&"a".to_string());
        assert_eq!(cache.get(&"a".to_string(), at(1)), None);
    }

    #[test]
    fn scopes_carry_the_spec_ttl_ordering() {
        assert!(Scope::Global.default_ttl() > Scope::Property.default_ttl());
        assert!(Scope::Property.default_ttl() > Scope::Credentials.default_ttl());
        assert!(Scope::Credentials.default_ttl() > Scope::Cache.default_ttl());
    }
}
