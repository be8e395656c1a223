use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::{PoisonError, RwLock};

use backfill_core::OrganizerId;

/// Organizer-isolated key/value store. Every access names the tenant.
pub trait TenantStore<K, V>: Send + Sync {
    fn get(&self, tenant_id: OrganizerId, key: &K) -> Option<V>;
    fn upsert(&self, tenant_id: OrganizerId, key: K, value: V);
    fn list(&self, tenant_id: OrganizerId) -> Vec<V>;
    /// All records across tenants (snapshot export only).
    fn list_all(&self) -> Vec<(OrganizerId, V)>;
}

impl<K, V, S> TenantStore<K, V> for Arc<S>
where
    S: TenantStore<K, V> + ?Sized,
{
    fn get(&self, tenant_id: OrganizerId, key: &K) -> Option<V> {
        (**self).get(tenant_id, key)
    }

    fn upsert(&self, tenant_id: OrganizerId, key: K, value: V) {
        (**self).upsert(tenant_id, key, value)
    }

    fn list(&self, tenant_id: OrganizerId) -> Vec<V> {
        (**self).list(tenant_id)
    }

    fn list_all(&self) -> Vec<(OrganizerId, V)> {
        (**self).list_all()
    }
}

/// In-memory tenant-isolated store.
///
/// Poisoned locks are recovered: every write is a single insert, so the map is
/// consistent even after a holder panicked.
#[derive(Debug)]
pub struct InMemoryTenantStore<K, V> {
    inner: RwLock<HashMap<(OrganizerId, K), V>>,
}

impl<K, V> InMemoryTenantStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Default for InMemoryTenantStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> TenantStore<K, V> for InMemoryTenantStore<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, tenant_id: OrganizerId, key: &K) -> Option<V> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(&(tenant_id, key.clone())).cloned()
    }

    fn upsert(&self, tenant_id: OrganizerId, key: K, value: V) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.insert((tenant_id, key), value);
    }

    fn list(&self, tenant_id: OrganizerId) -> Vec<V> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.iter()
            .filter_map(|((t, _k), v)| if *t == tenant_id { Some(v.clone()) } else { None })
            .collect()
    }

    fn list_all(&self) -> Vec<(OrganizerId, V)> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.iter().map(|((t, _k), v)| (*t, v.clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenants_do_not_see_each_other() {
        let store: InMemoryTenantStore<String, u32> = InMemoryTenantStore::new();
        let a = OrganizerId::new();
        let b = OrganizerId::new();

        store.upsert(a, "ABC12".to_string(), 1);
        store.upsert(b, "ABC12".to_string(), 2);

        assert_eq!(store.get(a, &"ABC12".to_string()), Some(1));
        assert_eq!(store.get(b, &"ABC12".to_string()), Some(2));
        assert_eq!(store.list(a), vec![1]);
        assert_eq!(store.list_all().len(), 2);
    }

    #[test]
    fn upsert_replaces_existing_value() {
        let store: InMemoryTenantStore<String, u32> = InMemoryTenantStore::new();
        let a = OrganizerId::new();
        store.upsert(a, "K".to_string(), 1);
        store.upsert(a, "K".to_string(), 7);
        assert_eq!(store.list(a), vec![7]);
    }

    #[test]
    fn writes_survive_a_poisoned_lock() {
        let store: Arc<InMemoryTenantStore<String, u32>> = Arc::new(InMemoryTenantStore::new());
        let a = OrganizerId::new();
        store.upsert(a, "K".to_string(), 1);

        let holder = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = holder.inner.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();
        assert!(store.inner.is_poisoned());

        store.upsert(a, "K".to_string(), 2);
        assert_eq!(store.get(a, &"K".to_string()), Some(2));
        assert_eq!(store.list(a), vec![2]);
    }
}
