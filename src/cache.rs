//! Shared, explicitly refreshable registries.
//!
//! Call sites that only need a quick existence check or link share scanned
//! registries through a [`RegistryCache`] owned by the caller's top-level
//! context. There is no hidden global: whoever owns the cache decides its
//! lifetime and when it is refreshed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::config::RegistryConfig;
use crate::entity::EntityType;
use crate::error::{RegistryError, RegistryResult};
use crate::link::EntityLink;
use crate::registry::EntityRegistry;
use crate::storage::VaultStore;

/// One scanned [`EntityRegistry`] per vault root, built on first use.
///
/// # Examples
///
/// ```no_run
/// use entity_registry::{EntityType, RegistryCache};
///
/// let cache = RegistryCache::new();
/// let registry = cache.get("/path/to/vault")?;
/// let link = registry.get_link("Sarah Chen", Some(EntityType::Person));
/// # Ok::<(), entity_registry::RegistryError>(())
/// ```
#[derive(Debug, Default)]
pub struct RegistryCache {
    template: RegistryConfig,
    registries: Mutex<HashMap<PathBuf, Arc<EntityRegistry<VaultStore>>>>,
}

impl RegistryCache {
    /// Cache building registries with the default layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache building registries from `template`; its `root` is replaced per call.
    #[must_use]
    pub fn with_config(template: RegistryConfig) -> Self {
        Self {
            template,
            registries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the registry for `root`, building and scanning it if needed.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or the cache lock is poisoned.
    pub fn get(&self, root: impl AsRef<Path>) -> RegistryResult<Arc<EntityRegistry<VaultStore>>> {
        self.get_with(root, false)
    }

    /// Like [`get`](Self::get); `refresh` forces a full rebuild.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub fn get_with(
        &self,
        root: impl AsRef<Path>,
        refresh: bool,
    ) -> RegistryResult<Arc<EntityRegistry<VaultStore>>> {
        let root = root.as_ref();
        let mut registries = self.lock()?;
        if !refresh {
            if let Some(registry) = registries.get(root) {
                return Ok(Arc::clone(registry));
            }
        }

        let config = RegistryConfig {
            root: root.to_path_buf(),
            ..self.template.clone()
        };
        let registry = EntityRegistry::new(config, VaultStore::new())?;
        let stats = registry.scan();
        debug!(root = %root.display(), records = stats.total(), refresh, "registry built");

        let registry = Arc::new(registry);
        registries.insert(root.to_path_buf(), Arc::clone(&registry));
        Ok(registry)
    }

    /// Rebuilds the registry for `root` from scratch.
    ///
    /// Holders of the previous `Arc` keep their (now stale) registry.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub fn refresh(&self, root: impl AsRef<Path>) -> RegistryResult<Arc<EntityRegistry<VaultStore>>> {
        self.get_with(root, true)
    }

    /// Drops the cached registry for `root`. Returns true if one was cached.
    pub fn invalidate(&self, root: impl AsRef<Path>) -> bool {
        self.lock()
            .map(|mut r| r.remove(root.as_ref()).is_some())
            .unwrap_or(false)
    }

    /// Drops every cached registry.
    pub fn clear(&self) {
        if let Ok(mut registries) = self.lock() {
            registries.clear();
        }
    }

    /// Number of cached roots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// True if no roots are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(
        &self,
    ) -> RegistryResult<std::sync::MutexGuard<'_, HashMap<PathBuf, Arc<EntityRegistry<VaultStore>>>>>
    {
        self.registries
            .lock()
            .map_err(|_| RegistryError::internal("poisoned lock: registry.cache"))
    }
}

/// Checks whether `name` resolves in the vault at `root`.
///
/// Returns false if the registry cannot be built.
pub fn entity_exists(
    cache: &RegistryCache,
    name: &str,
    entity_type: EntityType,
    root: impl AsRef<Path>,
) -> bool {
    cache
        .get(root)
        .map(|registry| registry.exists(name, Some(entity_type)))
        .unwrap_or(false)
}

/// Link for `name` in the vault at `root`, if it resolves.
pub fn get_entity_link(
    cache: &RegistryCache,
    name: &str,
    entity_type: EntityType,
    root: impl AsRef<Path>,
) -> Option<EntityLink> {
    cache.get(root).ok()?.get_link(name, Some(entity_type))
}
