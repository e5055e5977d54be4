//! AudienceRegistry: one facade per (process, plugin), built on first use.
//!
//! Concurrent first callers for the same key block on a single initializer
//! and all receive the same facade, bound or unavailable. Different keys
//! never wait on each other's probe.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use audience_core::{AudienceConfig, ContentSerializer, StandardSerializer};
use audience_host::HostRuntime;
use parking_lot::Mutex;
use tracing::debug;

use crate::facade::AudienceFacade;

/// Identity a facade is cached under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AudienceKey {
    pub process: String,
    pub plugin: String,
}

impl AudienceKey {
    pub fn new(process: impl Into<String>, plugin: impl Into<String>) -> Self {
        Self {
            process: process.into(),
            plugin: plugin.into(),
        }
    }
}

impl fmt::Display for AudienceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.process, self.plugin)
    }
}

type Slot = Arc<OnceLock<Arc<AudienceFacade>>>;

pub struct AudienceRegistry {
    config: AudienceConfig,
    serializer: Arc<dyn ContentSerializer>,
    entries: Mutex<HashMap<AudienceKey, Slot>>,
}

impl AudienceRegistry {
    pub fn new(config: AudienceConfig) -> Self {
        Self::with_serializer(config, Arc::new(StandardSerializer))
    }

    pub fn with_serializer(config: AudienceConfig, serializer: Arc<dyn ContentSerializer>) -> Self {
        Self {
            config,
            serializer,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The facade for `key`, probing `host` if this is the first request.
    pub fn of(&self, key: &AudienceKey, host: Arc<dyn HostRuntime>) -> Arc<AudienceFacade> {
        let slot = Arc::clone(self.entries.lock().entry(key.clone()).or_default());
        let facade = slot.get_or_init(|| {
            debug!(%key, "building audience facade");
            Arc::new(AudienceFacade::with_serializer(
                host,
                &self.config,
                Arc::clone(&self.serializer),
            ))
        });
        Arc::clone(facade)
    }

    /// Facade for `key` if one has been built.
    pub fn get(&self, key: &AudienceKey) -> Option<Arc<AudienceFacade>> {
        self.entries
            .lock()
            .get(key)
            .and_then(|slot| slot.get().cloned())
    }

    /// Drop the entry for `key`, e.g. when its plugin unloads.
    pub fn remove(&self, key: &AudienceKey) -> Option<Arc<AudienceFacade>> {
        self.entries
            .lock()
            .remove(key)
            .and_then(|slot| slot.get().cloned())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
