// Headless presentation backend: proxies are bookkeeping entries and every
// lifecycle call is reported through tracing.

use crate::domain::{EntityFields, EntityKind, Presentation, ProxyHandle, Vec3};
use std::collections::HashMap;
use tracing::{debug, info, trace};

#[derive(Debug, Default)]
pub struct LoggingPresentation {
    next_handle: u64,
    // Entity key per live proxy, for readable logs.
    proxies: HashMap<ProxyHandle, String>,
}

impl LoggingPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_proxies(&self) -> usize {
        self.proxies.len()
    }
}

impl Presentation for LoggingPresentation {
    fn create_proxy(&mut self, key: &str, fields: &EntityFields) -> ProxyHandle {
        self.next_handle += 1;
        let handle = ProxyHandle(self.next_handle);
        self.proxies.insert(handle, key.to_string());

        let kind = match fields.kind {
            EntityKind::Player { .. } => "player",
            EntityKind::Projectile { .. } => "projectile",
        };
        debug!(%key, kind, handle = handle.0, "proxy created");
        handle
    }

    fn destroy_proxy(&mut self, handle: ProxyHandle) {
        match self.proxies.remove(&handle) {
            Some(key) => debug!(%key, handle = handle.0, "proxy destroyed"),
            None => debug!(handle = handle.0, "destroy for unknown proxy"),
        }
    }

    fn set_proxy_position(&mut self, handle: ProxyHandle, position: Vec3) {
        if let Some(key) = self.proxies.get(&handle) {
            trace!(%key, x = position.x, y = position.y, z = position.z, "proxy moved");
        }
    }

    fn play_death_effect(&mut self, position: Vec3) {
        info!(x = position.x, y = position.y, z = position.z, "explosion");
    }
}
