use std::collections::HashMap;

use super::registry::TrackRegistry;
use super::track::TrackId;

/// Exact-match table from OSC address to the tracks bound to it.
///
/// The table is rebuilt from the registry after any add, remove or address
/// commit rather than patched, so it can never hold a stale binding.
#[derive(Debug, Default)]
pub struct TriggerRouter {
    routes: HashMap<String, Vec<TrackId>>,
}

impl TriggerRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rebuild(&mut self, registry: &TrackRegistry) {
        self.routes.clear();
        for track in registry.iter() {
            if let Some(addr) = track.routable_address() {
                self.routes
                    .entry(addr.to_string())
                    .or_default()
                    .push(track.id());
            }
        }
    }

    /// Track ids bound to `address`, in display order. Unknown addresses
    /// match nothing.
    pub fn dispatch(&self, address: &str) -> Vec<TrackId> {
        self.routes
            .get(address.trim())
            .cloned()
            .unwrap_or_default()
    }

    /// Bound addresses, sorted.
    pub fn addresses(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        out.sort_unstable();
        out
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
