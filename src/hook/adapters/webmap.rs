use anyhow::bail;
use dashmap::DashMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::any::Any;

use crate::event::Position;
use crate::hook::{Hook, HookKind, PluginContext};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: String,
    pub label: String,
    pub position: Position,
}

/// Point markers drawn into one marker set on the web map.
pub struct WebMapHook {
    marker_set: String,
    markers: DashMap<String, Marker>,
}

impl WebMapHook {
    pub fn new(ctx: &PluginContext) -> anyhow::Result<Self> {
        let marker_set = ctx.hooks.webmap_marker_set.trim().to_string();
        if marker_set.is_empty() {
            bail!("web map marker set name is empty");
        }
        Ok(Self {
            marker_set,
            markers: DashMap::new(),
        })
    }

    pub fn marker_set(&self) -> &str {
        &self.marker_set
    }

    /// Add or move a marker. Returns the marker it replaced, if any.
    pub fn add_marker(&self, marker: Marker) -> Option<Marker> {
        self.markers.insert(marker.id.clone(), marker)
    }

    pub fn remove_marker(&self, id: &str) -> Option<Marker> {
        self.markers.remove(id).map(|(_, m)| m)
    }

    /// All markers, ordered by id.
    pub fn markers(&self) -> Vec<Marker> {
        let mut all: Vec<Marker> = self.markers.iter().map(|m| m.value().clone()).collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }
}

impl Hook for WebMapHook {
    fn kind(&self) -> HookKind {
        HookKind::WebMap
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn on_disable(&self) {
        debug!(
            "clearing {} markers from set '{}'",
            self.markers.len(),
            self.marker_set
        );
        self.markers.clear();
    }
}
