use dashmap::DashMap;
use std::any::Any;

use crate::event::Position;
use crate::hook::{Hook, HookKind, PluginContext};

/// Axis-aligned cuboid inside one world. Bounds are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    pub world: String,
    min: (f64, f64, f64),
    max: (f64, f64, f64),
}

impl Region {
    /// Corners may be given in any order; both must be in the same world.
    pub fn new(name: impl Into<String>, a: &Position, b: &Position) -> anyhow::Result<Self> {
        if a.world != b.world {
            anyhow::bail!("region corners are in different worlds ({} / {})", a.world, b.world);
        }
        Ok(Self {
            name: name.into(),
            world: a.world.clone(),
            min: (a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: (a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        })
    }

    pub fn contains(&self, pos: &Position) -> bool {
        pos.world == self.world
            && (self.min.0..=self.max.0).contains(&pos.x)
            && (self.min.1..=self.max.1).contains(&pos.y)
            && (self.min.2..=self.max.2).contains(&pos.z)
    }
}

#[derive(Default)]
pub struct RegionHook {
    regions: DashMap<String, Region>,
}

impl RegionHook {
    pub fn new(_ctx: &PluginContext) -> anyhow::Result<Self> {
        Ok(Self::default())
    }

    /// Define or redefine a region by name.
    pub fn define(&self, region: Region) {
        self.regions.insert(region.name.clone(), region);
    }

    pub fn remove(&self, name: &str) -> bool {
        self.regions.remove(name).is_some()
    }

    pub fn region(&self, name: &str) -> Option<Region> {
        self.regions.get(name).map(|r| r.value().clone())
    }

    /// Names of every region containing `pos`, sorted.
    pub fn regions_at(&self, pos: &Position) -> Vec<String> {
        let mut names: Vec<String> = self
            .regions
            .iter()
            .filter(|r| r.contains(pos))
            .map(|r| r.name.clone())
            .collect();
        names.sort();
        names
    }
}

impl Hook for RegionHook {
    fn kind(&self) -> HookKind {
        HookKind::Regions
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HooksConfig;

    #[test]
    fn overlapping_regions() {
        let hook = RegionHook::new(&PluginContext::new("t", "0", ".", HooksConfig::default()))
            .expect("hook");
        let spawn = Region::new(
            "spawn",
            &Position::new("world", 10.0, 0.0, 10.0),
            &Position::new("world", -10.0, 255.0, -10.0),
        )
        .expect("region");
        let market = Region::new(
            "market",
            &Position::new("world", 0.0, 60.0, 0.0),
            &Position::new("world", 5.0, 80.0, 5.0),
        )
        .expect("region");
        hook.define(spawn);
        hook.define(market);

        assert_eq!(
            hook.regions_at(&Position::new("world", 2.0, 64.0, 2.0)),
            vec!["market".to_string(), "spawn".to_string()]
        );
        assert_eq!(
            hook.regions_at(&Position::new("world", -5.0, 64.0, -5.0)),
            vec!["spawn".to_string()]
        );
        assert!(hook
            .regions_at(&Position::new("nether", 2.0, 64.0, 2.0))
            .is_empty());
        assert!(hook.remove("market"));
        assert!(hook.region("market").is_none());
    }

    #[test]
    fn corners_must_share_a_world() {
        assert!(Region::new(
            "bad",
            &Position::new("world", 0.0, 0.0, 0.0),
            &Position::new("nether", 1.0, 1.0, 1.0),
        )
        .is_err());
    }
}
