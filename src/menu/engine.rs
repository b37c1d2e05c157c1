use dashmap::DashMap;
use log::{debug, info};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::context::{ClickContext, CloseCallback, MenuContext, SlotChange};
use super::item::{MenuItem, Visual};
use super::surface::{MenuView, Surface};
use super::MenuServices;
use crate::errors::{guarded, CoreError, Result};
use crate::event::{
    ClickEvent, CloseReason, ContainerId, Disposition, DragEvent, EntityId, Event,
};
use crate::logutil::escape_log;
use crate::metrics::Metrics;

pub const SLOTS_PER_ROW: usize = 9;
const MAX_ROWS: usize = 6;

/// An engine-owned container surface: title, rows of slots and the items in them.
pub struct Menu {
    container: ContainerId,
    title: String,
    rows: usize,
    items: BTreeMap<usize, MenuItem>,
    context: Arc<MenuContext>,
    owner: Option<EntityId>,
}

impl Menu {
    pub fn builder(title: impl Into<String>) -> MenuBuilder {
        MenuBuilder::new(title)
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn size(&self) -> usize {
        self.rows * SLOTS_PER_ROW
    }

    pub fn item(&self, slot: usize) -> Option<&MenuItem> {
        self.items.get(&slot)
    }

    pub fn context(&self) -> &MenuContext {
        &self.context
    }

    /// Entity the menu is open for; `None` until opened.
    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    fn view(&self) -> MenuView {
        MenuView {
            container: self.container,
            title: self.title.clone(),
            size: self.size(),
            slots: self
                .items
                .iter()
                .map(|(slot, item)| (*slot, item.visual().clone()))
                .collect(),
        }
    }
}

pub struct MenuBuilder {
    title: String,
    rows: usize,
    items: BTreeMap<usize, MenuItem>,
    on_close: Option<CloseCallback>,
}

impl MenuBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: 3,
            items: BTreeMap::new(),
            on_close: None,
        }
    }

    pub fn rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    /// Put an item in a slot. A later item for the same slot wins.
    pub fn item(mut self, slot: usize, item: MenuItem) -> Self {
        self.items.insert(slot, item);
        self
    }

    pub fn on_close<F>(mut self, f: F) -> Self
    where
        F: FnOnce(CloseReason) + Send + 'static,
    {
        self.on_close = Some(Box::new(f));
        self
    }

    pub fn build(self) -> Result<Menu> {
        if self.rows == 0 || self.rows > MAX_ROWS {
            return Err(CoreError::InvalidMenu(format!(
                "rows must be between 1 and {} (got {})",
                MAX_ROWS, self.rows
            )));
        }
        let size = self.rows * SLOTS_PER_ROW;
        if let Some(slot) = self.items.keys().find(|slot| **slot >= size) {
            return Err(CoreError::SlotOutOfRange { slot: *slot, size });
        }
        Ok(Menu {
            container: ContainerId::new(),
            title: self.title,
            rows: self.rows,
            items: self.items,
            context: Arc::new(MenuContext::with_close(self.on_close)),
            owner: None,
        })
    }
}

/// Owns open menus and interprets click, drag and close events against them.
///
/// Menus are never storage: any click into a menu is cancelled, bulk
/// transfers while a menu is the top container are cancelled, and drags into
/// a menu are cancelled. Button handlers run with no map lock held, so they
/// may open, close or prompt freely.
pub struct MenuEngine {
    menus: DashMap<ContainerId, Menu>,
    viewers: DashMap<EntityId, ContainerId>,
    surface: Arc<dyn Surface>,
    services: MenuServices,
    max_rows: usize,
    metrics: Arc<Metrics>,
}

impl MenuEngine {
    pub fn new(
        surface: Arc<dyn Surface>,
        services: MenuServices,
        max_rows: usize,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            menus: DashMap::new(),
            viewers: DashMap::new(),
            surface,
            services,
            max_rows,
            metrics,
        }
    }

    /// Show `menu` to `entity`. Another engine menu already on screen is
    /// replaced; a foreign container on screen is an error and nothing changes.
    pub fn open(&self, entity: EntityId, mut menu: Menu) -> Result<ContainerId> {
        if menu.rows > self.max_rows {
            return Err(CoreError::InvalidMenu(format!(
                "menu has {} rows, limit is {}",
                menu.rows, self.max_rows
            )));
        }
        if let Some(current) = self.surface.current(entity) {
            if !self.menus.contains_key(&current) {
                return Err(CoreError::AlreadyOpenElsewhere {
                    entity,
                    container: current,
                });
            }
            self.retire(current, CloseReason::OpenNew);
        }
        if let Some(stale) = self.viewers.get(&entity).map(|c| *c) {
            self.retire(stale, CloseReason::OpenNew);
        }

        menu.owner = Some(entity);
        let container = menu.container;
        let view = menu.view();
        self.menus.insert(container, menu);
        self.viewers.insert(entity, container);
        self.metrics.inc_menus_opened();
        info!(
            "opened menu '{}' ({}) for {}",
            escape_log(&view.title),
            container,
            entity
        );
        self.surface.show(entity, &view);
        Ok(container)
    }

    /// Close the entity's menu from our side. The close event the host echoes
    /// back carries [`CloseReason::Programmatic`] and is ignored.
    pub fn close(&self, entity: EntityId) -> bool {
        let Some(container) = self.viewers.get(&entity).map(|c| *c) else {
            return false;
        };
        let closed = self.retire(container, CloseReason::Programmatic);
        self.surface.close(entity);
        closed
    }

    pub fn is_menu(&self, container: ContainerId) -> bool {
        self.menus.contains_key(&container)
    }

    pub fn menu_for(&self, entity: EntityId) -> Option<ContainerId> {
        self.viewers.get(&entity).map(|c| *c)
    }

    pub fn open_count(&self) -> usize {
        self.menus.len()
    }

    pub fn visual_at(&self, container: ContainerId, slot: usize) -> Option<Visual> {
        self.menus
            .get(&container)
            .and_then(|m| m.items.get(&slot).map(|i| i.visual().clone()))
    }

    pub fn handle(&self, event: &Event) -> Disposition {
        match event {
            Event::Click(click) => self.handle_interaction(click),
            Event::Drag(drag) => self.handle_drag(drag),
            Event::Close {
                entity,
                container,
                reason,
            } => {
                self.handle_close(*entity, *container, *reason);
                Disposition::Pass
            }
            Event::Leave { entity } => {
                if let Some(container) = self.viewers.get(entity).map(|c| *c) {
                    self.retire(container, CloseReason::Disconnect);
                }
                Disposition::Pass
            }
            _ => Disposition::Pass,
        }
    }

    pub fn handle_interaction(&self, click: &ClickEvent) -> Disposition {
        let mut disposition = Disposition::Pass;
        if click.action.crosses_inventories() && self.menus.contains_key(&click.top) {
            disposition = Disposition::Cancel;
        }

        let Some(clicked) = click.clicked else {
            return self.count(disposition);
        };

        // Clone what the handler needs and release the map guard before calling out.
        let target = match self.menus.get(&clicked) {
            None => return self.count(disposition),
            Some(menu) => {
                if menu.owner != Some(click.entity) {
                    debug!(
                        "click on menu {} by non-owner {}; ignoring",
                        clicked, click.entity
                    );
                    None
                } else {
                    menu.items
                        .get(&click.slot)
                        .and_then(|item| item.handler())
                        .map(|handler| (handler, menu.context.clone()))
                }
            }
        };
        disposition = Disposition::Cancel;

        if let Some((handler, menu_ctx)) = target {
            self.metrics.inc_menu_clicks();
            let mut ctx = ClickContext::new(
                click.entity,
                clicked,
                click.slot,
                click.action,
                &menu_ctx,
                &self.services,
            );
            guarded("menu click handler", || handler(&mut ctx));
            let change = ctx.change.take();
            let close_requested = ctx.close_requested;
            drop(ctx);
            if let Some(change) = change {
                self.apply(click.entity, clicked, click.slot, change);
            }
            if close_requested {
                self.close(click.entity);
            }
        }
        self.count(disposition)
    }

    pub fn handle_drag(&self, drag: &DragEvent) -> Disposition {
        if self.menus.contains_key(&drag.container) {
            self.count(Disposition::Cancel)
        } else {
            Disposition::Pass
        }
    }

    pub fn handle_close(&self, entity: EntityId, container: ContainerId, reason: CloseReason) {
        if reason == CloseReason::Programmatic {
            return;
        }
        let owner = self.menus.get(&container).and_then(|menu| menu.owner);
        if owner.is_some_and(|owner| owner != entity) {
            debug!("close of menu {} by non-owner {}; ignoring", container, entity);
            return;
        }
        if !self.retire(container, reason) {
            debug!("close for untracked container {} from {}", container, entity);
        }
    }

    fn apply(&self, entity: EntityId, container: ContainerId, slot: usize, change: SlotChange) {
        let visual = {
            let Some(mut menu) = self.menus.get_mut(&container) else {
                debug!("menu {} closed during click handler; dropping slot change", container);
                return;
            };
            match change {
                SlotChange::Replace(item) => {
                    menu.items.insert(slot, item);
                }
                SlotChange::Visual(visual) => {
                    if let Some(item) = menu.items.get(&slot) {
                        let updated = item.with_visual(visual);
                        menu.items.insert(slot, updated);
                    }
                }
                SlotChange::Clear => {
                    menu.items.remove(&slot);
                }
            }
            menu.items.get(&slot).map(|i| i.visual().clone())
        };
        self.surface
            .update_slot(entity, container, slot, visual.as_ref());
    }

    /// Drop a menu from the registry and notify its context. Returns false when
    /// the container was not (or no longer) a menu.
    fn retire(&self, container: ContainerId, reason: CloseReason) -> bool {
        let Some((_, menu)) = self.menus.remove(&container) else {
            return false;
        };
        if let Some(owner) = menu.owner {
            self.viewers.remove_if(&owner, |_, c| *c == container);
        }
        self.metrics.inc_menus_closed();
        debug!("menu {} closed ({:?})", container, reason);
        menu.context.close(reason);
        true
    }

    fn count(&self, disposition: Disposition) -> Disposition {
        if disposition.is_cancelled() {
            self.metrics.inc_menu_events_cancelled();
        }
        disposition
    }
}
