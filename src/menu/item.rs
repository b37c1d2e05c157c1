use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::context::ClickContext;

/// How a slot is drawn. Rendering itself belongs to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visual {
    pub material: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub lore: Vec<String>,
    #[serde(default = "default_amount")]
    pub amount: u8,
}

fn default_amount() -> u8 {
    1
}

impl Visual {
    pub fn new(material: impl Into<String>) -> Self {
        Self {
            material: material.into(),
            name: None,
            lore: Vec::new(),
            amount: 1,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn lore_line(mut self, line: impl Into<String>) -> Self {
        self.lore.push(line.into());
        self
    }

    pub fn amount(mut self, amount: u8) -> Self {
        self.amount = amount.max(1);
        self
    }
}

pub type ClickHandler = Arc<dyn Fn(&mut ClickContext<'_>) + Send + Sync + 'static>;

/// Content of one menu slot. Items are immutable; a click handler swaps the
/// whole binding through [`ClickContext`].
#[derive(Clone)]
pub enum MenuItem {
    /// Display only.
    Icon { visual: Visual },
    /// Display plus click behaviour.
    Button { visual: Visual, on_click: ClickHandler },
}

impl MenuItem {
    pub fn icon(visual: Visual) -> Self {
        MenuItem::Icon { visual }
    }

    pub fn button<F>(visual: Visual, on_click: F) -> Self
    where
        F: Fn(&mut ClickContext<'_>) + Send + Sync + 'static,
    {
        MenuItem::Button {
            visual,
            on_click: Arc::new(on_click),
        }
    }

    pub fn visual(&self) -> &Visual {
        match self {
            MenuItem::Icon { visual } | MenuItem::Button { visual, .. } => visual,
        }
    }

    pub fn is_button(&self) -> bool {
        matches!(self, MenuItem::Button { .. })
    }

    pub(crate) fn handler(&self) -> Option<ClickHandler> {
        match self {
            MenuItem::Button { on_click, .. } => Some(on_click.clone()),
            MenuItem::Icon { .. } => None,
        }
    }

    /// Same behaviour, new look.
    pub fn with_visual(&self, visual: Visual) -> Self {
        match self {
            MenuItem::Icon { .. } => MenuItem::Icon { visual },
            MenuItem::Button { on_click, .. } => MenuItem::Button {
                visual,
                on_click: on_click.clone(),
            },
        }
    }
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuItem::Icon { visual } => f.debug_struct("Icon").field("visual", visual).finish(),
            MenuItem::Button { visual, .. } => f
                .debug_struct("Button")
                .field("visual", visual)
                .finish_non_exhaustive(),
        }
    }
}
