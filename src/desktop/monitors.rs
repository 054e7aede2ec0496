use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use glam::{IVec2, Vec2};
use thiserror::Error;

use super::{MonitorId, MonitorSource, Rect};
use crate::input::MouseInput;

/// Geometry of one active display, desktop coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorInfo {
    pub full: Rect,
    /// Full bounds minus taskbars and docked bars.
    pub work: Rect,
    pub taskbar_height: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MonitorSelectionError {
    #[error("expected \"auto\" or \"manual{{i,j,...}}\", got {0:?}")]
    Unrecognised(String),

    #[error("invalid monitor index {0:?}")]
    InvalidIndex(String),
}

/// Which monitors, by zero-based enumeration index, the cats may use.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MonitorSelection {
    #[default]
    Auto,
    Manual(BTreeSet<usize>),
}

impl MonitorSelection {
    pub fn allows(&self, index: usize) -> bool {
        match self {
            Self::Auto => true,
            Self::Manual(set) => set.contains(&index),
        }
    }
}

impl FromStr for MonitorSelection {
    type Err = MonitorSelectionError;

    /// Parses `auto` or `manual{0,2}`. An empty manual list means every monitor.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }

        let list = s
            .strip_prefix("manual")
            .map(str::trim)
            .and_then(|rest| rest.strip_prefix('{'))
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or_else(|| MonitorSelectionError::Unrecognised(s.to_string()))?;

        let mut indices = BTreeSet::new();
        for token in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let index = token
                .parse::<usize>()
                .map_err(|_| MonitorSelectionError::InvalidIndex(token.to_string()))?;
            indices.insert(index);
        }

        if indices.is_empty() {
            Ok(Self::Auto)
        } else {
            Ok(Self::Manual(indices))
        }
    }
}

/// Active monitors and the desktop ⇄ overlay-local mapping.
///
/// The overlay's local origin is the top-left of the union of every active
/// monitor's full bounds.
pub struct MonitorManager {
    selection: MonitorSelection,
    combined: Rect,
    order: Vec<MonitorId>,
    details: HashMap<MonitorId, MonitorInfo>,
}

impl MonitorManager {
    pub fn new(selection: MonitorSelection) -> Self {
        Self {
            selection,
            combined: Rect::default(),
            order: Vec::new(),
            details: HashMap::new(),
        }
    }

    /// Rebuild the monitor snapshot from scratch.
    ///
    /// The cached cursor is re-mapped before and after so it stays consistent
    /// when the combined rectangle moves within the frame.
    pub fn update(&mut self, source: &mut dyn MonitorSource, input: &mut MouseInput) {
        input.relocate(self.desktop_to_local(input.desktop_location()));

        self.combined = Rect::default();
        self.order.clear();
        self.details.clear();

        for (index, raw) in source.enumerate().into_iter().enumerate() {
            if !self.selection.allows(index) {
                continue;
            }

            self.details.insert(
                raw.id,
                MonitorInfo {
                    full: raw.full,
                    work: raw.work,
                    taskbar_height: raw.full.bottom - raw.work.bottom,
                    width: raw.full.width(),
                    height: raw.full.height(),
                },
            );
            self.order.push(raw.id);
            self.combined = self.combined.union(&raw.full);
        }

        input.relocate(self.desktop_to_local(input.desktop_location()));
    }

    pub fn origin(&self) -> IVec2 {
        self.combined.top_left()
    }

    pub fn desktop_to_local(&self, p: Vec2) -> Vec2 {
        p - self.origin().as_vec2()
    }

    pub fn local_to_desktop(&self, p: Vec2) -> Vec2 {
        p + self.origin().as_vec2()
    }

    pub fn combined_rect(&self) -> Rect {
        self.combined
    }

    /// Active monitors in enumeration order.
    pub fn monitors(&self) -> &[MonitorId] {
        &self.order
    }

    pub fn monitor_detail(&self, id: MonitorId) -> Option<MonitorInfo> {
        self.details.get(&id).copied()
    }

    /// Active monitor details in enumeration order.
    pub fn infos(&self) -> impl Iterator<Item = &MonitorInfo> + '_ {
        self.order.iter().filter_map(|id| self.details.get(id))
    }

    pub fn primary(&self) -> Option<MonitorInfo> {
        self.infos().next().copied()
    }

    pub fn selection(&self) -> &MonitorSelection {
        &self.selection
    }
}
