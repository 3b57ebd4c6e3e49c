use std::collections::BTreeSet;

/// Which routes are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisibilityMode {
    All,
    Single { active: usize },
}

/// Visibility for the current route set.
///
/// `sticky` is the last explicit click selection. It survives hovers and is only changed
/// by [`VisibilitySelector::select_one`], [`VisibilitySelector::select_all`] and
/// [`VisibilitySelector::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisibilityState {
    pub mode: VisibilityMode,
    pub sticky: Option<usize>,
}

impl VisibilityState {
    pub const INITIAL: Self = Self {
        mode: VisibilityMode::All,
        sticky: None,
    };

    pub fn active_index(&self) -> Option<usize> {
        match self.mode {
            VisibilityMode::All => None,
            VisibilityMode::Single { active } => Some(active),
        }
    }
}

impl Default for VisibilityState {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Indices to draw: every route in `All` mode, otherwise only the active one.
pub fn visible_indices(state: &VisibilityState, total_routes: usize) -> BTreeSet<usize> {
    match state.mode {
        VisibilityMode::All => (0..total_routes).collect(),
        VisibilityMode::Single { active } => BTreeSet::from([active]),
    }
}

/// Hover/click state machine.
///
/// Hover temporarily overrides what is shown. Every `hover_enter` remembers the mode it
/// replaced, and the matching `hover_leave` puts that exact mode back, so nested hovers
/// (card hover, then map hover over the same line) unwind cleanly. A click starts a new
/// baseline: it drops the remembered hover modes, and a later `hover_leave` falls back to
/// the sticky selection.
#[derive(Debug, Clone, Default)]
pub struct VisibilitySelector {
    state: VisibilityState,
    hover_stack: Vec<VisibilityMode>,
}

impl VisibilitySelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> VisibilityState {
        self.state
    }

    pub fn is_hovering(&self) -> bool {
        !self.hover_stack.is_empty()
    }

    pub fn reset(&mut self) {
        self.state = VisibilityState::INITIAL;
        self.hover_stack.clear();
    }

    pub fn hover_enter(&mut self, index: usize) {
        self.hover_stack.push(self.state.mode);
        self.state.mode = VisibilityMode::Single { active: index };
    }

    pub fn hover_leave(&mut self) {
        self.state.mode = match self.hover_stack.pop() {
            Some(previous) => previous,
            None => self.sticky_mode(),
        };
    }

    pub fn select_all(&mut self) {
        self.state = VisibilityState::INITIAL;
        self.hover_stack.clear();
    }

    pub fn select_one(&mut self, index: usize) {
        self.state = VisibilityState {
            mode: VisibilityMode::Single { active: index },
            sticky: Some(index),
        };
        self.hover_stack.clear();
    }

    pub fn visible_indices(&self, total_routes: usize) -> BTreeSet<usize> {
        visible_indices(&self.state, total_routes)
    }

    fn sticky_mode(&self) -> VisibilityMode {
        match self.state.sticky {
            Some(active) => VisibilityMode::Single { active },
            None => VisibilityMode::All,
        }
    }
}
