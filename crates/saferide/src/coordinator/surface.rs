use crate::cards::{HoverPopup, RouteCard};
use crate::classify::RankedRoute;
use crate::classify::color::RouteColor;
use crate::geometry::{Bounds, Coord};

/// One line layer on the map, keyed by route index.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOverlay {
    pub index: usize,
    pub coordinates: Vec<Coord>,
    pub color: RouteColor,
    pub is_winner: bool,
    pub risk_rank: Option<usize>,
}

impl RouteOverlay {
    pub fn from_ranked(route: &RankedRoute) -> Self {
        Self {
            index: route.index(),
            coordinates: route.route.geometry.clone(),
            color: route.color,
            is_winner: route.is_winner,
            risk_rank: route.risk_rank,
        }
    }

    /// Layer id used by the map style.
    pub fn layer_id(&self) -> String {
        format!("route-{}", self.index)
    }
}

/// Everything the coordinator can ask of the map and side panel.
///
/// Implementations only draw; they never call back into the coordinator.
pub trait MapSurface {
    /// Replace all route layers. Called once per applied response.
    fn set_overlays(&mut self, overlays: &[RouteOverlay]);

    fn set_visibility(&mut self, index: usize, visible: bool);

    /// Show the hover popup, or remove it and reset the cursor on `None`.
    fn show_popup(&mut self, popup: Option<&HoverPopup>);

    fn fit_bounds(&mut self, bounds: Bounds);

    fn render_cards(&mut self, cards: &[RouteCard]);

    /// Emphasize the card of the sticky selection, or none.
    fn set_selected_card(&mut self, index: Option<usize>);

    fn set_status(&mut self, status: &str);

    /// Called after each batch of instructions.
    fn flush(&mut self) {}
}
