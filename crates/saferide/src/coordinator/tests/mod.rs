
use std::collections::BTreeMap;
use std::collections::BTreeSet;

use super::surface::{MapSurface, RouteOverlay};
use super::{ApplyOutcome, InteractionCoordinator, PointerEvent};
use crate::api::{RankRequest, RankResponse, RouteRecord};
use crate::cards::{HoverPopup, RouteCard};
use crate::geometry::{Bounds, Coord};

/// Surface fake that keeps the latest state the coordinator pushed.
#[derive(Debug, Default)]
struct RecordingSurface {
    overlays: Vec<RouteOverlay>,
    visibility: BTreeMap<usize, bool>,
    popup: Option<HoverPopup>,
    bounds: Option<Bounds>,
    cards: Vec<RouteCard>,
    selected_card: Option<usize>,
    status: String,
    overlay_pushes: usize,
    flushes: usize,
}

impl RecordingSurface {
    fn visible(&self) -> BTreeSet<usize> {
        self.visibility
            .iter()
            .filter(|(_, visible)| **visible)
            .map(|(index, _)| *index)
            .collect()
    }
}

impl MapSurface for RecordingSurface {
    fn set_overlays(&mut self, overlays: &[RouteOverlay]) {
        self.overlays = overlays.to_vec();
        self.visibility.clear();
        self.overlay_pushes += 1;
    }

    fn set_visibility(&mut self, index: usize, visible: bool) {
        self.visibility.insert(index, visible);
    }

    fn show_popup(&mut self, popup: Option<&HoverPopup>) {
        self.popup = popup.cloned();
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.bounds = Some(bounds);
    }

    fn render_cards(&mut self, cards: &[RouteCard]) {
        self.cards = cards.to_vec();
    }

    fn set_selected_card(&mut self, index: Option<usize>) {
        self.selected_card = index;
    }

    fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}

type Coordinator = InteractionCoordinator<RecordingSurface>;

fn record(index: usize, crashes: u32, length_km: f64) -> RouteRecord {
    // Each route gets a short diagonal line offset by its index.
    let offset = index as f64 * 0.01;
    RouteRecord {
        index,
        crashes,
        length_km,
        wkt: format!(
            "LINESTRING(-105.0 {}, -104.99 {})",
            39.70 + offset,
            39.75 + offset
        ),
    }
}

fn response(records: Vec<RouteRecord>) -> RankResponse {
    RankResponse {
        winner: None,
        routes_ranked: records,
    }
}

/// Three routes: winner 1, then 2 (moderate), then 0 (high).
fn scenario_response() -> RankResponse {
    response(vec![record(0, 5, 4.0), record(1, 2, 3.0), record(2, 2, 5.0)])
}

fn request() -> RankRequest {
    RankRequest::new(Coord::new(-105.1, 39.6), Coord::new(-104.9, 39.8))
}

fn coordinator() -> Coordinator {
    InteractionCoordinator::new(RecordingSurface::default())
}

/// Coordinator with [`scenario_response`] already applied.
fn loaded() -> Coordinator {
    let mut c = coordinator();
    let ticket = c.begin_request(&request());
    assert_eq!(
        c.apply_response(ticket, Ok(scenario_response())),
        ApplyOutcome::Applied { routes: 3 }
    );
    c
}

fn hover(at_index: usize) -> PointerEvent {
    PointerEvent::MapHover {
        index: at_index,
        at: Coord::new(-105.0, 39.72),
    }
}

fn visible(c: &Coordinator) -> BTreeSet<usize> {
    c.surface().visible()
}

fn set(indices: &[usize]) -> BTreeSet<usize> {
    indices.iter().copied().collect()
}
