pub mod surface;

#[cfg(test)]
mod tests;

use tracing::{debug, info};

use crate::api::{RankRequest, RankResponse};
use crate::cards::{HoverPopup, build_cards};
use crate::classify::{Classification, classify};
use crate::error::{Result, SafeRideError};
use crate::geometry::{Bounds, Coord};
use crate::visibility::{VisibilityMode, VisibilitySelector, VisibilityState};
use surface::{MapSurface, RouteOverlay};

/// Pointer input, already resolved to a route index by the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer is over a route line at `at`. Fired repeatedly while moving.
    MapHover { index: usize, at: Coord },
    /// Pointer is over the map but not over any route line.
    MapHoverEnd,
    CardHover(usize),
    CardHoverEnd,
    AllRoutesClick,
    CardClick(usize),
}

/// Handle for one routing request. Responses are applied only if their ticket is newer
/// than the last one applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestTicket {
    seq: u64,
    origin: Coord,
    destination: Coord,
}

impl RequestTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied { routes: usize },
    /// The request failed; the previous routes stay on screen.
    Failed,
    /// A newer response was already applied; this one was dropped.
    Stale,
}

/// State owned by one applied route set. Replaced wholesale on every new response.
#[derive(Debug, Clone)]
struct Session {
    classification: Classification,
    selector: VisibilitySelector,
    map_hover: Option<(usize, Coord)>,
    card_hover: Option<usize>,
    origin: Coord,
    destination: Coord,
}

impl Session {
    fn new(classification: Classification, origin: Coord, destination: Coord) -> Self {
        let mut selector = VisibilitySelector::new();
        selector.reset();
        Self {
            classification,
            selector,
            map_hover: None,
            card_hover: None,
            origin,
            destination,
        }
    }

    /// Route the active hover shows. A map hover takes precedence over a card hover.
    fn hovered(&self) -> Option<usize> {
        self.map_hover.map(|(index, _)| index).or(self.card_hover)
    }

    /// Bring the selector in line with the hover slots after one of them changed.
    ///
    /// The selector holds at most one hover on top of the baseline, so the two slots can
    /// start and end in any order.
    fn retarget_hover(&mut self, before: Option<usize>) {
        match (before, self.hovered()) {
            (Some(old), Some(new)) if old == new => {}
            (Some(_), Some(new)) => {
                self.selector.hover_leave();
                self.selector.hover_enter(new);
            }
            (None, Some(new)) => self.selector.hover_enter(new),
            (Some(_), None) => self.selector.hover_leave(),
            (None, None) => {}
        }
    }

    /// A click replaces the baseline; a hover still in progress stays on top of it.
    fn rehover(&mut self) {
        if let Some(index) = self.hovered() {
            self.selector.hover_enter(index);
        }
    }

    fn popup(&self) -> Option<HoverPopup> {
        let (index, anchor) = match (self.map_hover, self.card_hover) {
            (Some((index, at)), _) => (index, Some(at)),
            (None, Some(index)) => (index, None),
            (None, None) => return None,
        };
        let route = self.classification.get(index)?;
        let winner = self.classification.winner()?;
        Some(HoverPopup::for_route(route, winner, anchor))
    }

    fn bounds(&self) -> Option<Bounds> {
        let route_points = self
            .classification
            .routes
            .iter()
            .flat_map(|r| r.route.geometry.iter().copied());
        Bounds::covering(route_points.chain([self.origin, self.destination]))
    }
}

/// Connects routing responses and pointer events to the classifier, the visibility
/// state machine, and a [`MapSurface`].
pub struct InteractionCoordinator<S: MapSurface> {
    surface: S,
    session: Option<Session>,
    next_seq: u64,
    last_seen: Option<u64>,
}

impl<S: MapSurface> InteractionCoordinator<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            session: None,
            next_seq: 1,
            last_seen: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn classification(&self) -> Option<&Classification> {
        self.session.as_ref().map(|s| &s.classification)
    }

    pub fn visibility(&self) -> Option<VisibilityState> {
        self.session.as_ref().map(|s| s.selector.state())
    }

    /// Issue a ticket for a new routing request. Tickets are strictly increasing.
    pub fn begin_request(&mut self, request: &RankRequest) -> RequestTicket {
        let ticket = RequestTicket {
            seq: self.next_seq,
            origin: request.start,
            destination: request.end,
        };
        self.next_seq += 1;
        self.surface.set_status("Requesting routes…");
        self.surface.flush();
        debug!(seq = ticket.seq, "routing request issued");
        ticket
    }

    /// Apply the outcome of a routing request.
    ///
    /// A response whose ticket is not newer than the newest one already seen is dropped.
    /// Failures only update the status line; the previous routes stay as they were.
    pub fn apply_response(
        &mut self,
        ticket: RequestTicket,
        result: Result<RankResponse>,
    ) -> ApplyOutcome {
        if self.last_seen.is_some_and(|seen| ticket.seq <= seen) {
            debug!(
                seq = ticket.seq,
                last_seen = ?self.last_seen,
                "discarding stale routing response"
            );
            return ApplyOutcome::Stale;
        }
        self.last_seen = Some(ticket.seq);

        let response = match result {
            Ok(response) if response.routes_ranked.is_empty() => {
                return self.fail(&SafeRideError::EmptyRouteSet);
            }
            Ok(response) => response,
            Err(err) => return self.fail(&err),
        };

        let (routes, declared_winner) = response.into_routes();
        let classification = classify(routes, declared_winner);
        let count = classification.len();
        self.session = Some(Session::new(
            classification,
            ticket.origin,
            ticket.destination,
        ));
        self.render_all();
        info!(seq = ticket.seq, routes = count, "applied routing response");
        ApplyOutcome::Applied { routes: count }
    }

    /// Route a pointer event. Events for indices outside the current route set, or that
    /// arrive before any routes are shown, are ignored.
    pub fn handle(&mut self, event: PointerEvent) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match event {
            PointerEvent::MapHover { index, at } => {
                if !session.classification.contains(index) {
                    debug!(index, "ignoring hover over unknown route");
                    return;
                }
                let before = session.hovered();
                session.map_hover = Some((index, at));
                session.retarget_hover(before);
            }
            PointerEvent::MapHoverEnd => {
                let before = session.hovered();
                if session.map_hover.take().is_none() {
                    return;
                }
                session.retarget_hover(before);
            }
            PointerEvent::CardHover(index) => {
                if !session.classification.contains(index) || session.card_hover == Some(index) {
                    return;
                }
                let before = session.hovered();
                session.card_hover = Some(index);
                session.retarget_hover(before);
            }
            PointerEvent::CardHoverEnd => {
                let before = session.hovered();
                if session.card_hover.take().is_none() {
                    return;
                }
                session.retarget_hover(before);
            }
            PointerEvent::AllRoutesClick => {
                session.selector.select_all();
                session.rehover();
            }
            PointerEvent::CardClick(index) => {
                if !session.classification.contains(index) {
                    debug!(index, "ignoring click on unknown route");
                    return;
                }
                session.selector.select_one(index);
                session.rehover();
            }
        }
        self.push_visibility();
    }

    fn fail(&mut self, err: &SafeRideError) -> ApplyOutcome {
        info!("routing request failed: {err}");
        self.surface.set_status(&format!("Error: {err}"));
        self.surface.flush();
        ApplyOutcome::Failed
    }

    fn render_all(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let classification = &session.classification;
        let overlays: Vec<RouteOverlay> = classification
            .by_index()
            .into_iter()
            .map(RouteOverlay::from_ranked)
            .collect();
        self.surface.set_overlays(&overlays);
        self.surface.render_cards(&build_cards(classification));
        if let Some(bounds) = session.bounds() {
            self.surface.fit_bounds(bounds);
        }
        if let Some(winner) = classification.winner() {
            self.surface.set_status(&format!(
                "Loaded {} route(s). Winner: Route {}",
                classification.len(),
                winner.index() + 1
            ));
        }
        self.push_visibility();
    }

    fn push_visibility(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        // Indices may have gaps, so `All` is resolved against the routes actually present.
        let mode = session.selector.state().mode;
        for route in session.classification.by_index() {
            let index = route.index();
            let visible = match mode {
                VisibilityMode::All => true,
                VisibilityMode::Single { active } => active == index,
            };
            self.surface.set_visibility(index, visible);
        }
        self.surface.set_selected_card(session.selector.state().sticky);
        let popup = session.popup();
        self.surface.show_popup(popup.as_ref());
        self.surface.flush();
    }
}
