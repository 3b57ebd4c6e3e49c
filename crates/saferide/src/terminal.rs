use std::collections::BTreeMap;
use std::io::Write;

use colored::Colorize;

use saferide::cards::{HoverPopup, RouteCard};
use saferide::coordinator::surface::{MapSurface, RouteOverlay};
use saferide::geometry::Bounds;

/// Draws coordinator instructions as text.
///
/// Instructions are collected and printed as one frame on `flush`. A flush that only
/// changed the status line prints just that line.
pub struct TerminalSurface<W: Write> {
    out: W,
    quiet: bool,
    overlays: Vec<RouteOverlay>,
    visible: BTreeMap<usize, bool>,
    cards: Vec<RouteCard>,
    selected: Option<usize>,
    popup: Option<HoverPopup>,
    bounds: Option<Bounds>,
    status: Option<String>,
    frame_dirty: bool,
    status_dirty: bool,
}

impl TerminalSurface<std::io::Stdout> {
    pub fn stdout(quiet: bool) -> Self {
        Self::new(std::io::stdout(), quiet)
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, quiet: bool) -> Self {
        Self {
            out,
            quiet,
            overlays: Vec::new(),
            visible: BTreeMap::new(),
            cards: Vec::new(),
            selected: None,
            popup: None,
            bounds: None,
            status: None,
            frame_dirty: false,
            status_dirty: false,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_frame(&mut self) -> std::io::Result<()> {
        if let Some(status) = &self.status {
            writeln!(self.out, "{}", status_line(status))?;
        }
        if let Some(bounds) = self.bounds.filter(|_| !self.quiet) {
            writeln!(
                self.out,
                "{}",
                format!("Map view: {} to {}", bounds.min, bounds.max).dimmed()
            )?;
        }

        writeln!(self.out)?;
        for overlay in &self.overlays {
            let shown = self.visible.get(&overlay.index).copied().unwrap_or(true);
            let (r, g, b) = overlay.color.rgb();
            let line = if shown {
                "━━━━".truecolor(r, g, b).bold()
            } else {
                "┄┄┄┄".dimmed()
            };
            writeln!(
                self.out,
                "  {line} {} {}",
                overlay.layer_id(),
                if shown { "shown".normal() } else { "hidden".dimmed() }
            )?;
        }

        writeln!(self.out)?;
        for card in &self.cards {
            let selected = card.index().is_some() && card.index() == self.selected;
            let marker = if selected { "▶" } else { " " };
            let title = if selected {
                card.title().bold().underline()
            } else {
                card.title().bold()
            };
            writeln!(self.out, "{marker} {title}  {}", card.badge())?;
            writeln!(self.out, "    {}", card.stats())?;
            if self.quiet {
                continue;
            }
            if let Some(suggestion) = card.suggestion() {
                writeln!(self.out, "    {}", suggestion.italic())?;
            }
            if let RouteCard::Route { comparison, .. } = card {
                for line in comparison {
                    let mark = if line.better {
                        line.mark().green()
                    } else {
                        line.mark().red()
                    };
                    writeln!(self.out, "    {mark} {}", line.text)?;
                }
            }
        }

        if let Some(popup) = &self.popup {
            writeln!(self.out)?;
            let anchor = popup
                .anchor
                .map(|at| format!(" @ {at}"))
                .unwrap_or_default();
            writeln!(self.out, "┌ {}{}", popup.heading().bold(), anchor.dimmed())?;
            writeln!(self.out, "│ {}", popup.stats())?;
            if let Some(explanation) = popup.explanation() {
                writeln!(self.out, "│ {explanation}")?;
            }
            writeln!(self.out, "└")?;
        }
        self.out.flush()
    }
}

fn status_line(status: &str) -> colored::ColoredString {
    if status.starts_with("Error:") {
        status.red().bold()
    } else if status.starts_with("Loaded") {
        status.green()
    } else {
        status.normal()
    }
}

impl<W: Write> MapSurface for TerminalSurface<W> {
    fn set_overlays(&mut self, overlays: &[RouteOverlay]) {
        self.overlays = overlays.to_vec();
        self.visible.clear();
        self.frame_dirty = true;
    }

    fn set_visibility(&mut self, index: usize, visible: bool) {
        if self.visible.insert(index, visible) != Some(visible) {
            self.frame_dirty = true;
        }
    }

    fn show_popup(&mut self, popup: Option<&HoverPopup>) {
        let popup = popup.cloned();
        if popup != self.popup {
            self.popup = popup;
            self.frame_dirty = true;
        }
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.bounds = Some(bounds);
        self.frame_dirty = true;
    }

    fn render_cards(&mut self, cards: &[RouteCard]) {
        self.cards = cards.to_vec();
        self.frame_dirty = true;
    }

    fn set_selected_card(&mut self, index: Option<usize>) {
        if self.selected != index {
            self.selected = index;
            self.frame_dirty = true;
        }
    }

    fn set_status(&mut self, status: &str) {
        if self.status.as_deref() != Some(status) {
            self.status = Some(status.to_string());
            self.status_dirty = true;
        }
    }

    fn flush(&mut self) {
        let result = if self.frame_dirty {
            self.write_frame()
        } else if self.status_dirty && !self.quiet {
            let line = self.status.as_deref().map(status_line);
            match line {
                Some(line) => writeln!(self.out, "{line}").and_then(|_| self.out.flush()),
                None => Ok(()),
            }
        } else {
            Ok(())
        };
        if let Err(e) = result {
            tracing::warn!("failed to write to terminal: {e}");
        }
        self.frame_dirty = false;
        self.status_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saferide::api::{RankRequest, RankResponse};
    use saferide::coordinator::{InteractionCoordinator, PointerEvent};
    use saferide::geometry::Coord;

    const BODY: &str = r#"{
        "winner": 1,
        "routes_ranked": [
            {"index": 0, "crashes": 5, "length_km": 4.0, "wkt": "LINESTRING(-105.0 39.75, -104.99 39.76)"},
            {"index": 1, "crashes": 2, "length_km": 3.0, "wkt": "LINESTRING(-105.0 39.75, -104.98 39.76)"}
        ]
    }"#;

    fn rendered(events: &[PointerEvent]) -> String {
        colored::control::set_override(false);
        let mut coordinator = InteractionCoordinator::new(TerminalSurface::new(Vec::new(), false));
        let request = RankRequest::new(Coord::new(-105.0, 39.75), Coord::new(-104.99, 39.76));
        let ticket = coordinator.begin_request(&request);
        coordinator.apply_response(ticket, RankResponse::from_json(BODY));
        for event in events {
            coordinator.handle(*event);
        }
        String::from_utf8(coordinator.into_surface().into_inner()).unwrap()
    }

    #[test]
    fn test_frame_lists_routes_and_cards() {
        let out = rendered(&[]);
        assert!(out.starts_with("Requesting routes…\n"));
        assert!(out.contains("Loaded 2 route(s). Winner: Route 2"));
        assert!(out.contains("route-0 shown"));
        assert!(out.contains("route-1 shown"));
        assert!(out.contains("📍 All Routes"));
        assert!(out.contains("Route 2  🏆 Best Route"));
        assert!(out.contains("✗ Safety: +3 more crashes vs safest route"));
    }

    #[test]
    fn test_select_hides_other_routes() {
        let out = rendered(&[PointerEvent::CardClick(0)]);
        let last_frame = out.rsplit("Loaded").next().unwrap();
        assert!(last_frame.contains("route-0 shown"));
        assert!(last_frame.contains("route-1 hidden"));
        assert!(last_frame.contains("▶ Route 1"));
    }

    #[test]
    fn test_card_hover_prints_popup() {
        let out = rendered(&[PointerEvent::CardHover(0)]);
        assert!(out.contains("┌ Route 1 – Alternative Route"));
        assert!(out.contains("│ +3 more crashes | +1.0 km longer"));
    }
}
