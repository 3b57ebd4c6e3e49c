//! Text content for the route cards and the hover popup.
//!
//! Everything here is derived from a [`Classification`]; nothing is stored between
//! route sets.

use std::fmt;

use crate::classify::{Classification, RankedRoute, RiskTier};
use crate::geometry::Coord;

/// Signed difference of a route against the winner. Positive means worse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WinnerDelta {
    pub crashes: i64,
    pub length_km: f64,
}

impl WinnerDelta {
    pub fn between(route: &RankedRoute, winner: &RankedRoute) -> Self {
        Self {
            crashes: i64::from(route.route.crashes) - i64::from(winner.route.crashes),
            length_km: route.route.length_km - winner.route.length_km,
        }
    }

    pub fn more_crashes(&self) -> bool {
        self.crashes > 0
    }

    pub fn longer(&self) -> bool {
        self.length_km > 0.0
    }

    /// Popup phrasing: `+3 more crashes` / `2 fewer crashes`.
    pub fn crash_text(&self) -> String {
        if self.more_crashes() {
            format!("+{} more crashes", self.crashes)
        } else {
            format!("{} fewer crashes", self.crashes.abs())
        }
    }

    /// Card phrasing with singular/plural: `+1 more crash` / `2 fewer crashes`.
    pub fn crash_text_counted(&self) -> String {
        let n = self.crashes.abs();
        let noun = if n == 1 { "crash" } else { "crashes" };
        if self.more_crashes() {
            format!("+{n} more {noun}")
        } else {
            format!("{n} fewer {noun}")
        }
    }

    /// `+1.2 km longer` / `0.4 km shorter`.
    pub fn length_text(&self) -> String {
        if self.longer() {
            format!("+{:.1} km longer", self.length_km)
        } else {
            format!("{:.1} km shorter", self.length_km.abs())
        }
    }
}

/// Popup shown while hovering a route line or card.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverPopup {
    pub index: usize,
    pub is_winner: bool,
    pub length_km: f64,
    pub crashes: u32,
    /// `None` for the winner, which shows a fixed label instead.
    pub delta: Option<WinnerDelta>,
    /// Pointer position for map hovers; card hovers have no anchor on the map.
    pub anchor: Option<Coord>,
}

impl HoverPopup {
    pub fn for_route(route: &RankedRoute, winner: &RankedRoute, anchor: Option<Coord>) -> Self {
        Self {
            index: route.index(),
            is_winner: route.is_winner,
            length_km: route.route.length_km,
            crashes: route.route.crashes,
            delta: (!route.is_winner).then(|| WinnerDelta::between(route, winner)),
            anchor,
        }
    }

    pub fn label(&self) -> &'static str {
        if self.is_winner {
            "✓ Safest Route"
        } else {
            "Alternative Route"
        }
    }

    pub fn heading(&self) -> String {
        format!("Route {} – {}", self.index + 1, self.label())
    }

    pub fn stats(&self) -> String {
        format!("📏 {:.2} km | ⚠️ {} crashes", self.length_km, self.crashes)
    }

    pub fn explanation(&self) -> Option<String> {
        self.delta
            .map(|d| format!("{} | {}", d.crash_text(), d.length_text()))
    }
}

impl fmt::Display for HoverPopup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.heading(), self.stats())?;
        if let Some(explanation) = self.explanation() {
            write!(f, "\n{explanation}")?;
        }
        Ok(())
    }
}

/// One comparison row on a route card.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonLine {
    pub better: bool,
    pub text: String,
}

impl ComparisonLine {
    fn new(better: bool, text: impl Into<String>) -> Self {
        Self {
            better,
            text: text.into(),
        }
    }

    pub fn mark(&self) -> &'static str {
        if self.better { "✓" } else { "✗" }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteCard {
    /// Synthetic card that shows every route when clicked.
    AllRoutes {
        count: usize,
        min_crashes: u32,
        max_crashes: u32,
    },
    Route {
        index: usize,
        tier: RiskTier,
        length_km: f64,
        crashes: u32,
        comparison: Vec<ComparisonLine>,
    },
}

impl RouteCard {
    /// Route index a card stands for; `None` for the "All Routes" card.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::AllRoutes { .. } => None,
            Self::Route { index, .. } => Some(*index),
        }
    }

    pub fn title(&self) -> String {
        match self {
            Self::AllRoutes { .. } => "📍 All Routes".to_string(),
            Self::Route { index, .. } => format!("Route {}", index + 1),
        }
    }

    pub fn badge(&self) -> &'static str {
        match self {
            Self::AllRoutes { .. } => "👁️ View All",
            Self::Route { tier, .. } => match tier {
                RiskTier::Winner => "🏆 Best Route",
                RiskTier::Moderate => "⚠️ Average Risk",
                RiskTier::High => "🚨 Higher Risk",
            },
        }
    }

    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::AllRoutes { .. } => None,
            Self::Route { tier, .. } => Some(match tier {
                RiskTier::Winner => "Safest option with fewest crashes",
                RiskTier::Moderate => "Moderate safety profile",
                RiskTier::High => "More crashes on this route",
            }),
        }
    }

    pub fn stats(&self) -> String {
        match self {
            Self::AllRoutes {
                count,
                min_crashes,
                max_crashes,
            } => format!("📏 {count} routes available | ⚠️ {min_crashes}-{max_crashes} crashes"),
            Self::Route {
                length_km, crashes, ..
            } => format!("📏 {length_km:.2} km | ⚠️ {crashes} crashes"),
        }
    }
}

/// Build the card list: "All Routes" first, then one card per route in tier order.
///
/// Returns an empty list for an empty classification.
pub fn build_cards(classification: &Classification) -> Vec<RouteCard> {
    let Some(winner) = classification.winner() else {
        return Vec::new();
    };

    let crashes = classification.routes.iter().map(|r| r.route.crashes);
    let mut cards = Vec::with_capacity(classification.len() + 1);
    cards.push(RouteCard::AllRoutes {
        count: classification.len(),
        min_crashes: crashes.clone().min().unwrap_or(0),
        max_crashes: crashes.max().unwrap_or(0),
    });

    for route in &classification.routes {
        cards.push(RouteCard::Route {
            index: route.index(),
            tier: route.risk_tier,
            length_km: route.route.length_km,
            crashes: route.route.crashes,
            comparison: comparison_lines(route, winner),
        });
    }
    cards
}

fn comparison_lines(route: &RankedRoute, winner: &RankedRoute) -> Vec<ComparisonLine> {
    if route.is_winner {
        return vec![
            ComparisonLine::new(true, "Lowest crash count on record"),
            ComparisonLine::new(true, "Optimal balance of safety & distance"),
        ];
    }
    let delta = WinnerDelta::between(route, winner);
    vec![
        ComparisonLine::new(
            !delta.more_crashes(),
            format!("Safety: {} vs safest route", delta.crash_text_counted()),
        ),
        ComparisonLine::new(
            !delta.longer(),
            format!("Distance: {}", delta.length_text()),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Route, classify};

    fn route(index: usize, crashes: u32, length_km: f64) -> Route {
        Route {
            index,
            geometry: Vec::new(),
            crashes,
            length_km,
        }
    }

    fn sample() -> Classification {
        classify(
            vec![route(0, 5, 4.0), route(1, 2, 3.0), route(2, 3, 2.5)],
            None,
        )
    }

    #[test]
    fn test_cards_all_routes_first_then_tier_order() {
        let cards = build_cards(&sample());
        assert_eq!(cards.len(), 4);
        assert_eq!(
            cards[0],
            RouteCard::AllRoutes {
                count: 3,
                min_crashes: 2,
                max_crashes: 5
            }
        );
        let order: Vec<Option<usize>> = cards.iter().map(RouteCard::index).collect();
        assert_eq!(order, vec![None, Some(1), Some(2), Some(0)]);
        assert_eq!(cards[1].badge(), "🏆 Best Route");
        assert_eq!(cards[2].badge(), "⚠️ Average Risk");
        assert_eq!(cards[3].badge(), "🚨 Higher Risk");
    }

    #[test]
    fn test_card_comparison_text() {
        let cards = build_cards(&sample());
        let RouteCard::Route { comparison, .. } = &cards[2] else {
            panic!("expected route card");
        };
        assert_eq!(comparison[0].text, "Safety: +1 more crash vs safest route");
        assert!(!comparison[0].better);
        assert_eq!(comparison[1].text, "Distance: 0.5 km shorter");
        assert!(comparison[1].better);
    }

    #[test]
    fn test_winner_card_has_fixed_lines() {
        let cards = build_cards(&sample());
        let RouteCard::Route { comparison, .. } = &cards[1] else {
            panic!("expected route card");
        };
        assert_eq!(comparison[0].text, "Lowest crash count on record");
        assert!(comparison.iter().all(|c| c.better));
    }

    #[test]
    fn test_empty_classification_has_no_cards() {
        assert!(build_cards(&Classification::default()).is_empty());
    }

    #[test]
    fn test_popup_for_alternative() {
        let c = sample();
        let winner = c.winner().unwrap();
        let popup = HoverPopup::for_route(c.get(0).unwrap(), winner, None);
        assert_eq!(popup.heading(), "Route 1 – Alternative Route");
        assert_eq!(
            popup.explanation().as_deref(),
            Some("+3 more crashes | +1.0 km longer")
        );
    }

    #[test]
    fn test_popup_for_winner_has_no_delta() {
        let c = sample();
        let winner = c.winner().unwrap();
        let popup = HoverPopup::for_route(winner, winner, None);
        assert_eq!(popup.heading(), "Route 2 – ✓ Safest Route");
        assert!(popup.explanation().is_none());
        assert_eq!(popup.stats(), "📏 3.00 km | ⚠️ 2 crashes");
    }

    #[test]
    fn test_delta_zero_reads_as_fewer_and_shorter() {
        let d = WinnerDelta {
            crashes: 0,
            length_km: 0.0,
        };
        assert_eq!(d.crash_text(), "0 fewer crashes");
        assert_eq!(d.length_text(), "0.0 km shorter");
        assert_eq!(d.crash_text_counted(), "0 fewer crashes");
    }

    #[test]
    fn test_negative_delta_phrasing() {
        let d = WinnerDelta {
            crashes: -2,
            length_km: -1.26,
        };
        assert_eq!(d.crash_text(), "2 fewer crashes");
        assert_eq!(d.length_text(), "1.3 km shorter");
    }
}
