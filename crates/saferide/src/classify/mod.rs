pub mod color;

use std::cmp::Ordering;
use std::fmt;

use crate::geometry::Coord;
use color::{RouteColor, gradient_color};

/// A candidate route as returned by the routing service. Immutable once received.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Identity of the route within one response: unique, zero-based, contiguous.
    pub index: usize,
    pub geometry: Vec<Coord>,
    pub crashes: u32,
    pub length_km: f64,
}

impl Route {
    /// Safety ordering: fewer crashes first, then shorter, then lower index.
    pub fn risk_cmp(&self, other: &Route) -> Ordering {
        self.crashes
            .cmp(&other.crashes)
            .then_with(|| self.length_km.total_cmp(&other.length_km))
            .then(self.index.cmp(&other.index))
    }
}

/// Coarse classification used for card styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskTier {
    Winner,
    Moderate,
    High,
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Winner => write!(f, "winner"),
            Self::Moderate => write!(f, "moderate"),
            Self::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedRoute {
    pub route: Route,
    pub is_winner: bool,
    pub risk_tier: RiskTier,
    /// Position among non-winners in safety order; `None` for the winner.
    pub risk_rank: Option<usize>,
    pub color: RouteColor,
}

impl RankedRoute {
    pub fn index(&self) -> usize {
        self.route.index
    }
}

/// Output of [`classify`]: routes in tier order, winner first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub routes: Vec<RankedRoute>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn winner(&self) -> Option<&RankedRoute> {
        self.routes.iter().find(|r| r.is_winner)
    }

    pub fn get(&self, index: usize) -> Option<&RankedRoute> {
        self.routes.iter().find(|r| r.route.index == index)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Routes ordered by their `index`, the order overlays are created in.
    pub fn by_index(&self) -> Vec<&RankedRoute> {
        let mut routes: Vec<&RankedRoute> = self.routes.iter().collect();
        routes.sort_by_key(|r| r.route.index);
        routes
    }
}

/// Rank a route set: pick the winner, assign risk tiers, and derive line colors.
///
/// The winner is `declared_winner` when it names a route in the set; otherwise the route
/// that sorts first under [`Route::risk_cmp`]. Non-winners are ranked by the same order.
/// Rank 0 is [`RiskTier::Moderate`], every later rank is [`RiskTier::High`]. Colors follow
/// the finer-grained rank gradient from [`gradient_color`].
///
/// An empty input produces an empty classification.
pub fn classify(routes: Vec<Route>, declared_winner: Option<usize>) -> Classification {
    let num_routes = routes.len();
    let mut sorted = routes;
    sorted.sort_by(Route::risk_cmp);

    let winner_pos = declared_winner
        .and_then(|w| sorted.iter().position(|r| r.index == w))
        .or((!sorted.is_empty()).then_some(0));

    let Some(winner_pos) = winner_pos else {
        return Classification::default();
    };

    let winner = sorted.remove(winner_pos);
    let mut ranked = Vec::with_capacity(num_routes);
    ranked.push(RankedRoute {
        route: winner,
        is_winner: true,
        risk_tier: RiskTier::Winner,
        risk_rank: None,
        color: gradient_color(num_routes, None),
    });

    for (rank, route) in sorted.into_iter().enumerate() {
        ranked.push(RankedRoute {
            route,
            is_winner: false,
            risk_tier: if rank == 0 {
                RiskTier::Moderate
            } else {
                RiskTier::High
            },
            risk_rank: Some(rank),
            color: gradient_color(num_routes, Some(rank)),
        });
    }

    Classification { routes: ranked }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn route(index: usize, crashes: u32, length_km: f64) -> Route {
        Route {
            index,
            geometry: Vec::new(),
            crashes,
            length_km,
        }
    }

    fn tier_of(c: &Classification, index: usize) -> RiskTier {
        c.get(index).unwrap().risk_tier
    }

    #[test]
    fn test_empty_input() {
        let c = classify(Vec::new(), None);
        assert!(c.is_empty());
        assert!(c.winner().is_none());

        let c = classify(Vec::new(), Some(0));
        assert!(c.is_empty());
    }

    #[test]
    fn test_scenario_crash_tie_broken_by_length() {
        let c = classify(
            vec![route(0, 5, 4.0), route(1, 2, 3.0), route(2, 2, 5.0)],
            None,
        );
        assert_eq!(c.winner().unwrap().index(), 1);
        assert_eq!(tier_of(&c, 1), RiskTier::Winner);
        assert_eq!(tier_of(&c, 2), RiskTier::Moderate);
        assert_eq!(tier_of(&c, 0), RiskTier::High);
        let order: Vec<usize> = c.routes.iter().map(|r| r.index()).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_full_tie_broken_by_index() {
        let c = classify(vec![route(2, 1, 1.0), route(0, 1, 1.0), route(1, 1, 1.0)], None);
        assert_eq!(c.winner().unwrap().index(), 0);
        assert_eq!(tier_of(&c, 1), RiskTier::Moderate);
        assert_eq!(tier_of(&c, 2), RiskTier::High);
    }

    #[test]
    fn test_declared_winner_is_honoured() {
        let c = classify(vec![route(0, 1, 1.0), route(1, 9, 9.0)], Some(1));
        assert_eq!(c.winner().unwrap().index(), 1);
        assert_eq!(tier_of(&c, 0), RiskTier::Moderate);
    }

    #[test]
    fn test_out_of_range_declared_winner_falls_back() {
        let c = classify(vec![route(0, 3, 1.0), route(1, 2, 1.0)], Some(7));
        assert_eq!(c.winner().unwrap().index(), 1);
    }

    #[test]
    fn test_two_routes_never_high() {
        let c = classify(vec![route(0, 3, 1.0), route(1, 9, 1.0)], None);
        assert_eq!(tier_of(&c, 0), RiskTier::Winner);
        assert_eq!(tier_of(&c, 1), RiskTier::Moderate);
        assert_eq!(c.get(1).unwrap().color, RouteColor::Danger);
    }

    #[test]
    fn test_colors_follow_rank_not_index() {
        // Route 3 is the safest non-winner despite the highest index.
        let c = classify(
            vec![
                route(0, 0, 1.0),
                route(1, 8, 1.0),
                route(2, 5, 1.0),
                route(3, 1, 1.0),
            ],
            None,
        );
        assert_eq!(c.get(0).unwrap().color, RouteColor::Safe);
        assert_eq!(c.get(3).unwrap().color.hue(), 60.0);
        assert_eq!(c.get(2).unwrap().color.hue(), 30.0);
        assert_eq!(c.get(1).unwrap().color.hue(), 0.0);
        // Tiers stay two-level even though colors are three-level.
        assert_eq!(tier_of(&c, 3), RiskTier::Moderate);
        assert_eq!(tier_of(&c, 2), RiskTier::High);
        assert_eq!(tier_of(&c, 1), RiskTier::High);
    }

    #[test]
    fn test_by_index_orders_overlays() {
        let c = classify(vec![route(0, 5, 1.0), route(1, 0, 1.0)], None);
        let indices: Vec<usize> = c.by_index().iter().map(|r| r.index()).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    fn arb_routes() -> impl Strategy<Value = Vec<Route>> {
        prop::collection::vec((0u32..6, 0u32..40), 1..8).prop_map(|pairs| {
            pairs
                .into_iter()
                .enumerate()
                .map(|(i, (crashes, tenths))| route(i, crashes, tenths as f64 / 10.0))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn exactly_one_winner(routes in arb_routes(), declared in prop::option::of(0usize..10)) {
            let n = routes.len();
            let c = classify(routes, declared);
            prop_assert_eq!(c.len(), n);
            let winners: Vec<&RankedRoute> = c.routes.iter().filter(|r| r.is_winner).collect();
            prop_assert_eq!(winners.len(), 1);
            prop_assert_eq!(winners[0].risk_tier, RiskTier::Winner);
        }

        #[test]
        fn best_non_winner_is_moderate(routes in arb_routes()) {
            let c = classify(routes, None);
            let mut non_winners: Vec<&RankedRoute> =
                c.routes.iter().filter(|r| !r.is_winner).collect();
            non_winners.sort_by(|a, b| a.route.risk_cmp(&b.route));
            for (i, r) in non_winners.iter().enumerate() {
                let expected = if i == 0 { RiskTier::Moderate } else { RiskTier::High };
                prop_assert_eq!(r.risk_tier, expected);
            }
        }
    }
}
