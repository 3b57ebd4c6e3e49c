use std::fmt;

/// Display color for a route line.
///
/// Winners get a fixed safe green. Non-winners sit on a caution-to-danger scale by their
/// risk rank; see [`gradient_color`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouteColor {
    Safe,
    Caution,
    Danger,
    /// Point on the yellow (60°) to red (0°) hue ramp used for three or more non-winners.
    Gradient { hue: f64 },
}

/// Hue of the start of the caution-to-danger ramp.
pub const CAUTION_RAMP_HUE: f64 = 60.0;

impl RouteColor {
    /// CSS color string as consumed by the map style.
    pub fn css(&self) -> String {
        match self {
            Self::Safe => "#10b981".to_string(),
            Self::Caution => "#f59e0b".to_string(),
            Self::Danger => "#ef4444".to_string(),
            Self::Gradient { hue } => format!("hsl({hue}, 100%, 50%)"),
        }
    }

    /// Hue in degrees. Lower is more dangerous for non-winner colors.
    pub fn hue(&self) -> f64 {
        match self {
            Self::Safe => 160.0,
            Self::Caution => 38.0,
            Self::Danger => 0.0,
            Self::Gradient { hue } => *hue,
        }
    }

    /// 8-bit RGB triple.
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Self::Safe => (0x10, 0xb9, 0x81),
            Self::Caution => (0xf5, 0x9e, 0x0b),
            Self::Danger => (0xef, 0x44, 0x44),
            Self::Gradient { hue } => hsl_to_rgb(*hue, 1.0, 0.5),
        }
    }
}

impl fmt::Display for RouteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.css())
    }
}

/// Color for a route given the size of the set, the winner position, and the route's
/// rank among non-winners.
///
/// - `rank == None` marks the winner: always [`RouteColor::Safe`].
/// - One non-winner: it is [`RouteColor::Danger`].
/// - Two non-winners: rank 0 is [`RouteColor::Caution`], rank 1 is [`RouteColor::Danger`].
/// - Three or more: hue falls linearly from 60° at rank 0 to 0° at the last rank.
pub fn gradient_color(num_routes: usize, rank: Option<usize>) -> RouteColor {
    let Some(rank) = rank else {
        return RouteColor::Safe;
    };
    let non_winners = num_routes.saturating_sub(1);
    match non_winners {
        0 | 1 => RouteColor::Danger,
        2 => {
            if rank == 0 {
                RouteColor::Caution
            } else {
                RouteColor::Danger
            }
        }
        n => {
            let ratio = rank.min(n - 1) as f64 / (n - 1) as f64;
            RouteColor::Gradient {
                hue: CAUTION_RAMP_HUE - ratio * CAUTION_RAMP_HUE,
            }
        }
    }
}

fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(r), to_byte(g), to_byte(b))
}
