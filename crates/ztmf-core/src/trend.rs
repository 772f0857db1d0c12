//! Score trend between two consecutive datacalls.
//!
//! A change smaller than [`FLAT_THRESHOLD`] in either direction counts as
//! "no significant change", whatever the sign of the percentage.
//!
//! A previous score of `0.0` is *not* treated as missing: the percentage
//! divides by zero and renders as `Infinity` or `NaN`. Callers that want the
//! "no previous data" presentation must pass `None`.

use crate::format::{format_percent, to_fixed};

/// Absolute score change below which a trend is reported as flat.
pub const FLAT_THRESHOLD: f64 = 0.05;

pub const COLOR_UP: &str = "#66BB6A";
pub const COLOR_DOWN: &str = "#EF5350";
pub const COLOR_FLAT: &str = "#FFA726";

/// Direction of a score change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Flat,
    /// No previous score to compare against.
    None,
}

impl Direction {
    /// Arrow shown next to the score.
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Up => "↗",
            Self::Down => "↘",
            Self::Flat => "→",
            Self::None => "",
        }
    }
}

/// Classified change between a current and a previous score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trend {
    pub direction: Direction,
    pub color: Option<&'static str>,
    /// `current - previous`.
    pub difference: f64,
    /// `|difference|`.
    pub magnitude: f64,
    /// Percentage change relative to the previous score, one decimal.
    pub percent: f64,
}

/// Compare `current` against `previous`.
pub fn trend(current: f64, previous: Option<f64>) -> Trend {
    let Some(previous) = previous else {
        return Trend {
            direction: Direction::None,
            color: None,
            difference: 0.0,
            magnitude: 0.0,
            percent: 0.0,
        };
    };

    let difference = current - previous;
    let raw = (difference / previous) * 100.0;
    let percent = format_percent(raw).parse().unwrap_or(raw);

    let (direction, color) = if difference.abs() < FLAT_THRESHOLD {
        (Direction::Flat, COLOR_FLAT)
    } else if difference > 0.0 {
        (Direction::Up, COLOR_UP)
    } else {
        (Direction::Down, COLOR_DOWN)
    };

    Trend {
        direction,
        color: Some(color),
        difference,
        magnitude: difference.abs(),
        percent,
    }
}

impl Trend {
    pub fn is_none(&self) -> bool {
        self.direction == Direction::None
    }

    /// Percentage with one decimal, e.g. `100.0` or `-50.0`.
    pub fn percent_text(&self) -> String {
        format_percent(self.percent)
    }

    /// Magnitude with two decimals.
    pub fn magnitude_text(&self) -> String {
        to_fixed(self.magnitude, 2)
    }

    /// Full sentence describing the change; empty when there is nothing to
    /// compare against.
    pub fn text(&self) -> String {
        let pct = self.percent_text();
        match self.direction {
            Direction::None => String::new(),
            Direction::Flat => {
                let sign = if self.percent >= 0.0 { "+" } else { "" };
                format!("No significant change ({sign}{pct}%)")
            }
            Direction::Up => format!("Improved by {} (+{pct}%)", to_fixed(self.difference, 2)),
            Direction::Down => format!("Decreased by {} ({pct}%)", self.magnitude_text()),
        }
    }

    /// Short form used on pillar cards: `+0.50 (+25.0%)`.
    pub fn compact_text(&self) -> String {
        self.text()
            .replacen("Improved by ", "+", 1)
            .replacen("Decreased by ", "-", 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn missing_previous_has_no_trend() {
        let t = trend(2.0, None);
        assert_eq!(t.direction, Direction::None);
        assert_eq!(t.color, None);
        assert_eq!(t.text(), "");
        assert_eq!(t.direction.glyph(), "");
    }

    #[test]
    fn doubling_is_up_by_one_hundred_percent() {
        let t = trend(4.0, Some(2.0));
        assert_eq!(t.direction, Direction::Up);
        assert_eq!(t.magnitude_text(), "2.00");
        assert_eq!(t.percent_text(), "100.0");
        assert_eq!(t.text(), "Improved by 2.00 (+100.0%)");
        assert_eq!(t.compact_text(), "+2.00 (+100.0%)");
        assert_eq!(t.color, Some(COLOR_UP));
    }

    #[test]
    fn halving_is_down_by_fifty_percent() {
        let t = trend(2.0, Some(4.0));
        assert_eq!(t.direction, Direction::Down);
        assert_eq!(t.magnitude_text(), "2.00");
        assert_eq!(t.percent_text(), "-50.0");
        assert_eq!(t.text(), "Decreased by 2.00 (-50.0%)");
        assert_eq!(t.compact_text(), "-2.00 (-50.0%)");
    }

    #[test]
    fn small_changes_are_flat_in_both_directions() {
        let up = trend(2.04, Some(2.0));
        assert_eq!(up.direction, Direction::Flat);
        assert_eq!(up.text(), "No significant change (+2.0%)");

        let down = trend(1.97, Some(2.0));
        assert_eq!(down.direction, Direction::Flat);
        assert_eq!(down.text(), "No significant change (-1.5%)");
        assert_eq!(down.color, Some(COLOR_FLAT));
    }

    #[test]
    fn threshold_itself_is_significant() {
        let t = trend(2.5, Some(2.0));
        assert_eq!(t.direction, Direction::Up);
        let t = trend(2.0, Some(2.06));
        assert_eq!(t.direction, Direction::Down);
    }

    #[test]
    fn exact_ties_round_up_in_text() {
        let t = trend(2.125, Some(2.0));
        assert_eq!(t.text(), "Improved by 0.13 (+6.3%)");
        assert!((t.percent - 6.3).abs() < 1e-9);

        let t = trend(2.0, Some(2.125));
        assert_eq!(t.magnitude_text(), "0.13");
    }

    #[test]
    fn zero_previous_keeps_division_artifacts() {
        let t = trend(2.0, Some(0.0));
        assert_eq!(t.direction, Direction::Up);
        assert_eq!(t.text(), "Improved by 2.00 (+Infinity%)");

        let t = trend(0.0, Some(0.0));
        assert_eq!(t.direction, Direction::Flat);
        assert_eq!(t.text(), "No significant change (NaN%)");
    }

    proptest! {
        #[test]
        fn equal_scores_are_flat(x in 0.01f64..4.0) {
            let t = trend(x, Some(x));
            prop_assert_eq!(t.direction, Direction::Flat);
            prop_assert!(t.magnitude.abs() < f64::EPSILON);
        }

        #[test]
        fn direction_matches_sign_of_large_changes(a in 0.5f64..4.0, b in 0.5f64..4.0) {
            let t = trend(a, Some(b));
            if (a - b).abs() >= FLAT_THRESHOLD {
                let expected = if a > b { Direction::Up } else { Direction::Down };
                prop_assert_eq!(t.direction, expected);
            }
        }
    }
}
