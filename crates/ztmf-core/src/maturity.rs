//! Maturity tier classification on the 0–4 scale.
//!
//! Band edges are inclusive on both ends and must not be changed: they decide
//! the colour every score is shown in. Values that fall between two bands
//! (for example `1.745`), at or below zero, above four, or NaN have no tier.

/// Named maturity band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    NoScore,
    Traditional,
    Initial,
    Advanced,
    Optimal,
}

impl Tier {
    pub fn label(self) -> &'static str {
        match self {
            Self::NoScore => "No Score",
            Self::Traditional => "Traditional",
            Self::Initial => "Initial",
            Self::Advanced => "Advanced",
            Self::Optimal => "Optimal",
        }
    }

    /// Background colour for chips and cards in this tier.
    pub fn background_color(self) -> &'static str {
        match self {
            Self::NoScore => "#f5f5f5",
            Self::Traditional => "#DAA9EC",
            Self::Initial => "#FFD5A5",
            Self::Advanced => "#F2FBC4",
            Self::Optimal => "#93F0ED",
        }
    }

    /// Foreground text colour.
    pub fn color(self) -> &'static str {
        match self {
            Self::NoScore => "#666666",
            _ => "#000000",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Tier plus its display colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Maturity {
    pub tier: Tier,
    pub color: &'static str,
    pub background_color: &'static str,
}

/// Classify a score.
pub fn maturity(score: f64) -> Maturity {
    let tier = classify(score);
    Maturity {
        tier,
        color: tier.color(),
        background_color: tier.background_color(),
    }
}

fn classify(score: f64) -> Tier {
    if (1.0..=1.74).contains(&score) {
        Tier::Traditional
    } else if (1.75..=2.74).contains(&score) {
        Tier::Initial
    } else if (2.75..=3.65).contains(&score) {
        Tier::Advanced
    } else if (3.66..=4.0).contains(&score) {
        Tier::Optimal
    } else {
        Tier::NoScore
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn optimal_boundary_is_exact() {
        assert_eq!(maturity(3.66).tier, Tier::Optimal);
        assert_eq!(maturity(3.65).tier, Tier::Advanced);
        assert_eq!(maturity(4.0).tier, Tier::Optimal);
    }

    #[test]
    fn lower_band_edges() {
        assert_eq!(maturity(1.0).tier, Tier::Traditional);
        assert_eq!(maturity(1.74).tier, Tier::Traditional);
        assert_eq!(maturity(1.75).tier, Tier::Initial);
        assert_eq!(maturity(2.74).tier, Tier::Initial);
        assert_eq!(maturity(2.75).tier, Tier::Advanced);
    }

    #[test]
    fn out_of_band_values_have_no_score() {
        assert_eq!(maturity(0.0).tier, Tier::NoScore);
        assert_eq!(maturity(0.99).tier, Tier::NoScore);
        assert_eq!(maturity(1.745).tier, Tier::NoScore);
        assert_eq!(maturity(3.655).tier, Tier::NoScore);
        assert_eq!(maturity(4.01).tier, Tier::NoScore);
        assert_eq!(maturity(-2.0).tier, Tier::NoScore);
        assert_eq!(maturity(f64::NAN).tier, Tier::NoScore);
    }

    #[test]
    fn colours_follow_tier() {
        let m = maturity(2.0);
        assert_eq!(m.background_color, "#FFD5A5");
        assert_eq!(m.color, "#000000");

        let none = maturity(0.0);
        assert_eq!(none.background_color, "#f5f5f5");
        assert_eq!(none.color, "#666666");
    }

    proptest! {
        #[test]
        fn tiers_never_decrease_between_bands(a in 1.0f64..=4.0, b in 1.0f64..=4.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let (t_lo, t_hi) = (maturity(lo).tier, maturity(hi).tier);
            if t_lo != Tier::NoScore && t_hi != Tier::NoScore {
                prop_assert!(t_lo <= t_hi);
            }
        }
    }
}
