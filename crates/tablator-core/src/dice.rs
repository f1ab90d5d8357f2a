//! Dice expressions and quantity rolls.
//!
//! A quantity field is either a dice expression of the form
//! `NdS[+A|-A][xM]` (roll `N` dice with `S` sides, add `A`, multiply by `M`)
//! or a literal that is passed through untouched, so `"20"` and `"a few"`
//! are both valid quantities.

use std::fmt;

use once_cell::sync::Lazy;
use rand::Rng;
use rand::rngs::StdRng;
use regex::Regex;
use tracing::{debug, trace};

static DICE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([1-9][0-9]*)d([1-9][0-9]*)([+-][1-9][0-9]*)?(?:x([1-9][0-9]*))?$")
        .expect("dice pattern is a valid regex")
});

/// A parsed dice expression such as `3d6+2x10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceExpr {
    /// Number of dice rolled.
    pub count: u32,
    /// Sides per die.
    pub sides: u32,
    /// Added to the sum before multiplying.
    pub adjustment: i64,
    /// Applied last.
    pub multiplier: u32,
}

impl DiceExpr {
    /// Parse an expression; `None` unless the whole string is dice notation.
    pub fn parse(expr: &str) -> Option<Self> {
        let caps = DICE_PATTERN.captures(expr)?;
        let count = caps[1].parse().ok()?;
        let sides = caps[2].parse().ok()?;
        let adjustment = match caps.get(3) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        let multiplier = match caps.get(4) {
            Some(m) => m.as_str().parse().ok()?,
            None => 1,
        };
        Some(Self {
            count,
            sides,
            adjustment,
            multiplier,
        })
    }

    /// Smallest value this expression can produce.
    pub fn min(&self) -> i64 {
        self.finish(i64::from(self.count))
    }

    /// Largest value this expression can produce.
    pub fn max(&self) -> i64 {
        self.finish(i64::from(self.count) * i64::from(self.sides))
    }

    /// Roll the dice, apply adjustment and multiplier.
    pub fn roll(&self, rng: &mut StdRng) -> i64 {
        let sum: i64 = (0..self.count)
            .map(|_| i64::from(rng.random_range(1..=self.sides)))
            .sum();
        self.finish(sum)
    }

    fn finish(&self, sum: i64) -> i64 {
        sum.saturating_add(self.adjustment)
            .saturating_mul(i64::from(self.multiplier))
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        if self.adjustment > 0 {
            write!(f, "+{}", self.adjustment)?;
        } else if self.adjustment < 0 {
            write!(f, "{}", self.adjustment)?;
        }
        if self.multiplier != 1 {
            write!(f, "x{}", self.multiplier)?;
        }
        Ok(())
    }
}

/// Evaluate a quantity field.
///
/// Dice notation is rolled and returned as a decimal string; anything else
/// comes back unchanged.
pub fn roll_quantity(expr: &str, rng: &mut StdRng) -> String {
    trace!(expr, "roll_quantity");
    match DiceExpr::parse(expr) {
        Some(dice) => {
            let value = dice.roll(rng);
            debug!(%dice, value, "rolled quantity");
            value.to_string()
        }
        None => {
            debug!(expr, "no dice match, using literal");
            expr.to_string()
        }
    }
}
