//! Buy decision for a single poll.
//!
//! Two rules, checked in order:
//!
//! 1. **Absolute target** - buy when `lowest <= target_price` (only if a
//!    positive target is set).
//! 2. **Percentage** - buy when `lowest <= join_price * percentage / 100`
//!    (only if the join price is positive).
//!
//! A failing absolute rule falls through to the percentage rule.

use std::fmt;

use rust_decimal::Decimal;

use super::task::{Percentage, PricePolicy};

/// Why a buy was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuyReason {
    /// Lowest price is at or below the absolute target.
    TargetPrice { lowest: Decimal, target: Decimal },
    /// Lowest price is at or below the percentage threshold.
    Percentage {
        lowest: Decimal,
        percentage: Percentage,
        threshold: Decimal,
    },
}

impl fmt::Display for BuyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetPrice { lowest, target } => {
                write!(f, "price {lowest:.2} <= target {target:.2}")
            }
            Self::Percentage {
                lowest,
                percentage,
                threshold,
            } => write!(f, "price {lowest:.2} <= {percentage} of join ({threshold:.2})"),
        }
    }
}

/// Result of [`evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Buy(BuyReason),
    Hold,
}

impl Decision {
    #[must_use]
    pub const fn should_buy(&self) -> bool {
        matches!(self, Self::Buy(_))
    }

    #[must_use]
    pub const fn reason(&self) -> Option<&BuyReason> {
        match self {
            Self::Buy(reason) => Some(reason),
            Self::Hold => None,
        }
    }
}

/// Decide whether `lowest` satisfies `policy`. Pure.
#[must_use]
pub fn evaluate(policy: &PricePolicy, lowest: Decimal) -> Decision {
    if let Some(target) = policy.target_price.filter(|t| *t > Decimal::ZERO) {
        if lowest <= target {
            return Decision::Buy(BuyReason::TargetPrice { lowest, target });
        }
    }

    if policy.join_price > Decimal::ZERO {
        let threshold = policy.target_percentage.of(policy.join_price);
        if lowest <= threshold {
            return Decision::Buy(BuyReason::Percentage {
                lowest,
                percentage: policy.target_percentage,
                threshold,
            });
        }
    }

    Decision::Hold
}

/// Price at or below which the percentage rule fires, if it can fire at all.
#[must_use]
pub fn percentage_threshold(policy: &PricePolicy) -> Option<Decimal> {
    (policy.join_price > Decimal::ZERO).then(|| policy.target_percentage.of(policy.join_price))
}
