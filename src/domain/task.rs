//! Tracked grab tasks.
//!
//! A [`GrabTask`] is the persistent record of one marketplace item being
//! watched for purchase. The supervisor owns the canonical copy; workers only
//! ever see clones taken atomically.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{ItemId, OrderId};

/// Percentage of the join price at which a task buys, bounded to `[10, 100]`.
///
/// Out-of-range inputs are clamped rather than rejected, including values
/// read back from a persisted task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Percentage(u8);

impl Percentage {
    /// Lowest accepted percentage.
    pub const MIN: u8 = 10;
    /// Highest accepted percentage.
    pub const MAX: u8 = 100;
    /// Default used when nothing else is configured.
    pub const DEFAULT: Self = Self(70);

    /// Clamp `value` into `[MIN, MAX]`.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// `value * self / 100`, computed exactly.
    #[must_use]
    pub fn of(self, value: Decimal) -> Decimal {
        value * Decimal::from(self.0) / Decimal::ONE_HUNDRED
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<i64> for Percentage {
    fn from(value: i64) -> Self {
        Self::clamped(value)
    }
}

impl From<Percentage> for u8 {
    fn from(p: Percentage) -> Self {
        p.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// A worker is (or should be) polling.
    Monitoring,
    /// Polling is suspended until an operator resumes the task.
    Paused,
    /// A purchase completed. Terminal.
    Succeeded,
}

impl TaskStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monitoring => "monitoring",
            Self::Paused => "paused",
            Self::Succeeded => "succeeded",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable copy of the fields that decide whether to buy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricePolicy {
    pub join_price: Decimal,
    pub target_price: Option<Decimal>,
    pub target_percentage: Percentage,
}

/// Input for creating a task from a catalog result.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub id: ItemId,
    pub name: String,
    pub join_price: Decimal,
}

impl NewTask {
    /// Validate and build a new task request.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError`] for an empty id or a negative join price.
    pub fn try_new(
        id: impl Into<ItemId>,
        name: impl Into<String>,
        join_price: Decimal,
    ) -> Result<Self, DomainError> {
        let id = id.into();
        if id.is_blank() {
            return Err(DomainError::EmptyItemId);
        }
        if join_price < Decimal::ZERO {
            return Err(DomainError::NegativeJoinPrice { price: join_price });
        }
        Ok(Self {
            id,
            name: name.into(),
            join_price,
        })
    }
}

/// One tracked item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrabTask {
    pub id: ItemId,
    pub name: String,
    join_price: Decimal,
    #[serde(default)]
    target_price: Option<Decimal>,
    #[serde(default)]
    target_percentage: Percentage,
    #[serde(default)]
    pub current_min_price: Option<Decimal>,
    pub status: TaskStatus,
    #[serde(default)]
    pub last_success_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_order_id: Option<OrderId>,
    created_at: DateTime<Utc>,
}

impl GrabTask {
    /// Create a monitoring task.
    #[must_use]
    pub fn new(request: NewTask, percentage: Percentage, created_at: DateTime<Utc>) -> Self {
        Self {
            id: request.id,
            name: request.name,
            join_price: request.join_price,
            target_price: None,
            target_percentage: percentage,
            current_min_price: None,
            status: TaskStatus::Monitoring,
            last_success_price: None,
            last_order_id: None,
            created_at,
        }
    }

    #[must_use]
    pub fn join_price(&self) -> Decimal {
        self.join_price
    }

    #[must_use]
    pub fn target_price(&self) -> Option<Decimal> {
        self.target_price
    }

    #[must_use]
    pub fn target_percentage(&self) -> Percentage {
        self.target_percentage
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Set or clear the absolute target. Non-positive prices clear it.
    pub fn set_target_price(&mut self, price: Option<Decimal>) {
        self.target_price = price.filter(|p| *p > Decimal::ZERO);
    }

    pub fn set_target_percentage(&mut self, percentage: Percentage) {
        self.target_percentage = percentage;
    }

    /// Snapshot of the buy policy.
    #[must_use]
    pub fn policy(&self) -> PricePolicy {
        PricePolicy {
            join_price: self.join_price,
            target_price: self.target_price,
            target_percentage: self.target_percentage,
        }
    }

    /// Normalise a task read back at startup.
    ///
    /// Succeeded tasks stay succeeded; everything else comes back paused so
    /// nothing buys unattended after a restart.
    #[must_use]
    pub fn into_restored(mut self) -> Self {
        if self.status != TaskStatus::Succeeded {
            self.status = TaskStatus::Paused;
        }
        self.target_price = self.target_price.filter(|p| *p > Decimal::ZERO);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn task() -> GrabTask {
        GrabTask::new(
            NewTask::try_new("g-1", "Hades", dec!(100)).unwrap(),
            Percentage::DEFAULT,
            Utc::now(),
        )
    }

    #[test]
    fn percentage_is_clamped_at_both_ends() {
        assert_eq!(Percentage::clamped(5).get(), 10);
        assert_eq!(Percentage::clamped(250).get(), 100);
        assert_eq!(Percentage::clamped(-3).get(), 10);
        assert_eq!(Percentage::clamped(42).get(), 42);
    }

    #[test]
    fn percentage_of_is_exact() {
        assert_eq!(Percentage::clamped(70).of(dec!(100)), dec!(70));
        assert_eq!(Percentage::clamped(33).of(dec!(10)), dec!(3.3));
    }

    #[test]
    fn persisted_percentage_is_clamped_on_read() {
        let p: Percentage = serde_json::from_str("7").unwrap();
        assert_eq!(p.get(), 10);
        let p: Percentage = serde_json::from_str("130").unwrap();
        assert_eq!(p.get(), 100);
    }

    #[test]
    fn new_task_rejects_blank_id_and_negative_price() {
        assert_eq!(
            NewTask::try_new(" ", "x", dec!(1)).unwrap_err(),
            DomainError::EmptyItemId
        );
        assert!(matches!(
            NewTask::try_new("g", "x", dec!(-1)),
            Err(DomainError::NegativeJoinPrice { .. })
        ));
    }

    #[test]
    fn non_positive_target_price_means_unset() {
        let mut t = task();
        t.set_target_price(Some(dec!(0)));
        assert_eq!(t.target_price(), None);
        t.set_target_price(Some(dec!(-4)));
        assert_eq!(t.target_price(), None);
        t.set_target_price(Some(dec!(55.5)));
        assert_eq!(t.target_price(), Some(dec!(55.5)));
    }

    #[test]
    fn restore_pauses_everything_but_succeeded() {
        let mut monitoring = task();
        monitoring.status = TaskStatus::Monitoring;
        assert_eq!(monitoring.into_restored().status, TaskStatus::Paused);

        let mut done = task();
        done.status = TaskStatus::Succeeded;
        assert_eq!(done.into_restored().status, TaskStatus::Succeeded);
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::Succeeded).unwrap(),
            "\"succeeded\""
        );
    }
}
