//! Item lifecycle status.
//!
//! Items move along `pending ⇄ sold ⇄ completed`. There is no direct edge
//! between `pending` and `completed` in either direction.

use serde::{Deserialize, Serialize};

/// Where an item sits in the resale lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "item_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// In inventory, not yet sold.
    #[default]
    Pending,
    /// Has a buyer and is waiting to be shipped ("ready to ship").
    Sold,
    /// Shipped.
    Completed,
}

impl ItemStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Sold, Self::Completed];

    /// Wire/database name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sold => "sold",
            Self::Completed => "completed",
        }
    }

    /// Whether an item may move from `self` to `next`.
    ///
    /// Staying in the same status is always allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        !matches!(
            (self, next),
            (Self::Pending, Self::Completed) | (Self::Completed, Self::Pending)
        )
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "sold" => Ok(Self::Sold),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("invalid item status: {s}")),
        }
    }
}
