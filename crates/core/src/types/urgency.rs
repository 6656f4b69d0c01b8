//! Shipment urgency for sold items.
//!
//! Deadlines are compared as calendar dates in the caller's time zone; the
//! time of day is ignored.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::item::InventoryItem;

/// Items due within this many days are urgent.
pub const URGENT_WITHIN_DAYS: i64 = 3;

/// How pressing an item's shipment deadline is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    /// No ship-by date set.
    NoDate,
    /// Deadline has passed.
    Overdue { days: i64 },
    Today,
    Tomorrow,
    /// Due in two or more days.
    InDays(i64),
}

impl Urgency {
    /// Classify a whole-day distance to the deadline.
    #[must_use]
    pub const fn from_days(days: Option<i64>) -> Self {
        match days {
            None => Self::NoDate,
            Some(d) if d < 0 => Self::Overdue { days: d },
            Some(0) => Self::Today,
            Some(1) => Self::Tomorrow,
            Some(d) => Self::InDays(d),
        }
    }

    /// Classify a ship-by timestamp relative to `today` in `tz`.
    pub fn classify<Tz: TimeZone>(ship_by: Option<DateTime<Utc>>, today: NaiveDate, tz: &Tz) -> Self {
        Self::from_days(ship_by.map(|date| days_until(date, today, tz)))
    }

    /// Whether the item needs shipping soon.
    #[must_use]
    pub const fn is_urgent(self) -> bool {
        match self {
            Self::NoDate => false,
            Self::Overdue { .. } | Self::Today | Self::Tomorrow => true,
            Self::InDays(d) => d <= URGENT_WITHIN_DAYS,
        }
    }

    /// Signed whole days to the deadline, if there is one.
    #[must_use]
    pub const fn days_until(self) -> Option<i64> {
        match self {
            Self::NoDate => None,
            Self::Overdue { days } | Self::InDays(days) => Some(days),
            Self::Today => Some(0),
            Self::Tomorrow => Some(1),
        }
    }

    /// Short human label.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::NoDate => "No date".to_string(),
            Self::Overdue { .. } => "Overdue".to_string(),
            Self::Today => "Today".to_string(),
            Self::Tomorrow => "Tomorrow".to_string(),
            Self::InDays(d) => format!("{d} days"),
        }
    }
}

impl Serialize for Urgency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Urgency", 3)?;
        state.serialize_field("label", &self.label())?;
        state.serialize_field("urgent", &self.is_urgent())?;
        state.serialize_field("daysUntil", &self.days_until())?;
        state.end()
    }
}

/// Whole calendar days from `today` to `ship_by`, both taken in `tz`.
pub fn days_until<Tz: TimeZone>(ship_by: DateTime<Utc>, today: NaiveDate, tz: &Tz) -> i64 {
    let due = ship_by.with_timezone(tz).date_naive();
    (due - today).num_days()
}

/// Order sold items for the shipping worklist: earliest deadline first, items
/// without a deadline last. The sort is stable.
pub fn sort_for_shipping(items: &mut [InventoryItem]) {
    items.sort_by_key(|item| (item.ship_by_date.is_none(), item.ship_by_date));
}
