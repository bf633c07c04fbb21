use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, PrimitiveDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Preparing,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Every status, in the order the dashboard lists them.
    pub const ALL: [OrderStatus; 5] = [
        Self::Pending,
        Self::Preparing,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Preparing => "Preparing",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Parse a status from its display name
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    pub pizza_type: String,
    pub quantity: u32,
    /// Local time the order was placed, e.g. `2023-05-15 14:30`
    pub order_date: String,
    pub status: OrderStatus,
}

impl Order {
    /// The order date as an instant, if it parses
    pub fn placed_at(&self) -> Option<PrimitiveDateTime> {
        parse_order_date(&self.order_date)
    }
}

/// Parse an order timestamp.
///
/// Accepts `YYYY-MM-DD HH:MM`, the same with seconds, either with a `T`
/// separator, and a bare `YYYY-MM-DD` (midnight).
pub fn parse_order_date(value: &str) -> Option<PrimitiveDateTime> {
    let minutes = format_description!("[year]-[month]-[day] [hour]:[minute]");
    let seconds = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let date_only = format_description!("[year]-[month]-[day]");

    let normalized = value.trim().replacen('T', " ", 1);

    PrimitiveDateTime::parse(&normalized, minutes)
        .or_else(|_| PrimitiveDateTime::parse(&normalized, seconds))
        .ok()
        .or_else(|| Date::parse(&normalized, date_only).ok().map(Date::midnight))
}
