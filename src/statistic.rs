//! Statistic rows - the `item_statistics` time series
//!
//! One row per sampling interval per item, optionally qualified by a
//! subtype or mod rank. Rows are append-only.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Order-side classification of a statistic row.
///
/// `Closed` rows summarize completed trades; `Buy` and `Sell` rows summarize
/// open orders on that side of the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    Buy,
    Sell,
    Closed,
}

impl OrderType {
    /// Canonical stored form
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Buy => "Buy",
            OrderType::Sell => "Sell",
            OrderType::Closed => "Closed",
        }
    }

    pub fn all() -> &'static [OrderType] {
        &[OrderType::Buy, OrderType::Sell, OrderType::Closed]
    }
}

impl FromStr for OrderType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(OrderType::Buy),
            "sell" => Ok(OrderType::Sell),
            "closed" => Ok(OrderType::Closed),
            _ => Err(Error::InvalidOrderType(s.to_string())),
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A time-stamped market observation for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStatistic {
    /// Row id, assigned by the database (0 before insertion)
    pub id: i64,
    /// Start of the sampling interval
    pub datetime: DateTime<Utc>,
    /// Expected to match `items.id`; not enforced by the database
    pub item_id: String,
    pub volume: u32,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_price: f64,
    /// Volume-weighted average price
    pub wa_price: f64,
    pub median: f64,
    pub order_type: Option<OrderType>,
    pub sub_type: Option<String>,
    pub mod_rank: Option<u32>,
    pub moving_avg: Option<f64>,
    pub open_price: Option<f64>,
    pub closed_price: Option<f64>,
    /// Donchian channel upper bound
    pub donch_top: Option<f64>,
    /// Donchian channel lower bound
    pub donch_bot: Option<f64>,
}

impl ItemStatistic {
    /// Create an empty observation for `item_id` at `datetime`; fill it with the `with_*` builders.
    pub fn new(item_id: impl Into<String>, datetime: DateTime<Utc>) -> Self {
        Self {
            id: 0, // Set by DB
            datetime,
            item_id: item_id.into(),
            volume: 0,
            min_price: 0.0,
            max_price: 0.0,
            avg_price: 0.0,
            wa_price: 0.0,
            median: 0.0,
            order_type: None,
            sub_type: None,
            mod_rank: None,
            moving_avg: None,
            open_price: None,
            closed_price: None,
            donch_top: None,
            donch_bot: None,
        }
    }

    pub fn with_volume(mut self, volume: u32) -> Self {
        self.volume = volume;
        self
    }

    /// Set min, max, avg, weighted-avg and median prices
    pub fn with_prices(mut self, min: f64, max: f64, avg: f64, wa: f64, median: f64) -> Self {
        self.min_price = min;
        self.max_price = max;
        self.avg_price = avg;
        self.wa_price = wa;
        self.median = median;
        self
    }

    pub fn with_order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = Some(order_type);
        self
    }

    pub fn with_sub_type(mut self, sub_type: impl Into<String>) -> Self {
        self.sub_type = Some(sub_type.into());
        self
    }

    pub fn with_mod_rank(mut self, mod_rank: u32) -> Self {
        self.mod_rank = Some(mod_rank);
        self
    }

    pub fn with_moving_avg(mut self, moving_avg: f64) -> Self {
        self.moving_avg = Some(moving_avg);
        self
    }

    pub fn with_open_close(mut self, open: f64, close: f64) -> Self {
        self.open_price = Some(open);
        self.closed_price = Some(close);
        self
    }

    pub fn with_donchian(mut self, top: f64, bottom: f64) -> Self {
        self.donch_top = Some(top);
        self.donch_bot = Some(bottom);
        self
    }

    /// True when the row carries a subtype or mod-rank qualifier
    pub fn is_qualified(&self) -> bool {
        self.sub_type.is_some() || self.mod_rank.is_some()
    }
}
