//! Position lifecycle types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Confidence;

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    SignalClose,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::StopLoss => "stop_loss",
            ExitReason::TakeProfit => "take_profit",
            ExitReason::SignalClose => "signal_close",
        };
        write!(f, "{}", s)
    }
}

/// The single currently-open position.
///
/// At most one position exists at a time; it is owned and mutated
/// exclusively by the position engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub direction: Direction,
    pub entry_price: Decimal,
    pub size: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub opened_at: DateTime<Utc>,
    pub confidence: Confidence,
}

impl Position {
    /// Check whether a price tick crosses the stop-loss level.
    pub fn stop_hit(&self, price: Decimal) -> bool {
        match self.direction {
            Direction::Long => price <= self.stop_loss,
            Direction::Short => price >= self.stop_loss,
        }
    }

    /// Check whether a price tick crosses the take-profit level.
    pub fn target_hit(&self, price: Decimal) -> bool {
        match self.direction {
            Direction::Long => price >= self.take_profit,
            Direction::Short => price <= self.take_profit,
        }
    }

    /// P&L of the position if it were closed at the given price.
    pub fn pnl_at(&self, price: Decimal) -> Decimal {
        match self.direction {
            Direction::Long => (price - self.entry_price) * self.size,
            Direction::Short => (self.entry_price - price) * self.size,
        }
    }

    /// Convert the position into its closed-trade record.
    pub fn into_record(
        self,
        exit_price: Decimal,
        closed_at: DateTime<Utc>,
        exit_reason: ExitReason,
    ) -> TradeRecord {
        let pnl = self.pnl_at(exit_price);
        TradeRecord {
            direction: self.direction,
            entry_price: self.entry_price,
            exit_price,
            size: self.size,
            opened_at: self.opened_at,
            closed_at,
            pnl,
            exit_reason,
        }
    }
}

/// Immutable record of a closed trade. Append-only history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub direction: Direction,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub size: Decimal,
    pub opened_at: DateTime<Utc>,
    pub closed_at: DateTime<Utc>,
    pub pnl: Decimal,
    pub exit_reason: ExitReason,
}

impl TradeRecord {
    pub fn is_win(&self) -> bool {
        self.pnl > Decimal::ZERO
    }

    /// Holding duration in whole seconds.
    pub fn holding_secs(&self) -> i64 {
        (self.closed_at - self.opened_at).num_seconds()
    }
}
