//! Closed-trade statistics.

use rust_decimal::Decimal;
use sage_core::types::TradeRecord;
use serde::{Deserialize, Serialize};

/// Aggregate statistics over the closed-trade history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeStats {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Win rate percentage
    pub win_rate_pct: Decimal,
    /// Cumulative realized P&L
    pub total_pnl: Decimal,
    /// Average profit per winning trade
    pub avg_win: Decimal,
    /// Average loss per losing trade (positive magnitude)
    pub avg_loss: Decimal,
    /// Gross profit / gross loss
    pub profit_factor: Decimal,
    pub best_trade: Decimal,
    pub worst_trade: Decimal,
    /// Mean holding duration in seconds
    pub avg_holding_secs: i64,
}

impl TradeStats {
    pub fn from_records(records: &[TradeRecord]) -> Self {
        let mut winning = 0usize;
        let mut losing = 0usize;
        let mut total_profit = Decimal::ZERO;
        let mut total_loss = Decimal::ZERO;
        let mut total_pnl = Decimal::ZERO;
        let mut best = Decimal::ZERO;
        let mut worst = Decimal::ZERO;
        let mut holding_secs = 0i64;

        for record in records {
            total_pnl += record.pnl;
            holding_secs += record.holding_secs();

            if record.pnl > Decimal::ZERO {
                winning += 1;
                total_profit += record.pnl;
            } else if record.pnl < Decimal::ZERO {
                losing += 1;
                total_loss += record.pnl.abs();
            }

            if record.pnl > best {
                best = record.pnl;
            }
            if record.pnl < worst {
                worst = record.pnl;
            }
        }

        let total = records.len();
        let win_rate_pct = if total > 0 {
            Decimal::from(winning * 100) / Decimal::from(total)
        } else {
            Decimal::ZERO
        };
        let avg_win = if winning > 0 {
            total_profit / Decimal::from(winning)
        } else {
            Decimal::ZERO
        };
        let avg_loss = if losing > 0 {
            total_loss / Decimal::from(losing)
        } else {
            Decimal::ZERO
        };
        let profit_factor = if total_loss > Decimal::ZERO {
            total_profit / total_loss
        } else {
            Decimal::ZERO
        };
        let avg_holding_secs = if total > 0 {
            holding_secs / total as i64
        } else {
            0
        };

        Self {
            total_trades: total,
            winning_trades: winning,
            losing_trades: losing,
            win_rate_pct,
            total_pnl,
            avg_win,
            avg_loss,
            profit_factor,
            best_trade: best,
            worst_trade: worst,
            avg_holding_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;
    use sage_core::types::{Direction, ExitReason};

    fn record(pnl: Decimal, holding_hours: i64) -> TradeRecord {
        let closed = Utc::now();
        TradeRecord {
            direction: Direction::Long,
            entry_price: dec!(100),
            exit_price: dec!(100) + pnl,
            size: dec!(1),
            opened_at: closed - Duration::hours(holding_hours),
            closed_at: closed,
            pnl,
            exit_reason: ExitReason::SignalClose,
        }
    }

    #[test]
    fn test_empty_history() {
        let stats = TradeStats::from_records(&[]);
        assert_eq!(stats.total_trades, 0);
        assert_eq!(stats.win_rate_pct, Decimal::ZERO);
        assert_eq!(stats.total_pnl, Decimal::ZERO);
    }

    #[test]
    fn test_mixed_history() {
        let records = vec![
            record(dec!(4), 2),
            record(dec!(-2), 4),
            record(dec!(6), 6),
            record(dec!(-1), 4),
        ];
        let stats = TradeStats::from_records(&records);

        assert_eq!(stats.total_trades, 4);
        assert_eq!(stats.winning_trades, 2);
        assert_eq!(stats.losing_trades, 2);
        assert_eq!(stats.win_rate_pct, dec!(50));
        assert_eq!(stats.total_pnl, dec!(7));
        assert_eq!(stats.avg_win, dec!(5));
        assert_eq!(stats.avg_loss, dec!(1.5));
        assert_eq!(stats.best_trade, dec!(6));
        assert_eq!(stats.worst_trade, dec!(-2));
        // Gross profit 10 / gross loss 3
        assert_eq!(stats.profit_factor, dec!(10) / dec!(3));
        assert_eq!(stats.avg_holding_secs, 4 * 3600);
    }

    #[test]
    fn test_all_wins_profit_factor_is_zero() {
        let records = vec![record(dec!(2), 1), record(dec!(3), 1)];
        let stats = TradeStats::from_records(&records);
        // No losses: the ratio is undefined, reported as zero
        assert_eq!(stats.profit_factor, Decimal::ZERO);
        assert_eq!(stats.win_rate_pct, dec!(100));
    }
}
