//! Position lifecycle state machine.
//!
//! At most one position is open at any time. Each cycle evaluates the
//! latest price against the position's risk levels before consulting the
//! new recommendation: existing limits outrank new opinions. Rules, in
//! order:
//!
//! 1. price crosses stop-loss → close (`stop_loss`)
//! 2. price crosses take-profit → close (`take_profit`)
//! 3. signal Close while holding → close (`signal_close`)
//! 4. signal Buy/Sell while flat → open Long/Short
//! 5. otherwise no transition (an entry signal while holding never
//!    pyramids; it may only revise the stop/target levels)
//!
//! A price tick that crosses both levels at once resolves as a stop-loss:
//! rule 1 runs first.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sage_core::types::{Direction, ExitReason, Position, Signal, SignalAction, TradeRecord};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Stop distance as a percent of entry when the signal supplies none
    pub default_stop_pct: Decimal,
    /// Target distance as a percent of entry when the signal supplies none
    pub default_target_pct: Decimal,
    /// Position size when the signal supplies none
    pub default_size: Decimal,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_stop_pct: dec!(2),
            default_target_pct: dec!(4),
            default_size: dec!(0.1),
        }
    }
}

/// Current lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Flat,
    Long,
    Short,
}

/// A lifecycle transition emitted by one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Opened(Position),
    Closed(TradeRecord),
    /// Risk levels revised on the open position; not an open or close
    AdjustedRisk {
        stop_loss: Decimal,
        take_profit: Decimal,
    },
}

/// Owns and mutates the single open position.
pub struct PositionEngine {
    settings: EngineSettings,
    position: Option<Position>,
}

impl PositionEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            position: None,
        }
    }

    /// Resume with a previously persisted position.
    pub fn with_position(settings: EngineSettings, position: Option<Position>) -> Self {
        Self { settings, position }
    }

    pub fn state(&self) -> EngineState {
        match &self.position {
            None => EngineState::Flat,
            Some(p) => match p.direction {
                Direction::Long => EngineState::Long,
                Direction::Short => EngineState::Short,
            },
        }
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    /// Apply one price tick and one recommendation.
    ///
    /// Never panics on any signal content; the position and the emitted
    /// trade record change together before the caller performs any I/O.
    pub fn evaluate(
        &mut self,
        price: Decimal,
        at: DateTime<Utc>,
        signal: &Signal,
    ) -> Option<Transition> {
        match self.position.take() {
            Some(position) => self.evaluate_holding(position, price, at, signal),
            None => self.evaluate_flat(price, at, signal),
        }
    }

    fn evaluate_holding(
        &mut self,
        position: Position,
        price: Decimal,
        at: DateTime<Utc>,
        signal: &Signal,
    ) -> Option<Transition> {
        if position.stop_hit(price) {
            return Some(self.close(position, price, at, ExitReason::StopLoss));
        }
        if position.target_hit(price) {
            return Some(self.close(position, price, at, ExitReason::TakeProfit));
        }
        if signal.action == SignalAction::Close {
            return Some(self.close(position, price, at, ExitReason::SignalClose));
        }

        // Still holding. No pyramiding: a Buy while Long (or Sell while
        // Short) adds nothing, but the recommendation may move the risk
        // levels of the existing position.
        let mut position = position;
        let mut adjusted = false;
        if let Some(stop_loss) = signal.stop_loss {
            if stop_loss != position.stop_loss {
                info!(%stop_loss, "updated stop loss");
                position.stop_loss = stop_loss;
                adjusted = true;
            }
        }
        if let Some(take_profit) = signal.take_profit {
            if take_profit != position.take_profit {
                info!(%take_profit, "updated take profit");
                position.take_profit = take_profit;
                adjusted = true;
            }
        }

        let transition = adjusted.then(|| Transition::AdjustedRisk {
            stop_loss: position.stop_loss,
            take_profit: position.take_profit,
        });
        self.position = Some(position);
        transition
    }

    fn evaluate_flat(
        &mut self,
        price: Decimal,
        at: DateTime<Utc>,
        signal: &Signal,
    ) -> Option<Transition> {
        match signal.action {
            SignalAction::Buy => Some(self.open(Direction::Long, price, at, signal)),
            SignalAction::Sell => Some(self.open(Direction::Short, price, at, signal)),
            SignalAction::Close => {
                warn!("received CLOSE signal without an open position");
                None
            }
            SignalAction::Hold => None,
        }
    }

    fn open(
        &mut self,
        direction: Direction,
        price: Decimal,
        at: DateTime<Utc>,
        signal: &Signal,
    ) -> Transition {
        let stop_offset = price * self.settings.default_stop_pct / dec!(100);
        let target_offset = price * self.settings.default_target_pct / dec!(100);
        let (default_stop, default_target) = match direction {
            Direction::Long => (price - stop_offset, price + target_offset),
            Direction::Short => (price + stop_offset, price - target_offset),
        };

        let position = Position {
            direction,
            entry_price: price,
            size: signal.size.unwrap_or(self.settings.default_size),
            stop_loss: signal.stop_loss.unwrap_or(default_stop),
            take_profit: signal.take_profit.unwrap_or(default_target),
            opened_at: at,
            confidence: signal.confidence,
        };

        info!(
            %direction,
            entry = %position.entry_price,
            stop = %position.stop_loss,
            target = %position.take_profit,
            size = %position.size,
            "opened position"
        );
        self.position = Some(position.clone());
        Transition::Opened(position)
    }

    fn close(
        &mut self,
        position: Position,
        price: Decimal,
        at: DateTime<Utc>,
        reason: ExitReason,
    ) -> Transition {
        let record = position.into_record(price, at, reason);
        info!(
            direction = %record.direction,
            exit = %record.exit_price,
            pnl = %record.pnl,
            %reason,
            "closed position"
        );
        // Position is already cleared: it was moved out of the slot.
        Transition::Closed(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sage_core::types::Confidence;

    fn buy_signal() -> Signal {
        Signal {
            action: SignalAction::Buy,
            confidence: Confidence::High,
            stop_loss: None,
            take_profit: None,
            size: None,
        }
    }

    fn signal(action: SignalAction) -> Signal {
        Signal {
            action,
            ..Signal::hold()
        }
    }

    fn engine() -> PositionEngine {
        PositionEngine::new(EngineSettings::default())
    }

    #[test]
    fn test_buy_from_flat_opens_long_with_defaults() {
        let mut engine = engine();
        let transition = engine.evaluate(dec!(100), Utc::now(), &buy_signal());

        let position = match transition {
            Some(Transition::Opened(p)) => p,
            other => panic!("expected open, got {other:?}"),
        };
        assert_eq!(engine.state(), EngineState::Long);
        assert_eq!(position.entry_price, dec!(100));
        assert_eq!(position.stop_loss, dec!(98));
        assert_eq!(position.take_profit, dec!(104));
        assert_eq!(position.size, dec!(0.1));
        assert!(position.stop_loss < position.entry_price);
        assert!(position.entry_price < position.take_profit);
    }

    #[test]
    fn test_sell_from_flat_opens_short() {
        let mut engine = engine();
        let transition = engine.evaluate(dec!(100), Utc::now(), &signal(SignalAction::Sell));

        let position = match transition {
            Some(Transition::Opened(p)) => p,
            other => panic!("expected open, got {other:?}"),
        };
        assert_eq!(engine.state(), EngineState::Short);
        assert_eq!(position.stop_loss, dec!(102));
        assert_eq!(position.take_profit, dec!(96));
    }

    #[test]
    fn test_signal_levels_override_defaults() {
        let mut engine = engine();
        let mut entry = buy_signal();
        entry.stop_loss = Some(dec!(95));
        entry.take_profit = Some(dec!(112));
        entry.size = Some(dec!(0.25));

        match engine.evaluate(dec!(100), Utc::now(), &entry) {
            Some(Transition::Opened(p)) => {
                assert_eq!(p.stop_loss, dec!(95));
                assert_eq!(p.take_profit, dec!(112));
                assert_eq!(p.size, dec!(0.25));
            }
            other => panic!("expected open, got {other:?}"),
        }
    }

    #[test]
    fn test_stop_loss_closes_long() {
        let mut engine = engine();
        let mut entry = buy_signal();
        entry.stop_loss = Some(dec!(98));
        entry.take_profit = Some(dec!(104));
        engine.evaluate(dec!(100), Utc::now(), &entry);

        let transition = engine.evaluate(dec!(97), Utc::now(), &signal(SignalAction::Hold));
        let record = match transition {
            Some(Transition::Closed(r)) => r,
            other => panic!("expected close, got {other:?}"),
        };
        assert_eq!(engine.state(), EngineState::Flat);
        assert_eq!(record.exit_reason, ExitReason::StopLoss);
        // pnl = (97 - 100) * size
        assert_eq!(record.pnl, dec!(-3) * dec!(0.1));
    }

    #[test]
    fn test_stop_loss_outranks_concurrent_buy_signal() {
        let mut engine = engine();
        engine.evaluate(dec!(100), Utc::now(), &buy_signal());

        // Price at the stop with a fresh BUY recommendation: risk wins.
        let transition = engine.evaluate(dec!(98), Utc::now(), &buy_signal());
        match transition {
            Some(Transition::Closed(record)) => {
                assert_eq!(record.exit_reason, ExitReason::StopLoss)
            }
            other => panic!("expected stop-loss close, got {other:?}"),
        }
        assert_eq!(engine.state(), EngineState::Flat);
    }

    #[test]
    fn test_stop_loss_outranks_take_profit_on_same_tick() {
        let mut engine = engine();
        let mut entry = buy_signal();
        // Degenerate levels where a single tick crosses both
        entry.stop_loss = Some(dec!(100));
        entry.take_profit = Some(dec!(100));
        engine.evaluate(dec!(100), Utc::now(), &entry);
        // Position opened, then the next tick sits on both levels

        let mut engine2 = PositionEngine::with_position(
            EngineSettings::default(),
            engine.position().cloned(),
        );
        let transition = engine2.evaluate(dec!(100), Utc::now(), &signal(SignalAction::Hold));
        match transition {
            Some(Transition::Closed(record)) => {
                assert_eq!(record.exit_reason, ExitReason::StopLoss)
            }
            other => panic!("expected stop-loss close, got {other:?}"),
        }
    }

    #[test]
    fn test_take_profit_closes_short() {
        let mut engine = engine();
        engine.evaluate(dec!(100), Utc::now(), &signal(SignalAction::Sell));

        let transition = engine.evaluate(dec!(96), Utc::now(), &signal(SignalAction::Hold));
        match transition {
            Some(Transition::Closed(record)) => {
                assert_eq!(record.exit_reason, ExitReason::TakeProfit);
                // Short from 100, exit 96: pnl = (100 - 96) * 0.1
                assert_eq!(record.pnl, dec!(0.4));
            }
            other => panic!("expected take-profit close, got {other:?}"),
        }
    }

    #[test]
    fn test_close_signal_closes_with_signal_reason() {
        let mut engine = engine();
        engine.evaluate(dec!(100), Utc::now(), &buy_signal());

        let transition = engine.evaluate(dec!(101), Utc::now(), &signal(SignalAction::Close));
        match transition {
            Some(Transition::Closed(record)) => {
                assert_eq!(record.exit_reason, ExitReason::SignalClose)
            }
            other => panic!("expected signal close, got {other:?}"),
        }
    }

    #[test]
    fn test_no_pyramiding() {
        let mut engine = engine();
        engine.evaluate(dec!(100), Utc::now(), &buy_signal());
        let first_entry = engine.position().unwrap().entry_price;

        // A second BUY while Long is a no-op, not an additive position.
        let transition = engine.evaluate(dec!(101), Utc::now(), &buy_signal());
        assert!(transition.is_none());
        assert_eq!(engine.state(), EngineState::Long);
        assert_eq!(engine.position().unwrap().entry_price, first_entry);
    }

    #[test]
    fn test_holding_signal_adjusts_risk_levels() {
        let mut engine = engine();
        engine.evaluate(dec!(100), Utc::now(), &buy_signal());

        let mut update = signal(SignalAction::Hold);
        update.stop_loss = Some(dec!(99));
        update.take_profit = Some(dec!(110));

        let transition = engine.evaluate(dec!(101), Utc::now(), &update);
        assert_eq!(
            transition,
            Some(Transition::AdjustedRisk {
                stop_loss: dec!(99),
                take_profit: dec!(110),
            })
        );
        assert_eq!(engine.position().unwrap().stop_loss, dec!(99));
    }

    #[test]
    fn test_close_without_position_is_noop() {
        let mut engine = engine();
        let transition = engine.evaluate(dec!(100), Utc::now(), &signal(SignalAction::Close));
        assert!(transition.is_none());
        assert_eq!(engine.state(), EngineState::Flat);
    }

    #[test]
    fn test_hold_while_flat_is_noop() {
        let mut engine = engine();
        assert!(engine
            .evaluate(dec!(100), Utc::now(), &Signal::hold())
            .is_none());
        assert_eq!(engine.state(), EngineState::Flat);
    }

    #[test]
    fn test_every_close_emits_exactly_one_record() {
        let mut engine = engine();
        engine.evaluate(dec!(100), Utc::now(), &buy_signal());
        let first = engine.evaluate(dec!(97), Utc::now(), &signal(SignalAction::Hold));
        assert!(matches!(first, Some(Transition::Closed(_))));

        // Position is cleared; the same tick again produces nothing.
        let second = engine.evaluate(dec!(97), Utc::now(), &signal(SignalAction::Hold));
        assert!(second.is_none());
    }
}
