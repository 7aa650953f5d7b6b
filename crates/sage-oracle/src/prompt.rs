//! Prompt assembly.
//!
//! Renders one cycle's state (recent bars, per-window indicator values,
//! the open position, decision history and sentiment) into the text the
//! reasoning model sees, ending with the fixed decision template the
//! parser understands.

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use sage_core::traits::RecommendationRequest;
use sage_core::types::{Direction, Position, TradeRecord};
use std::fmt::Write;

pub struct PromptBuilder {
    symbol: String,
    timeframe: String,
}

impl PromptBuilder {
    pub fn new(symbol: &str, timeframe: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
        }
    }

    pub fn build(&self, request: &RecommendationRequest<'_>) -> String {
        let sections = [
            self.header(),
            self.market_data(request),
            self.trading_context(request),
            self.technical_analysis(request),
            self.decision_history(request.recent_trades),
            self.sentiment(request),
            self.analysis_steps(),
            self.decision_template(request.position),
        ];

        sections
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn header(&self) -> String {
        format!(
            "You are a professional futures crypto trader analyzing {} on the {} timeframe. \
             Provide clear, structured analysis with concrete numbers from the data. \
             Consider both long and short opportunities.",
            self.symbol, self.timeframe
        )
    }

    fn market_data(&self, request: &RecommendationRequest<'_>) -> String {
        if request.recent_bars.is_empty() {
            return "MARKET DATA:\nNo OHLCV data available".to_string();
        }

        let mut out = String::from("MARKET DATA:\nRecent closed candles:\nTimestamp,Open,High,Low,Close,Volume\n");
        for bar in request.recent_bars {
            let _ = writeln!(
                out,
                "{},{:.4},{:.4},{:.4},{:.4},{:.2}",
                bar.datetime().format("%Y-%m-%d %H:%M"),
                bar.open,
                bar.high,
                bar.low,
                bar.close,
                bar.volume
            );
        }
        out
    }

    fn trading_context(&self, request: &RecommendationRequest<'_>) -> String {
        let snapshot = request.snapshot;
        let mut out = format!(
            "TRADING CONTEXT:\n- Current Price: ${:.2}\n- Analysis Time: {}\n- Timeframe: {}",
            snapshot.latest_close,
            Utc::now().format("%Y-%m-%d %H:%M:%S"),
            self.timeframe
        );

        if let Some(position) = request.position {
            out.push_str(&self.position_context(position, snapshot.latest_close));
        }
        out
    }

    fn position_context(&self, position: &Position, current_price: f64) -> String {
        let entry = position.entry_price.to_f64().unwrap_or(current_price);
        let price_diff = match position.direction {
            Direction::Long => current_price - entry,
            Direction::Short => entry - current_price,
        };
        let pl_pct = if entry != 0.0 {
            price_diff / entry * 100.0
        } else {
            0.0
        };
        let held_hours =
            (Utc::now() - position.opened_at).num_seconds() as f64 / 3600.0;

        format!(
            "\nActive Position:\n- Direction: {}\n- Entry Price: ${}\n- P/L: {:+.2}%\n- Stop Loss: ${}\n- Take Profit: ${}\n- Size: {}\n- Held for: {:.1} hours",
            position.direction,
            position.entry_price,
            pl_pct,
            position.stop_loss,
            position.take_profit,
            position.size,
            held_hours
        )
    }

    fn technical_analysis(&self, request: &RecommendationRequest<'_>) -> String {
        let snapshot = request.snapshot;
        if snapshot.windows.is_empty() {
            return "TECHNICAL ANALYSIS:\nNo window has enough history yet.".to_string();
        }

        let mut out = String::from("TECHNICAL ANALYSIS:");
        for (name, window) in &snapshot.windows {
            let _ = write!(out, "\n\nWindow {} ({} bars):", name, window.bar_count);
            for (indicator, value) in &window.values {
                let _ = write!(out, "\n- {}: {:.6}", indicator, value);
            }
            let metrics = &window.metrics;
            let _ = write!(
                out,
                "\n- price_change: {:.2}%\n- price_volatility: {:.2}%\n- volume_avg: {:.2}\n- range: {:.2}..{:.2}",
                metrics.price_change_pct,
                metrics.price_volatility_pct,
                metrics.volume_avg,
                metrics.lowest_price,
                metrics.highest_price
            );
        }
        out
    }

    fn decision_history(&self, trades: &[TradeRecord]) -> String {
        if trades.is_empty() {
            return String::new();
        }

        let mut out = String::from("RECENT TRADES (newest first):");
        for trade in trades {
            let _ = write!(
                out,
                "\n- {} {} entry ${} exit ${} pnl {} ({})",
                trade.closed_at.format("%Y-%m-%d %H:%M"),
                trade.direction,
                trade.entry_price,
                trade.exit_price,
                trade.pnl,
                trade.exit_reason
            );
        }
        out
    }

    fn sentiment(&self, request: &RecommendationRequest<'_>) -> String {
        match &request.snapshot.sentiment {
            Some(sentiment) => format!(
                "MARKET SENTIMENT:\n- Fear & Greed Index: {} ({})\n- Reading: {}",
                sentiment.score, sentiment.classification, sentiment.label
            ),
            None => String::new(),
        }
    }

    fn analysis_steps(&self) -> String {
        "ANALYSIS STEPS:\n\
         1. Assess trend direction and strength across all windows.\n\
         2. Check momentum and volume for confirmation or divergence.\n\
         3. Weigh volatility and statistical context for risk placement.\n\
         4. Reconcile with the open position and recent trade outcomes.\n\
         5. Decide, then set concrete price levels."
            .to_string()
    }

    fn decision_template(&self, position: Option<&Position>) -> String {
        let actions = if position.is_some() {
            "HOLD, or CLOSE"
        } else {
            "BUY, SELL, or HOLD"
        };
        format!(
            "Finish with exactly this decision block:\n\
             Signal: [{actions}]\n\
             Confidence: [HIGH, MEDIUM, or LOW]\n\
             Stop Loss: [price]\n\
             Take Profit: [price]\n\
             Position Size: [percent of portfolio]"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use sage_core::types::{Bar, Confidence, Snapshot};
    use std::collections::BTreeMap;

    fn snapshot() -> Snapshot {
        Snapshot {
            symbol: "BTCUSDT".to_string(),
            timestamp: 1_700_000_000_000,
            latest_close: 65000.0,
            windows: BTreeMap::new(),
            sentiment: None,
        }
    }

    fn bars() -> Vec<Bar> {
        vec![Bar::new(1_700_000_000_000, 64000.0, 65500.0, 63800.0, 65000.0, 123.4)]
    }

    #[test]
    fn test_prompt_has_required_sections() {
        let builder = PromptBuilder::new("BTCUSDT", "5m");
        let snapshot = snapshot();
        let bars = bars();
        let request = RecommendationRequest {
            snapshot: &snapshot,
            recent_bars: &bars,
            position: None,
            recent_trades: &[],
        };

        let prompt = builder.build(&request);
        assert!(prompt.contains("MARKET DATA:"));
        assert!(prompt.contains("TRADING CONTEXT:"));
        assert!(prompt.contains("Signal: [BUY, SELL, or HOLD]"));
        assert!(!prompt.contains("Active Position"));
        assert!(!prompt.contains("MARKET SENTIMENT"));
    }

    #[test]
    fn test_prompt_with_position_offers_close() {
        let builder = PromptBuilder::new("BTCUSDT", "5m");
        let snapshot = snapshot();
        let bars = bars();
        let position = Position {
            direction: Direction::Long,
            entry_price: dec!(64000),
            size: dec!(0.1),
            stop_loss: dec!(62720),
            take_profit: dec!(66560),
            opened_at: Utc::now(),
            confidence: Confidence::High,
        };
        let request = RecommendationRequest {
            snapshot: &snapshot,
            recent_bars: &bars,
            position: Some(&position),
            recent_trades: &[],
        };

        let prompt = builder.build(&request);
        assert!(prompt.contains("Active Position"));
        assert!(prompt.contains("Signal: [HOLD, or CLOSE]"));
    }
}
