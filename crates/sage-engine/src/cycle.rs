//! The per-cycle analysis loop.
//!
//! One [`CycleRunner::run_cycle`] call per timeframe tick: aggregate the
//! history into a snapshot, consult the reasoning oracle, feed the result
//! through the position engine, and persist any transition. The `&mut
//! self` receiver keeps at most one cycle in flight.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sage_analysis::Aggregator;
use sage_core::error::{AnalysisResult, DataError, OracleError};
use sage_core::traits::{
    PositionStore, RecommendationOracle, RecommendationRequest, SentimentSample,
};
use sage_core::types::{Bar, Signal, Snapshot, TradeRecord};
use tracing::{info, warn};

use crate::lifecycle::{PositionEngine, Transition};

/// How many recent bars the oracle sees verbatim.
const PROMPT_BAR_COUNT: usize = 24;

/// A non-fatal condition reported alongside a completed cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// The reasoning step failed or timed out; the cycle degraded to Hold
    AnalysisUnavailable(String),
    /// The reasoning step answered but the signal was unparseable
    MalformedSignal(String),
    /// A persistence write failed; in-memory state stays authoritative
    PersistenceFailure(String),
    /// A configured window had too little history this cycle
    WindowNotReady(String),
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::AnalysisUnavailable(detail) => write!(f, "analysis unavailable: {detail}"),
            Anomaly::MalformedSignal(detail) => write!(f, "malformed signal: {detail}"),
            Anomaly::PersistenceFailure(detail) => write!(f, "persistence failure: {detail}"),
            Anomaly::WindowNotReady(window) => write!(f, "window not ready: {window}"),
        }
    }
}

/// Everything one cycle produced.
#[derive(Debug)]
pub struct CycleReport {
    pub snapshot: Snapshot,
    /// The signal the engine actually evaluated (Hold when degraded)
    pub signal: Signal,
    pub transition: Option<Transition>,
    pub anomalies: Vec<Anomaly>,
}

/// Drives one analysis cycle end to end.
pub struct CycleRunner {
    symbol: String,
    aggregator: Aggregator,
    engine: PositionEngine,
    oracle: Arc<dyn RecommendationOracle>,
    store: Arc<dyn PositionStore>,
    /// Closed trades shown to the oracle, newest first
    history_depth: usize,
}

impl CycleRunner {
    pub fn new(
        symbol: String,
        aggregator: Aggregator,
        engine: PositionEngine,
        oracle: Arc<dyn RecommendationOracle>,
        store: Arc<dyn PositionStore>,
    ) -> Self {
        Self {
            symbol,
            aggregator,
            engine,
            oracle,
            store,
            history_depth: 5,
        }
    }

    pub fn engine(&self) -> &PositionEngine {
        &self.engine
    }

    /// Run one full cycle.
    ///
    /// Fails only when the input bars are unusable (the caller skips this
    /// cycle). Oracle failures, unparseable signals and persistence
    /// trouble are downgraded to anomalies on the report; risk limits on
    /// an open position are still enforced in every one of those cases.
    pub async fn run_cycle(
        &mut self,
        bars: &[Bar],
        latest_price: f64,
        sentiment: Option<&[SentimentSample]>,
    ) -> AnalysisResult<CycleReport> {
        let snapshot = self.aggregator.analyze(&self.symbol, bars, sentiment)?;

        let mut anomalies: Vec<Anomaly> = self
            .aggregator
            .window_names()
            .filter(|name| !snapshot.windows.contains_key(*name))
            .map(|name| Anomaly::WindowNotReady(name.to_string()))
            .collect();

        let price = Decimal::try_from(latest_price)
            .map_err(|_| DataError::InvalidPrice(latest_price.to_string()))?;

        let recent_trades = match self.store.history() {
            Ok(history) => recent(history, self.history_depth),
            Err(e) => {
                warn!(error = %e, "could not load trade history for the prompt");
                anomalies.push(Anomaly::PersistenceFailure(e.to_string()));
                Vec::new()
            }
        };

        let signal = {
            let request = RecommendationRequest {
                snapshot: &snapshot,
                recent_bars: &bars[bars.len().saturating_sub(PROMPT_BAR_COUNT)..],
                position: self.engine.position(),
                recent_trades: &recent_trades,
            };
            match self.oracle.recommend(&request).await {
                Ok(signal) => signal,
                Err(OracleError::Malformed(e)) => {
                    warn!(error = %e, "unparseable recommendation, degrading to HOLD");
                    anomalies.push(Anomaly::MalformedSignal(e.to_string()));
                    Signal::hold()
                }
                Err(e) => {
                    warn!(error = %e, "analysis unavailable, degrading to HOLD");
                    anomalies.push(Anomaly::AnalysisUnavailable(e.to_string()));
                    Signal::hold()
                }
            }
        };

        let transition = self.engine.evaluate(price, Utc::now(), &signal);
        self.persist(&transition, &mut anomalies);

        if let Some(t) = &transition {
            info!(symbol = %self.symbol, transition = ?t, "cycle transition");
        }

        Ok(CycleReport {
            snapshot,
            signal,
            transition,
            anomalies,
        })
    }

    /// Persist the in-memory state after a transition. Failures are
    /// reported, never rolled back: the engine already committed.
    fn persist(&self, transition: &Option<Transition>, anomalies: &mut Vec<Anomaly>) {
        match transition {
            Some(Transition::Opened(_)) | Some(Transition::AdjustedRisk { .. }) => {
                if let Err(e) = self.store.save(self.engine.position()) {
                    warn!(error = %e, "failed to persist position");
                    anomalies.push(Anomaly::PersistenceFailure(e.to_string()));
                }
            }
            Some(Transition::Closed(record)) => {
                if let Err(e) = self.store.append(record) {
                    warn!(error = %e, "failed to append trade record");
                    anomalies.push(Anomaly::PersistenceFailure(e.to_string()));
                }
                if let Err(e) = self.store.save(None) {
                    warn!(error = %e, "failed to clear persisted position");
                    anomalies.push(Anomaly::PersistenceFailure(e.to_string()));
                }
            }
            None => {}
        }
    }
}

fn recent(mut history: Vec<TradeRecord>, depth: usize) -> Vec<TradeRecord> {
    history.reverse();
    history.truncate(depth);
    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sage_analysis::WindowSpec;
    use sage_core::error::SignalError;
    use sage_core::types::{Confidence, SignalAction};
    use sage_indicators::IndicatorParams;
    use sage_persistence::MemoryStore;
    use std::sync::Mutex;

    use crate::lifecycle::{EngineSettings, EngineState};

    /// One scripted oracle outcome.
    #[derive(Clone)]
    enum Script {
        Respond(Signal),
        Unavailable,
        Malformed,
    }

    /// Oracle double: plays its script, repeating the last step forever.
    struct ScriptedOracle {
        script: Mutex<Vec<Script>>,
    }

    impl ScriptedOracle {
        fn new(script: Vec<Script>) -> Self {
            Self {
                script: Mutex::new(script),
            }
        }

        fn always(signal: Signal) -> Self {
            Self::new(vec![Script::Respond(signal)])
        }
    }

    #[async_trait]
    impl RecommendationOracle for ScriptedOracle {
        async fn recommend(
            &self,
            _request: &RecommendationRequest<'_>,
        ) -> Result<Signal, OracleError> {
            let mut script = self.script.lock().unwrap();
            let step = if script.len() > 1 {
                script.remove(0)
            } else {
                script[0].clone()
            };
            match step {
                Script::Respond(signal) => Ok(signal),
                Script::Unavailable => Err(OracleError::Request("scripted outage".to_string())),
                Script::Malformed => Err(OracleError::Malformed(SignalError::MissingAction)),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn make_bars(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.2).sin() * 5.0;
                Bar::new(
                    (i as i64 + 1) * 300_000,
                    close - 0.2,
                    close + 1.0,
                    close - 1.0,
                    close,
                    1000.0,
                )
            })
            .collect()
    }

    fn runner(oracle: ScriptedOracle, store: Arc<MemoryStore>) -> CycleRunner {
        let aggregator = Aggregator::new(
            vec![WindowSpec::trailing("1d", 288), WindowSpec::full("3d")],
            &IndicatorParams::default(),
        );
        CycleRunner::new(
            "BTCUSDT".to_string(),
            aggregator,
            PositionEngine::new(EngineSettings::default()),
            Arc::new(oracle),
            store,
        )
    }

    fn buy_signal() -> Signal {
        Signal {
            action: SignalAction::Buy,
            confidence: Confidence::High,
            stop_loss: None,
            take_profit: None,
            size: None,
        }
    }

    #[tokio::test]
    async fn test_buy_cycle_opens_and_persists() {
        let store = Arc::new(MemoryStore::new());
        let mut runner = runner(ScriptedOracle::always(buy_signal()), store.clone());
        let bars = make_bars(400);

        let report = runner
            .run_cycle(&bars, 100.0, None)
            .await
            .expect("cycle should complete");

        assert!(matches!(report.transition, Some(Transition::Opened(_))));
        assert_eq!(runner.engine().state(), EngineState::Long);
        assert!(store.load().unwrap().is_some());
        assert!(report.anomalies.is_empty());
        assert_eq!(report.snapshot.windows.len(), 2);
    }

    #[tokio::test]
    async fn test_oracle_failure_degrades_to_hold() {
        let store = Arc::new(MemoryStore::new());
        let oracle = ScriptedOracle::new(vec![Script::Unavailable]);
        let mut runner = runner(oracle, store);
        let bars = make_bars(400);

        let report = runner.run_cycle(&bars, 100.0, None).await.unwrap();

        assert!(report.transition.is_none());
        assert_eq!(report.signal, Signal::hold());
        assert!(report
            .anomalies
            .iter()
            .any(|a| matches!(a, Anomaly::AnalysisUnavailable(_))));
    }

    #[tokio::test]
    async fn test_malformed_signal_is_reported_and_state_unchanged() {
        let store = Arc::new(MemoryStore::new());
        let oracle = ScriptedOracle::new(vec![Script::Malformed]);
        let mut runner = runner(oracle, store);
        let bars = make_bars(400);

        let report = runner.run_cycle(&bars, 100.0, None).await.unwrap();

        assert!(report.transition.is_none());
        assert_eq!(runner.engine().state(), EngineState::Flat);
        assert!(report
            .anomalies
            .iter()
            .any(|a| matches!(a, Anomaly::MalformedSignal(_))));
    }

    #[tokio::test]
    async fn test_stop_enforced_even_when_oracle_is_down() {
        let store = Arc::new(MemoryStore::new());
        let oracle = ScriptedOracle::new(vec![Script::Respond(buy_signal()), Script::Unavailable]);
        let mut runner = runner(oracle, store.clone());
        let bars = make_bars(400);

        runner.run_cycle(&bars, 100.0, None).await.unwrap();
        assert_eq!(runner.engine().state(), EngineState::Long);

        // Oracle down, price through the default 2% stop: still closes.
        let report = runner.run_cycle(&bars, 97.0, None).await.unwrap();
        match report.transition {
            Some(Transition::Closed(record)) => {
                assert_eq!(record.exit_reason, sage_core::types::ExitReason::StopLoss)
            }
            other => panic!("expected stop-loss close, got {other:?}"),
        }
        assert_eq!(runner.engine().state(), EngineState::Flat);
        assert!(store.load().unwrap().is_none());
        assert_eq!(store.history().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_two_buy_cycles_hold_one_position() {
        let store = Arc::new(MemoryStore::new());
        let mut runner = runner(ScriptedOracle::always(buy_signal()), store.clone());
        let bars = make_bars(400);

        runner.run_cycle(&bars, 100.0, None).await.unwrap();
        let report = runner.run_cycle(&bars, 100.5, None).await.unwrap();

        // Second BUY while Long: no transition, single position intact.
        assert!(report.transition.is_none());
        assert_eq!(runner.engine().state(), EngineState::Long);
        assert_eq!(store.history().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_not_ready_windows_are_flagged() {
        let store = Arc::new(MemoryStore::new());
        let aggregator = Aggregator::new(
            vec![WindowSpec::trailing("tiny", 10), WindowSpec::full("all")],
            &IndicatorParams::default(),
        );
        let mut runner = CycleRunner::new(
            "BTCUSDT".to_string(),
            aggregator,
            PositionEngine::new(EngineSettings::default()),
            Arc::new(ScriptedOracle::always(Signal::hold())),
            store,
        );
        let bars = make_bars(150);

        let report = runner.run_cycle(&bars, 100.0, None).await.unwrap();
        assert!(report
            .anomalies
            .iter()
            .any(|a| *a == Anomaly::WindowNotReady("tiny".to_string())));
        assert!(report.snapshot.windows.contains_key("all"));
    }

    #[tokio::test]
    async fn test_empty_bars_skip_cycle() {
        let store = Arc::new(MemoryStore::new());
        let mut runner = runner(ScriptedOracle::always(Signal::hold()), store);

        assert!(runner.run_cycle(&[], 100.0, None).await.is_err());
    }
}
