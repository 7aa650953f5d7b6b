//! Recommendation signal types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Action recommended by the reasoning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalAction {
    /// Open a long position (or hold an existing long)
    Buy,
    /// Open a short position (or hold an existing short)
    Sell,
    /// No action
    Hold,
    /// Close the open position
    Close,
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalAction::Buy => "BUY",
            SignalAction::Sell => "SELL",
            SignalAction::Hold => "HOLD",
            SignalAction::Close => "CLOSE",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SignalAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(SignalAction::Buy),
            "SELL" => Ok(SignalAction::Sell),
            "HOLD" => Ok(SignalAction::Hold),
            "CLOSE" => Ok(SignalAction::Close),
            other => Err(format!("Unknown signal action: {}", other)),
        }
    }
}

/// Confidence level attached to a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    High,
    #[default]
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Confidence::High => "HIGH",
            Confidence::Medium => "MEDIUM",
            Confidence::Low => "LOW",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "HIGH" => Ok(Confidence::High),
            "MEDIUM" => Ok(Confidence::Medium),
            "LOW" => Ok(Confidence::Low),
            other => Err(format!("Unknown confidence: {}", other)),
        }
    }
}

/// Structured recommendation returned by the reasoning step.
///
/// Price levels and size are optional; when absent the position engine
/// falls back to its configured defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub action: SignalAction,
    pub confidence: Confidence,
    /// Suggested stop-loss price
    pub stop_loss: Option<Decimal>,
    /// Suggested take-profit price
    pub take_profit: Option<Decimal>,
    /// Suggested position size as a fraction of the portfolio
    pub size: Option<Decimal>,
}

impl Signal {
    /// A no-op signal. Used when the reasoning step fails or returns
    /// something unparseable.
    pub fn hold() -> Self {
        Self {
            action: SignalAction::Hold,
            confidence: Confidence::Medium,
            stop_loss: None,
            take_profit: None,
            size: None,
        }
    }

    pub fn is_entry(&self) -> bool {
        matches!(self.action, SignalAction::Buy | SignalAction::Sell)
    }
}
