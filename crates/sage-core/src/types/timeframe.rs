//! Timeframe definitions for market data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timeframe for bars/candles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// 1 minute bars
    #[serde(rename = "1m")]
    Minute1,
    /// 3 minute bars
    #[serde(rename = "3m")]
    Minute3,
    /// 5 minute bars
    #[serde(rename = "5m")]
    #[default]
    Minute5,
    /// 15 minute bars
    #[serde(rename = "15m")]
    Minute15,
    /// 30 minute bars
    #[serde(rename = "30m")]
    Minute30,
    /// 1 hour bars
    #[serde(rename = "1h")]
    Hour1,
    /// 2 hour bars
    #[serde(rename = "2h")]
    Hour2,
    /// 4 hour bars
    #[serde(rename = "4h")]
    Hour4,
    /// 6 hour bars
    #[serde(rename = "6h")]
    Hour6,
    /// 12 hour bars
    #[serde(rename = "12h")]
    Hour12,
    /// Daily bars
    #[serde(rename = "1d")]
    Daily,
    /// Weekly bars
    #[serde(rename = "1w")]
    Weekly,
}

impl Timeframe {
    /// Get the duration of the timeframe in seconds.
    pub fn as_secs(&self) -> u64 {
        match self {
            Timeframe::Minute1 => 60,
            Timeframe::Minute3 => 180,
            Timeframe::Minute5 => 300,
            Timeframe::Minute15 => 900,
            Timeframe::Minute30 => 1800,
            Timeframe::Hour1 => 3600,
            Timeframe::Hour2 => 7200,
            Timeframe::Hour4 => 14400,
            Timeframe::Hour6 => 21600,
            Timeframe::Hour12 => 43200,
            Timeframe::Daily => 86400,
            Timeframe::Weekly => 604800,
        }
    }

    /// Get the duration of the timeframe in milliseconds.
    pub fn as_millis(&self) -> u64 {
        self.as_secs() * 1000
    }

    /// Number of bars that cover one day at this timeframe.
    pub fn bars_per_day(&self) -> usize {
        (86400 / self.as_secs()).max(1) as usize
    }

    /// Check if this is an intraday timeframe.
    pub fn is_intraday(&self) -> bool {
        self.as_secs() < 86400
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::Minute1 => "1m",
            Timeframe::Minute3 => "3m",
            Timeframe::Minute5 => "5m",
            Timeframe::Minute15 => "15m",
            Timeframe::Minute30 => "30m",
            Timeframe::Hour1 => "1h",
            Timeframe::Hour2 => "2h",
            Timeframe::Hour4 => "4h",
            Timeframe::Hour6 => "6h",
            Timeframe::Hour12 => "12h",
            Timeframe::Daily => "1d",
            Timeframe::Weekly => "1w",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1m" | "1min" | "minute" => Ok(Timeframe::Minute1),
            "3m" | "3min" => Ok(Timeframe::Minute3),
            "5m" | "5min" => Ok(Timeframe::Minute5),
            "15m" | "15min" => Ok(Timeframe::Minute15),
            "30m" | "30min" => Ok(Timeframe::Minute30),
            "1h" | "1hour" | "hour" => Ok(Timeframe::Hour1),
            "2h" | "2hour" => Ok(Timeframe::Hour2),
            "4h" | "4hour" => Ok(Timeframe::Hour4),
            "6h" | "6hour" => Ok(Timeframe::Hour6),
            "12h" | "12hour" => Ok(Timeframe::Hour12),
            "1d" | "day" | "daily" => Ok(Timeframe::Daily),
            "1w" | "week" | "weekly" => Ok(Timeframe::Weekly),
            _ => Err(format!("Invalid timeframe: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_duration() {
        assert_eq!(Timeframe::Minute1.as_secs(), 60);
        assert_eq!(Timeframe::Minute5.as_secs(), 300);
        assert_eq!(Timeframe::Hour1.as_secs(), 3600);
        assert_eq!(Timeframe::Daily.as_secs(), 86400);
    }

    #[test]
    fn test_bars_per_day() {
        assert_eq!(Timeframe::Minute5.bars_per_day(), 288);
        assert_eq!(Timeframe::Hour1.bars_per_day(), 24);
        assert_eq!(Timeframe::Daily.bars_per_day(), 1);
    }

    #[test]
    fn test_timeframe_parse() {
        assert_eq!(Timeframe::from_str("1m").unwrap(), Timeframe::Minute1);
        assert_eq!(Timeframe::from_str("5m").unwrap(), Timeframe::Minute5);
        assert_eq!(Timeframe::from_str("daily").unwrap(), Timeframe::Daily);
    }

    #[test]
    fn test_timeframe_display() {
        assert_eq!(Timeframe::Minute5.to_string(), "5m");
        assert_eq!(Timeframe::Daily.to_string(), "1d");
    }

    #[test]
    fn test_is_intraday() {
        assert!(Timeframe::Minute1.is_intraday());
        assert!(Timeframe::Hour12.is_intraday());
        assert!(!Timeframe::Daily.is_intraday());
        assert!(!Timeframe::Weekly.is_intraday());
    }
}
