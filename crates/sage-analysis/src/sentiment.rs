//! Sentiment merge contract.
//!
//! Sentiment is a supplied value, never computed here: the adapter picks
//! the sample closest to the latest bar and derives a directional label.
//! No sample within a day of the bar means no sentiment in the snapshot.

use sage_core::traits::SentimentSample;
use sage_core::types::SentimentSnapshot;

const MAX_SAMPLE_AGE_MS: i64 = 86_400_000;

/// Map a Fear & Greed reading onto a directional label.
pub fn sentiment_label(score: u32, classification: &str) -> &'static str {
    match classification {
        "Extreme Greed" => "extremely_bullish",
        "Greed" => "bullish",
        "Fear" => "bearish",
        "Extreme Fear" => "extremely_bearish",
        _ if score > 60 => "slightly_bullish",
        _ if score < 40 => "slightly_bearish",
        _ => "neutral",
    }
}

/// Pick the sample nearest the latest bar, within 24 hours.
pub fn merge_sentiment(
    samples: &[SentimentSample],
    latest_bar_ms: i64,
) -> Option<SentimentSnapshot> {
    let nearest = samples
        .iter()
        .filter(|s| (s.timestamp.timestamp_millis() - latest_bar_ms).abs() < MAX_SAMPLE_AGE_MS)
        .min_by_key(|s| (s.timestamp.timestamp_millis() - latest_bar_ms).abs())?;

    Some(SentimentSnapshot {
        timestamp: nearest.timestamp,
        score: nearest.score,
        classification: nearest.classification.clone(),
        label: sentiment_label(nearest.score, &nearest.classification).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample(offset_ms: i64, score: u32, classification: &str) -> SentimentSample {
        SentimentSample {
            timestamp: Utc.timestamp_millis_opt(1_700_000_000_000 + offset_ms).unwrap(),
            score,
            classification: classification.to_string(),
        }
    }

    #[test]
    fn test_label_mapping() {
        assert_eq!(sentiment_label(90, "Extreme Greed"), "extremely_bullish");
        assert_eq!(sentiment_label(70, "Greed"), "bullish");
        assert_eq!(sentiment_label(30, "Fear"), "bearish");
        assert_eq!(sentiment_label(10, "Extreme Fear"), "extremely_bearish");
        assert_eq!(sentiment_label(65, "Neutral"), "slightly_bullish");
        assert_eq!(sentiment_label(35, "Neutral"), "slightly_bearish");
        assert_eq!(sentiment_label(50, "Neutral"), "neutral");
    }

    #[test]
    fn test_merge_picks_nearest() {
        let samples = vec![
            sample(-10_000_000, 20, "Fear"),
            sample(-100_000, 55, "Neutral"),
        ];
        let merged = merge_sentiment(&samples, 1_700_000_000_000).unwrap();
        assert_eq!(merged.score, 55);
        assert_eq!(merged.label, "neutral");
    }

    #[test]
    fn test_merge_rejects_stale_samples() {
        let samples = vec![sample(-2 * MAX_SAMPLE_AGE_MS, 20, "Fear")];
        assert!(merge_sentiment(&samples, 1_700_000_000_000).is_none());
    }

    #[test]
    fn test_merge_empty_is_none() {
        assert!(merge_sentiment(&[], 1_700_000_000_000).is_none());
    }
}
