//! Structured-signal extraction from model response text.
//!
//! The decision template asks the model for labelled lines:
//!
//! ```text
//! Signal: BUY
//! Confidence: HIGH
//! Stop Loss: $64,250.00
//! Take Profit: $68,900.00
//! Position Size: 10% of portfolio
//! ```
//!
//! Extraction is line-oriented and tolerant of markdown emphasis and
//! bracketed values. A response without a recognizable action is
//! malformed; the cycle degrades it to Hold.

use rust_decimal::Decimal;
use sage_core::error::SignalError;
use sage_core::types::{Confidence, Signal, SignalAction};
use std::str::FromStr;

/// Remove `<think>...</think>` reasoning spans before extraction.
/// An unterminated span drops the remainder of the text.
pub fn strip_think_blocks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("<think>") {
        out.push_str(&rest[..start]);
        match rest[start..].find("</think>") {
            Some(end) => rest = &rest[start + end + "</think>".len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

/// Parse the decision block out of a cleaned response.
pub fn parse_signal(text: &str) -> Result<Signal, SignalError> {
    let action_field = extract_field(text, "signal:").ok_or(SignalError::MissingAction)?;
    let action_token = first_token(&action_field).ok_or(SignalError::MissingAction)?;
    let action = SignalAction::from_str(&action_token)
        .map_err(|_| SignalError::UnknownAction(action_token))?;

    let confidence = extract_field(text, "confidence:")
        .and_then(|field| first_token(&field))
        .and_then(|token| Confidence::from_str(&token).ok())
        .unwrap_or_default();

    let stop_loss = parse_price_field(text, "stop loss:")?;
    let take_profit = parse_price_field(text, "take profit:")?;
    let size = parse_price_field(text, "position size:")?
        .map(|percent| percent / Decimal::from(100));

    Ok(Signal {
        action,
        confidence,
        stop_loss,
        take_profit,
        size,
    })
}

/// Find the first line containing `key` (case-insensitive, markdown
/// emphasis ignored) and return the text after it.
fn extract_field(text: &str, key: &str) -> Option<String> {
    for line in text.lines() {
        let cleaned: String = line.chars().filter(|c| *c != '*').collect();
        let lower = cleaned.to_ascii_lowercase();
        if let Some(idx) = lower.find(key) {
            let value = cleaned[idx + key.len()..].trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// First whitespace token with decoration (`[`, `]`, `$`, `%`, `,`, `.`
/// at the edges) stripped.
fn first_token(field: &str) -> Option<String> {
    field
        .split_whitespace()
        .next()
        .map(|token| token.trim_matches(|c| matches!(c, '[' | ']' | '$' | '%' | ',' | '.')).to_string())
        .filter(|token| !token.is_empty())
}

/// Parse a labelled price/percent field. Absent field is `None`; a field
/// that is present but not numeric makes the signal malformed.
fn parse_price_field(text: &str, key: &str) -> Result<Option<Decimal>, SignalError> {
    let field = match extract_field(text, key) {
        Some(field) => field,
        None => return Ok(None),
    };

    for token in field.split_whitespace() {
        let cleaned: String = token
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        if cleaned.is_empty() {
            continue;
        }
        return Decimal::from_str(&cleaned)
            .map(Some)
            .map_err(|_| SignalError::InvalidPrice {
                field: key.trim_end_matches(':').to_string(),
                value: field.clone(),
            });
    }

    Err(SignalError::InvalidPrice {
        field: key.trim_end_matches(':').to_string(),
        value: field,
    })
}
