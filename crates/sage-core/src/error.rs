//! Error types for the analysis system.

use thiserror::Error;

/// Top-level analysis system error.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),

    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Market data errors.
///
/// These cover fetch failures and malformed bar history. Insufficient
/// history is never an error at this level; indicators report it through
/// their undefined warm-up region instead.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("No data available for the requested range")]
    NoDataAvailable,

    #[error("Invalid timeframe: {0}")]
    InvalidTimeframe(String),

    #[error("Bars out of order at index {index}")]
    OutOfOrder { index: usize },

    #[error("Invalid price value: {0}")]
    InvalidPrice(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Rate limited: retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Indicator calculation errors.
///
/// A NaN escaping an indicator's guards is a bug: it is logged with
/// context and the affected series degrades to undefined, never aborting
/// the analysis cycle.
#[derive(Error, Debug)]
pub enum IndicatorError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Calculation produced NaN for {indicator} on window {window}")]
    UndefinedValue { indicator: String, window: String },
}

/// Recommendation signal errors.
///
/// Malformed recommendations degrade to Hold; they are never fatal.
#[derive(Error, Debug)]
pub enum SignalError {
    #[error("Response contains no signal action")]
    MissingAction,

    #[error("Unrecognized signal action: {0}")]
    UnknownAction(String),

    #[error("Invalid price field {field}: {value}")]
    InvalidPrice { field: String, value: String },
}

/// Reasoning oracle errors.
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Empty response from model")]
    EmptyResponse,

    #[error("Malformed response: {0}")]
    Malformed(#[from] SignalError),
}

/// Persistence errors.
///
/// A failed save is reported, not retried immediately; in-memory state
/// stays authoritative and the next cycle writes again.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
