//! Exchange rate error taxonomy

use thiserror::Error;

const DEFAULT_API_MESSAGE: &str =
    "Conversion service temporarily unavailable. Please try again later.";

/// Every failure a rate lookup can surface. None of these are retried by the
/// resolver; retry policy belongs to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Invalid response from rate feed")]
    InvalidResponse,
    #[error("Rate feed error: {0}")]
    ApiError(String),
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
    #[error("Function access restricted for this plan")]
    FunctionAccessRestricted,

    // Feed validation errors (6xx)
    #[error("Invalid base currency")]
    InvalidBaseCurrency,
    #[error("Invalid currency symbols")]
    InvalidSymbols,
    #[error("Invalid date")]
    InvalidDate,
    #[error("Invalid amount")]
    InvalidAmount,
    #[error("Invalid timeframe")]
    InvalidTimeframe,
    #[error("Weekend markets closed")]
    WeekendMarketsClosed,

    // HTTP status errors
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden")]
    Forbidden,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Too many requests")]
    TooManyRequests,
}

impl ExchangeError {
    /// Maps a feed-reported error code. Unknown codes keep the feed's message.
    pub fn from_api_code(code: i64, message: Option<&str>) -> Self {
        match code {
            104 => ExchangeError::RateLimitExceeded,
            105 => ExchangeError::FunctionAccessRestricted,
            601 => ExchangeError::InvalidBaseCurrency,
            602 => ExchangeError::InvalidSymbols,
            603 => ExchangeError::InvalidDate,
            604 => ExchangeError::InvalidAmount,
            605 => ExchangeError::InvalidTimeframe,
            606 => ExchangeError::WeekendMarketsClosed,
            _ => ExchangeError::ApiError(message.unwrap_or(DEFAULT_API_MESSAGE).to_string()),
        }
    }

    /// Maps a raw HTTP status when the transport did not yield a feed body.
    pub fn from_http_status(status: u16, endpoint: &str, message: Option<&str>) -> Self {
        match status {
            400 => ExchangeError::BadRequest(endpoint.to_string()),
            401 => ExchangeError::Unauthorized,
            403 => ExchangeError::Forbidden,
            404 => ExchangeError::NotFound(message.unwrap_or("resource").to_string()),
            429 => ExchangeError::TooManyRequests,
            _ => ExchangeError::NetworkError(
                message
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Connection error (Status: {status})")),
            ),
        }
    }

    /// Human-readable message shown to end users.
    pub fn user_message(&self) -> String {
        match self {
            ExchangeError::InvalidResponse => {
                "Unable to process the response from the currency service. Please try again."
                    .to_string()
            }
            ExchangeError::ApiError(message) => message.clone(),
            ExchangeError::RateLimitExceeded => {
                "Too many requests have been made. Please wait a moment and try again.".to_string()
            }
            ExchangeError::NetworkError(message) => format!(
                "Network connection error: {message}. Please check your internet connection."
            ),
            ExchangeError::BadRequest(endpoint) => {
                format!("Invalid request to {endpoint}. Please try again.")
            }
            ExchangeError::Unauthorized => {
                "Authentication failed. The currency service is temporarily unavailable."
                    .to_string()
            }
            ExchangeError::Forbidden => {
                "Access denied to the currency service. Please try again later.".to_string()
            }
            ExchangeError::NotFound(resource) => {
                format!("The requested {resource} could not be found.")
            }
            ExchangeError::TooManyRequests => {
                "Service is busy. Please wait a moment and try again.".to_string()
            }
            ExchangeError::InvalidBaseCurrency => {
                "The selected base currency is not supported. Please choose a different currency."
                    .to_string()
            }
            ExchangeError::InvalidSymbols => "One or more selected currencies are not supported. Please check your currency selection.".to_string(),
            ExchangeError::InvalidDate => "Invalid date specified. Please try again.".to_string(),
            ExchangeError::InvalidAmount => {
                "Please enter a valid amount greater than 0.".to_string()
            }
            ExchangeError::InvalidTimeframe => {
                "Invalid time period specified. Please try again.".to_string()
            }
            ExchangeError::WeekendMarketsClosed => "Currency markets are closed over the weekend. Please try again during business hours.".to_string(),
            ExchangeError::FunctionAccessRestricted => {
                "This conversion feature is temporarily unavailable. Please try again later."
                    .to_string()
            }
        }
    }
}
