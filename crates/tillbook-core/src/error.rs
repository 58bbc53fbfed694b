use thiserror::Error;

/// Input rejected locally, before any network call or offline queueing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select a date")]
    MissingDate,

    #[error("Please select a category")]
    MissingCategory,

    #[error("Please enter a valid amount (got {0:?})")]
    InvalidAmount(String),

    #[error("Unknown expense category: {0}")]
    UnknownCategory(String),

    #[error("Unknown payment method: {0} (expected cash or bank)")]
    UnknownPaymentMethod(String),

    #[error("Please enter the Apps Script web app URL")]
    MissingEndpoint,

    #[error("Invalid Apps Script URL. Should be in format: https://script.google.com/macros/s/.../exec")]
    InvalidEndpoint(String),
}
