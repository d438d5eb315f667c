//! Failure vocabulary for the gift-card domain.

/// Business rule violations. Stable kinds so callers branch on the
/// variant, never on message text.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid user and/or password")]
    InvalidCredentials,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Invalid gift card id")]
    InvalidCardId,
    #[error("Gift card already claimed")]
    AlreadyClaimed,
    #[error("Gift card not claimed")]
    NotClaimed,
    #[error("Gift card not claimed by user")]
    CardNotClaimedByUser,
    #[error("Invalid merchant")]
    InvalidMerchant,
    #[error("Insufficient balance")]
    NotEnoughBalance,
}

/// Violations of the monetary input contract. Kept apart from
/// [`DomainError`]: these are caller bugs, not business outcomes, and
/// they are never repaired by rounding.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountError {
    #[error("malformed decimal amount")]
    Malformed,
    #[error("amount carries more than two fractional digits")]
    PrecisionLoss,
    #[error("amount must not be negative")]
    Negative,
    #[error("charge amount must be positive")]
    NotPositive,
}

/// Union of both failure classes, for the operations that can hit either.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Amount(#[from] AmountError),
}
