use thiserror::Error;

/// Errors returned by pricing collaborators.
#[derive(Debug, Error)]
pub enum PricingError {
    /// The provider could not serve the request. Transient per unit of work:
    /// the reward engine isolates the failure to the single pair it was
    /// computing.
    #[error("pricing provider unavailable: {reason}")]
    Unavailable { reason: String },
}
