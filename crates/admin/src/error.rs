//! Admin console errors.

use thiserror::Error;
use the_wind_storefront::OperationError;

/// Why the admin console could not be used.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Nobody is signed in.
    #[error("Unauthorized: sign in with an admin account")]
    Unauthorized,

    /// Signed in, but not as an admin.
    #[error("Forbidden: {email} is not an admin")]
    Forbidden { email: String },

    /// A console operation failed.
    #[error(transparent)]
    Operation(#[from] OperationError),
}

impl AdminError {
    /// Log the failure; client-side operation failures also go to Sentry.
    pub fn report(&self) {
        match self {
            Self::Operation(e) => e.report(),
            Self::Unauthorized | Self::Forbidden { .. } => {
                tracing::warn!(error = %self, "Admin console refused");
            }
        }
    }
}
