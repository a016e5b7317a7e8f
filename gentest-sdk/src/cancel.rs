//! Cooperative cancellation.

pub use tokio_util::sync::CancellationToken;

/// Returned when an operation observed a cancelled [`CancellationToken`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation was cancelled")]
pub struct Cancelled;

/// Fail with [`Cancelled`] if the token has been cancelled.
pub fn check(token: &CancellationToken) -> Result<(), Cancelled> {
    if token.is_cancelled() {
        Err(Cancelled)
    } else {
        Ok(())
    }
}
