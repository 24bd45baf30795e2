use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::matching::transitions::MatchNotice;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification channel unavailable: {0}")]
    Unavailable(String),
}

/// Delivery port for match notifications and messages.
///
/// Called after the write-set commits. A delivery failure never rolls back a match.
#[async_trait]
pub trait MatchNotifier: Send + Sync {
    async fn deliver(&self, notice: &MatchNotice) -> Result<(), NotifyError>;
}

/// Writes notices to the log. Used when no push/message channel is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl MatchNotifier for TracingNotifier {
    async fn deliver(&self, notice: &MatchNotice) -> Result<(), NotifyError> {
        match notice {
            MatchNotice::Notification {
                from, to, message, ..
            } => info!(%from, %to, "notification: {message}"),
            MatchNotice::Message { from, to, body } => {
                info!(%from, recipients = to.len(), "message: {body}")
            }
        }
        Ok(())
    }
}
