//! Operation wrapper: loading visualization and error surfacing for any
//! backend call.

use crate::error::ClientError;
use crate::loading::LoadingCoordinator;
use std::error::Error as StdError;
use std::future::Future;
use tracing::error;

/// Destination for user-facing error messages.
pub trait MessageSink: Send + Sync {
    /// Display an error message.
    fn error(&self, message: &str);
}

/// Build the user-facing text for an error.
///
/// Client errors carry their own message, with a status body's `detail`
/// shown in place of the raw body. Other errors use their display text, and
/// errors without one are reported with their debug form.
pub fn describe_error(err: &(dyn StdError + 'static)) -> String {
    if let Some(client) = err.downcast_ref::<ClientError>() {
        if let (Some(status), Some(detail)) = (client.status(), client.detail()) {
            return format!("{status}: {detail}");
        }
        return client.to_string();
    }
    let message = err.to_string();
    if message.trim().is_empty() {
        format!("Unknown error: {err:?}")
    } else {
        message
    }
}

/// Run an operation under the loading coordinator.
///
/// Returns the value on success. On failure the error is forwarded to `sink`
/// and `None` is returned; the failure does not propagate further. The
/// indicator reaches a terminal state on every path, including when the
/// returned future is dropped before completion.
pub async fn fetch<T, E, F>(
    operation: F,
    sink: &dyn MessageSink,
    loading: &LoadingCoordinator,
) -> Option<T>
where
    F: Future<Output = Result<T, E>>,
    E: StdError + 'static,
{
    let guard = loading.guard();
    match operation.await {
        Ok(value) => {
            guard.finish();
            Some(value)
        }
        Err(err) => {
            guard.error();
            let message = describe_error(&err);
            error!(error = %message, "request failed");
            sink.error(&message);
            None
        }
    }
}
