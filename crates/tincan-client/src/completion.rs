//! Result-or-callback delivery shared by every store operation.

use std::future::Future;

use crate::error::LrsResult;

/// Run `operation` and deliver its outcome through exactly one channel.
///
/// Without a callback the outcome is returned as `Ok(Some(value))` or `Err`.
/// With one, the callback receives the outcome and `Ok(None)` is returned.
pub async fn deliver<T, F, C>(operation: F, callback: Option<C>) -> LrsResult<Option<T>>
where
    F: Future<Output = LrsResult<T>>,
    C: FnOnce(LrsResult<T>),
{
    let outcome = operation.await;
    match callback {
        Some(callback) => {
            callback(outcome);
            Ok(None)
        }
        None => outcome.map(Some),
    }
}
