/// A cancellation token used to signal drain shutdown.
///
/// This is a type alias for [`tokio_util::sync::CancellationToken`]. Pass the
/// token to [`Remover::new`](crate::Remover::new) and call
/// [`cancel()`](tokio_util::sync::CancellationToken::cancel) on it to stop
/// running drains at the next page or pass boundary (e.g., in a Ctrl+C handler).
pub type DrainCancellationToken = tokio_util::sync::CancellationToken;

/// Create a new [`DrainCancellationToken`].
///
/// # Example
///
/// ```
/// use gbucketremove_rs::create_drain_cancellation_token;
///
/// let token = create_drain_cancellation_token();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
pub fn create_drain_cancellation_token() -> DrainCancellationToken {
    tokio_util::sync::CancellationToken::new()
}
