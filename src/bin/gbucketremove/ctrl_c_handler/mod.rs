// Waits for either cancellation or Ctrl+C. On Ctrl+C the shared token is
// cancelled and every drain stops at its next page or pass boundary.

use gbucketremove_rs::DrainCancellationToken;
use tokio::task::JoinHandle;
use tokio::{select, signal};
use tracing::{debug, warn};

pub fn spawn_ctrl_c_handler(cancellation_token: DrainCancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        select! {
            _ = cancellation_token.cancelled() => {
                debug!("cancellation_token canceled.")
            }
            _ = signal::ctrl_c() => {
                warn!("ctrl-c received, stopping drains.");
                cancellation_token.cancel();
            }
        }
    })
}
