use async_channel::Sender;

use crate::config::Config;
use crate::storage::Storage;
use crate::types::DrainStatistics;
use crate::types::token::DrainCancellationToken;

/// Shared context passed to the lister, the deleter and the drainer.
///
/// One `Stage` is built per bucket drain. The storage client inside is a
/// cheap clone of the shared client, so every bucket talks to the service
/// through the same connection pool.
#[derive(Clone)]
pub struct Stage {
    pub config: Config,
    pub storage: Storage,
    pub cancellation_token: DrainCancellationToken,
    pub stats_sender: Sender<DrainStatistics>,
}

impl Stage {
    pub fn new(
        config: Config,
        storage: Storage,
        cancellation_token: DrainCancellationToken,
        stats_sender: Sender<DrainStatistics>,
    ) -> Self {
        Self {
            config,
            storage,
            cancellation_token,
            stats_sender,
        }
    }

    /// Send a statistics event. A closed channel is not an error: nobody is
    /// watching progress.
    pub async fn send_stats(&self, stats: DrainStatistics) {
        let _ = self.stats_sender.send(stats).await;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}
