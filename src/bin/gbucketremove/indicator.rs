// Displays drain progress using indicatif and a moving average.
//
// Reads DrainStatistics from the stats channel and updates a single status
// line until the channel closes.

use std::io;
use std::io::Write;

use async_channel::Receiver;
use gbucketremove_rs::types::DrainStatistics;
use indicatif::{HumanCount, HumanDuration, ProgressBar, ProgressStyle};
use simple_moving_average::{SMA, SumTreeSMA};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::info;

/// Totals returned by [`show_indicator`] after the stats channel closes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorSummary {
    pub total_listed_count: u64,
    pub total_delete_count: u64,
    pub total_error_count: u64,
    pub total_drained_buckets: u64,
}

impl IndicatorSummary {
    fn apply(&mut self, stats: DrainStatistics) -> u64 {
        match stats {
            DrainStatistics::ListPage { objects, .. } => self.total_listed_count += objects,
            DrainStatistics::DeleteComplete { .. } => {
                self.total_delete_count += 1;
                return 1;
            }
            DrainStatistics::DeleteError { .. } => self.total_error_count += 1,
            DrainStatistics::BucketDrained { .. } => self.total_drained_buckets += 1,
        }
        0
    }
}

/// Moving average window in seconds (samples).
const MOVING_AVERAGE_PERIOD_SECS: usize = 10;

/// How often (in seconds) to refresh the progress display.
const REFRESH_INTERVAL: f32 = 1.0;

/// Spawn a background task that reads drain statistics from the channel and
/// displays progress.
///
/// The task runs until `stats_receiver` is closed. Await the returned handle
/// after the remover finished.
pub fn show_indicator(
    stats_receiver: Receiver<DrainStatistics>,
    show_progress: bool,
    show_result: bool,
) -> JoinHandle<IndicatorSummary> {
    let progress_text = ProgressBar::new(0);
    if let Ok(progress_style) = ProgressStyle::with_template("{wide_msg}") {
        progress_text.set_style(progress_style);
    }

    tokio::spawn(async move {
        let start_time = Instant::now();

        let mut ma_deleted_count = SumTreeSMA::<_, u64, MOVING_AVERAGE_PERIOD_SECS>::new();
        let mut summary = IndicatorSummary::default();

        loop {
            let mut period_count: u64 = 0;

            let period = Instant::now();
            loop {
                while let Ok(stats) = stats_receiver.try_recv() {
                    period_count += summary.apply(stats);
                }

                if REFRESH_INTERVAL < period.elapsed().as_secs_f32() {
                    break;
                }

                if stats_receiver.is_closed() {
                    while let Ok(stats) = stats_receiver.try_recv() {
                        summary.apply(stats);
                    }

                    let elapsed = start_time.elapsed();
                    let elapsed_secs_f64 = elapsed.as_secs_f64();

                    let objects_per_sec = if elapsed_secs_f64 < REFRESH_INTERVAL as f64 {
                        summary.total_delete_count
                    } else {
                        (summary.total_delete_count as f64 / elapsed_secs_f64) as u64
                    };

                    info!(
                        message = "drain summary",
                        listed_objects = summary.total_listed_count,
                        deleted_objects = summary.total_delete_count,
                        deleted_objects_per_sec = objects_per_sec,
                        error = summary.total_error_count,
                        drained_buckets = summary.total_drained_buckets,
                        duration_sec = elapsed_secs_f64,
                    );

                    if show_result {
                        if let Ok(result_style) = ProgressStyle::with_template("{msg}") {
                            progress_text.set_style(result_style);
                        }

                        progress_text.finish_with_message(format!(
                            "deleted {:>3} objects | {:>3} objects/sec,  error {} objects,  drained {} buckets,  duration {}",
                            summary.total_delete_count,
                            HumanCount(objects_per_sec),
                            summary.total_error_count,
                            summary.total_drained_buckets,
                            HumanDuration(elapsed),
                        ));

                        println!();
                        let _ = io::stdout().flush();
                    }

                    return summary;
                }

                tokio::time::sleep(std::time::Duration::from_secs_f32(0.05)).await;
            }

            ma_deleted_count.add_sample(period_count);

            if show_progress {
                progress_text.set_message(format!(
                    "listed {:>3} objects,  deleted {:>3} objects | {:>3} objects/sec,  error {} objects,  drained {} buckets",
                    summary.total_listed_count,
                    summary.total_delete_count,
                    HumanCount(ma_deleted_count.get_average()),
                    summary.total_error_count,
                    summary.total_drained_buckets,
                ));
            }
        }
    })
}
