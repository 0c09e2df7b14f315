use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing::{debug, error, trace};

use gbucketremove_rs::config::Config;
use gbucketremove_rs::{
    CLIArgs, Remover, create_drain_cancellation_token, exit_code_from_error, is_cancelled_error,
};

mod ctrl_c_handler;
pub mod indicator;
mod tracing_init;
pub mod ui_config;

/// gbucketremove - empties Google Cloud Storage buckets.
///
/// This binary is a thin wrapper over the gbucketremove-rs library.
#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config_exit_if_err();

    if let Some(shell) = config.auto_complete_shell {
        generate(
            shell,
            &mut CLIArgs::command(),
            "gbucketremove",
            &mut std::io::stdout(),
        );

        return Ok(());
    }

    start_tracing_if_necessary(&config);

    trace!("config = {:?}", config);

    if let Err(e) = run(config).await {
        if is_cancelled_error(&e) {
            debug!("remove cancelled by user.");
            return Ok(());
        }
        error!("{:#}", e);
        std::process::exit(exit_code_from_error(&e));
    }

    Ok(())
}

#[cfg_attr(coverage_nightly, coverage(off))]
fn load_config_exit_if_err() -> Config {
    match Config::try_from(CLIArgs::parse()) {
        Ok(config) => config,
        Err(error_message) => {
            clap::Error::raw(clap::error::ErrorKind::ValueValidation, error_message).exit()
        }
    }
}

fn start_tracing_if_necessary(config: &Config) -> bool {
    let Some(tracing_config) = config.tracing_config.as_ref() else {
        return false;
    };

    tracing_init::init_tracing(tracing_config);
    true
}

async fn run(config: Config) -> Result<()> {
    let cancellation_token = create_drain_cancellation_token();
    ctrl_c_handler::spawn_ctrl_c_handler(cancellation_token.clone());

    let start_time = tokio::time::Instant::now();
    debug!("gbucketremove start.");

    let remover = Remover::new(config.clone(), cancellation_token).await?;
    let indicator_join_handle = indicator::show_indicator(
        remover.get_stats_receiver(),
        ui_config::is_progress_indicator_needed(&config),
        ui_config::is_show_result_needed(&config),
    );

    let result = remover.run(config.lifecycle_event).await;
    remover.close_stats_sender();
    indicator_join_handle.await?;

    let duration_sec = format!("{:.3}", start_time.elapsed().as_secs_f32());
    match result {
        Ok(results) => {
            debug!(
                duration_sec = duration_sec,
                buckets = results.len(),
                "gbucketremove has been completed."
            );
            Ok(())
        }
        Err(e) => {
            debug!(duration_sec = duration_sec, "gbucketremove failed.");
            Err(e)
        }
    }
}
