use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use mirror_core::MirrorConfig;
use mirror_sync::{PassReport, Synchronizer, TracingLogger};

use crate::error::{io_err, DaemonError};
use crate::logging::{init_logging, LogFormat};

/// Totals over the lifetime of one scheduler run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerSummary {
    pub passes: u64,
    pub changed_passes: u64,
    pub errors: u64,
}

impl SchedulerSummary {
    fn record(&mut self, report: &PassReport) {
        self.passes += 1;
        if report.changed() {
            self.changed_passes += 1;
        }
        self.errors += report.errors.len() as u64;
    }
}

/// Install logging, build the engine, and block the current thread on the
/// scheduler until Ctrl-C.
///
/// An initialization failure is logged and returned before any pass runs.
pub fn start_blocking(
    config: &MirrorConfig,
    format: LogFormat,
) -> Result<SchedulerSummary, DaemonError> {
    let log_path = init_logging(&config.log_folder, format)?;
    tracing::info!(
        source = %config.source_folder.display(),
        replica = %config.replica_folder.display(),
        interval_seconds = config.interval_seconds,
        log = %log_path.display(),
        "starting synchronization",
    );

    let synchronizer = match Synchronizer::new(
        &config.source_folder,
        &config.replica_folder,
        Arc::new(TracingLogger),
    ) {
        Ok(synchronizer) => Arc::new(synchronizer),
        Err(err) => {
            tracing::error!(error = %err, "initialization failed");
            return Err(err.into());
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run_until_ctrl_c(synchronizer, config.interval()))
}

/// Run the scheduler until Ctrl-C is received.
pub async fn run_until_ctrl_c(
    synchronizer: Arc<Synchronizer>,
    interval: Duration,
) -> Result<SchedulerSummary, DaemonError> {
    let (shutdown_tx, _) = broadcast::channel::<()>(4);

    let scheduler_handle = {
        let shutdown = shutdown_tx.clone();
        let shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(async move {
            let result = run(synchronizer, interval, shutdown_rx).await;
            let _ = shutdown.send(());
            result
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        let mut shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    let _ = shutdown.send(());
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, stopping after the current pass");
                            Ok(())
                        }
                        Err(err) => Err(DaemonError::Signal(err.to_string())),
                    }
                }
            }
        })
    };

    let (scheduler_result, signal_result) = tokio::join!(scheduler_handle, signal_handle);
    let summary = handle_join("scheduler", scheduler_result)?;
    handle_join("signal_handler", signal_result)?;
    Ok(summary)
}

/// Run one pass, then wait for `interval` or a shutdown message, and repeat.
///
/// Passes never overlap: each runs to completion on the blocking pool before
/// the wait starts. A shutdown received during a pass stops the loop once
/// that pass is done.
pub async fn run(
    synchronizer: Arc<Synchronizer>,
    interval: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<SchedulerSummary, DaemonError> {
    let mut summary = SchedulerSummary::default();

    loop {
        let engine = synchronizer.clone();
        let report = tokio::task::spawn_blocking(move || engine.synchronize())
            .await
            .map_err(|err| DaemonError::Join {
                task: "synchronization pass",
                message: err.to_string(),
            })?;
        summary.record(&report);
        tracing::info!(
            pass = summary.passes,
            changed = report.changed(),
            mutations = report.mutation_count(),
            errors = report.errors.len(),
            duration_ms = report.duration_ms,
            "synchronization pass finished",
        );

        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    tracing::info!(
        passes = summary.passes,
        changed_passes = summary.changed_passes,
        "synchronization stopped",
    );
    Ok(summary)
}

fn handle_join<T>(
    task: &'static str,
    result: Result<Result<T, DaemonError>, tokio::task::JoinError>,
) -> Result<T, DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Join {
            task,
            message: err.to_string(),
        }),
    }
}
