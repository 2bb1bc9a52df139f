//! PipelineController - lifecycle of one fusion pipeline
//!
//! Owns the shared stores and the stop flag, spawns the three activities and
//! joins them on stop. Every controller instance is independent: nothing is
//! process-global.

use std::fmt;
use std::time::Duration;

use contracts::{
    ActivityReport, ContractError, FrameSource, FusedRecord, FusionConfig, MonotonicClock,
    PipelineState, SharedClock, TelemetrySource,
};
use ingestion::{FrameSlot, TelemetryBuffer, TelemetryIngestor, VideoIngestor};
use sync_engine::{SyncReport, Synchronizer};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::error::LifecycleError;
use crate::stats::PipelineStats;

/// Controller lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, nothing spawned
    Idle,
    /// Activities running
    Running,
    /// Stop requested, joining activities
    Stopping,
    /// All activities exited (terminal)
    Stopped,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

struct ActivityTasks {
    video: JoinHandle<ActivityReport>,
    telemetry: JoinHandle<ActivityReport>,
    sync: JoinHandle<SyncReport>,
    started_at: Instant,
}

/// Lifecycle owner of one pipeline
pub struct PipelineController {
    config: FusionConfig,
    clock: SharedClock,
    state: PipelineState,
    slot: FrameSlot,
    buffer: TelemetryBuffer,
    phase: Phase,
    tasks: Option<ActivityTasks>,
}

impl PipelineController {
    /// Create an idle controller on a fresh monotonic clock
    ///
    /// # Errors
    /// Rejects non-positive rates, intervals and capacities before anything runs
    pub fn new(config: FusionConfig) -> Result<Self, ContractError> {
        Self::with_clock(config, MonotonicClock::shared())
    }

    /// Create an idle controller stamping records with `clock`
    pub fn with_clock(config: FusionConfig, clock: SharedClock) -> Result<Self, ContractError> {
        config.validate()?;
        let buffer = TelemetryBuffer::new(config.pipeline.telemetry_buffer_capacity)?;

        Ok(Self {
            config,
            clock,
            state: PipelineState::new(),
            slot: FrameSlot::new(),
            buffer,
            phase: Phase::Idle,
            tasks: None,
        })
    }

    /// Clock shared by all activities; sources should stamp with it too
    pub fn clock(&self) -> SharedClock {
        self.clock.clone()
    }

    /// Stop handle for external signals
    pub fn state(&self) -> PipelineState {
        self.state.clone()
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Validated configuration this controller was built with
    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Spawn the three activities
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// `AlreadyStarted` if the controller left Idle; nothing is spawned
    #[instrument(name = "pipeline_start", skip_all, fields(phase = %self.phase))]
    pub fn start<F, T>(
        &mut self,
        frames: F,
        telemetry: T,
        records: mpsc::Sender<FusedRecord>,
    ) -> Result<(), LifecycleError>
    where
        F: FrameSource + 'static,
        T: TelemetrySource + 'static,
    {
        if self.phase != Phase::Idle {
            warn!(phase = %self.phase, "start rejected");
            return Err(LifecycleError::AlreadyStarted { phase: self.phase });
        }

        let settings = &self.config.pipeline;

        let video = VideoIngestor::new(frames, self.slot.clone(), settings.video_period());
        let telemetry =
            TelemetryIngestor::new(telemetry, self.buffer.clone(), settings.telemetry_period());
        let sync = Synchronizer::new(
            self.slot.clone(),
            self.buffer.clone(),
            records,
            self.clock.clone(),
            settings.sync_interval(),
        )
        .with_policy(settings.match_policy);

        self.tasks = Some(ActivityTasks {
            video: tokio::spawn(video.run(self.state.subscribe())),
            telemetry: tokio::spawn(telemetry.run(self.state.subscribe())),
            sync: tokio::spawn(sync.run(self.state.subscribe())),
            started_at: Instant::now(),
        });
        self.phase = Phase::Running;

        info!(
            video_rate_hz = settings.video_rate_hz,
            telemetry_rate_hz = settings.telemetry_rate_hz,
            sync_interval_ms = settings.sync_interval_ms,
            buffer_capacity = settings.telemetry_buffer_capacity,
            match_policy = ?settings.match_policy,
            "pipeline started"
        );
        Ok(())
    }

    /// Stop all activities and wait for them to exit
    ///
    /// Sleeping activities wake immediately; a busy one finishes its current
    /// tick first.
    ///
    /// # Errors
    /// `NotRunning` unless the controller is Running; `TaskFailed` if an
    /// activity panicked (the controller still ends Stopped)
    #[instrument(name = "pipeline_stop", skip_all)]
    pub async fn stop(&mut self) -> Result<PipelineStats, LifecycleError> {
        let tasks = match (self.phase, self.tasks.take()) {
            (Phase::Running, Some(tasks)) => tasks,
            (phase, tasks) => {
                self.tasks = tasks;
                return Err(LifecycleError::NotRunning { phase });
            }
        };

        self.phase = Phase::Stopping;
        if !self.state.request_stop() {
            debug!("stop was already requested externally");
        }

        let video = tasks.video.await;
        let telemetry = tasks.telemetry.await;
        let sync = tasks.sync.await;
        let duration = tasks.started_at.elapsed();
        self.phase = Phase::Stopped;

        let video = join_result("video_ingestion", video)?;
        let telemetry = join_result("telemetry_ingestion", telemetry)?;
        let sync = join_result("synchronization", sync)?;

        let stats = self.collect_stats(video, telemetry, sync, duration);
        info!(
            records = stats.records_emitted,
            skipped = stats.records_skipped,
            dropped = stats.records_dropped,
            lag_mean_ms = stats.lag_ms.mean,
            duration_secs = stats.duration.as_secs_f64(),
            "pipeline stopped"
        );
        Ok(stats)
    }

    fn collect_stats(
        &self,
        video: ActivityReport,
        telemetry: ActivityReport,
        sync: SyncReport,
        duration: Duration,
    ) -> PipelineStats {
        PipelineStats {
            video,
            telemetry,
            sync: sync.activity,
            records_emitted: sync.summary.total_records,
            records_skipped: sync.summary.total_skipped,
            records_dropped: sync.summary.total_dropped,
            frames_published: self.slot.writes(),
            telemetry_evicted: self.buffer.evicted_count(),
            telemetry_out_of_order: self.buffer.out_of_order_count(),
            lag_ms: sync.summary.lag_ms,
            duration,
        }
    }
}

impl Drop for PipelineController {
    fn drop(&mut self) {
        if self.phase == Phase::Running {
            // Detached tasks exit on their own once they see the flag.
            self.state.request_stop();
            debug!("controller dropped while running, stop requested");
        }
    }
}

fn join_result<T>(activity: &str, result: Result<T, JoinError>) -> Result<T, LifecycleError> {
    result.map_err(|e| LifecycleError::TaskFailed {
        activity: activity.to_string(),
        message: e.to_string(),
    })
}
