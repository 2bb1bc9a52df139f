//! # Integration Tests
//!
//! End-to-end tests across crates.
//!
//! Covers:
//! - Contract snapshot checks
//! - Controller -> synchronizer -> dispatcher runs on mock sources
//! - Config file driven runs on simulated sources

#[cfg(test)]
mod contract_tests {
    use contracts::{ActivityKind, ConfigVersion, FusionConfig, MatchPolicy, SinkType};

    #[test]
    fn test_default_config_snapshot() {
        let config = FusionConfig::default();
        assert_eq!(config.version, ConfigVersion::V1);
        assert_eq!(config.pipeline.match_policy, MatchPolicy::Latest);
        assert_eq!(config.sinks.len(), 1);
        assert_eq!(config.sinks[0].sink_type, SinkType::Log);
    }

    #[test]
    fn test_activity_names_are_stable() {
        assert_eq!(ActivityKind::VideoIngestion.as_str(), "video_ingestion");
        assert_eq!(ActivityKind::TelemetryIngestion.as_str(), "telemetry_ingestion");
        assert_eq!(ActivityKind::Synchronization.as_str(), "synchronization");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::Write;
    use std::time::Duration;

    use config_loader::ConfigLoader;
    use contracts::{
        Attitude, ContractError, FrameDescriptor, FusedRecord, FusionConfig, GnssFix,
        ManualClock, PipelineSettings, RecordSink, TelemetrySample, TimestampSource,
    };
    use dispatcher::{create_dispatcher, CollectSink, Dispatcher, SinkHandle};
    use ingestion::{
        CountingCamera, CountingSensorBus, ScriptedFrameSource, ScriptedTelemetrySource,
        SimulatedCamera, SimulatedSensorBus,
    };
    use pipeline::{Phase, PipelineController};
    use tokio::sync::mpsc;

    /// Video and telemetry every ~67 ms, sync every 100 ms.
    ///
    /// Both stores are populated before the first sync tick, so every sync
    /// tick emits a record.
    fn aligned_config() -> FusionConfig {
        FusionConfig {
            pipeline: PipelineSettings {
                video_rate_hz: 15.0,
                telemetry_rate_hz: 15.0,
                sync_interval_ms: 100,
                telemetry_buffer_capacity: 8,
                record_queue_capacity: 32,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Sink that takes a fixed time per write
    struct SlowSink {
        delay: Duration,
    }

    impl RecordSink for SlowSink {
        fn name(&self) -> &str {
            "slow"
        }

        async fn write(&mut self, _record: &FusedRecord) -> Result<(), ContractError> {
            tokio::time::sleep(self.delay).await;
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), ContractError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            Ok(())
        }
    }

    /// End-to-end: counting sources -> controller -> dispatcher -> two sinks
    #[tokio::test(start_paused = true)]
    async fn test_e2e_counting_pipeline() {
        let mut controller = PipelineController::new(aligned_config()).unwrap();
        let clock = controller.clock();

        let primary = CollectSink::new("primary");
        let mirror = CollectSink::new("mirror");
        let (tx, rx) = mpsc::channel(32);
        let dispatcher = Dispatcher::with_handles(
            vec![
                SinkHandle::spawn(primary.clone(), 16),
                SinkHandle::spawn(mirror.clone(), 16),
            ],
            rx,
        )
        .spawn();

        controller
            .start(
                CountingCamera::new("cam", clock.clone(), 2048),
                CountingSensorBus::new("bus", clock),
                tx,
            )
            .unwrap();

        tokio::time::sleep(Duration::from_millis(1050)).await;
        let stats = controller.stop().await.unwrap();
        assert_eq!(controller.phase(), Phase::Stopped);

        // Synchronizer (and its sender) is gone once stop returns.
        let report = dispatcher.await.unwrap();

        assert_eq!(stats.sync.ticks, 10);
        assert_eq!(stats.records_emitted, 10);
        assert_eq!(stats.records_skipped, 0);
        assert_eq!(report.records, 10);

        let records = primary.records();
        assert_eq!(records.len(), 10);
        assert_eq!(mirror.len(), 10);
        assert!(primary.is_closed());
        assert!(mirror.is_closed());

        let sequences: Vec<u64> = records.iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, (1..=10).collect::<Vec<_>>());
        for record in &records {
            assert_eq!(record.frame.source_id, "cam");
            assert_eq!(record.frame.payload_bytes, 2048);
            assert!(record.telemetry.range_m > 10.0);
        }

        for (_, snapshot) in &report.sinks {
            assert_eq!(snapshot.written, 10);
            assert_eq!(snapshot.dropped, 0);
        }
    }

    /// A failed camera read keeps the last good frame in play
    #[tokio::test(start_paused = true)]
    async fn test_e2e_scripted_failures_reuse_last_frame() {
        let axis = ManualClock::new();
        let frame_at = axis.at(Duration::from_millis(5));
        let sample = |range_m: f64| {
            TelemetrySample::new(
                GnssFix {
                    latitude: 42.5,
                    longitude: -71.2,
                },
                Attitude {
                    pitch: 1.0,
                    roll: -0.5,
                },
                range_m,
                axis.now(),
            )
        };

        let frames = ScriptedFrameSource::new(
            "cam",
            vec![
                Ok(FrameDescriptor::new("cam", frame_at, 7, 512)),
                Err(ContractError::acquisition("cam", "usb reset")),
                Err(ContractError::acquisition("cam", "usb reset")),
            ],
        );
        let telemetry = ScriptedTelemetrySource::new(
            "bus",
            vec![sample(30.0), sample(31.0), sample(32.0)],
        );

        let mut controller = PipelineController::new(aligned_config()).unwrap();
        let collected = CollectSink::new("collect");
        let (tx, rx) = mpsc::channel(32);
        let dispatcher =
            Dispatcher::with_handles(vec![SinkHandle::spawn(collected.clone(), 16)], rx).spawn();

        controller.start(frames, telemetry, tx).unwrap();
        tokio::time::sleep(Duration::from_millis(450)).await;
        let stats = controller.stop().await.unwrap();
        dispatcher.await.unwrap();

        assert_eq!(stats.video.succeeded, 1);
        assert!(stats.video.failed >= 2);
        assert_eq!(stats.records_emitted, 4);

        let records = collected.records();
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.frame.sequence == 7));
        // Latest policy pairs with the newest sample once the script runs dry.
        assert_eq!(records.last().unwrap().telemetry.range_m, 32.0);
    }

    /// A slow sink loses records without slowing the synchronizer
    #[tokio::test(start_paused = true)]
    async fn test_e2e_slow_sink_does_not_stall_sync() {
        let mut controller = PipelineController::new(aligned_config()).unwrap();
        let clock = controller.clock();

        let fast = CollectSink::new("fast");
        let (tx, rx) = mpsc::channel(32);
        let dispatcher = Dispatcher::with_handles(
            vec![
                SinkHandle::spawn(fast.clone(), 16),
                SinkHandle::spawn(
                    SlowSink {
                        delay: Duration::from_millis(250),
                    },
                    1,
                ),
            ],
            rx,
        )
        .spawn();

        controller
            .start(
                CountingCamera::new("cam", clock.clone(), 1024),
                CountingSensorBus::new("bus", clock),
                tx,
            )
            .unwrap();

        tokio::time::sleep(Duration::from_millis(1050)).await;
        let stats = controller.stop().await.unwrap();
        let report = dispatcher.await.unwrap();

        assert_eq!(stats.records_emitted, 10);
        assert_eq!(stats.records_dropped, 0);
        assert_eq!(fast.len(), 10);

        let (name, slow) = &report.sinks[1];
        assert_eq!(name, "slow");
        assert!(slow.dropped > 0);
        assert_eq!(slow.written + slow.dropped, 10);
    }

    /// Config file -> simulated sources -> dispatcher built from config sinks
    #[tokio::test(start_paused = true)]
    async fn test_e2e_config_file_pipeline() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[pipeline]
video_rate_hz = 15.0
telemetry_rate_hz = 15.0
sync_interval_ms = 100
telemetry_buffer_capacity = 16
match_policy = "nearest"

[sources]
video_source_id = "cam0"
seed = 7

[[sinks]]
name = "log"
sink_type = "log"
queue_capacity = 32
"#
        )
        .unwrap();

        let config = ConfigLoader::load_from_path(file.path()).unwrap();
        let mut controller = PipelineController::new(config.clone()).unwrap();
        let clock = controller.clock();

        let (tx, rx) = mpsc::channel(config.pipeline.record_queue_capacity);
        let dispatcher = create_dispatcher(config.sinks.clone(), rx).unwrap().spawn();

        controller
            .start(
                SimulatedCamera::from_settings(&config.sources, clock.clone()),
                SimulatedSensorBus::from_settings(&config.sources, clock),
                tx,
            )
            .unwrap();

        tokio::time::sleep(Duration::from_millis(550)).await;
        let stats = controller.stop().await.unwrap();
        let report = dispatcher.await.unwrap();

        assert_eq!(stats.records_emitted, 5);
        assert_eq!(stats.acquisition_failures(), 0);
        assert_eq!(report.records, 5);
        assert_eq!(report.sinks.len(), 1);
        assert_eq!(report.sinks[0].0, "log");
        assert_eq!(report.sinks[0].1.written, 5);
    }
}
