//! # Integration Tests
//!
//! End-to-end tests wiring mock endpoints through the full stack:
//! config -> routing -> service -> engines -> recorders.

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use contracts::{MetricValue, Reader, Recorder};
    use endpoints::{FlattenMapper, MockReader, MockRecorder};
    use service::Service;
    use tokio_util::sync::CancellationToken;

    const CONFIG: &str = r#"
[[readers]]
name = "app"
url = "http://localhost:1234/debug/vars"
interval_secs = 0.01
timeout_secs = 0.5

[[readers]]
name = "db"
url = "http://localhost:5678/debug/vars"
interval_secs = 0.01
timeout_secs = 0.5

[[recorders]]
name = "primary"
index = "metrics"

[[recorders]]
name = "secondary"
index = "metrics_copy"

[routes.everything]
readers = ["app", "db"]
recorders = "primary"

[routes.app_copy]
readers = "app"
recorders = ["primary", "secondary"]
"#;

    async fn wait_for_jobs(recorder: &MockRecorder, target: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while recorder.jobs().len() < target {
            assert!(
                Instant::now() < deadline,
                "timed out waiting for {} jobs at '{}', got {}",
                target,
                recorder.name(),
                recorder.jobs().len()
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    /// End-to-end: config -> adjacency -> fleet of mock-backed engines
    ///
    /// Verifies the full flow:
    /// 1. ConfigLoader parses and validates the blueprint
    /// 2. The routing compiler produces a deduplicated adjacency
    /// 3. The service runs one engine per reader, jobs arrive flattened
    /// 4. Cancellation drains the whole fleet within a bounded time
    #[tokio::test]
    async fn test_e2e_mock_pipeline() {
        let blueprint =
            config_loader::ConfigLoader::load_from_str(CONFIG, config_loader::ConfigFormat::Toml)
                .unwrap();

        let adjacency = routing::compile(&blueprint.routes).unwrap();
        // "app" appears in both routes but gets exactly one engine.
        assert_eq!(adjacency.len(), 2);
        assert_eq!(adjacency["app"].len(), 2);
        assert_eq!(adjacency["db"].len(), 1);

        let app = Arc::new(MockReader::new("app").with_payload(&br#"{"mem": {"alloc": 42}}"#[..]));
        let db = Arc::new(MockReader::new("db").with_payload(&br#"{"conns": 7}"#[..]));
        let primary = Arc::new(MockRecorder::new("primary"));
        let secondary = Arc::new(MockRecorder::new("secondary").with_index("metrics_copy"));

        let mut readers: HashMap<String, Arc<dyn Reader>> = HashMap::new();
        readers.insert("app".to_string(), app.clone());
        readers.insert("db".to_string(), db.clone());

        let mut recorders: HashMap<String, Arc<dyn Recorder>> = HashMap::new();
        recorders.insert("primary".to_string(), primary.clone());
        recorders.insert("secondary".to_string(), secondary.clone());

        let cancel = CancellationToken::new();
        let service = Service::new(
            adjacency,
            readers,
            recorders,
            Box::new(FlattenMapper::new()),
            cancel.clone(),
        );

        let handle = service.start().await.unwrap();
        assert_eq!(handle.engine_count(), 2);

        wait_for_jobs(&primary, 6).await;
        wait_for_jobs(&secondary, 3).await;

        // Flattened, typed, prefixed with the reader name.
        let jobs = primary.jobs();
        let app_job = jobs.iter().find(|j| j.values[0].key.starts_with("app.")).unwrap();
        assert_eq!(app_job.values[0].key, "app.mem.alloc");
        assert_eq!(app_job.values[0].value, MetricValue::Int(42));
        let db_job = jobs.iter().find(|j| j.values[0].key.starts_with("db.")).unwrap();
        assert_eq!(db_job.values[0].key, "db.conns");
        assert_eq!(db_job.values[0].value, MetricValue::Int(7));

        // Destination fields come from the recorder's own configuration.
        let copy_job = &secondary.jobs()[0];
        assert_eq!(copy_job.index, "metrics_copy");

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle.wait())
            .await
            .expect("fleet did not drain after cancellation");
    }

    /// One read fans out to every recorder with the same correlation token
    #[tokio::test]
    async fn test_e2e_fanout_shares_token() {
        let reader = Arc::new(MockReader::new("app"));
        let first = Arc::new(MockRecorder::new("first"));
        let second = Arc::new(MockRecorder::new("second"));

        let mut adjacency = routing::ReaderRecorderAdjacency::new();
        adjacency.insert(
            "app".to_string(),
            ["first", "second"].iter().map(|s| s.to_string()).collect(),
        );

        let mut readers: HashMap<String, Arc<dyn Reader>> = HashMap::new();
        readers.insert("app".to_string(), reader);
        let mut recorders: HashMap<String, Arc<dyn Recorder>> = HashMap::new();
        recorders.insert("first".to_string(), first.clone());
        recorders.insert("second".to_string(), second.clone());

        let cancel = CancellationToken::new();
        let handle = Service::new(
            adjacency,
            readers,
            recorders,
            Box::new(FlattenMapper::new()),
            cancel.clone(),
        )
        .start()
        .await
        .unwrap();

        wait_for_jobs(&first, 1).await;
        wait_for_jobs(&second, 1).await;

        let token = first.jobs()[0].token.id();
        assert!(second.jobs().iter().any(|j| j.token.id() == token));

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle.wait())
            .await
            .expect("fleet did not drain after cancellation");
    }

    /// Reader retirement ends its engine, and with it the whole fleet
    #[tokio::test]
    async fn test_e2e_reader_retirement_ends_fleet() {
        let reader = Arc::new(MockReader::new("app").with_retire_after(3));
        let recorder = Arc::new(MockRecorder::new("rec"));

        let mut adjacency = routing::ReaderRecorderAdjacency::new();
        adjacency.insert(
            "app".to_string(),
            std::iter::once("rec".to_string()).collect(),
        );

        let mut readers: HashMap<String, Arc<dyn Reader>> = HashMap::new();
        readers.insert("app".to_string(), reader.clone());
        let mut recorders: HashMap<String, Arc<dyn Recorder>> = HashMap::new();
        recorders.insert("rec".to_string(), recorder.clone());

        let cancel = CancellationToken::new();
        let handle = Service::new(
            adjacency,
            readers,
            recorders,
            Box::new(FlattenMapper::new()),
            cancel,
        )
        .start()
        .await
        .unwrap();

        // No cancellation: the fleet must end on its own once the reader
        // exceeds its backoff threshold.
        tokio::time::timeout(Duration::from_secs(5), handle.wait())
            .await
            .expect("fleet did not terminate after reader retirement");

        assert!(reader.reads() >= 4, "got {} reads", reader.reads());
        assert_eq!(recorder.jobs().len(), 3);
    }
}
