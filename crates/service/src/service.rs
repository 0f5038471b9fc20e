//! Service - constructs and supervises the engine fleet

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use contracts::{Mapper, Reader, Recorder};
use routing::ReaderRecorderAdjacency;

use crate::error::ServiceError;
use crate::factory::{DefaultEngineFactory, EngineFactory};

/// The fleet bootstrap
///
/// Consumes a compiled adjacency plus catalogs of instantiated endpoints and
/// runs one engine per reader. Individual edge failures are logged and
/// skipped; `start` fails only when no engine at all could be constructed.
pub struct Service {
    adjacency: ReaderRecorderAdjacency,
    readers: HashMap<String, Arc<dyn Reader>>,
    recorders: HashMap<String, Arc<dyn Recorder>>,
    mapper: Box<dyn Mapper>,
    cancel: CancellationToken,
    factory: Box<dyn EngineFactory>,
}

impl Service {
    /// Create a service with the default engine factory
    pub fn new(
        adjacency: ReaderRecorderAdjacency,
        readers: HashMap<String, Arc<dyn Reader>>,
        recorders: HashMap<String, Arc<dyn Recorder>>,
        mapper: Box<dyn Mapper>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            adjacency,
            readers,
            recorders,
            mapper,
            cancel,
            factory: Box::new(DefaultEngineFactory),
        }
    }

    /// Substitute the engine factory (for testing)
    pub fn with_factory(mut self, factory: Box<dyn EngineFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Construct and run the whole fleet
    ///
    /// # Errors
    /// Returns the last edge failure when not a single engine could be
    /// constructed across the entire adjacency.
    pub async fn start(self) -> Result<ServiceHandle, ServiceError> {
        let mut engines: JoinSet<()> = JoinSet::new();
        let mut built = 0usize;
        let mut last_err: Option<ServiceError> = None;

        for (reader_name, recorder_names) in &self.adjacency {
            let Some(reader) = self.readers.get(reader_name) else {
                warn!(reader = %reader_name, "reader not in catalog, skipping edge");
                last_err = Some(ServiceError::UnknownReader(reader_name.clone()));
                continue;
            };

            let recorders: Vec<Arc<dyn Recorder>> = recorder_names
                .iter()
                .filter_map(|name| {
                    let recorder = self.recorders.get(name).cloned();
                    if recorder.is_none() {
                        warn!(
                            reader = %reader_name,
                            recorder = %name,
                            "recorder not in catalog, dropping from edge"
                        );
                    }
                    recorder
                })
                .collect();

            if recorders.is_empty() {
                warn!(reader = %reader_name, "no recorders resolved, skipping edge");
                last_err = Some(ServiceError::NoRecorders(reader_name.clone()));
                continue;
            }

            match self
                .factory
                .build(
                    Arc::clone(reader),
                    recorders,
                    self.mapper.clone(),
                    self.cancel.child_token(),
                )
                .await
            {
                Ok(engine) => {
                    built += 1;
                    let name = engine.name;
                    let runner = engine.runner;
                    engines.spawn(async move {
                        runner.await;
                        info!(engine = %name, "engine completed");
                    });
                }
                Err(e) => {
                    warn!(reader = %reader_name, error = %e, "engine construction failed, skipping edge");
                    last_err = Some(e.into());
                }
            }
        }

        if built == 0 {
            return Err(last_err.unwrap_or(ServiceError::NoEngines));
        }

        info!(engines = built, "service started");

        let supervisor = tokio::spawn(async move {
            while engines.join_next().await.is_some() {}
            info!("all engines terminated");
        });

        Ok(ServiceHandle {
            supervisor,
            engines: built,
        })
    }
}

/// Completion signal for the whole fleet
#[derive(Debug)]
pub struct ServiceHandle {
    supervisor: JoinHandle<()>,
    engines: usize,
}

impl ServiceHandle {
    /// Number of engines that were successfully constructed
    pub fn engine_count(&self) -> usize {
        self.engines
    }

    /// Resolve once every engine has terminated
    pub async fn wait(self) {
        let _ = self.supervisor.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use contracts::{ContractError, CorrelationToken, ReadResult, RecordJob, TypedValue};
    use engine::EngineError;
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::Mutex;
    use std::time::{Duration, SystemTime};

    use crate::factory::BuiltEngine;

    struct StubReader(String);

    #[async_trait]
    impl Reader for StubReader {
        async fn ping(&self) -> Result<(), ContractError> {
            Ok(())
        }

        async fn read(&self, token: CorrelationToken) -> Result<ReadResult, ContractError> {
            Ok(ReadResult {
                token,
                reader: self.0.clone(),
                payload: Bytes::from_static(b"{}"),
                issued_at: SystemTime::now(),
            })
        }

        fn name(&self) -> &str {
            &self.0
        }

        fn interval(&self) -> Duration {
            Duration::from_millis(10)
        }

        fn timeout(&self) -> Duration {
            Duration::from_millis(100)
        }
    }

    struct StubRecorder(String);

    #[async_trait]
    impl Recorder for StubRecorder {
        async fn ping(&self) -> Result<(), ContractError> {
            Ok(())
        }

        async fn record(&self, _job: RecordJob) -> Result<(), ContractError> {
            Ok(())
        }

        fn name(&self) -> &str {
            &self.0
        }

        fn index_name(&self) -> &str {
            "idx"
        }

        fn type_name(&self) -> &str {
            "doc"
        }

        fn timeout(&self) -> Duration {
            Duration::from_millis(100)
        }
    }

    struct NoopMapper;

    impl Mapper for NoopMapper {
        fn values(&self, _prefix: &str, _payload: &[u8]) -> Result<Vec<TypedValue>, ContractError> {
            Ok(Vec::new())
        }

        fn boxed_clone(&self) -> Box<dyn Mapper> {
            Box::new(NoopMapper)
        }
    }

    /// Factory recording every build and returning cancel-bound runners
    #[derive(Default)]
    struct FakeFactory {
        built: Arc<Mutex<Vec<(String, Vec<String>)>>>,
        fail_for: Vec<String>,
    }

    #[async_trait]
    impl EngineFactory for FakeFactory {
        async fn build(
            &self,
            reader: Arc<dyn Reader>,
            recorders: Vec<Arc<dyn Recorder>>,
            _mapper: Box<dyn Mapper>,
            cancel: CancellationToken,
        ) -> Result<BuiltEngine, EngineError> {
            let name = reader.name().to_string();
            if self.fail_for.contains(&name) {
                return Err(EngineError::Ping {
                    endpoints: vec![name],
                });
            }
            self.built.lock().unwrap().push((
                name.clone(),
                recorders.iter().map(|r| r.name().to_string()).collect(),
            ));
            Ok(BuiltEngine {
                name,
                runner: Box::pin(async move { cancel.cancelled().await }),
            })
        }
    }

    fn adjacency(edges: &[(&str, &[&str])]) -> ReaderRecorderAdjacency {
        edges
            .iter()
            .map(|(reader, recorders)| {
                (
                    reader.to_string(),
                    recorders
                        .iter()
                        .map(|r| r.to_string())
                        .collect::<BTreeSet<_>>(),
                )
            })
            .collect::<BTreeMap<_, _>>()
    }

    fn readers(names: &[&str]) -> HashMap<String, Arc<dyn Reader>> {
        names
            .iter()
            .map(|n| (n.to_string(), Arc::new(StubReader(n.to_string())) as _))
            .collect()
    }

    fn recorders(names: &[&str]) -> HashMap<String, Arc<dyn Recorder>> {
        names
            .iter()
            .map(|n| (n.to_string(), Arc::new(StubRecorder(n.to_string())) as _))
            .collect()
    }

    #[tokio::test]
    async fn test_missing_reader_yields_error_and_no_signal() {
        let cancel = CancellationToken::new();
        let service = Service::new(
            adjacency(&[("red1", &["rec1"])]),
            readers(&[]),
            recorders(&["rec1"]),
            Box::new(NoopMapper),
            cancel,
        )
        .with_factory(Box::new(FakeFactory::default()));

        let err = service.start().await.unwrap_err();
        assert_eq!(err, ServiceError::UnknownReader("red1".to_string()));
    }

    #[tokio::test]
    async fn test_missing_recorders_skip_edge_but_fleet_survives() {
        let cancel = CancellationToken::new();
        let factory = FakeFactory::default();
        let built = Arc::clone(&factory.built);

        let service = Service::new(
            adjacency(&[("red1", &["ghost"]), ("red2", &["rec1", "ghost"])]),
            readers(&["red1", "red2"]),
            recorders(&["rec1"]),
            Box::new(NoopMapper),
            cancel.clone(),
        )
        .with_factory(Box::new(factory));

        let handle = service.start().await.unwrap();
        assert_eq!(handle.engine_count(), 1);

        let builds = built.lock().unwrap().clone();
        assert_eq!(builds, vec![("red2".to_string(), vec!["rec1".to_string()])]);

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle.wait())
            .await
            .expect("fleet did not terminate");
    }

    #[tokio::test]
    async fn test_all_constructions_failing_returns_last_error() {
        let cancel = CancellationToken::new();
        let factory = FakeFactory {
            fail_for: vec!["red1".to_string(), "red2".to_string()],
            ..Default::default()
        };

        let service = Service::new(
            adjacency(&[("red1", &["rec1"]), ("red2", &["rec1"])]),
            readers(&["red1", "red2"]),
            recorders(&["rec1"]),
            Box::new(NoopMapper),
            cancel,
        )
        .with_factory(Box::new(factory));

        let err = service.start().await.unwrap_err();
        assert_eq!(
            err,
            ServiceError::Engine(EngineError::Ping {
                endpoints: vec!["red2".to_string()]
            })
        );
    }

    #[tokio::test]
    async fn test_completion_signal_closes_after_cancellation() {
        let cancel = CancellationToken::new();
        let service = Service::new(
            adjacency(&[("red1", &["rec1"]), ("red2", &["rec1"])]),
            readers(&["red1", "red2"]),
            recorders(&["rec1"]),
            Box::new(NoopMapper),
            cancel.clone(),
        )
        .with_factory(Box::new(FakeFactory::default()));

        let handle = service.start().await.unwrap();
        assert_eq!(handle.engine_count(), 2);
        assert!(format!("{handle:?}").contains("engines: 2"));

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle.wait())
            .await
            .expect("completion signal did not close");
    }

    #[tokio::test]
    async fn test_empty_adjacency_fails() {
        let cancel = CancellationToken::new();
        let service = Service::new(
            adjacency(&[]),
            readers(&[]),
            recorders(&[]),
            Box::new(NoopMapper),
            cancel,
        )
        .with_factory(Box::new(FakeFactory::default()));

        let err = service.start().await.unwrap_err();
        assert_eq!(err, ServiceError::NoEngines);
    }
}
