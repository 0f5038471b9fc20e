//! Engine factory seam
//!
//! The service constructs engines through this trait so tests can substitute
//! fakes for the real builder.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use contracts::{Mapper, Reader, Recorder};
use engine::{EngineBuilder, EngineError};

/// A boxed engine run loop, ready to be spawned
pub type EngineRunner = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A constructed engine: its name plus its run loop
pub struct BuiltEngine {
    pub name: String,
    pub runner: EngineRunner,
}

/// Pluggable engine construction
#[async_trait]
pub trait EngineFactory: Send + Sync {
    /// Build one engine for a resolved adjacency edge
    async fn build(
        &self,
        reader: Arc<dyn Reader>,
        recorders: Vec<Arc<dyn Recorder>>,
        mapper: Box<dyn Mapper>,
        cancel: CancellationToken,
    ) -> Result<BuiltEngine, EngineError>;
}

/// The real builder from the engine crate
#[derive(Debug, Default)]
pub struct DefaultEngineFactory;

#[async_trait]
impl EngineFactory for DefaultEngineFactory {
    async fn build(
        &self,
        reader: Arc<dyn Reader>,
        recorders: Vec<Arc<dyn Recorder>>,
        mapper: Box<dyn Mapper>,
        cancel: CancellationToken,
    ) -> Result<BuiltEngine, EngineError> {
        let engine = EngineBuilder::new()
            .reader(reader)
            .recorders(recorders)
            .mapper(mapper)
            .cancel(cancel)
            .build()
            .await?;

        Ok(BuiltEngine {
            name: engine.name().to_string(),
            runner: Box::pin(engine.run()),
        })
    }
}
