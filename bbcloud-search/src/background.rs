//! Background billboard cloud generation
//!
//! A run executes on its own thread and publishes its finished cloud through
//! a channel. The generator holds at most one run in flight.

use crate::engine::{BillboardCloud, EngineConfig, PlaneSearchEngine};
use bbcloud_core::{Error, Result, TriangleMesh};
use flume::{Receiver, TryRecvError};
use std::thread;

/// Handle to the result of a run executing in the background
#[derive(Debug)]
pub struct PendingCloud {
    receiver: Receiver<Result<BillboardCloud>>,
}

impl PendingCloud {
    /// Start generating the cloud of `mesh` on a new thread
    pub fn spawn(engine: PlaneSearchEngine, mesh: TriangleMesh) -> Result<Self> {
        let (sender, receiver) = flume::bounded(1);
        thread::Builder::new()
            .name("bbcloud-generator".to_string())
            .spawn(move || {
                let result = engine.run(&mesh);
                if sender.send(result).is_err() {
                    log::debug!("Billboard cloud finished after its handle was dropped");
                }
            })
            .map_err(|e| Error::Algorithm(format!("Failed to start generation thread: {}", e)))?;
        Ok(Self { receiver })
    }

    /// The published result, or `None` while the run is still going
    pub fn try_take(&self) -> Option<Result<BillboardCloud>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(Error::Disconnected)),
        }
    }

    /// Block until the run publishes its result
    pub fn wait(self) -> Result<BillboardCloud> {
        self.receiver.recv().map_err(|_| Error::Disconnected)?
    }
}

/// Owner of the single in-flight generation run.
///
/// Results are handed over exactly once; a new run can only be requested
/// after the previous result has been taken.
#[derive(Debug)]
pub struct CloudGenerator {
    engine: PlaneSearchEngine,
    pending: Option<PendingCloud>,
}

impl CloudGenerator {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Ok(Self {
            engine: PlaneSearchEngine::new(config)?,
            pending: None,
        })
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Start a run, failing with [`Error::Busy`] while another is pending
    pub fn request(&mut self, mesh: TriangleMesh) -> Result<()> {
        if self.is_busy() {
            return Err(Error::Busy);
        }
        self.pending = Some(PendingCloud::spawn(self.engine.clone(), mesh)?);
        Ok(())
    }

    /// Take the finished result of the pending run, if there is one
    pub fn poll(&mut self) -> Option<Result<BillboardCloud>> {
        let result = self.pending.as_ref()?.try_take()?;
        self.pending = None;
        Some(result)
    }

    /// Block until the pending run finishes; `None` when nothing is pending
    pub fn wait(&mut self) -> Option<Result<BillboardCloud>> {
        self.pending.take().map(PendingCloud::wait)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Algorithm;

    fn quad_mesh() -> TriangleMesh {
        TriangleMesh::from_flat(
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0],
            &[0, 1, 2, 0, 2, 3],
        )
        .unwrap()
    }

    fn config() -> EngineConfig {
        EngineConfig {
            algorithm: Algorithm::KMeans {
                clusters: 1,
                max_iterations: 20,
            },
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_single_run_in_flight() {
        let mut generator = CloudGenerator::new(config()).unwrap();
        assert!(!generator.is_busy());
        assert!(generator.poll().is_none());

        generator.request(quad_mesh()).unwrap();
        assert!(generator.is_busy());
        assert!(matches!(generator.request(quad_mesh()), Err(Error::Busy)));

        let cloud = generator.wait().unwrap().unwrap();
        assert_eq!(cloud.plane_count(), 1);
        assert!(!generator.is_busy());
        assert!(generator.wait().is_none());

        generator.request(quad_mesh()).unwrap();
    }

    #[test]
    fn test_poll_hands_result_over_once() {
        let mut generator = CloudGenerator::new(config()).unwrap();
        generator.request(quad_mesh()).unwrap();

        let result = loop {
            if let Some(result) = generator.poll() {
                break result;
            }
            thread::yield_now();
        };
        assert!(result.is_ok());
        assert!(generator.poll().is_none());
    }

    #[test]
    fn test_errors_are_published() {
        let pending = PendingCloud::spawn(
            PlaneSearchEngine::new(config()).unwrap(),
            TriangleMesh::new(),
        )
        .unwrap();
        assert!(matches!(pending.wait(), Err(Error::EmptyInput)));
    }
}
