use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, unbounded};
use glam::IVec2;
use log::{debug, warn};

use super::generator::{ChunkData, ChunkGenerator};
use crate::error::TerrainError;

#[derive(Clone, Debug)]
pub(crate) struct ChunkJob {
    pub(crate) coord: IVec2,
    pub(crate) cancel: Arc<AtomicBool>,
}

pub(crate) struct ChunkDone {
    pub(crate) coord: IVec2,
    pub(crate) cancel: Arc<AtomicBool>,
    /// `None` when the job was cancelled before it finished.
    pub(crate) chunk: Option<ChunkData>,
}

/// Fixed pool of generation threads fed through a job channel.
///
/// Finished chunks come back on a completed queue that the owner drains
/// from its own thread.
pub struct ChunkWorkers {
    tx_job: Option<Sender<ChunkJob>>,
    rx_done: Receiver<ChunkDone>,
    handles: Vec<JoinHandle<()>>,
}

impl ChunkWorkers {
    pub fn spawn(generator: Arc<ChunkGenerator>, threads: usize) -> Result<Self, TerrainError> {
        let (tx_job, rx_job) = unbounded::<ChunkJob>();
        let (tx_done, rx_done) = unbounded::<ChunkDone>();

        let mut handles = Vec::with_capacity(threads.max(1));
        for index in 0..threads.max(1) {
            let generator = generator.clone();
            let rx_job = rx_job.clone();
            let tx_done = tx_done.clone();

            let handle = std::thread::Builder::new()
                .name(format!("chunk-gen-{index}"))
                .spawn(move || worker_loop(&generator, rx_job, tx_done))
                .map_err(|e| TerrainError::WorkersUnavailable(e.to_string()))?;
            handles.push(handle);
        }

        debug!("started {} chunk generation threads", handles.len());
        Ok(Self {
            tx_job: Some(tx_job),
            rx_done,
            handles,
        })
    }

    pub fn thread_count(&self) -> usize {
        self.handles.len()
    }

    pub(crate) fn submit(&self, job: ChunkJob) -> Result<(), TerrainError> {
        let Some(tx) = &self.tx_job else {
            return Err(TerrainError::WorkersUnavailable("pool is shutting down".to_string()));
        };
        tx.send(job)
            .map_err(|_| TerrainError::WorkersUnavailable("all workers exited".to_string()))
    }

    pub(crate) fn completed(&self) -> impl Iterator<Item = ChunkDone> + '_ {
        self.rx_done.try_iter()
    }
}

impl Drop for ChunkWorkers {
    fn drop(&mut self) {
        // Closing the job channel ends each worker's recv loop.
        self.tx_job.take();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                warn!("chunk generation thread panicked");
            }
        }
    }
}

fn worker_loop(generator: &ChunkGenerator, rx_job: Receiver<ChunkJob>, tx_done: Sender<ChunkDone>) {
    while let Ok(job) = rx_job.recv() {
        let chunk = if job.cancel.load(Ordering::Relaxed) {
            None
        } else {
            generator.build_cancellable(job.coord, &job.cancel)
        };

        let _ = tx_done.send(ChunkDone {
            coord: job.coord,
            cancel: job.cancel,
            chunk,
        });
    }
}
