mod generator;
mod workers;

pub use generator::{ChunkData, ChunkGenerator, chunk_seed};
pub use workers::ChunkWorkers;

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use glam::IVec2;
use log::{debug, info, warn};

use crate::types::{FrameContext, TerrainConfig};
use workers::{ChunkDone, ChunkJob};

#[derive(Clone, Debug)]
pub enum ChunkEvent {
    Loaded(Arc<ChunkData>),
    Unloaded(IVec2),
}

/// Chunks currently handed to the renderer.
#[derive(Debug, Default)]
pub struct ActiveChunkSet {
    chunks: HashMap<IVec2, Arc<ChunkData>>,
    viewer_chunk: Option<IVec2>,
}

impl ActiveChunkSet {
    pub fn get(&self, coord: IVec2) -> Option<&Arc<ChunkData>> {
        self.chunks.get(&coord)
    }

    pub fn contains(&self, coord: IVec2) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn coords(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.chunks.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ChunkData>> {
        self.chunks.values()
    }

    /// Chunk the viewer was in at the last trigger.
    pub fn viewer_chunk(&self) -> Option<IVec2> {
        self.viewer_chunk
    }
}

#[derive(Default)]
struct StreamingState {
    desired: HashSet<IVec2>,
    pending_build: VecDeque<IVec2>,
    in_flight: HashMap<IVec2, Arc<AtomicBool>>,
}

/// Largest view radius honoured; bigger values are clamped to it.
pub const MAX_VIEW_DISTANCE_CHUNKS: i32 = 256;

/// Square `(2r+1)²` neighbourhood around `center`, nearest rings first.
/// `radius` is clamped to [`MAX_VIEW_DISTANCE_CHUNKS`].
pub fn neighbourhood(center: IVec2, radius: i32) -> Vec<IVec2> {
    if radius < 0 {
        return Vec::new();
    }
    let radius = radius.min(MAX_VIEW_DISTANCE_CHUNKS);
    let side = 2 * radius as usize + 1;
    let mut coords = Vec::with_capacity(side * side);
    for dz in -radius..=radius {
        for dx in -radius..=radius {
            coords.push(center.saturating_add(IVec2::new(dx, dz)));
        }
    }
    coords.sort_by_key(|c| ring_key(*c, center));
    coords.dedup();
    coords
}

fn ring_key(coord: IVec2, center: IVec2) -> (i64, i64, i32, i32) {
    let dx = (coord.x as i64 - center.x as i64).abs();
    let dz = (coord.y as i64 - center.y as i64).abs();
    (dx.max(dz), dx + dz, coord.y, coord.x)
}

/// Keeps the active chunk set centred on the viewer.
///
/// Work only happens when the viewer crosses into a different chunk. The
/// manager then diffs the wanted neighbourhood against what is loaded:
/// chunks that fell out are unloaded straight away and missing ones are
/// queued nearest-first. Queued chunks are built inline (bounded by
/// `chunk_build_budget_per_frame`) or handed to [`ChunkWorkers`] when
/// `worker_threads > 0`.
pub struct ChunkManager {
    generator: Arc<ChunkGenerator>,
    workers: Option<ChunkWorkers>,
    active: ActiveChunkSet,
    streaming: StreamingState,
    chunks_built: u64,
    since_trigger: f32,
}

impl ChunkManager {
    pub fn new(config: TerrainConfig) -> Self {
        let threads = config.worker_threads;
        let generator = Arc::new(ChunkGenerator::new(config));

        let workers = if threads > 0 {
            match ChunkWorkers::spawn(generator.clone(), threads) {
                Ok(workers) => Some(workers),
                Err(e) => {
                    warn!("{e}; building chunks inline");
                    None
                }
            }
        } else {
            None
        };

        Self {
            generator,
            workers,
            active: ActiveChunkSet::default(),
            streaming: StreamingState::default(),
            chunks_built: 0,
            since_trigger: 0.0,
        }
    }

    pub fn config(&self) -> &TerrainConfig {
        self.generator.config()
    }

    pub fn active(&self) -> &ActiveChunkSet {
        &self.active
    }

    pub fn uses_workers(&self) -> bool {
        self.workers.is_some()
    }

    /// Chunks accepted into the active set since creation.
    pub fn chunks_built(&self) -> u64 {
        self.chunks_built
    }

    /// Chunks wanted but not yet loaded, queued or being built.
    pub fn pending(&self) -> usize {
        self.streaming.pending_build.len() + self.streaming.in_flight.len()
    }

    pub fn is_settled(&self) -> bool {
        self.pending() == 0
    }

    /// Frame time accumulated since the viewer last changed chunk.
    pub fn seconds_since_trigger(&self) -> f32 {
        self.since_trigger
    }

    pub fn update(&mut self, frame: &FrameContext) -> Vec<ChunkEvent> {
        let mut events = Vec::new();

        self.since_trigger += frame.delta_seconds.max(0.0);

        let viewer_chunk = self.config().chunk_of_world(frame.viewer_world_xz);
        if self.active.viewer_chunk != Some(viewer_chunk) {
            self.active.viewer_chunk = Some(viewer_chunk);
            let radius = self.config().view_distance_chunks;
            self.retarget(viewer_chunk, radius, &mut events);
            info!(
                "viewer entered chunk {viewer_chunk} after {:.1}s: {} unloaded, {} queued",
                self.since_trigger,
                events.len(),
                self.streaming.pending_build.len()
            );
            self.since_trigger = 0.0;
        }

        if self.workers.is_some() {
            self.pump_workers(&mut events);
        } else {
            let budget = match self.config().chunk_build_budget_per_frame {
                0 => usize::MAX,
                n => n,
            };
            self.build_inline(budget, &mut events);
        }

        events
    }

    /// Synchronously makes the active set exactly the neighbourhood of
    /// `center`, ignoring the per-frame budget and any worker pool.
    pub fn regenerate(&mut self, center: IVec2, radius: i32) -> Vec<ChunkEvent> {
        let mut events = Vec::new();
        self.active.viewer_chunk = Some(center);
        self.retarget(center, radius, &mut events);

        let in_flight: Vec<IVec2> = self.streaming.in_flight.keys().copied().collect();
        for coord in in_flight {
            if let Some(flag) = self.streaming.in_flight.remove(&coord) {
                flag.store(true, Ordering::Relaxed);
            }
            self.streaming.pending_build.push_back(coord);
        }

        self.build_inline(usize::MAX, &mut events);
        info!(
            "regenerated {} chunks around {center} (radius {radius})",
            self.active.len()
        );
        events
    }

    fn retarget(&mut self, center: IVec2, radius: i32, events: &mut Vec<ChunkEvent>) {
        let wanted = neighbourhood(center, radius);
        self.streaming.desired = wanted.iter().copied().collect();

        let mut leaving: Vec<IVec2> = self
            .active
            .coords()
            .filter(|c| !self.streaming.desired.contains(c))
            .collect();
        leaving.sort_by_key(|c| (c.y, c.x));
        for coord in leaving {
            self.active.chunks.remove(&coord);
            events.push(ChunkEvent::Unloaded(coord));
        }

        let desired = &self.streaming.desired;
        self.streaming.in_flight.retain(|coord, flag| {
            let keep = desired.contains(coord);
            if !keep {
                flag.store(true, Ordering::Relaxed);
                debug!("cancelled chunk {coord}");
            }
            keep
        });

        self.streaming.pending_build = wanted
            .into_iter()
            .filter(|c| !self.active.contains(*c) && !self.streaming.in_flight.contains_key(c))
            .collect();
    }

    fn build_inline(&mut self, mut budget: usize, events: &mut Vec<ChunkEvent>) {
        while budget > 0 {
            let Some(coord) = self.streaming.pending_build.pop_front() else {
                break;
            };
            if self.active.contains(coord) || !self.streaming.desired.contains(&coord) {
                continue;
            }
            let chunk = self.generator.build(coord);
            self.insert(chunk, events);
            budget -= 1;
        }
    }

    fn pump_workers(&mut self, events: &mut Vec<ChunkEvent>) {
        let Some(workers) = &self.workers else {
            return;
        };

        let mut failed = false;
        while let Some(coord) = self.streaming.pending_build.pop_front() {
            let cancel = Arc::new(AtomicBool::new(false));
            let job = ChunkJob {
                coord,
                cancel: cancel.clone(),
            };
            if let Err(e) = workers.submit(job) {
                warn!("{e}; building chunks inline");
                self.streaming.pending_build.push_front(coord);
                failed = true;
                break;
            }
            self.streaming.in_flight.insert(coord, cancel);
        }

        let completed: Vec<ChunkDone> = workers.completed().collect();
        for done in completed {
            self.accept(done, events);
        }

        if failed {
            self.workers = None;
            let orphaned: Vec<IVec2> = self.streaming.in_flight.drain().map(|(c, _)| c).collect();
            self.streaming.pending_build.extend(orphaned);
            self.build_inline(usize::MAX, events);
        }
    }

    fn accept(&mut self, done: ChunkDone, events: &mut Vec<ChunkEvent>) {
        let current = matches!(
            self.streaming.in_flight.get(&done.coord),
            Some(flag) if Arc::ptr_eq(flag, &done.cancel)
        );
        if !current || done.cancel.load(Ordering::Relaxed) {
            debug!("discarded stale chunk {}", done.coord);
            return;
        }

        self.streaming.in_flight.remove(&done.coord);
        match done.chunk {
            Some(chunk) => self.insert(chunk, events),
            None => {
                warn!("chunk {} came back empty; requeueing", done.coord);
                self.streaming.pending_build.push_back(done.coord);
            }
        }
    }

    fn insert(&mut self, chunk: ChunkData, events: &mut Vec<ChunkEvent>) {
        let chunk = Arc::new(chunk);
        self.active.chunks.insert(chunk.coord, chunk.clone());
        self.chunks_built += 1;
        events.push(ChunkEvent::Loaded(chunk));
    }
}

impl Drop for ChunkManager {
    fn drop(&mut self) {
        for flag in self.streaming.in_flight.values() {
            flag.store(true, Ordering::Relaxed);
        }
    }
}
