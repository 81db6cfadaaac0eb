// src/terrain/worker.rs
//! Terrain worker: runs one request to completion on whatever thread calls
//! it, talking back only through emitted [`WorkerResponse`]s.
//!
//! Per job: `Idle → Sampling → (Smoothing) → Complete | Cancelled | Error`.
//! A job is cancelled when its slot's current id moves on; it then stops
//! quietly and emits nothing further.

use bevy::log::{debug, warn};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::grid::{CellSlope, TerrainGrid};
use super::protocol::*;
use super::provider::ElevationProvider;
use crate::error::{TerrainError, WorkerError};
use crate::geo::GeoPoint;
use crate::shortgame::ShortGameModel;
use crate::strokes::expected_strokes;

/// Progress events per sampling pass.
pub const PROGRESS_STEPS: usize = 20;
/// Cancellation check cadence inside cell/point loops.
pub const CANCEL_CHECK_EVERY: usize = 100;

// ---------- Job slots ----------

/// Current job id per [`JobKind`], shared between the coordinator and
/// running jobs. Ids are unique across all kinds and start at 1.
#[derive(Clone, Debug, Default)]
pub struct JobSlots {
    inner: Arc<SlotsInner>,
}

#[derive(Debug, Default)]
struct SlotsInner {
    next: AtomicU64,
    current: [AtomicU64; 3],
}

impl JobSlots {
    pub fn new() -> Self { Self::default() }

    /// Allocate a fresh id and make it the current one for `kind`.
    pub fn begin(&self, kind: JobKind) -> u64 {
        let id = self.inner.next.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.current[kind.slot()].store(id, Ordering::SeqCst);
        id
    }

    /// 0 when nothing was ever started for `kind`.
    #[inline]
    pub fn current(&self, kind: JobKind) -> u64 { self.inner.current[kind.slot()].load(Ordering::SeqCst) }

    #[inline]
    pub fn is_current(&self, kind: JobKind, id: u64) -> bool { self.current(kind) == id }

    /// Drop tracking for `kind` so any running job sees itself superseded.
    pub fn cancel(&self, kind: JobKind) {
        self.inner.current[kind.slot()].store(0, Ordering::SeqCst);
    }
}

// ---------- Control flow ----------

enum Halt {
    Superseded,
    Failed(WorkerError),
}

impl From<WorkerError> for Halt {
    fn from(e: WorkerError) -> Self { Halt::Failed(e) }
}

impl From<TerrainError> for Halt {
    fn from(e: TerrainError) -> Self { Halt::Failed(WorkerError::Terrain(e)) }
}

struct Job<'a> {
    kind: JobKind,
    id: u64,
    slots: &'a JobSlots,
    emit: &'a mut dyn FnMut(WorkerResponse),
}

impl Job<'_> {
    #[inline]
    fn check(&self) -> Result<(), Halt> {
        if self.slots.is_current(self.kind, self.id) { Ok(()) } else { Err(Halt::Superseded) }
    }

    fn progress(&mut self, phase: Phase, progress: f64, message: impl Into<String>) {
        (self.emit)(WorkerResponse::Progress { job_id: self.id, phase, progress, message: message.into() });
    }

    /// Last check before a terminal message.
    fn finish(&mut self, resp: WorkerResponse) -> Result<(), Halt> {
        self.check()?;
        (self.emit)(resp);
        Ok(())
    }
}

fn captured_stack() -> Option<String> {
    let bt = Backtrace::capture();
    (bt.status() == BacktraceStatus::Captured).then(|| bt.to_string())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

// ---------- Worker ----------

#[derive(Clone)]
pub struct TerrainWorker {
    provider: Arc<dyn ElevationProvider>,
    short_game: ShortGameModel,
    slots: JobSlots,
}

impl TerrainWorker {
    pub fn new(provider: Arc<dyn ElevationProvider>, short_game: ShortGameModel, slots: JobSlots) -> Self {
        Self { provider, short_game, slots }
    }

    #[inline]
    pub fn slots(&self) -> &JobSlots { &self.slots }

    /// Run one request. Faults (errors and panics) become an `error`
    /// message unless the job has been superseded.
    pub fn run(&self, req: WorkerRequest, emit: &mut dyn FnMut(WorkerResponse)) {
        let (kind, id) = (req.kind(), req.job_id());
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut job = Job { kind, id, slots: &self.slots, emit: &mut *emit };
            self.process(req, &mut job)
        }));

        let (error, stack) = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(Halt::Superseded)) => {
                debug!("Worker: {:?} job {} superseded", kind, id);
                return;
            }
            Ok(Err(Halt::Failed(e))) => (e.to_string(), captured_stack()),
            Err(payload) => (panic_message(payload.as_ref()), captured_stack()),
        };
        if !self.slots.is_current(kind, id) {
            debug!("Worker: dropping error for superseded {:?} job {}: {}", kind, id, error);
            return;
        }
        warn!("Worker: {:?} job {} failed: {}", kind, id, error);
        emit(WorkerResponse::Error { job_id: id, error, stack });
    }

    /// JSON in, JSON out. Undecodable requests answer with job id 0.
    pub fn run_json(&self, text: &str, emit: &mut dyn FnMut(String)) {
        let mut send = |resp: WorkerResponse| match encode_response(&resp) {
            Ok(s) => emit(s),
            Err(e) => warn!("Worker: failed to encode response: {}", e),
        };
        match decode_request(text) {
            Ok(req) => self.run(req, &mut send),
            Err(e) => send(WorkerResponse::Error { job_id: 0, error: e.to_string(), stack: None }),
        }
    }

    fn process(&self, req: WorkerRequest, job: &mut Job<'_>) -> Result<(), Halt> {
        match req {
            WorkerRequest::SampleTerrain { data, .. } => {
                let elevations = self.sample_points(job, &data.points)?;
                let processed = elevations.iter().filter(|v| v.is_some()).count();
                job.finish(WorkerResponse::TerrainComplete { job_id: job.id, elevations, processed })
            }
            WorkerRequest::CalculateSlopes { data, .. } => self.calculate_slopes(job, data),
            WorkerRequest::AdvancedExpectedStrokes { data, .. } => self.expected_strokes(job, data),
        }
    }

    /// Chunked sampling with a cancellation check per chunk (at most
    /// [`CANCEL_CHECK_EVERY`] points) and up to [`PROGRESS_STEPS`] progress
    /// events. Failed chunks come back as `None`; if every chunk fails the
    /// job fails once.
    fn sample_points(&self, job: &mut Job<'_>, points: &[GeoPoint]) -> Result<Vec<Option<f64>>, Halt> {
        let n = points.len();
        let chunk = n.div_ceil(PROGRESS_STEPS).clamp(1, CANCEL_CHECK_EVERY);
        let mut reported_step = 0usize;
        let mut out = Vec::with_capacity(n);
        let mut last_error: Option<TerrainError> = None;
        let mut failed_chunks = 0usize;

        for (ci, part) in points.chunks(chunk).enumerate() {
            job.check()?;
            match self.provider.sample_elevations(part) {
                Ok(values) if values.len() == part.len() => {
                    out.extend(values.into_iter().map(|v| v.is_finite().then_some(v)));
                }
                other => {
                    let e = match other {
                        Err(e) => e,
                        Ok(values) => TerrainError::Partial { requested: part.len(), returned: values.len() },
                    };
                    if failed_chunks == 0 {
                        warn!("Worker: {} terrain sampling failed: {} - marking chunk as missing", self.provider.name(), e);
                    }
                    failed_chunks += 1;
                    last_error = Some(e);
                    out.extend(std::iter::repeat(None).take(part.len()));
                }
            }
            let done = ((ci + 1) * chunk).min(n);
            let step = done * PROGRESS_STEPS / n;
            if step > reported_step {
                reported_step = step;
                job.progress(Phase::Sampling, done as f64 / n as f64, format!("Sampled {done}/{n} points"));
            }
        }

        if n > 0 && failed_chunks == n.div_ceil(chunk) {
            if let Some(e) = last_error {
                return Err(e.into());
            }
        }
        Ok(out)
    }

    fn calculate_slopes(&self, job: &mut Job<'_>, data: CalculateSlopesData) -> Result<(), Halt> {
        let CalculateSlopesData { rows, cols, bounds, elevations, mask, smooth, arrow_stride } = data;
        if rows < 3 || cols < 3 {
            return Err(WorkerError::InvalidRequest(format!("slope grid needs at least 3x3 nodes, got {rows}x{cols}")).into());
        }
        let elevations = match elevations {
            Some(v) => v,
            None => self.sample_points(job, &TerrainGrid::points(rows, cols, bounds))?,
        };
        let mut grid = TerrainGrid::new(rows, cols, bounds, elevations.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())?;
        if let Some(mask) = mask {
            grid = grid.with_mask(mask)?;
        }

        if smooth {
            job.check()?;
            job.progress(Phase::Smoothing, 0.0, "Smoothing elevation grid");
            let mut smoothed = Vec::with_capacity(grid.elevations.len());
            for i in 0..grid.elevations.len() {
                if i % CANCEL_CHECK_EVERY == 0 {
                    job.check()?;
                }
                smoothed.push(grid.smoothed_cell(i / cols, i % cols));
            }
            grid.elevations = smoothed;
        }

        let spacing = grid.spacing_m();
        let mut cells: Vec<CellSlope> = Vec::new();
        for i in 0..rows * cols {
            if i % CANCEL_CHECK_EVERY == 0 {
                job.check()?;
            }
            if let Some(s) = grid.slope_at(i / cols, i % cols, spacing) {
                cells.push(s);
            }
        }

        let stride = arrow_stride.max(1);
        let slopes = cells.iter().map(SlopeRecord::from).collect();
        let arrows = cells.iter().filter(|s| s.row % stride == 0 && s.col % stride == 0).map(ArrowRecord::from).collect();
        job.finish(WorkerResponse::SlopesComplete { job_id: job.id, slopes, arrows })
    }

    fn expected_strokes(&self, job: &mut Job<'_>, data: ExpectedStrokesData) -> Result<(), Halt> {
        let total = data.points.len();
        let green = data.green.as_deref();
        let step = total.div_ceil(PROGRESS_STEPS).max(1);
        let (mut sum, mut valid) = (0.0, 0usize);
        let mut terrain_warned = false;

        for (i, p) in data.points.iter().enumerate() {
            if i % CANCEL_CHECK_EVERY == 0 {
                job.check()?;
            }
            let Some(base) = expected_strokes(p.distance_yards, p.surface) else { continue };
            let strokes = match self.short_game.advanced_expected_strokes(
                self.provider.as_ref(),
                base,
                p.distance_yards,
                p.point,
                data.pin,
                green,
            ) {
                Some(outcome) => {
                    if let (Some(e), false) = (&outcome.terrain_error, terrain_warned) {
                        warn!("Worker: short-game terrain unavailable ({}) - using flat conditions", e);
                        terrain_warned = true;
                    }
                    outcome.strokes
                }
                None => base,
            };
            sum += strokes;
            valid += 1;
            if (i + 1) % step == 0 {
                job.progress(Phase::Strokes, (i + 1) as f64 / total as f64, format!("Evaluated {}/{total} points", i + 1));
            }
        }

        let average_strokes = (valid > 0).then(|| sum / valid as f64);
        job.finish(WorkerResponse::ExpectedStrokesComplete { job_id: job.id, average_strokes, valid_points: valid, total_points: total })
    }
}
