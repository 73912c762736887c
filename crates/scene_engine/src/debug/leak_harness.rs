//! Leak-test harness
//!
//! Drives an [`Engine`] through repeated add/remove cycles and samples the
//! backend counters after each one. A healthy resource layer converges: the
//! counters stop moving once the pool holds its baseline for the cycled
//! kind, and no per-instance allocation survives its entity.
//!
//! This is a verification tool. Nothing in the engine depends on it.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::LeakTestConfig;
use crate::engine::Engine;
use crate::render::api::RendererInfo;
use crate::scene::PrimitiveKind;

/// Parameters a leak run was started with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeakMeta {
    /// Start time
    pub run_at: DateTime<Utc>,
    /// Number of add/remove cycles
    pub iterations: usize,
    /// Pause after each add and each remove
    pub delay_ms: u64,
    /// Kind cycled
    pub kind: PrimitiveKind,
}

/// Counters sampled after one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeakSnapshot {
    /// Cycle index
    pub i: usize,
    /// Counters
    #[serde(flatten)]
    pub info: RendererInfo,
}

/// Full record of a leak run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeakReport {
    /// Run parameters
    pub meta: LeakMeta,
    /// Counters before the first cycle
    pub baseline: RendererInfo,
    /// One sample per cycle
    pub snapshots: Vec<LeakSnapshot>,
    /// Counters after the last cycle
    #[serde(rename = "final")]
    pub final_info: RendererInfo,
}

impl LeakReport {
    /// Whether the samples at cycles `early` and `late` agree on geometry,
    /// texture and program counts and on draw calls
    ///
    /// Out-of-range indices never converge.
    pub fn converged(&self, early: usize, late: usize) -> bool {
        let (Some(a), Some(b)) = (self.snapshots.get(early), self.snapshots.get(late)) else {
            return false;
        };
        a.info.memory == b.info.memory
            && a.info.programs == b.info.programs
            && a.info.render.calls == b.info.render.calls
    }

    /// Convergence check at the configured sample points, clamped to the run length
    pub fn converged_for(&self, config: &LeakTestConfig) -> bool {
        let last = self.snapshots.len().saturating_sub(1);
        let late = config.late_sample.min(last);
        let early = config.early_sample.min(late);
        self.converged(early, late)
    }

    /// Geometries allocated by the run beyond the first cycle's sample
    ///
    /// The first cycle creates the pool's baseline for the kind, so this is
    /// zero for a run that leaks nothing per instance.
    pub fn net_geometry_growth(&self) -> isize {
        let first = self.snapshots.first().map_or(self.baseline, |s| s.info);
        self.final_info.memory.geometries as isize - first.memory.geometries as isize
    }

    /// Suggested file name for this report
    pub fn file_name(&self) -> String {
        format!("leak-test-{}.json", self.meta.run_at.format("%Y%m%dT%H%M%S"))
    }

    /// Write the report as pretty JSON, creating parent directories
    pub fn write_json(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        write_json(self, path.as_ref())
    }
}

/// Counters around a clear
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearReport {
    /// Start time
    pub run_at: DateTime<Utc>,
    /// Entities added before clearing
    pub added: usize,
    /// Counters before anything was added
    pub initial: RendererInfo,
    /// Counters before the clear
    pub before: RendererInfo,
    /// Counters after the clear
    pub after: RendererInfo,
}

impl ClearReport {
    /// Whether the clear left nothing allocated beyond the initial counters
    ///
    /// Non-pooled singletons such as the transform gizmo are part of the
    /// initial counters and stay allocated across a clear.
    pub fn is_clean(&self) -> bool {
        self.after.memory.geometries <= self.initial.memory.geometries
            && self.after.memory.textures <= self.initial.memory.textures
            && self.after.programs <= self.initial.programs
    }

    /// Write the report as pretty JSON, creating parent directories
    pub fn write_json(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        write_json(self, path.as_ref())
    }
}

/// Add and remove one entity of `kind` per cycle, sampling after each
pub fn run_leak_cycle(engine: &mut Engine, iterations: usize, delay: Duration, kind: PrimitiveKind) -> LeakReport {
    let meta = LeakMeta {
        run_at: Utc::now(),
        iterations,
        delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        kind,
    };
    log::info!("Leak test: {} cycles of {} with {:?} delay", iterations, kind, delay);

    let baseline = engine.renderer_info();
    let mut snapshots = Vec::with_capacity(iterations);
    for i in 0..iterations {
        let id = engine.add_primitive(kind);
        engine.tick();
        pause(delay);

        engine.remove_object(&id);
        engine.tick();
        pause(delay);

        snapshots.push(LeakSnapshot { i, info: engine.renderer_info() });
    }

    let final_info = engine.renderer_info();
    log::info!(
        "Leak test done: geometries {} -> {}, programs {} -> {}",
        baseline.memory.geometries,
        final_info.memory.geometries,
        baseline.programs,
        final_info.programs
    );

    LeakReport { meta, baseline, snapshots, final_info }
}

/// Add `count` boxes, then clear, sampling before and after
pub fn run_clear_test(engine: &mut Engine, count: usize, delay: Duration) -> ClearReport {
    let run_at = Utc::now();
    let initial = engine.renderer_info();
    for _ in 0..count {
        engine.add_primitive(PrimitiveKind::Box);
    }
    engine.tick();
    pause(delay);
    let before = engine.renderer_info();

    engine.clear();
    engine.tick();
    pause(delay);
    let after = engine.renderer_info();

    log::info!(
        "Clear test: geometries before {}, after {}",
        before.memory.geometries,
        after.memory.geometries
    );
    ClearReport { run_at, added: count, initial, before, after }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EditorConfig;

    fn engine() -> Engine {
        Engine::headless(EditorConfig::default()).unwrap()
    }

    #[test]
    fn test_leak_cycle_converges() {
        let mut engine = engine();
        let report = run_leak_cycle(&mut engine, 200, Duration::ZERO, PrimitiveKind::Box);

        assert_eq!(report.snapshots.len(), 200);
        assert!(report.converged(10, 190));
        assert_eq!(report.net_geometry_growth(), 0);
        // Pool baseline only: one geometry and one outline
        assert_eq!(report.final_info.memory.geometries, report.baseline.memory.geometries + 2);
        assert_eq!(report.final_info.programs, report.baseline.programs);
        assert_eq!(report.final_info.memory.textures, 0);
        assert_eq!(report.final_info.stale_draws, 0);
        assert_eq!(report.final_info.invalid_releases, 0);
    }

    #[test]
    fn test_leak_cycle_never_uses_untracked_fallback() {
        let mut engine = engine();
        run_leak_cycle(&mut engine, 20, Duration::ZERO, PrimitiveKind::Sphere);
        let stats = engine.scene_manager().resources().tracker().stats();
        assert_eq!(stats.untracked_releases, 0);
        // Baseline geometry and outline
        assert_eq!(stats.tracked, 2);
    }

    #[test]
    fn test_converged_out_of_range() {
        let mut engine = engine();
        let report = run_leak_cycle(&mut engine, 5, Duration::ZERO, PrimitiveKind::Box);
        assert!(!report.converged(1, 10));
        assert!(report.converged_for(&LeakTestConfig::default()));
    }

    #[test]
    fn test_clear_test_returns_to_zero() {
        let mut engine = engine();
        let report = run_clear_test(&mut engine, 12, Duration::ZERO);

        assert_eq!(report.added, 12);
        assert_eq!(report.before.memory.geometries, report.initial.memory.geometries + 2);
        assert_eq!(report.before.render.calls, 24);
        assert!(report.is_clean());
        assert_eq!(report.after.render.calls, 0);
    }

    #[test]
    fn test_report_json_layout() {
        let mut engine = engine();
        let report = run_leak_cycle(&mut engine, 2, Duration::ZERO, PrimitiveKind::Box);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["meta"]["iterations"], 2);
        assert_eq!(json["meta"]["delayMs"], 0);
        assert_eq!(json["meta"]["kind"], "Box");
        assert_eq!(json["snapshots"][1]["i"], 1);
        assert_eq!(json["snapshots"][1]["memory"], json["snapshots"][0]["memory"]);
        assert!(json["final"]["render"]["frame"].is_u64());
    }

    #[test]
    fn test_write_json_round_trip() {
        let dir = std::env::temp_dir().join(format!("leak-{}", uuid::Uuid::new_v4()));
        let mut engine = engine();
        let report = run_leak_cycle(&mut engine, 3, Duration::ZERO, PrimitiveKind::Cylinder);
        let path = dir.join(report.file_name());

        report.write_json(&path).unwrap();
        let loaded: LeakReport = serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(loaded, report);
        std::fs::remove_dir_all(dir).ok();
    }
}
