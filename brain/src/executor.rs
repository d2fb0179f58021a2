use crate::error::{Error, Result};
use crate::planner::{Action, MotionPlan};
use crate::shape::ShapeSpec;
use crate::stats::{RunRecord, Statistics};
use kinematics::WheelCommand;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;

/// Motor driver. `drive` blocks until `duration` has elapsed or the drive fails.
pub trait Actuator {
    fn drive(&mut self, wheels: WheelCommand, duration: Duration) -> Result<()>;

    fn begin_shape(&mut self, _shape: &ShapeSpec) {}

    /// Called once the last action of `shape` has been driven.
    fn finish_shape(&mut self, _shape: &ShapeSpec) {}
}

pub trait StatusLight {
    fn set_color(&mut self, rgb: [u8; 3]) -> Result<()>;
    fn off(&mut self) -> Result<()>;
}

pub trait ProgressSink {
    fn report(&mut self, shape: &ShapeSpec, percent: u8);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&mut self, shape: &ShapeSpec, percent: u8) {
        info!("{}: {percent}% complete...", shape.kind());
    }
}

/// Turns completed units into percentages, keeping only new 10% steps and the
/// final 100%.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total: usize,
    last: Option<u8>,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            last: Some(0),
        }
    }

    pub fn advance(&mut self, completed: usize) -> Option<u8> {
        if self.total == 0 {
            return None;
        }
        let completed = completed.min(self.total);
        // round half up
        let percent = ((200 * completed + self.total) / (2 * self.total)) as u8;

        if self.last != Some(percent) && (percent % 10 == 0 || percent == 100) {
            self.last = Some(percent);
            Some(percent)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Celebration {
    pub color: [u8; 3],
    pub cycles: u32,
    /// Length of each on and each off phase.
    pub period_ms: u64,
}

impl Default for Celebration {
    fn default() -> Self {
        Self {
            color: [0, 255, 0],
            cycles: 3,
            period_ms: 500,
        }
    }
}

#[derive(Debug)]
pub enum DrawOutcome {
    Drawn(RunRecord),
    /// The actuator failed part way; the shape is not recorded.
    Aborted {
        shape: ShapeSpec,
        completed_units: usize,
        error: Error,
    },
}

pub struct Executor<A, L, P> {
    actuator: A,
    light: L,
    progress: P,
    celebration: Celebration,
}

impl<A: Actuator, L: StatusLight, P: ProgressSink> Executor<A, L, P> {
    pub fn new(actuator: A, light: L, progress: P) -> Self {
        Self {
            actuator,
            light,
            progress,
            celebration: Celebration::default(),
        }
    }

    pub fn with_celebration(mut self, celebration: Celebration) -> Self {
        self.celebration = celebration;
        self
    }

    /// Drives every action of `plan` in order. On success the run is recorded
    /// in `statistics`; an actuation failure abandons the rest of the plan.
    pub fn execute(&mut self, plan: &MotionPlan, statistics: &mut Statistics) -> DrawOutcome {
        let shape = *plan.shape();
        info!(
            "Drawing {shape} ({:.1} s of motion)",
            plan.actuation_time().as_secs_f64()
        );

        let mut tracker = ProgressTracker::new(plan.units());
        self.actuator.begin_shape(&shape);
        for (i, segment) in plan.segments().iter().enumerate() {
            for action in [&segment.drive, &segment.turn] {
                if let Err(error) = self.perform(action) {
                    error!("{shape}: stopped after {i} of {} units: {error}", plan.units());
                    return DrawOutcome::Aborted {
                        shape,
                        completed_units: i,
                        error,
                    };
                }
            }
            if let Some(percent) = tracker.advance(i + 1) {
                self.progress.report(&shape, percent);
            }
        }

        self.actuator.finish_shape(&shape);
        info!("Drawing complete: {shape}");
        if let Some([a, b, c]) = shape.interior_angles() {
            info!("Triangle angles: A = {a:.2}°, B = {b:.2}°, C = {c:.2}°");
        }
        self.celebrate();

        let record = RunRecord::new(shape, plan.drawing_time());
        statistics.record(record.clone());
        DrawOutcome::Drawn(record)
    }

    pub fn perform(&mut self, action: &Action) -> Result<()> {
        debug!("{action:?}");
        self.actuator.drive(action.wheels(), action.duration())
    }

    fn celebrate(&mut self) {
        let period = Duration::from_millis(self.celebration.period_ms);
        for _ in 0..self.celebration.cycles {
            if let Err(e) = self.light.set_color(self.celebration.color) {
                warn!("Could not blink under-lights: {e}");
                return;
            }
            thread::sleep(period);
            if let Err(e) = self.light.off() {
                warn!("Could not switch off under-lights: {e}");
                return;
            }
            thread::sleep(period);
        }
    }

    #[cfg(test)]
    pub(crate) fn actuator(&self) -> &A {
        &self.actuator
    }

    #[cfg(test)]
    fn light(&self) -> &L {
        &self.light
    }

    #[cfg(test)]
    fn progress(&self) -> &P {
        &self.progress
    }
}
