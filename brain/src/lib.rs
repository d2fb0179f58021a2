pub mod error;
pub mod executor;
pub mod parser;
pub mod planner;
pub mod scan;
pub mod shape;
pub mod stats;

pub use error::{Error, Result, TokenError};
pub use executor::{
    Actuator, Celebration, DrawOutcome, Executor, LogProgress, ProgressSink, ProgressTracker,
    StatusLight,
};
pub use parser::{Batch, MAX_SHAPES_PER_CODE, parse};
pub use planner::{Action, Calibration, MotionPlan, Planner, Segment};
pub use scan::{CodeReader, SCAN_TIMEOUT, scan_command};
pub use shape::{MAX_SIDE_LENGTH, MIN_SIDE_LENGTH, ShapeKind, ShapeSpec, validate_side_length};
pub use stats::{LargestShape, RunRecord, Statistics, SummaryReport};

use log::{error, info, warn};
use std::path::Path;

#[derive(Debug, Default)]
pub struct BatchReport {
    pub drawn: Vec<RunRecord>,
    pub rejected: Vec<TokenError>,
    pub aborted: Vec<(ShapeSpec, Error)>,
}

pub struct ShapeDrawer<A, L, P> {
    planner: Planner,
    executor: Executor<A, L, P>,
    statistics: Statistics,
}

impl<A: Actuator, L: StatusLight, P: ProgressSink> ShapeDrawer<A, L, P> {
    pub fn new(planner: Planner, executor: Executor<A, L, P>) -> Self {
        Self {
            planner,
            executor,
            statistics: Statistics::new(),
        }
    }

    /// Fails only when the batch is rejected as a whole; per-token problems and
    /// actuation failures are collected in the report.
    pub fn process(&mut self, raw: &str) -> Result<BatchReport> {
        let batch = parse(raw).inspect_err(|e| error!("Rejected code `{raw}`: {e}"))?;
        let total = batch.len();
        let mut report = BatchReport::default();

        for (i, entry) in batch.into_entries().into_iter().enumerate() {
            let shape = match entry {
                Ok(shape) => shape,
                Err(rejected) => {
                    warn!("{rejected}");
                    report.rejected.push(rejected);
                    continue;
                }
            };

            let plan = self.planner.plan(&shape);
            match self.executor.execute(&plan, &mut self.statistics) {
                DrawOutcome::Drawn(record) => report.drawn.push(record),
                DrawOutcome::Aborted { shape, error, .. } => report.aborted.push((shape, error)),
            }

            if i + 1 < total {
                self.reposition();
            }
        }

        Ok(report)
    }

    fn reposition(&mut self) {
        let action = self.planner.reposition();
        match self.executor.perform(&action) {
            Ok(()) => info!(
                "Moved {} cm backwards to start next shape",
                self.planner.calibration().reposition_cm
            ),
            Err(e) => warn!("Could not reposition before next shape: {e}"),
        }
    }

    #[cfg(test)]
    fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn summarize(&self) -> SummaryReport {
        self.statistics.summarize()
    }

    pub fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        self.statistics.persist(path)
    }

    #[cfg(test)]
    fn executor(&self) -> &Executor<A, L, P> {
        &self.executor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::tests::{
        CollectProgress, CountingLight, RecordingActuator, quick_celebration,
    };
    use kinematics::WheelCommand;
    use std::time::Duration;

    fn drawer(
        actuator: RecordingActuator,
    ) -> ShapeDrawer<RecordingActuator, CountingLight, CollectProgress> {
        let executor = Executor::new(actuator, CountingLight::default(), CollectProgress::default())
            .with_celebration(quick_celebration());
        ShapeDrawer::new(Planner::default(), executor)
    }

    #[test]
    fn test_process_batch() {
        let mut drawer = drawer(RecordingActuator::default());

        let report = drawer.process("S-30&T-20-30-40").unwrap();

        assert_eq!(report.drawn.len(), 2);
        assert!(report.rejected.is_empty());
        // 8 square actions + reposition + 6 triangle actions
        let calls = &drawer.executor().actuator().calls;
        assert_eq!(calls.len(), 15);
        assert_eq!(calls[8], (WheelCommand::new(-50, -50), Duration::from_millis(900)));
        assert_eq!(drawer.statistics().count(), 2);
        assert_eq!(
            drawer.statistics().total_time(),
            Duration::from_millis(7200 + 5400)
        );
    }

    #[test]
    fn test_too_many_shapes_draws_nothing() {
        let mut drawer = drawer(RecordingActuator::default());

        let result = drawer.process("S-10&S-10&S-10&S-10&S-10&S-10");

        assert!(matches!(result, Err(Error::TooManyShapes { .. })));
        assert!(drawer.executor().actuator().calls.is_empty());
        assert_eq!(drawer.statistics().count(), 0);
    }

    #[test]
    fn test_bad_token_skipped() {
        let mut drawer = drawer(RecordingActuator::default());

        let report = drawer.process("Q-10&S-30").unwrap();

        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].index, 1);
        assert!(matches!(report.rejected[0].error, Error::MalformedToken { .. }));
        assert_eq!(report.drawn.len(), 1);
        assert_eq!(report.drawn[0].shape, ShapeSpec::Square { side: 30 });
        // Nothing moved for the rejected token, so no reposition either.
        assert_eq!(drawer.executor().actuator().calls.len(), 8);
    }

    #[test]
    fn test_actuation_failure_continues_batch() {
        let mut drawer = drawer(RecordingActuator {
            fail_at: Some(0),
            ..Default::default()
        });

        let report = drawer.process("S-30&C-20").unwrap();

        assert_eq!(report.aborted.len(), 1);
        assert_eq!(report.aborted[0].0, ShapeSpec::Square { side: 30 });
        assert_eq!(report.drawn.len(), 1);
        assert_eq!(report.drawn[0].shape.kind(), ShapeKind::Circle);
        assert_eq!(drawer.statistics().count(), 1);
        assert_eq!(drawer.statistics().count_of(ShapeKind::Square), 0);
    }

    #[test]
    fn test_reposition_failure_continues_batch() {
        // calls 0..8 draw the square, the 9th drive is the reposition
        let mut drawer = drawer(RecordingActuator {
            fail_at: Some(8),
            ..Default::default()
        });

        let report = drawer.process("S-30&S-40").unwrap();

        assert_eq!(report.drawn.len(), 2);
        assert!(report.aborted.is_empty());
        let calls = &drawer.executor().actuator().calls;
        assert_eq!(calls.len(), 16);
        assert_eq!(calls[8].0, WheelCommand::new(50, 50));
        assert_eq!(drawer.statistics().count_of(ShapeKind::Square), 2);
    }

    struct BrokenLight;

    impl StatusLight for BrokenLight {
        fn set_color(&mut self, _rgb: [u8; 3]) -> Result<()> {
            Err(Error::StatusLight("no under-lights".to_string()))
        }

        fn off(&mut self) -> Result<()> {
            Err(Error::StatusLight("no under-lights".to_string()))
        }
    }

    #[test]
    fn test_light_failure_still_records() {
        let executor = Executor::new(
            RecordingActuator::default(),
            BrokenLight,
            CollectProgress::default(),
        )
        .with_celebration(quick_celebration());
        let mut drawer = ShapeDrawer::new(Planner::default(), executor);

        let report = drawer.process("T-30-30-30").unwrap();

        assert_eq!(report.drawn.len(), 1);
        assert!(report.aborted.is_empty());
        assert_eq!(drawer.statistics().count(), 1);
        assert_eq!(drawer.executor().actuator().calls.len(), 6);
    }
}
