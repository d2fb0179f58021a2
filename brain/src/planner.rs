use crate::shape::ShapeSpec;
use kinematics::WheelCommand;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::time::Duration;

/// Time (ms) to travel 1 cm, measured on the robot.
pub const MOVE_TIME_PER_CM: u64 = 100;
pub const TURN_TIME_90: u64 = 643;
pub const TURN_TIME_120: u64 = 666;
/// Straight-line moves are shortened by this factor to counter drift.
pub const TRAVEL_SCALE: f64 = 0.6;
pub const MOTOR_SPEED: i32 = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub move_ms_per_cm: u64,
    pub turn_90_ms: u64,
    pub turn_120_ms: u64,
    pub travel_scale: f64,
    pub motor_speed: i32,
    /// Widening applied to the square's closing turn.
    pub square_closing_turn_factor: f64,
    /// Widening applied to the triangle's second and third turns.
    pub triangle_turn_factors: [f64; 2],
    pub circle_steps: u32,
    pub circle_turn_ms: u64,
    /// Distance reversed between consecutive shapes of a batch.
    pub reposition_cm: u32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            move_ms_per_cm: MOVE_TIME_PER_CM,
            turn_90_ms: TURN_TIME_90,
            turn_120_ms: TURN_TIME_120,
            travel_scale: TRAVEL_SCALE,
            motor_speed: MOTOR_SPEED,
            square_closing_turn_factor: 1.15,
            triangle_turn_factors: [1.5, 1.6],
            circle_steps: 360,
            circle_turn_ms: 10,
            reposition_cm: 15,
        }
    }
}

impl Calibration {
    /// Drive time for a straight line of `distance_cm`, truncated to whole ms.
    pub fn travel_ms(&self, distance_cm: f64) -> u64 {
        (distance_cm * self.move_ms_per_cm as f64 * self.travel_scale) as u64
    }
}

fn scaled(ms: u64, factor: f64) -> u64 {
    (ms as f64 * factor) as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Drive {
        duration: Duration,
        wheels: WheelCommand,
    },
    Turn {
        duration: Duration,
        wheels: WheelCommand,
    },
}

impl Action {
    pub fn duration(&self) -> Duration {
        match self {
            Action::Drive { duration, .. } | Action::Turn { duration, .. } => *duration,
        }
    }

    pub fn wheels(&self) -> WheelCommand {
        match self {
            Action::Drive { wheels, .. } | Action::Turn { wheels, .. } => *wheels,
        }
    }
}

/// One discrete unit of progress: a side (or polygon step) and the turn after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub drive: Action,
    pub turn: Action,
}

#[derive(Debug, Clone)]
pub struct MotionPlan {
    shape: ShapeSpec,
    segments: Vec<Segment>,
    drawing_time: Duration,
}

impl MotionPlan {
    pub fn shape(&self) -> &ShapeSpec {
        &self.shape
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.segments
            .iter()
            .flat_map(|segment| [&segment.drive, &segment.turn])
    }

    pub fn units(&self) -> usize {
        self.segments.len()
    }

    /// Time recorded for the shape. Only straight-line travel counts; turns
    /// are left out so the figure stays proportional to path length.
    pub fn drawing_time(&self) -> Duration {
        self.drawing_time
    }

    /// Wall-clock time the actuator will be busy, turns included.
    pub fn actuation_time(&self) -> Duration {
        self.actions().map(Action::duration).sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Planner {
    calibration: Calibration,
}

impl Planner {
    pub fn new(calibration: Calibration) -> Self {
        Self { calibration }
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn plan(&self, shape: &ShapeSpec) -> MotionPlan {
        let cal = &self.calibration;
        let mut segments = Vec::new();

        let drawing_ms = match *shape {
            ShapeSpec::Square { side } => {
                let drive_ms = cal.travel_ms(f64::from(side));
                let closing_turn_ms = scaled(cal.turn_90_ms, cal.square_closing_turn_factor);
                for i in 0..4 {
                    let turn_ms = if i == 3 { closing_turn_ms } else { cal.turn_90_ms };
                    segments.push(self.segment(drive_ms, turn_ms));
                }
                drive_ms * 4
            }
            ShapeSpec::Triangle { a, b, c } => {
                let [second, third] = cal.triangle_turn_factors;
                let turns = [
                    cal.turn_120_ms,
                    scaled(cal.turn_120_ms, second),
                    scaled(cal.turn_120_ms, third),
                ];
                let mut total = 0;
                for (side, turn_ms) in [a, b, c].into_iter().zip(turns) {
                    let drive_ms = cal.travel_ms(f64::from(side));
                    segments.push(self.segment(drive_ms, turn_ms));
                    total += drive_ms;
                }
                total
            }
            ShapeSpec::Circle { diameter } => {
                let circumference = PI * f64::from(diameter);
                let total = cal.travel_ms(circumference);
                let steps = cal.circle_steps.max(1);
                let step_ms = total / u64::from(steps);
                for _ in 0..steps {
                    segments.push(self.segment(step_ms, cal.circle_turn_ms));
                }
                total
            }
        };

        MotionPlan {
            shape: *shape,
            segments,
            drawing_time: Duration::from_millis(drawing_ms),
        }
    }

    pub fn reposition(&self) -> Action {
        let cal = &self.calibration;
        Action::Drive {
            duration: Duration::from_millis(cal.travel_ms(f64::from(cal.reposition_cm))),
            wheels: WheelCommand::reverse(cal.motor_speed),
        }
    }

    fn segment(&self, drive_ms: u64, turn_ms: u64) -> Segment {
        let speed = self.calibration.motor_speed;
        Segment {
            drive: Action::Drive {
                duration: Duration::from_millis(drive_ms),
                wheels: WheelCommand::forward(speed),
            },
            turn: Action::Turn {
                duration: Duration::from_millis(turn_ms),
                wheels: WheelCommand::spin_left(speed),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_square_plan() {
        let plan = Planner::default().plan(&ShapeSpec::Square { side: 30 });

        assert_eq!(plan.units(), 4);
        for segment in plan.segments() {
            assert_eq!(
                segment.drive,
                Action::Drive {
                    duration: ms(1800),
                    wheels: WheelCommand::new(50, 50)
                }
            );
        }
        let turns: Vec<Duration> = plan.segments().iter().map(|s| s.turn.duration()).collect();
        assert_eq!(turns, vec![ms(643), ms(643), ms(643), ms(739)]);
        assert_eq!(plan.segments()[0].turn.wheels(), WheelCommand::new(-50, 50));
        assert_eq!(plan.drawing_time(), ms(7200));
        assert_eq!(plan.actuation_time(), ms(7200 + 643 * 3 + 739));
    }

    #[test]
    fn test_triangle_plan() {
        let plan = Planner::default().plan(&ShapeSpec::Triangle { a: 20, b: 30, c: 40 });

        let drives: Vec<Duration> = plan.segments().iter().map(|s| s.drive.duration()).collect();
        let turns: Vec<Duration> = plan.segments().iter().map(|s| s.turn.duration()).collect();
        assert_eq!(drives, vec![ms(1200), ms(1800), ms(2400)]);
        assert_eq!(turns, vec![ms(666), ms(999), ms(1065)]);
        assert_eq!(plan.drawing_time(), ms(5400));
    }

    #[test]
    fn test_circle_plan() {
        let plan = Planner::default().plan(&ShapeSpec::Circle { diameter: 30 });

        // pi * 30 * 100 * 0.6 = 5654.87 ms
        assert_eq!(plan.drawing_time(), ms(5654));
        assert_eq!(plan.units(), 360);
        assert!(plan.segments().iter().all(|s| s.drive.duration() == ms(15)));
        assert!(plan.segments().iter().all(|s| s.turn.duration() == ms(10)));
        assert_eq!(plan.actions().count(), 720);
    }

    #[test]
    fn test_actions_alternate() {
        let plan = Planner::default().plan(&ShapeSpec::Square { side: 20 });
        let kinds: Vec<bool> = plan
            .actions()
            .map(|a| matches!(a, Action::Drive { .. }))
            .collect();
        assert_eq!(kinds, vec![true, false, true, false, true, false, true, false]);
    }

    #[test]
    fn test_reposition() {
        let action = Planner::default().reposition();
        assert_eq!(
            action,
            Action::Drive {
                duration: ms(900),
                wheels: WheelCommand::new(-50, -50)
            }
        );
    }

    #[test]
    fn test_custom_calibration() {
        let planner = Planner::new(Calibration {
            travel_scale: 1.0,
            circle_steps: 36,
            ..Calibration::default()
        });
        let plan = planner.plan(&ShapeSpec::Circle { diameter: 20 });

        assert_eq!(plan.units(), 36);
        assert_eq!(plan.drawing_time(), ms(6283));
    }
}
