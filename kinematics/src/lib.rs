use nalgebra::{Isometry2, Vector2};
use std::time::Duration;

/// Signed motor powers for the left and right wheels, in percent of full power.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelCommand {
    pub left: i32,
    pub right: i32,
}

impl Default for WheelCommand {
    fn default() -> Self {
        Self { left: 0, right: 0 }
    }
}

impl WheelCommand {
    pub const MAX_POWER: i32 = 100;

    pub fn new(left: i32, right: i32) -> Self {
        Self { left, right }
    }

    pub fn forward(speed: i32) -> Self {
        Self::new(speed, speed)
    }

    pub fn reverse(speed: i32) -> Self {
        Self::new(-speed, -speed)
    }

    /// Spin in place counter-clockwise (left wheel back, right wheel forward).
    pub fn spin_left(speed: i32) -> Self {
        Self::new(-speed, speed)
    }
}

/// Planar pose in centimetres; heading 0 points along +x, counter-clockwise positive.
pub type Pose = Isometry2<f64>;

pub mod dead_reckoning;

pub use dead_reckoning::DeadReckoning;

pub trait ForwardKinematics {
    fn integrate(&self, pose: &Pose, command: WheelCommand, duration: Duration) -> Pose;
}

#[derive(Debug, Clone, Copy)]
pub struct DifferentialDrive {
    /// Distance between the wheel contact points.
    pub wheel_base_cm: f64,
    /// Wheel surface speed at `WheelCommand::MAX_POWER`.
    pub full_speed_cm_s: f64,
}

impl DifferentialDrive {
    pub fn new(wheel_base_cm: f64, full_speed_cm_s: f64) -> Self {
        Self {
            wheel_base_cm,
            full_speed_cm_s,
        }
    }

    fn wheel_speed(&self, power: i32) -> f64 {
        let power = power.clamp(-WheelCommand::MAX_POWER, WheelCommand::MAX_POWER);
        self.full_speed_cm_s * f64::from(power) / f64::from(WheelCommand::MAX_POWER)
    }

    /// Body-frame linear (cm/s) and angular (rad/s) velocity for a command.
    pub fn body_velocity(&self, command: WheelCommand) -> (f64, f64) {
        let left = self.wheel_speed(command.left);
        let right = self.wheel_speed(command.right);
        let linear = (left + right) / 2.0;
        let angular = (right - left) / self.wheel_base_cm;
        (linear, angular)
    }
}

impl ForwardKinematics for DifferentialDrive {
    fn integrate(&self, pose: &Pose, command: WheelCommand, duration: Duration) -> Pose {
        let (linear, angular) = self.body_velocity(command);
        let dt = duration.as_secs_f64();
        let dtheta = angular * dt;

        // Exact arc; straight line when the wheels match.
        let local = if angular.abs() < 1e-9 {
            Vector2::new(linear * dt, 0.0)
        } else {
            let radius = linear / angular;
            Vector2::new(radius * dtheta.sin(), radius * (1.0 - dtheta.cos()))
        };

        pose * Isometry2::new(local, dtheta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn drive() -> DifferentialDrive {
        DifferentialDrive::new(10.0, 20.0)
    }

    #[test]
    fn test_straight_line() {
        let pose = drive().integrate(
            &Pose::identity(),
            WheelCommand::forward(50),
            Duration::from_secs(2),
        );

        assert!((pose.translation.vector.x - 20.0).abs() < 1e-6);
        assert!(pose.translation.vector.y.abs() < 1e-6);
        assert!(pose.rotation.angle().abs() < 1e-6);
    }

    #[test]
    fn test_spin_in_place() {
        let model = drive();
        let (_, angular) = model.body_velocity(WheelCommand::spin_left(50));
        let quarter = Duration::from_secs_f64((PI / 2.0) / angular);
        let pose = model.integrate(&Pose::identity(), WheelCommand::spin_left(50), quarter);

        assert!(pose.translation.vector.norm() < 1e-6);
        assert!((pose.rotation.angle() - PI / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_reverse_moves_backward() {
        let pose = drive().integrate(
            &Pose::identity(),
            WheelCommand::reverse(50),
            Duration::from_secs(1),
        );

        assert!((pose.translation.vector.x + 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_power_is_clamped() {
        let (linear, _) = drive().body_velocity(WheelCommand::forward(400));
        assert!((linear - 20.0).abs() < 1e-9);
    }
}
