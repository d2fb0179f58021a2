use crate::{ForwardKinematics, Pose, WheelCommand};
use std::time::Duration;

/// Open-loop pose estimate built by integrating every command sent to the wheels.
#[derive(Debug, Clone)]
pub struct DeadReckoning<K> {
    model: K,
    pose: Pose,
    travelled_cm: f64,
}

impl<K: ForwardKinematics> DeadReckoning<K> {
    pub fn new(model: K) -> Self {
        Self {
            model,
            pose: Pose::identity(),
            travelled_cm: 0.0,
        }
    }

    pub fn apply(&mut self, command: WheelCommand, duration: Duration) -> Pose {
        let next = self.model.integrate(&self.pose, command, duration);
        self.travelled_cm += (next.translation.vector - self.pose.translation.vector).norm();
        self.pose = next;
        next
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Straight-line distance covered between integration steps (chord length).
    pub fn travelled_cm(&self) -> f64 {
        self.travelled_cm
    }

    pub fn offset_from(&self, origin: &Pose) -> f64 {
        (self.pose.translation.vector - origin.translation.vector).norm()
    }

    pub fn heading_degrees(&self) -> f64 {
        self.pose.rotation.angle().to_degrees()
    }
}
