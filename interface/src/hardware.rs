use crate::communication::CommunicationLayer;
use brain::{Actuator, CodeReader, ShapeSpec, StatusLight};
use kinematics::{DeadReckoning, DifferentialDrive, Pose, WheelCommand};
use log::{debug, info};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;
use std::time::Duration;
use tokio::runtime::Handle;

/// Local stand-in for the motors: tracks the pose the commands would produce.
pub struct SimulatedDrive {
    odometry: DeadReckoning<DifferentialDrive>,
    realtime: bool,
    shape_start: Option<(Pose, f64)>,
}

impl SimulatedDrive {
    pub fn new(model: DifferentialDrive, realtime: bool) -> Self {
        Self {
            odometry: DeadReckoning::new(model),
            realtime,
            shape_start: None,
        }
    }

    /// Gap between the start and end of the current shape, and the path length
    /// driven since it began.
    fn shape_displacement(&self) -> Option<(f64, f64)> {
        self.shape_start.map(|(origin, travelled)| {
            (
                self.odometry.offset_from(&origin),
                self.odometry.travelled_cm() - travelled,
            )
        })
    }
}

impl Actuator for SimulatedDrive {
    fn drive(&mut self, wheels: WheelCommand, duration: Duration) -> brain::Result<()> {
        let pose = self.odometry.apply(wheels, duration);
        debug!(
            "sim pose x={:.1} cm y={:.1} cm heading={:.1}°",
            pose.translation.vector.x,
            pose.translation.vector.y,
            self.odometry.heading_degrees()
        );
        if self.realtime {
            thread::sleep(duration);
        }
        Ok(())
    }

    fn begin_shape(&mut self, _shape: &ShapeSpec) {
        self.shape_start = Some((self.odometry.pose(), self.odometry.travelled_cm()));
    }

    fn finish_shape(&mut self, shape: &ShapeSpec) {
        if let Some((gap, travelled)) = self.shape_displacement() {
            info!("sim: {shape} ended {gap:.1} cm from its start after {travelled:.1} cm of travel");
        }
        self.shape_start = None;
    }
}

/// Motor node reached over zenoh. Must be driven from a blocking thread.
pub struct BridgeDrive {
    bridge: Arc<CommunicationLayer>,
    runtime: Handle,
}

impl BridgeDrive {
    pub fn new(bridge: Arc<CommunicationLayer>, runtime: Handle) -> Self {
        Self { bridge, runtime }
    }
}

impl Actuator for BridgeDrive {
    fn drive(&mut self, wheels: WheelCommand, duration: Duration) -> brain::Result<()> {
        self.runtime
            .block_on(self.bridge.publish_wheel_command(wheels, duration))
            .map_err(|e| brain::Error::ActuationFailure(e.to_string()))?;
        // The motor node runs the command for `duration`; wait it out.
        thread::sleep(duration);
        Ok(())
    }
}

pub enum DriveBackend {
    Simulated(SimulatedDrive),
    Bridge(BridgeDrive),
}

impl Actuator for DriveBackend {
    fn drive(&mut self, wheels: WheelCommand, duration: Duration) -> brain::Result<()> {
        match self {
            DriveBackend::Simulated(drive) => drive.drive(wheels, duration),
            DriveBackend::Bridge(drive) => drive.drive(wheels, duration),
        }
    }

    fn begin_shape(&mut self, shape: &ShapeSpec) {
        if let DriveBackend::Simulated(drive) = self {
            drive.begin_shape(shape);
        }
    }

    fn finish_shape(&mut self, shape: &ShapeSpec) {
        if let DriveBackend::Simulated(drive) = self {
            drive.finish_shape(shape);
        }
    }
}

pub enum LightBackend {
    Console,
    Bridge {
        bridge: Arc<CommunicationLayer>,
        runtime: Handle,
    },
}

impl LightBackend {
    fn publish(&self, rgb: Option<[u8; 3]>) -> brain::Result<()> {
        match self {
            LightBackend::Console => {
                match rgb {
                    Some([r, g, b]) => info!("Under-lights on ({r}, {g}, {b})"),
                    None => debug!("Under-lights off"),
                }
                Ok(())
            }
            LightBackend::Bridge { bridge, runtime } => runtime
                .block_on(bridge.publish_light(rgb))
                .map_err(|e| brain::Error::StatusLight(e.to_string())),
        }
    }
}

impl StatusLight for LightBackend {
    fn set_color(&mut self, rgb: [u8; 3]) -> brain::Result<()> {
        self.publish(Some(rgb))
    }

    fn off(&mut self) -> brain::Result<()> {
        self.publish(None)
    }
}

/// Each received string is one already-decoded frame.
pub struct ChannelCodeReader {
    codes: Receiver<String>,
}

impl ChannelCodeReader {
    pub fn new(codes: Receiver<String>) -> Self {
        Self { codes }
    }
}

impl CodeReader for ChannelCodeReader {
    type Frame = Option<String>;

    fn capture_frame(&mut self) -> brain::Result<Self::Frame> {
        match self.codes.try_recv() {
            Ok(code) => Ok(Some(code)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                Err(brain::Error::Capture("code source disconnected".to_string()))
            }
        }
    }

    fn decode(&mut self, frame: &Self::Frame) -> Option<String> {
        frame.as_ref().map(|code| code.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain::{Planner, ShapeSpec, scan_command};
    use std::sync::mpsc;

    #[test]
    fn test_simulated_triangle_stays_near_origin() {
        let mut drive = SimulatedDrive::new(DifferentialDrive::new(13.6, 33.3), false);
        let plan = Planner::default().plan(&ShapeSpec::Triangle { a: 30, b: 30, c: 30 });

        for action in plan.actions() {
            drive.drive(action.wheels(), action.duration()).unwrap();
        }

        // Open-loop; only check that the path stays within the shape's scale.
        assert!(drive.odometry.pose().translation.vector.norm() < 60.0);
    }

    #[test]
    fn test_square_displacement_per_shape() {
        let mut drive = SimulatedDrive::new(DifferentialDrive::new(13.6, 33.3), false);
        let planner = Planner::default();
        let square = ShapeSpec::Square { side: 30 };

        let reposition = planner.reposition();
        drive.drive(reposition.wheels(), reposition.duration()).unwrap();
        assert_eq!(drive.shape_displacement(), None);

        drive.begin_shape(&square);
        for action in planner.plan(&square).actions() {
            drive.drive(action.wheels(), action.duration()).unwrap();
        }
        let (gap, travelled) = drive.shape_displacement().unwrap();
        drive.finish_shape(&square);

        // 4 sides of 30 cm * 0.6 scale at 16.65 cm/s; the reposition is excluded
        assert!((travelled - 4.0 * 1.8 * 16.65).abs() < 1.0);
        assert!(gap < travelled);
        assert_eq!(drive.shape_displacement(), None);
    }

    #[test]
    fn test_channel_reader() {
        let (tx, rx) = mpsc::channel();
        let mut reader = ChannelCodeReader::new(rx);
        tx.send(" S-30&C-20 \n".to_string()).unwrap();

        let code = scan_command(&mut reader, Duration::from_secs(1), Duration::ZERO);
        assert_eq!(code.as_deref(), Some("S-30&C-20"));

        drop(tx);
        assert!(reader.capture_frame().is_err());
    }
}
