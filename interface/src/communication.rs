use crate::config::BridgeConfig;
use crate::error::{InterfaceError, Result};
use edgefirst_schemas::builtin_interfaces::Time;
use edgefirst_schemas::std_msgs::Header;
use kinematics::WheelCommand;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use zenoh::Session;

/// ROS 2 CDR encapsulation header (Little Endian).
const CDR_LE_HEADER: [u8; 4] = [0x00, 0x01, 0x00, 0x00];

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WheelCommandMsg {
    pub header: Header,
    pub left: i32,
    pub right: i32,
    pub duration_ms: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LightMsg {
    pub header: Header,
    pub on: bool,
    pub rgb: [u8; 3],
}

/// Layout of `std_msgs/String`, published by the camera node with the decoded code.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CodeMsg {
    pub data: String,
}

fn stamped_header(frame_id: &str) -> Header {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    Header {
        stamp: Time::new(now.as_secs() as i32, now.subsec_nanos()),
        frame_id: frame_id.to_string(),
    }
}

fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>> {
    let mut payload = CDR_LE_HEADER.to_vec();
    let data = cdr::serialize::<_, _, cdr::CdrLe>(msg, cdr::Infinite)?;
    payload.extend(data);
    Ok(payload)
}

fn decode<T: DeserializeOwned>(payload: &[u8]) -> Option<T> {
    // We assume Little Endian for simplicity
    if payload.len() <= CDR_LE_HEADER.len() {
        warn!("Received payload too short for ROS 2 message");
        return None;
    }
    let mut deserializer =
        cdr::Deserializer::<_, _, cdr::LittleEndian>::new(&payload[4..], cdr::Infinite);
    match T::deserialize(&mut deserializer) {
        Ok(msg) => Some(msg),
        Err(e) => {
            warn!("Failed to deserialize message: {e}");
            None
        }
    }
}

pub struct CommunicationLayer {
    session: Session,
    wheel_command_key: String,
    light_key: String,
    code_key: String,
}

impl CommunicationLayer {
    pub async fn new(config: &BridgeConfig) -> Result<Self> {
        let zenoh_config = zenoh::config::Config::default();
        let session = zenoh::open(zenoh_config)
            .await
            .map_err(|e| InterfaceError::Bridge(e.to_string()))?;

        Ok(Self {
            session,
            wheel_command_key: config.wheel_command_key.clone(),
            light_key: config.light_key.clone(),
            code_key: config.code_key.clone(),
        })
    }

    pub async fn publish_wheel_command(&self, wheels: WheelCommand, duration: Duration) -> Result<()> {
        let msg = WheelCommandMsg {
            header: stamped_header("base_link"),
            left: wheels.left,
            right: wheels.right,
            duration_ms: u32::try_from(duration.as_millis()).unwrap_or(u32::MAX),
        };
        debug!("{} <- {:?}", self.wheel_command_key, wheels);
        self.session
            .put(&self.wheel_command_key, encode(&msg)?)
            .await
            .map_err(|e| InterfaceError::Bridge(e.to_string()))?;
        Ok(())
    }

    pub async fn publish_light(&self, rgb: Option<[u8; 3]>) -> Result<()> {
        let msg = LightMsg {
            header: stamped_header("underlights"),
            on: rgb.is_some(),
            rgb: rgb.unwrap_or_default(),
        };
        self.session
            .put(&self.light_key, encode(&msg)?)
            .await
            .map_err(|e| InterfaceError::Bridge(e.to_string()))?;
        Ok(())
    }

    /// Forwards every decoded code string to `callback`.
    pub async fn subscribe_codes<F>(&self, callback: F) -> Result<()>
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        let subscriber = self
            .session
            .declare_subscriber(&self.code_key)
            .await
            .map_err(|e| InterfaceError::Bridge(e.to_string()))?;

        tokio::spawn(async move {
            while let Ok(sample) = subscriber.recv_async().await {
                let payload = sample.payload().to_bytes();
                if let Some(msg) = decode::<CodeMsg>(&payload) {
                    callback(msg.data);
                }
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_command_round_trip() {
        let msg = WheelCommandMsg {
            header: stamped_header("base_link"),
            left: -50,
            right: 50,
            duration_ms: 643,
        };
        let payload = encode(&msg).unwrap();
        assert_eq!(&payload[..4], &CDR_LE_HEADER);

        let decoded: WheelCommandMsg = decode(&payload).unwrap();
        assert_eq!((decoded.left, decoded.right, decoded.duration_ms), (-50, 50, 643));
        assert_eq!(decoded.header.frame_id, "base_link");
    }

    #[test]
    fn test_short_payload_rejected() {
        assert!(decode::<CodeMsg>(&CDR_LE_HEADER).is_none());
    }
}
