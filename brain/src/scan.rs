use crate::error::Result;
use log::{debug, warn};
use std::thread;
use std::time::{Duration, Instant};

/// How long a user has to present a code.
pub const SCAN_TIMEOUT: Duration = Duration::from_secs(60);

pub trait CodeReader {
    type Frame;

    fn capture_frame(&mut self) -> Result<Self::Frame>;

    /// Decoded text, or `None` when the frame holds no readable code.
    fn decode(&mut self, frame: &Self::Frame) -> Option<String>;
}

/// Captures and decodes frames until a non-empty code is read or `timeout`
/// expires.
pub fn scan_command<R: CodeReader>(
    reader: &mut R,
    timeout: Duration,
    poll_interval: Duration,
) -> Option<String> {
    let deadline = Instant::now() + timeout;

    while Instant::now() < deadline {
        match reader.capture_frame() {
            Ok(frame) => {
                if let Some(code) = reader.decode(&frame).filter(|c| !c.trim().is_empty()) {
                    debug!("Code detected: {code}");
                    return Some(code);
                }
            }
            Err(e) => warn!("Frame capture failed: {e}"),
        }
        if !poll_interval.is_zero() {
            thread::sleep(poll_interval);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::VecDeque;

    struct ScriptedReader {
        frames: VecDeque<Result<Option<String>>>,
        captured: usize,
    }

    impl ScriptedReader {
        fn new(frames: Vec<Result<Option<String>>>) -> Self {
            Self {
                frames: frames.into(),
                captured: 0,
            }
        }
    }

    impl CodeReader for ScriptedReader {
        type Frame = Option<String>;

        fn capture_frame(&mut self) -> Result<Self::Frame> {
            self.captured += 1;
            self.frames.pop_front().unwrap_or(Ok(None))
        }

        fn decode(&mut self, frame: &Self::Frame) -> Option<String> {
            frame.clone()
        }
    }

    #[test]
    fn test_scan_returns_first_code() {
        let mut reader = ScriptedReader::new(vec![
            Ok(None),
            Err(Error::Capture("sensor busy".to_string())),
            Ok(Some("  ".to_string())),
            Ok(Some("S-30".to_string())),
            Ok(Some("C-20".to_string())),
        ]);

        let code = scan_command(&mut reader, Duration::from_secs(5), Duration::ZERO);

        assert_eq!(code.as_deref(), Some("S-30"));
        assert_eq!(reader.captured, 4);
    }

    #[test]
    fn test_scan_times_out() {
        let mut reader = ScriptedReader::new(Vec::new());

        let code = scan_command(
            &mut reader,
            Duration::from_millis(30),
            Duration::from_millis(5),
        );

        assert!(code.is_none());
        assert!(reader.captured > 0);
    }

    #[test]
    fn test_zero_timeout_never_captures() {
        let mut reader = ScriptedReader::new(vec![Ok(Some("S-30".to_string()))]);
        assert!(scan_command(&mut reader, Duration::ZERO, Duration::ZERO).is_none());
        assert_eq!(reader.captured, 0);
    }
}
