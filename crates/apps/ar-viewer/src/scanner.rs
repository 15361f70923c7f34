//! QR entry scanner
//!
//! The entry page scans a QR code with the rear camera and forwards to the AR
//! page shortly after a code is found. Frame capture and decoding happen in
//! the page; this tracks what the page should be doing and when to redirect.

use tracing::{debug, info};

/// Page the scanner forwards to
pub const AR_PAGE: &str = "ar.html";

/// Delay between detection and redirect, so the user sees the result
pub const REDIRECT_DELAY_MS: f64 = 1500.0;

#[derive(Debug, Clone, PartialEq)]
pub enum ScannerState {
    Idle,
    Scanning,
    Detected { payload: String, redirect_at_ms: f64 },
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct EntryScanner {
    state: ScannerState,
    target: String,
    delay_ms: f64,
}

impl Default for EntryScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryScanner {
    pub fn new() -> Self {
        Self::with_target(AR_PAGE, REDIRECT_DELAY_MS)
    }

    pub fn with_target(target: impl Into<String>, delay_ms: f64) -> Self {
        Self {
            state: ScannerState::Idle,
            target: target.into(),
            delay_ms,
        }
    }

    pub fn state(&self) -> &ScannerState {
        &self.state
    }

    /// Start scanning once the camera request resolved
    pub fn start(&mut self, camera_granted: bool) -> &ScannerState {
        if matches!(self.state, ScannerState::Idle | ScannerState::Failed(_)) {
            self.state = if camera_granted {
                info!("QR scanner started");
                ScannerState::Scanning
            } else {
                ScannerState::Failed("Camera access unavailable".to_string())
            };
        }
        &self.state
    }

    /// Feed the decode result of one video frame
    ///
    /// Returns true when this frame produced the detection.
    pub fn on_frame(&mut self, decoded: Option<&str>, now_ms: f64) -> bool {
        if self.state != ScannerState::Scanning {
            return false;
        }
        let Some(payload) = decoded else {
            return false;
        };

        debug!(payload, "QR code detected");
        self.state = ScannerState::Detected {
            payload: payload.to_string(),
            redirect_at_ms: now_ms + self.delay_ms,
        };
        true
    }

    /// Redirect target once the delay has passed
    ///
    /// Yields the target once; the scanner is idle afterwards.
    pub fn poll(&mut self, now_ms: f64) -> Option<String> {
        let due = matches!(
            self.state,
            ScannerState::Detected { redirect_at_ms, .. } if now_ms >= redirect_at_ms
        );
        if !due {
            return None;
        }
        self.state = ScannerState::Idle;
        info!(page = %self.target, "redirecting");
        Some(self.target.clone())
    }

    /// Stop scanning and release the camera
    pub fn stop(&mut self) {
        self.state = ScannerState::Idle;
    }

    /// Whether the page should keep capturing frames
    pub fn wants_frames(&self) -> bool {
        self.state == ScannerState::Scanning
    }

    pub fn start_enabled(&self) -> bool {
        matches!(self.state, ScannerState::Idle | ScannerState::Failed(_))
    }

    pub fn stop_enabled(&self) -> bool {
        matches!(self.state, ScannerState::Scanning | ScannerState::Detected { .. })
    }

    pub fn result_visible(&self) -> bool {
        matches!(self.state, ScannerState::Detected { .. })
    }

    pub fn payload(&self) -> Option<&str> {
        match &self.state {
            ScannerState::Detected { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_then_redirect_after_delay() {
        let mut scanner = EntryScanner::new();
        assert!(scanner.start_enabled());

        scanner.start(true);
        assert!(scanner.wants_frames());
        assert!(scanner.stop_enabled());
        assert!(!scanner.start_enabled());

        assert!(!scanner.on_frame(None, 100.0));
        assert!(scanner.on_frame(Some("exhibit-42"), 200.0));
        assert!(!scanner.wants_frames(), "Capture stops after detection");
        assert!(scanner.result_visible());
        assert_eq!(scanner.payload(), Some("exhibit-42"));

        assert_eq!(scanner.poll(1699.0), None);
        assert_eq!(scanner.poll(1700.0), Some("ar.html".to_string()));
        assert_eq!(scanner.poll(1800.0), None, "Redirect is yielded once");
    }

    #[test]
    fn test_camera_denied() {
        let mut scanner = EntryScanner::new();
        let state = scanner.start(false).clone();
        assert_eq!(state, ScannerState::Failed("Camera access unavailable".to_string()));
        assert!(scanner.start_enabled(), "User may retry");
        assert!(!scanner.on_frame(Some("code"), 0.0));
    }

    #[test]
    fn test_stop_cancels_pending_redirect() {
        let mut scanner = EntryScanner::with_target("viewer.html", 10.0);
        scanner.start(true);
        scanner.on_frame(Some("code"), 0.0);
        scanner.stop();
        assert_eq!(scanner.state(), &ScannerState::Idle);
        assert_eq!(scanner.poll(100.0), None);
        assert!(!scanner.stop_enabled());
    }
}
