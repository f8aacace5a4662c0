//! Error taxonomy for the capture pipeline.
//!
//! Device backends report [`DeviceError`]; acquisition folds the last one into a
//! [`CameraCause`]. Composition has its own [`CompositionError`], of which only
//! `OverlayLoad` is recoverable. Everything surfaced to the session ends up in
//! [`PhotoboothError`].

use std::fmt;

/// What went wrong while talking to a camera device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceErrorKind {
    PermissionDenied,
    NotFound,
    Busy,
    Overconstrained,
    Timeout,
    Other,
}

/// Error reported by a [`crate::capture::CameraDevice`] or its stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceError {
    pub kind: DeviceErrorKind,
    pub message: String,
}

impl DeviceError {
    pub fn new(kind: DeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(what: &str) -> Self {
        Self::new(DeviceErrorKind::Timeout, format!("{} timed out", what))
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for DeviceError {}

/// Classification of a failed acquisition, taken from the last profile's error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraCause {
    PermissionDenied,
    NotFound,
    Busy,
    Overconstrained,
    Timeout,
    Unknown,
}

impl From<DeviceErrorKind> for CameraCause {
    fn from(kind: DeviceErrorKind) -> Self {
        match kind {
            DeviceErrorKind::PermissionDenied => CameraCause::PermissionDenied,
            DeviceErrorKind::NotFound => CameraCause::NotFound,
            DeviceErrorKind::Busy => CameraCause::Busy,
            DeviceErrorKind::Overconstrained => CameraCause::Overconstrained,
            DeviceErrorKind::Timeout => CameraCause::Timeout,
            DeviceErrorKind::Other => CameraCause::Unknown,
        }
    }
}

/// Composition failures.
///
/// `OverlayLoad` never aborts a run: the slot it happened in is drawn unframed.
/// The rest are fatal, since a missing or malformed snapshot would shift every
/// following slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositionError {
    EmptySequence,
    SizeMismatch {
        index: usize,
        expected: (u32, u32),
        actual: (u32, u32),
    },
    OverlayLoad {
        overlay: String,
        reason: String,
    },
    Encode(String),
}

impl fmt::Display for CompositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositionError::EmptySequence => write!(f, "No snapshots to compose"),
            CompositionError::SizeMismatch {
                index,
                expected,
                actual,
            } => write!(
                f,
                "Snapshot {} is {}x{}, expected {}x{}",
                index, actual.0, actual.1, expected.0, expected.1
            ),
            CompositionError::OverlayLoad { overlay, reason } => {
                write!(f, "Overlay '{}' failed to load: {}", overlay, reason)
            }
            CompositionError::Encode(e) => write!(f, "PNG encode error: {}", e),
        }
    }
}

impl std::error::Error for CompositionError {}

/// Errors surfaced by the session controller.
#[derive(Debug)]
pub enum PhotoboothError {
    CameraUnavailable(CameraCause, String),
    FrameSourceNotReady,
    CaptureFailed { take: usize, reason: String },
    Composition(CompositionError),
    NothingToDownload,
    InvalidSettings(String),
    Io(std::io::Error),
}

impl PhotoboothError {
    /// Message shown to the person in front of the camera.
    pub fn user_message(&self) -> String {
        match self {
            PhotoboothError::CameraUnavailable(cause, detail) => {
                let hint = match cause {
                    CameraCause::PermissionDenied => {
                        "Please allow camera access and try again.".to_string()
                    }
                    CameraCause::NotFound => {
                        "No camera found. Please connect a camera and try again.".to_string()
                    }
                    CameraCause::Busy => "Camera is busy or unavailable. Please close other apps using the camera and try again.".to_string(),
                    CameraCause::Overconstrained => {
                        "Camera doesn't meet requirements, even with basic settings.".to_string()
                    }
                    CameraCause::Timeout => {
                        "Camera did not start in time. Please try again.".to_string()
                    }
                    CameraCause::Unknown => format!("Error: {}", detail),
                };
                format!("Failed to access camera. {}", hint)
            }
            PhotoboothError::FrameSourceNotReady => {
                "Camera not ready. Please wait for the camera to load or try again.".to_string()
            }
            PhotoboothError::NothingToDownload => "Nothing to download yet.".to_string(),
            _ => "Failed to capture photos. Please try again.".to_string(),
        }
    }

    /// Whether the shell should offer a retry action.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, PhotoboothError::InvalidSettings(_))
    }
}

impl fmt::Display for PhotoboothError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoboothError::CameraUnavailable(cause, detail) => {
                write!(f, "Camera unavailable ({:?}): {}", cause, detail)
            }
            PhotoboothError::FrameSourceNotReady => write!(f, "Frame source not ready"),
            PhotoboothError::CaptureFailed { take, reason } => {
                write!(f, "Capture failed at take {}: {}", take, reason)
            }
            PhotoboothError::Composition(e) => write!(f, "Composition failed: {}", e),
            PhotoboothError::NothingToDownload => write!(f, "No composite to download"),
            PhotoboothError::InvalidSettings(e) => write!(f, "Invalid settings: {}", e),
            PhotoboothError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for PhotoboothError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PhotoboothError::Composition(e) => Some(e),
            PhotoboothError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CompositionError> for PhotoboothError {
    fn from(e: CompositionError) -> Self {
        PhotoboothError::Composition(e)
    }
}

impl From<std::io::Error> for PhotoboothError {
    fn from(e: std::io::Error) -> Self {
        PhotoboothError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_kind_classification() {
        assert_eq!(CameraCause::from(DeviceErrorKind::Busy), CameraCause::Busy);
        assert_eq!(CameraCause::from(DeviceErrorKind::Timeout), CameraCause::Timeout);
        assert_eq!(CameraCause::from(DeviceErrorKind::Other), CameraCause::Unknown);
    }

    #[test]
    fn test_user_messages() {
        let e = PhotoboothError::CameraUnavailable(CameraCause::NotFound, "none".into());
        assert!(e.user_message().contains("No camera found"));

        let e = PhotoboothError::CameraUnavailable(CameraCause::Unknown, "weird glitch".into());
        assert!(e.user_message().contains("weird glitch"));

        assert!(PhotoboothError::FrameSourceNotReady.is_retryable());
        assert!(!PhotoboothError::InvalidSettings("takes".into()).is_retryable());
    }
}
