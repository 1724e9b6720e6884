//! Error types. None of these cross the picker boundary: the controller
//! recovers from them in place and at most turns them into a status message.

/// A serialized fill value or color string could not be understood.
#[derive(Debug, thiserror::Error)]
pub enum FillError {
    #[error("invalid fill JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid hex color: {0:?}")]
    InvalidHex(String),
    #[error("unknown fill type: {0:?}")]
    UnknownFillType(String),
    #[error("unrecognized color: {0:?}")]
    UnrecognizedColor(String),
}

/// Camera acquisition failed. The `Display` text is what the webcam tab
/// shows in place of the live preview.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error("Camera permission denied")]
    PermissionDenied,
    #[error("No camera found")]
    NotFound,
    #[error("Camera in use by another app")]
    NotReadable,
    #[error("Camera constraints not supported")]
    Overconstrained,
    #[error("Camera requires secure context")]
    InsecureContext,
    #[error("Camera access required")]
    Unavailable,
    #[error("Camera access denied")]
    Other(String),
}
