//! Host-provided media: object URLs behind image/video fills and the camera
//! stream behind the webcam tab.
//!
//! The picker never reads files or talks to a camera itself. The host hands
//! it opaque resources; the picker's only duty is to release each of them
//! exactly once, when it is replaced or when the picker is torn down.

use crate::error::CaptureError;
use crate::fill::FillType;

/// Something the host allocated on the picker's behalf.
pub trait HostResource {
    fn release(&mut self);
}

/// Owns a [`HostResource`] and releases it on drop.
pub struct ResourceGuard {
    label: String,
    resource: Option<Box<dyn HostResource>>,
}

impl ResourceGuard {
    pub fn new(label: impl Into<String>, resource: Box<dyn HostResource>) -> Self {
        Self {
            label: label.into(),
            resource: Some(resource),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Drop for ResourceGuard {
    fn drop(&mut self) {
        if let Some(mut resource) = self.resource.take() {
            resource.release();
            tracing::info!(label = %self.label, "released media resource");
        }
    }
}

impl std::fmt::Debug for ResourceGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceGuard")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// The resources currently backing the image and video fills.
#[derive(Debug, Default)]
pub struct MediaResources {
    image: Option<ResourceGuard>,
    video: Option<ResourceGuard>,
}

impl MediaResources {
    /// Store `guard` for `kind`, releasing whatever it replaces. Kinds other
    /// than image and video own no resources and drop the guard at once.
    pub fn replace(&mut self, kind: FillType, guard: Option<ResourceGuard>) {
        match kind {
            FillType::Image => self.image = guard,
            FillType::Video => self.video = guard,
            _ => drop(guard),
        }
    }

    pub fn release_all(&mut self) {
        self.image = None;
        self.video = None;
    }
}

/// A live camera stream.
pub trait CaptureStream: HostResource {
    /// Grab the current frame as an image URL (typically a PNG data URL).
    fn capture_frame(&mut self) -> Result<String, CaptureError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub id: String,
    pub label: String,
}

impl CameraDevice {
    /// The device label, or `Camera N` (1-based) for unnamed devices.
    pub fn display_label(&self, index: usize) -> String {
        if self.label.is_empty() {
            format!("Camera {}", index + 1)
        } else {
            self.label.clone()
        }
    }
}

/// Host camera access.
pub trait CameraProvider {
    /// Open a stream, on a specific device if one is named.
    fn open(&mut self, device: Option<&str>) -> Result<Box<dyn CaptureStream>, CaptureError>;

    fn devices(&mut self) -> Vec<CameraDevice>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebcamStatus {
    AccessRequired,
    Live,
    Failed(CaptureError),
}

impl WebcamStatus {
    /// Status text shown in place of the preview; `None` while live.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::AccessRequired => Some(CaptureError::Unavailable.to_string()),
            Self::Live => None,
            Self::Failed(err) => Some(err.to_string()),
        }
    }
}

/// Camera state for the webcam tab.
pub struct WebcamSession {
    provider: Option<Box<dyn CameraProvider>>,
    stream: Option<Box<dyn CaptureStream>>,
    status: WebcamStatus,
    cameras: Vec<CameraDevice>,
    device: Option<String>,
}

impl Default for WebcamSession {
    fn default() -> Self {
        Self {
            provider: None,
            stream: None,
            status: WebcamStatus::AccessRequired,
            cameras: Vec::new(),
            device: None,
        }
    }
}

impl WebcamSession {
    pub fn new(provider: Box<dyn CameraProvider>) -> Self {
        let mut session = Self::default();
        session.provider = Some(provider);
        session
    }

    pub fn set_provider(&mut self, provider: Box<dyn CameraProvider>) {
        self.stop();
        self.provider = Some(provider);
    }

    pub fn status(&self) -> &WebcamStatus {
        &self.status
    }

    pub fn is_live(&self) -> bool {
        self.stream.is_some()
    }

    pub fn cameras(&self) -> &[CameraDevice] {
        &self.cameras
    }

    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    /// A device picker is only worth showing with more than one camera.
    pub fn offers_camera_choice(&self) -> bool {
        self.cameras.len() > 1
    }

    /// (Re)start the stream. The previous stream is released first.
    pub fn start(&mut self, device: Option<&str>) -> &WebcamStatus {
        self.release_stream();
        let Some(provider) = self.provider.as_mut() else {
            self.status = WebcamStatus::Failed(CaptureError::Unavailable);
            return &self.status;
        };
        match provider.open(device) {
            Ok(stream) => {
                self.stream = Some(stream);
                self.cameras = provider.devices();
                self.device = device.map(str::to_owned);
                self.status = WebcamStatus::Live;
                tracing::debug!(?device, cameras = self.cameras.len(), "camera started");
            }
            Err(err) => {
                tracing::warn!(?device, %err, "camera failed to start");
                self.status = WebcamStatus::Failed(err);
            }
        }
        &self.status
    }

    /// Start the camera unless a stream is already running.
    pub fn ensure_started(&mut self) {
        if self.stream.is_none() {
            self.start(None);
        }
    }

    pub fn stop(&mut self) {
        if self.release_stream() {
            self.status = WebcamStatus::AccessRequired;
        }
    }

    /// Capture a frame. `None` when no stream is running.
    pub fn capture(&mut self) -> Option<Result<String, CaptureError>> {
        self.stream.as_mut().map(|stream| stream.capture_frame())
    }

    fn release_stream(&mut self) -> bool {
        match self.stream.take() {
            Some(mut stream) => {
                stream.release();
                tracing::info!("released camera stream");
                true
            }
            None => false,
        }
    }
}

impl Drop for WebcamSession {
    fn drop(&mut self) {
        self.release_stream();
    }
}

impl std::fmt::Debug for WebcamSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebcamSession")
            .field("status", &self.status)
            .field("live", &self.stream.is_some())
            .field("cameras", &self.cameras)
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::mock::{CountingResource, MockCamera};
    use super::*;

    #[test]
    fn test_guard_releases_once_on_drop() {
        let count = Rc::new(Cell::new(0));
        let guard = ResourceGuard::new("blob:1", Box::new(CountingResource(Rc::clone(&count))));
        assert_eq!(guard.label(), "blob:1");
        drop(guard);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_replacing_media_releases_previous() {
        let count = Rc::new(Cell::new(0));
        let guard = |n: &str| ResourceGuard::new(n, Box::new(CountingResource(Rc::clone(&count))));
        let mut media = MediaResources::default();
        media.replace(FillType::Image, Some(guard("blob:a")));
        media.replace(FillType::Video, Some(guard("blob:v")));
        assert_eq!(count.get(), 0);
        media.replace(FillType::Image, Some(guard("blob:b")));
        assert_eq!(count.get(), 1);
        media.replace(FillType::Solid, Some(guard("stray")));
        assert_eq!(count.get(), 2);
        media.release_all();
        assert_eq!(count.get(), 4);
        media.release_all();
        assert_eq!(count.get(), 4);
    }

    #[test]
    fn test_restart_releases_previous_stream() {
        let camera = MockCamera::new();
        let released = Rc::clone(&camera.released);
        let mut session = WebcamSession::new(Box::new(camera));
        assert_eq!(session.status(), &WebcamStatus::AccessRequired);

        assert_eq!(session.start(None), &WebcamStatus::Live);
        assert!(session.offers_camera_choice());
        assert_eq!(session.cameras()[1].display_label(1), "Camera 2");

        session.start(Some("usb"));
        assert_eq!(released.get(), 1);
        assert_eq!(session.device(), Some("usb"));
        assert_eq!(
            session.capture(),
            Some(Ok("data:image/png;base64,usb".to_string()))
        );

        drop(session);
        assert_eq!(released.get(), 2);
    }

    #[test]
    fn test_new_session_waits_for_start() {
        let camera = MockCamera::new();
        let opened = Rc::clone(&camera.opened);
        let session = WebcamSession::new(Box::new(camera));
        assert_eq!(session.status(), &WebcamStatus::AccessRequired);
        assert!(!session.is_live());
        assert!(session.cameras().is_empty());
        assert_eq!(opened.get(), 0);
    }

    #[test]
    fn test_failure_sets_status_message() {
        let mut camera = MockCamera::new();
        camera.fail_with = Some(CaptureError::NotReadable);
        let mut session = WebcamSession::new(Box::new(camera));
        session.start(None);
        assert_eq!(
            session.status().message().as_deref(),
            Some("Camera in use by another app")
        );
        assert!(!session.is_live());
        assert_eq!(session.capture(), None);
    }

    #[test]
    fn test_no_provider_and_stop() {
        let mut session = WebcamSession::default();
        session.ensure_started();
        assert_eq!(
            session.status(),
            &WebcamStatus::Failed(CaptureError::Unavailable)
        );

        let camera = MockCamera::new();
        let (opened, released) = (Rc::clone(&camera.opened), Rc::clone(&camera.released));
        session.set_provider(Box::new(camera));
        session.ensure_started();
        session.ensure_started();
        assert_eq!(opened.get(), 1);
        session.stop();
        assert_eq!(released.get(), 1);
        assert_eq!(session.status(), &WebcamStatus::AccessRequired);
        assert_eq!(WebcamStatus::Live.message(), None);
    }
}
