use async_trait::async_trait;
use image::RgbImage;
use tracing::debug;

/// What a capture session is opened against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CaptureTarget {
    Device(u32),
    Url(String),
}

impl std::fmt::Display for CaptureTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureTarget::Device(index) => write!(f, "device {}", index),
            CaptureTarget::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Opens capture sessions. Opening never fails outright; a session that could
/// not be established reports `is_opened() == false`.
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether `CaptureTarget::Device` can ever open on this backend.
    fn supports_devices(&self) -> bool {
        true
    }

    async fn open(&self, target: &CaptureTarget) -> Box<dyn CaptureSession>;
}

#[async_trait]
pub trait CaptureSession: Send {
    fn is_opened(&self) -> bool;

    /// Reads one frame in RGB order, `None` when the read fails.
    async fn read(&mut self) -> Option<RgbImage>;

    /// Must be safe to call more than once.
    fn release(&mut self);
}

/// Owns a session and releases it when dropped, so every exit path of the
/// acquirer gives the device back.
pub struct SessionGuard {
    target: CaptureTarget,
    session: Box<dyn CaptureSession>,
}

impl SessionGuard {
    pub async fn open(backend: &dyn CaptureBackend, target: CaptureTarget) -> Self {
        debug!("Opening {} session for {}", backend.name(), target);
        let session = backend.open(&target).await;
        Self { target, session }
    }

    pub fn is_opened(&self) -> bool {
        self.session.is_opened()
    }

    pub async fn read(&mut self) -> Option<RgbImage> {
        self.session.read().await
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        debug!("Releasing capture session for {}", self.target);
        self.session.release();
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted backend that records every call made against it.

    use super::*;
    use image::Rgb;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Open(CaptureTarget),
        Read(CaptureTarget),
        Release(CaptureTarget),
    }

    #[derive(Debug, Clone, Copy)]
    pub enum Behaviour {
        Closed,
        /// Opens and yields this many frames before reads start failing.
        Frames(usize),
    }

    #[derive(Clone, Default)]
    pub struct FakeBackend {
        behaviours: HashMap<CaptureTarget, Behaviour>,
        without_devices: bool,
        calls: Arc<Mutex<Vec<Call>>>,
    }

    impl FakeBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, target: CaptureTarget, behaviour: Behaviour) -> Self {
            self.behaviours.insert(target, behaviour);
            self
        }

        /// Mimics a build with no local camera support.
        pub fn without_devices(mut self) -> Self {
            self.without_devices = true;
            self
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub fn opened(&self) -> Vec<CaptureTarget> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    Call::Open(t) => Some(t),
                    _ => None,
                })
                .collect()
        }

        pub fn released(&self) -> Vec<CaptureTarget> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    Call::Release(t) => Some(t),
                    _ => None,
                })
                .collect()
        }
    }

    struct FakeSession {
        target: CaptureTarget,
        behaviour: Behaviour,
        served: usize,
        released: bool,
        calls: Arc<Mutex<Vec<Call>>>,
    }

    #[async_trait]
    impl CaptureBackend for FakeBackend {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn supports_devices(&self) -> bool {
            !self.without_devices
        }

        async fn open(&self, target: &CaptureTarget) -> Box<dyn CaptureSession> {
            self.calls.lock().unwrap().push(Call::Open(target.clone()));
            Box::new(FakeSession {
                target: target.clone(),
                behaviour: self
                    .behaviours
                    .get(target)
                    .copied()
                    .unwrap_or(Behaviour::Closed),
                served: 0,
                released: false,
                calls: self.calls.clone(),
            })
        }
    }

    #[async_trait]
    impl CaptureSession for FakeSession {
        fn is_opened(&self) -> bool {
            !self.released && matches!(self.behaviour, Behaviour::Frames(_))
        }

        async fn read(&mut self) -> Option<RgbImage> {
            self.calls.lock().unwrap().push(Call::Read(self.target.clone()));
            match self.behaviour {
                Behaviour::Frames(n) if self.served < n && !self.released => {
                    self.served += 1;
                    Some(RgbImage::from_pixel(8, 6, Rgb([10, 20, 30])))
                }
                _ => None,
            }
        }

        fn release(&mut self) {
            if !self.released {
                self.released = true;
                self.calls
                    .lock()
                    .unwrap()
                    .push(Call::Release(self.target.clone()));
            }
        }
    }
}
