// SPDX-License-Identifier: GPL-3.0-only

//! In-process camera backend for tests and dry runs
//!
//! Produces a synthetic gradient still and records every session's
//! lifecycle, so callers can check that no session is left running.

use super::types::*;
use super::{CameraBackend, CaptureSession};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::debug;

/// Step at which a fake session fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FakeFailure {
    /// Every step succeeds
    #[default]
    Never,
    /// No default device exists
    NoDevice,
    /// The input device cannot be opened
    Input,
    /// The output sink cannot be attached
    Output,
    /// Input and output cannot be linked
    Commit,
    /// The session does not start
    Start,
    /// The photo request reports an error
    Capture,
    /// The photo request completes with an empty frame
    EmptyFrame,
    /// The photo request is never fulfilled
    Hang,
}

/// Session lifecycle counters shared by all sessions of one backend
#[derive(Debug, Default)]
pub struct SessionStats {
    pub created: AtomicUsize,
    pub started: AtomicUsize,
    pub stopped: AtomicUsize,
    pub photos_requested: AtomicUsize,
    /// Sessions currently running
    pub running: AtomicUsize,
    /// Thread each stop ran on
    pub stop_threads: Mutex<Vec<ThreadId>>,
}

impl SessionStats {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn photos_requested(&self) -> usize {
        self.photos_requested.load(Ordering::SeqCst)
    }

    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop_threads(&self) -> Vec<ThreadId> {
        self.stop_threads
            .lock()
            .map(|threads| threads.clone())
            .unwrap_or_default()
    }
}

/// Fake camera backend
pub struct FakeBackend {
    width: u32,
    height: u32,
    failure: FakeFailure,
    stats: Arc<SessionStats>,
}

impl FakeBackend {
    /// A working camera producing `width` x `height` stills
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            failure: FakeFailure::Never,
            stats: Arc::new(SessionStats::default()),
        }
    }

    /// Make sessions fail at the given step
    pub fn failing_at(mut self, failure: FakeFailure) -> Self {
        self.failure = failure;
        self
    }

    pub fn stats(&self) -> Arc<SessionStats> {
        self.stats.clone()
    }

    /// The frame every fake capture returns, as packed RGBA
    pub fn test_pattern(width: u32, height: u32) -> Vec<u8> {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                data.push((x * 255 / width.max(1)) as u8);
                data.push((y * 255 / height.max(1)) as u8);
                data.push(((x + y) * 255 / (width + height).max(1)) as u8);
                data.push(255);
            }
        }
        data
    }
}

impl CameraBackend for FakeBackend {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        if self.failure == FakeFailure::NoDevice {
            return Vec::new();
        }
        vec![CameraDevice {
            name: "Fake Camera".to_string(),
            path: "/dev/fake0".to_string(),
            driver: "fake".to_string(),
            index: 0,
        }]
    }

    fn default_device(&self) -> Option<CameraDevice> {
        self.enumerate_cameras().into_iter().next()
    }

    fn create_session(&self, preset: SessionPreset) -> BackendResult<Box<dyn CaptureSession>> {
        self.stats.created.fetch_add(1, Ordering::SeqCst);
        let (width, height) = preset.dimensions().unwrap_or((self.width, self.height));
        Ok(Box::new(FakeSession {
            width,
            height,
            failure: self.failure,
            stats: self.stats.clone(),
            running: false,
            pending: None,
        }))
    }
}

struct FakeSession {
    width: u32,
    height: u32,
    failure: FakeFailure,
    stats: Arc<SessionStats>,
    running: bool,
    /// Keeps a hung request's sender alive until the session stops
    pending: Option<PhotoSender>,
}

impl CaptureSession for FakeSession {
    fn add_input(&mut self, device: &CameraDevice) -> BackendResult<()> {
        if self.failure == FakeFailure::Input {
            return Err(BackendError::DeviceNotFound(format!("{} is busy", device)));
        }
        Ok(())
    }

    fn add_output(&mut self) -> BackendResult<()> {
        if self.failure == FakeFailure::Output {
            return Err(BackendError::LinkFailed("appsink unavailable".to_string()));
        }
        Ok(())
    }

    fn commit_configuration(&mut self) -> BackendResult<()> {
        if self.failure == FakeFailure::Commit {
            return Err(BackendError::LinkFailed("caps mismatch".to_string()));
        }
        Ok(())
    }

    fn start_running(&mut self) -> BackendResult<()> {
        if self.failure == FakeFailure::Start {
            return Err(BackendError::InitializationFailed("device stalled".to_string()));
        }
        self.stats.started.fetch_add(1, Ordering::SeqCst);
        self.stats.running.fetch_add(1, Ordering::SeqCst);
        self.running = true;
        Ok(())
    }

    fn capture_photo(&mut self) -> BackendResult<PhotoReceiver> {
        self.stats.photos_requested.fetch_add(1, Ordering::SeqCst);
        let (sender, receiver) = oneshot::channel();

        let result = match self.failure {
            FakeFailure::Hang => {
                self.pending = Some(sender);
                return Ok(receiver);
            }
            FakeFailure::Capture => Err(BackendError::CaptureFailed("sensor error".to_string())),
            FakeFailure::EmptyFrame => Ok(CapturedStill {
                width: self.width,
                height: self.height,
                stride: self.width * 4,
                data: Vec::new(),
                captured_at: Instant::now(),
            }),
            _ => Ok(CapturedStill {
                width: self.width,
                height: self.height,
                stride: self.width * 4,
                data: FakeBackend::test_pattern(self.width, self.height),
                captured_at: Instant::now(),
            }),
        };
        let _ = sender.send(result);
        Ok(receiver)
    }

    fn stop_running(&mut self) {
        self.pending = None;
        if self.running {
            self.stats.running.fetch_sub(1, Ordering::SeqCst);
            self.running = false;
        }
        self.stats.stopped.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut threads) = self.stats.stop_threads.lock() {
            threads.push(std::thread::current().id());
        }
        debug!("Fake session stopped");
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
