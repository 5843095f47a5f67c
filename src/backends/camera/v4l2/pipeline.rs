// SPDX-License-Identifier: GPL-3.0-only

//! GStreamer capture session for a single still photo
//!
//! ```text
//! v4l2src / pipewiresrc → videoconvert → videoscale → appsink (RGBA)
//! ```
//!
//! The appsink keeps only the newest frame. Nothing is pulled until a photo
//! request arms the sink callback; the first sample after that fulfills the
//! request and later samples are discarded.

use super::super::types::*;
use super::super::{CameraDevice, CaptureSession};
use crate::constants::{pipeline, timing};
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Pending photo request shared between the sink callback and the bus watcher
type PhotoSlot = Arc<Mutex<Option<PhotoSender>>>;

/// Capture session backed by a GStreamer pipeline
pub struct GstCaptureSession {
    pipeline: gstreamer::Pipeline,
    source: CameraSource,
    preset: SessionPreset,
    input: Option<gstreamer::Element>,
    convert: Option<gstreamer::Element>,
    appsink: Option<AppSink>,
    running: bool,
    pending: Option<PhotoSlot>,
}

impl GstCaptureSession {
    /// Create an empty session. GStreamer must already be initialized.
    pub fn new(source: CameraSource, preset: SessionPreset) -> Self {
        Self {
            pipeline: gstreamer::Pipeline::new(),
            source,
            preset,
            input: None,
            convert: None,
            appsink: None,
            running: false,
            pending: None,
        }
    }

    fn appsink(&self) -> BackendResult<&AppSink> {
        self.appsink
            .as_ref()
            .ok_or_else(|| BackendError::Other("No photo output attached".to_string()))
    }

    fn output_caps(&self) -> gstreamer::Caps {
        let mut builder =
            gstreamer::Caps::builder("video/x-raw").field("format", pipeline::OUTPUT_FORMAT);
        if let Some((width, height)) = self.preset.dimensions() {
            builder = builder
                .field("width", width as i32)
                .field("height", height as i32);
        }
        builder.build()
    }
}

impl CaptureSession for GstCaptureSession {
    fn add_input(&mut self, device: &CameraDevice) -> BackendResult<()> {
        info!(device = %device, source = %self.source, "Binding camera input");

        let mut builder = gstreamer::ElementFactory::make(self.source.element_name());
        if let Some(property) = self.source.device_property()
            && !device.path.is_empty()
        {
            builder = builder.property(property, device.path.as_str());
        }
        let source = builder
            .build()
            .map_err(|e| BackendError::NotAvailable(format!("{}: {}", self.source.element_name(), e)))?;

        adopt_source(&self.pipeline, &source, device)?;
        self.input = Some(source);
        Ok(())
    }

    fn add_output(&mut self) -> BackendResult<()> {
        let convert = gstreamer::ElementFactory::make("videoconvert")
            .build()
            .map_err(|e| BackendError::LinkFailed(format!("videoconvert: {}", e)))?;
        let scale = gstreamer::ElementFactory::make("videoscale")
            .build()
            .map_err(|e| BackendError::LinkFailed(format!("videoscale: {}", e)))?;

        let appsink = AppSink::builder().caps(&self.output_caps()).build();
        appsink.set_property("sync", false);
        appsink.set_property("max-buffers", pipeline::MAX_BUFFERS);
        appsink.set_property("drop", true);
        appsink.set_property("enable-last-sample", false);

        self.pipeline
            .add_many([&convert, &scale, appsink.upcast_ref::<gstreamer::Element>()])
            .map_err(|e| BackendError::LinkFailed(e.to_string()))?;
        gstreamer::Element::link_many([&convert, &scale, appsink.upcast_ref::<gstreamer::Element>()])
            .map_err(|e| BackendError::LinkFailed(e.to_string()))?;

        debug!(caps = %self.output_caps(), "Photo output attached");
        self.convert = Some(convert);
        self.appsink = Some(appsink);
        Ok(())
    }

    fn commit_configuration(&mut self) -> BackendResult<()> {
        let (Some(input), Some(convert)) = (&self.input, &self.convert) else {
            return Err(BackendError::LinkFailed(
                "Session needs both an input and an output".to_string(),
            ));
        };
        input
            .link(convert)
            .map_err(|e| BackendError::LinkFailed(format!("input to output: {}", e)))?;
        debug!("Session configuration committed");
        Ok(())
    }

    fn start_running(&mut self) -> BackendResult<()> {
        debug!("Setting pipeline to PLAYING state");
        self.pipeline.set_state(gstreamer::State::Playing).map_err(|e| {
            BackendError::InitializationFailed(format!("Failed to start pipeline: {}", e))
        })?;
        self.running = true;

        let (result, state, pending) = self.pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::START_TIMEOUT_SECS,
        ));
        debug!(result = ?result, state = ?state, pending = ?pending, "Pipeline state");
        if result.is_err() {
            return Err(BackendError::InitializationFailed(
                "Pipeline failed to reach PLAYING".to_string(),
            ));
        }
        if state != gstreamer::State::Playing {
            warn!("Pipeline is not in PLAYING state yet");
        }

        info!("Capture session running");
        Ok(())
    }

    fn capture_photo(&mut self) -> BackendResult<PhotoReceiver> {
        let appsink = self.appsink()?.clone();
        let bus = self
            .pipeline
            .bus()
            .ok_or_else(|| BackendError::Other("Pipeline has no bus".to_string()))?;

        let (sender, receiver) = oneshot::channel();
        let slot: PhotoSlot = Arc::new(Mutex::new(Some(sender)));

        let sample_slot = slot.clone();
        appsink.set_callbacks(
            gstreamer_app::AppSinkCallbacks::builder()
                .new_sample(move |sink| {
                    // Always drain the sample so the sink keeps flowing
                    let sample = sink.pull_sample();
                    if !is_armed(&sample_slot) {
                        return Ok(gstreamer::FlowSuccess::Ok);
                    }
                    let result = sample
                        .map_err(|e| BackendError::CaptureFailed(format!("Failed to pull sample: {}", e)))
                        .and_then(|sample| still_from_sample(&sample));
                    fulfill(&sample_slot, result);
                    Ok(gstreamer::FlowSuccess::Ok)
                })
                .build(),
        );

        let bus_slot = slot.clone();
        std::thread::spawn(move || watch_bus(bus, bus_slot));

        self.pending = Some(slot);
        debug!("Photo request armed");
        Ok(receiver)
    }

    fn stop_running(&mut self) {
        // Dropping the sender lets the bus watcher exit
        if let Some(slot) = self.pending.take() {
            slot.lock().unwrap_or_else(PoisonError::into_inner).take();
        }
        if let Some(appsink) = &self.appsink {
            appsink.set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());
        }

        if let Err(e) = self.pipeline.set_state(gstreamer::State::Null) {
            error!(error = %e, "Failed to stop pipeline");
        }
        let (result, state, _) = self.pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::STOP_TIMEOUT_SECS,
        ));
        match result {
            Ok(_) => debug!(state = ?state, "Pipeline stopped"),
            Err(e) => debug!(error = ?e, state = ?state, "Pipeline state change had issues"),
        }

        if self.running {
            info!("Capture session stopped");
        }
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

impl Drop for GstCaptureSession {
    fn drop(&mut self) {
        if let Some(appsink) = &self.appsink {
            appsink.set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());
        }
        // Release the device even if the owner never called stop_running
        let _ = self.pipeline.set_state(gstreamer::State::Null);
    }
}

/// Open `source` and add it to `pipeline`, leaving it in NULL on failure
fn adopt_source(
    pipeline: &gstreamer::Pipeline,
    source: &gstreamer::Element,
    device: &CameraDevice,
) -> BackendResult<()> {
    // READY opens the device, so a busy or missing node fails here
    if let Err(e) = source.set_state(gstreamer::State::Ready) {
        let _ = source.set_state(gstreamer::State::Null);
        return Err(BackendError::DeviceNotFound(format!(
            "{} could not be opened: {}",
            device, e
        )));
    }

    if let Err(e) = pipeline.add(source) {
        let _ = source.set_state(gstreamer::State::Null);
        return Err(BackendError::DeviceNotFound(format!(
            "{} could not be added: {}",
            device, e
        )));
    }
    Ok(())
}

fn is_armed(slot: &PhotoSlot) -> bool {
    slot.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .is_some_and(|sender| !sender.is_closed())
}

/// Deliver the photo result if the request is still pending
fn fulfill(slot: &PhotoSlot, result: BackendResult<CapturedStill>) {
    let sender = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(sender) = sender {
        let _ = sender.send(result);
    }
}

/// Fail the pending request on a pipeline error or early end of stream
fn watch_bus(bus: gstreamer::Bus, slot: PhotoSlot) {
    use gstreamer::MessageView;

    while is_armed(&slot) {
        let Some(message) = bus.timed_pop_filtered(
            gstreamer::ClockTime::from_mseconds(timing::BUS_POLL_INTERVAL_MS),
            &[gstreamer::MessageType::Error, gstreamer::MessageType::Eos],
        ) else {
            continue;
        };

        match message.view() {
            MessageView::Error(err) => {
                error!(error = %err.error(), debug = ?err.debug(), "Pipeline error during capture");
                fulfill(&slot, Err(BackendError::CaptureFailed(err.error().to_string())));
            }
            MessageView::Eos(_) => {
                fulfill(
                    &slot,
                    Err(BackendError::CaptureFailed(
                        "Stream ended before a frame arrived".to_string(),
                    )),
                );
            }
            _ => {}
        }
    }
}

fn still_from_sample(sample: &gstreamer::Sample) -> BackendResult<CapturedStill> {
    let buffer = sample
        .buffer()
        .ok_or_else(|| BackendError::InvalidFrame("No buffer in sample".to_string()))?;
    let caps = sample
        .caps()
        .ok_or_else(|| BackendError::InvalidFrame("No caps in sample".to_string()))?;
    let video_info = VideoInfo::from_caps(caps)
        .map_err(|e| BackendError::InvalidFrame(format!("Failed to get video info: {}", e)))?;
    let map = buffer
        .map_readable()
        .map_err(|e| BackendError::InvalidFrame(format!("Failed to map buffer: {}", e)))?;

    let still = CapturedStill {
        width: video_info.width(),
        height: video_info.height(),
        stride: video_info.stride()[0] as u32,
        data: map.as_slice().to_vec(),
        captured_at: Instant::now(),
    };
    debug!(
        width = still.width,
        height = still.height,
        stride = still.stride,
        size_kb = still.data.len() / 1024,
        "Still frame received"
    );
    Ok(still)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named_source(name: &str) -> Option<gstreamer::Element> {
        gstreamer::init().ok()?;
        gstreamer::ElementFactory::make("fakesrc").name(name).build().ok()
    }

    #[test]
    fn test_rejected_source_is_released() {
        let (Some(taken), Some(source)) = (named_source("camera"), named_source("camera")) else {
            return;
        };
        let pipeline = gstreamer::Pipeline::new();
        pipeline.add(&taken).unwrap();

        let result = adopt_source(&pipeline, &source, &CameraDevice::default());
        assert!(matches!(result, Err(BackendError::DeviceNotFound(_))));
        assert_eq!(source.current_state(), gstreamer::State::Null);
        assert!(source.parent().is_none());
    }

    #[test]
    fn test_adopted_source_joins_pipeline() {
        let Some(source) = named_source("camera") else {
            return;
        };
        let pipeline = gstreamer::Pipeline::new();

        adopt_source(&pipeline, &source, &CameraDevice::default()).unwrap();
        assert_eq!(source.current_state(), gstreamer::State::Ready);
        assert!(source.has_as_parent(&pipeline));
        let _ = source.set_state(gstreamer::State::Null);
    }
}
