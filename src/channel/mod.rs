// SPDX-License-Identifier: GPL-3.0-only

//! Method channel between the GUI host and the camera handler
//!
//! The host calls named methods with optional JSON arguments and gets back
//! one [`MethodResult`] per call. See [`transport`] for the stdio framing.

pub mod transport;

use crate::constants::methods;
use crate::errors::{CameraError, ErrorCode};
use crate::handler::CameraHandler;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

/// One call from the host
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub arguments: Option<Value>,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Option<Value>) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// A string argument by key, if present and a string
    pub fn string_argument(&self, key: &str) -> Option<&str> {
        self.arguments.as_ref()?.get(key)?.as_str()
    }
}

/// Outcome of one call
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResult {
    /// A JSON value; `Value::Null` for calls with no result
    Success(Value),
    /// Raw bytes (the JPEG from `takePicture`)
    Bytes(Vec<u8>),
    /// A failure with a short code and a human-readable message
    Error {
        code: ErrorCode,
        message: String,
        details: Option<String>,
    },
    /// The method name is not known
    NotImplemented,
}

impl MethodResult {
    /// Host-facing error for a call-level failure, keeping the cause in `details`
    pub fn from_error(err: &CameraError) -> Self {
        let details = match err {
            CameraError::InvalidArgument(_) | CameraError::HandlerUnavailable => None,
            other => Some(other.to_string()),
        };
        MethodResult::Error {
            code: err.code(),
            message: err.host_message(),
            details,
        }
    }
}

/// Dispatches host calls to a [`CameraHandler`]
pub struct CameraChannel {
    handler: Option<Arc<CameraHandler>>,
}

impl CameraChannel {
    /// `None` models a handler that failed to initialise; every call is then `UNAVAILABLE`
    pub fn new(handler: Option<Arc<CameraHandler>>) -> Self {
        Self { handler }
    }

    pub fn name(&self) -> &'static str {
        crate::constants::CHANNEL_NAME
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Handle one call. Never panics; every failure is a [`MethodResult::Error`].
    pub async fn handle(&self, call: MethodCall) -> MethodResult {
        info!(method = %call.method, "Method called");

        let Some(handler) = self.handler.as_ref() else {
            error!("Camera handler not available");
            return MethodResult::from_error(&CameraError::HandlerUnavailable);
        };

        match call.method.as_str() {
            methods::CHECK_CAMERA_PERMISSION => {
                MethodResult::Success(Value::Bool(handler.check_camera_permission()))
            }
            methods::REQUEST_CAMERA_PERMISSION => {
                MethodResult::Success(Value::Bool(handler.request_camera_permission().await))
            }
            methods::SET_FILTER => match call.string_argument(methods::FILTER_ARGUMENT) {
                Some(filter) => {
                    handler.set_filter(filter);
                    MethodResult::Success(Value::Null)
                }
                None => {
                    warn!("setFilter called without a filter name");
                    MethodResult::from_error(&CameraError::InvalidArgument(
                        "Filter name required".to_string(),
                    ))
                }
            },
            methods::TAKE_PICTURE => match handler.take_picture().await {
                Ok(bytes) => {
                    info!(bytes = bytes.len(), "Returning image data");
                    MethodResult::Bytes(bytes)
                }
                Err(e) => {
                    error!(error = %e, "No image data to return");
                    MethodResult::from_error(&e)
                }
            },
            other => {
                warn!(method = %other, "Method not implemented");
                MethodResult::NotImplemented
            }
        }
    }
}
