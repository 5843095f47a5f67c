// SPDX-License-Identifier: GPL-3.0-only

//! Line-framed stdio transport for the method channel
//!
//! Requests are one JSON object per line:
//!
//! ```text
//! {"id":1,"method":"setFilter","arguments":{"filter":"vintage"}}
//! ```
//!
//! Every response starts with one JSON header line carrying the request id
//! and a `status` of `ok`, `error`, `not_implemented` or `bytes`. A `bytes`
//! header is followed by exactly `length` raw bytes and no newline.
//!
//! `takePicture` and `requestCameraPermission` run concurrently and may be
//! answered out of order. Every other call is handled in the order it was
//! read. Each response is written whole before the next one starts.

use super::{CameraChannel, MethodCall, MethodResult};
use crate::constants::methods;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io;
use std::sync::Arc;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// One request line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: u64,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

/// Response header line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseHeader {
    /// Id of the request; absent when the request line could not be parsed
    pub id: Option<u64>,
    #[serde(flatten)]
    pub body: ResponseBody,
}

/// Status-tagged body of a response header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResponseBody {
    Ok {
        result: Value,
    },
    Error {
        code: String,
        message: String,
        #[serde(default)]
        details: Option<String>,
    },
    NotImplemented,
    /// `length` raw bytes follow the header line
    Bytes {
        length: usize,
    },
}

/// Serialize a result as a complete response frame
pub fn encode_response(id: Option<u64>, result: MethodResult) -> serde_json::Result<Vec<u8>> {
    let (body, payload) = match result {
        MethodResult::Success(result) => (ResponseBody::Ok { result }, None),
        MethodResult::Bytes(bytes) => (ResponseBody::Bytes { length: bytes.len() }, Some(bytes)),
        MethodResult::Error {
            code,
            message,
            details,
        } => (
            ResponseBody::Error {
                code: code.as_str().to_string(),
                message,
                details,
            },
            None,
        ),
        MethodResult::NotImplemented => (ResponseBody::NotImplemented, None),
    };

    let mut frame = serde_json::to_vec(&ResponseHeader { id, body })?;
    frame.push(b'\n');
    if let Some(payload) = payload {
        frame.extend_from_slice(&payload);
    }
    Ok(frame)
}

/// Read one response frame, returning the header and any byte payload.
///
/// Returns `Ok(None)` at end of stream.
pub async fn read_response<R>(reader: &mut R) -> io::Result<Option<(ResponseHeader, Option<Vec<u8>>)>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    let header: ResponseHeader =
        serde_json::from_str(line.trim_end()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let payload = match header.body {
        ResponseBody::Bytes { length } => {
            let mut buffer = vec![0u8; length];
            reader.read_exact(&mut buffer).await?;
            Some(buffer)
        }
        _ => None,
    };
    Ok(Some((header, payload)))
}

/// Serve the channel until `reader` reaches end of stream.
///
/// Returns once every request read so far has been answered.
pub async fn serve<R, W>(channel: Arc<CameraChannel>, reader: R, writer: W) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    info!(channel = channel.name(), handler = channel.has_handler(), "Channel serving");

    let (frame_tx, mut frame_rx) = mpsc::unbounded_channel::<Vec<u8>>();
    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(frame) = frame_rx.recv().await {
            writer.write_all(&frame).await?;
            writer.flush().await?;
        }
        Ok::<_, io::Error>(())
    });

    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    let mut read_error = None;
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "Failed to read request");
                read_error = Some(e);
                break;
            }
        }

        let trimmed = line.trim_ascii();
        if trimmed.is_empty() {
            continue;
        }

        let request: Request = match serde_json::from_slice(trimmed) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Malformed request line");
                let result = MethodResult::Error {
                    code: crate::errors::ErrorCode::InvalidArgument,
                    message: "Malformed request".to_string(),
                    details: Some(e.to_string()),
                };
                send_frame(&frame_tx, None, result);
                continue;
            }
        };

        debug!(id = request.id, method = %request.method, "Request received");
        let call = MethodCall::new(request.method, request.arguments);
        if runs_detached(&call.method) {
            let channel = channel.clone();
            let frame_tx = frame_tx.clone();
            tokio::spawn(async move {
                let result = channel.handle(call).await;
                send_frame(&frame_tx, Some(request.id), result);
            });
        } else {
            // Answered before the next line is read, so calls apply in order
            let result = channel.handle(call).await;
            send_frame(&frame_tx, Some(request.id), result);
        }
    }

    info!("Input closed, waiting for pending responses");
    drop(frame_tx);
    writer_task
        .await
        .map_err(|e| io::Error::other(format!("Writer task error: {}", e)))??;

    match read_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Calls that wait on the camera or the user run as their own task
fn runs_detached(method: &str) -> bool {
    matches!(
        method,
        methods::TAKE_PICTURE | methods::REQUEST_CAMERA_PERMISSION
    )
}

fn send_frame(frame_tx: &mpsc::UnboundedSender<Vec<u8>>, id: Option<u64>, result: MethodResult) {
    match encode_response(id, result) {
        Ok(frame) => {
            if frame_tx.send(frame).is_err() {
                warn!(?id, "Response dropped, writer closed");
            }
        }
        Err(e) => warn!(?id, error = %e, "Failed to encode response"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use serde_json::json;

    #[test]
    fn test_header_wire_format() {
        let frame = encode_response(Some(7), MethodResult::Success(Value::Bool(true))).unwrap();
        let header: Value = serde_json::from_slice(&frame[..frame.len() - 1]).unwrap();
        assert_eq!(header, json!({"id": 7, "status": "ok", "result": true}));

        let frame = encode_response(Some(8), MethodResult::NotImplemented).unwrap();
        let header: Value = serde_json::from_slice(&frame[..frame.len() - 1]).unwrap();
        assert_eq!(header, json!({"id": 8, "status": "not_implemented"}));

        let frame = encode_response(
            Some(9),
            MethodResult::Error {
                code: ErrorCode::InvalidArgument,
                message: "Filter name required".to_string(),
                details: None,
            },
        )
        .unwrap();
        let header: Value = serde_json::from_slice(&frame[..frame.len() - 1]).unwrap();
        assert_eq!(header["code"], "INVALID_ARGUMENT");
        assert_eq!(header["status"], "error");
    }

    #[tokio::test]
    async fn test_bytes_payload_follows_header() {
        let frame = encode_response(Some(1), MethodResult::Bytes(vec![0xFF, 0xD8, b'\n', 0xD9])).unwrap();
        let mut reader = BufReader::new(&frame[..]);

        let (header, payload) = read_response(&mut reader).await.unwrap().unwrap();
        assert_eq!(header.id, Some(1));
        assert_eq!(header.body, ResponseBody::Bytes { length: 4 });
        assert_eq!(payload.unwrap(), vec![0xFF, 0xD8, b'\n', 0xD9]);
        assert!(read_response(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_line_gets_error_without_id() {
        let channel = Arc::new(CameraChannel::new(None));
        let (client, server) = tokio::io::duplex(4096);
        let (server_read, server_write) = tokio::io::split(server);
        let server = tokio::spawn(serve(channel, server_read, server_write));

        let (client_read, mut client_write) = tokio::io::split(client);
        client_write.write_all(b"not json\n").await.unwrap();
        client_write.shutdown().await.unwrap();

        let mut reader = BufReader::new(client_read);
        let (header, _) = read_response(&mut reader).await.unwrap().unwrap();
        assert_eq!(header.id, None);
        assert!(matches!(header.body, ResponseBody::Error { ref code, .. } if code == "INVALID_ARGUMENT"));

        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_does_not_stop_serving() {
        let channel = Arc::new(CameraChannel::new(None));
        let (client, server) = tokio::io::duplex(4096);
        let (server_read, server_write) = tokio::io::split(server);
        let server = tokio::spawn(serve(channel, server_read, server_write));

        let (client_read, mut client_write) = tokio::io::split(client);
        client_write.write_all(b"\xff\xfe\n").await.unwrap();
        client_write
            .write_all(b"{\"id\":2,\"method\":\"checkCameraPermission\"}\n")
            .await
            .unwrap();
        client_write.shutdown().await.unwrap();

        let mut reader = BufReader::new(client_read);
        let (header, _) = read_response(&mut reader).await.unwrap().unwrap();
        assert_eq!(header.id, None);
        assert!(matches!(header.body, ResponseBody::Error { ref code, .. } if code == "INVALID_ARGUMENT"));

        let (header, _) = read_response(&mut reader).await.unwrap().unwrap();
        assert_eq!(header.id, Some(2));
        assert!(read_response(&mut reader).await.unwrap().is_none());

        server.await.unwrap().unwrap();
    }

    #[test]
    fn test_only_camera_and_prompt_calls_run_detached() {
        assert!(runs_detached(methods::TAKE_PICTURE));
        assert!(runs_detached(methods::REQUEST_CAMERA_PERMISSION));
        assert!(!runs_detached(methods::SET_FILTER));
        assert!(!runs_detached(methods::CHECK_CAMERA_PERMISSION));
        assert!(!runs_detached("unknownMethod"));
    }
}
