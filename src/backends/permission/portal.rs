// SPDX-License-Identifier: GPL-3.0-only

//! XDG desktop portal camera access
//!
//! Talks to `org.freedesktop.portal.Camera` on the session bus, which shows
//! the consent dialog in sandboxed and portal-aware desktops.

use futures::StreamExt;
use std::collections::HashMap;
use tracing::{debug, info};
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

const PORTAL_DESTINATION: &str = "org.freedesktop.portal.Desktop";
const PORTAL_PATH: &str = "/org/freedesktop/portal/desktop";
const CAMERA_INTERFACE: &str = "org.freedesktop.portal.Camera";
const REQUEST_INTERFACE: &str = "org.freedesktop.portal.Request";

/// Portal response code for a granted request
const RESPONSE_SUCCESS: u32 = 0;

/// Request path the portal will use for `token` on this connection
fn request_path(unique_name: &str, token: &str) -> String {
    let sender = unique_name.trim_start_matches(':').replace('.', "_");
    format!("{}/request/{}/{}", PORTAL_PATH, sender, token)
}

/// Ask the portal for camera access and wait for the user's answer
///
/// # Returns
/// * `Ok(true)` - Access granted
/// * `Ok(false)` - Access refused, or no camera present
/// * `Err(String)` - The portal could not be reached
pub async fn access_camera() -> Result<bool, String> {
    let connection = zbus::Connection::session()
        .await
        .map_err(|e| format!("Failed to connect to session D-Bus: {}", e))?;

    let camera = zbus::Proxy::new(&connection, PORTAL_DESTINATION, PORTAL_PATH, CAMERA_INTERFACE)
        .await
        .map_err(|e| format!("Failed to create camera portal proxy: {}", e))?;

    let present: bool = camera
        .get_property("IsCameraPresent")
        .await
        .map_err(|e| format!("Camera portal unavailable: {}", e))?;
    if !present {
        info!("Portal reports no camera present");
        return Ok(false);
    }

    let unique_name = connection
        .unique_name()
        .map(|name| name.as_str().to_string())
        .ok_or_else(|| "Session bus connection has no unique name".to_string())?;
    let token = format!("photobooth_{}", uuid::Uuid::new_v4().simple());
    let path = request_path(&unique_name, &token);

    // Subscribe before calling so the response cannot be missed
    let request = zbus::Proxy::new(&connection, PORTAL_DESTINATION, path.as_str(), REQUEST_INTERFACE)
        .await
        .map_err(|e| format!("Failed to create request proxy: {}", e))?;
    let mut responses = request
        .receive_signal("Response")
        .await
        .map_err(|e| format!("Failed to subscribe to portal response: {}", e))?;

    let mut options: HashMap<&str, Value> = HashMap::new();
    options.insert("handle_token", Value::new(token.as_str()));

    debug!(request = %path, "Requesting camera access from portal");
    let _handle: OwnedObjectPath = camera
        .call("AccessCamera", &(options,))
        .await
        .map_err(|e| format!("AccessCamera failed: {}", e))?;

    let message = responses
        .next()
        .await
        .ok_or_else(|| "Portal closed the request without answering".to_string())?;
    let (response, _results): (u32, HashMap<String, OwnedValue>) = message
        .body()
        .deserialize()
        .map_err(|e| format!("Malformed portal response: {}", e))?;

    let granted = response == RESPONSE_SUCCESS;
    info!(granted, response, "Portal camera access answered");
    Ok(granted)
}
