// SPDX-License-Identifier: GPL-3.0-only

//! Permission based on device-node access, with portal consent as fallback

use super::{PermissionProvider, PermissionStatus, portal};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::ffi::CString;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Camera permission for the local user.
///
/// Access is authorized when the process can read and write the capture
/// node, or after the desktop portal granted it during this run.
pub struct DevicePermission {
    configured_device: Option<String>,
    decision: Mutex<Option<bool>>,
}

impl DevicePermission {
    pub fn new(configured_device: Option<String>) -> Self {
        Self {
            configured_device,
            decision: Mutex::new(None),
        }
    }

    /// The node whose access decides the permission
    fn device_node(&self) -> Option<PathBuf> {
        match &self.configured_device {
            Some(path) => Some(PathBuf::from(path)),
            None => first_video_node(Path::new("/dev")),
        }
    }

    fn decision(&self) -> Option<bool> {
        *self.decision.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, granted: bool) {
        *self.decision.lock().unwrap_or_else(PoisonError::into_inner) = Some(granted);
    }
}

impl PermissionProvider for DevicePermission {
    fn status(&self) -> PermissionStatus {
        match self.decision() {
            Some(true) => return PermissionStatus::Authorized,
            Some(false) => return PermissionStatus::Denied,
            None => {}
        }

        let status = match self.device_node() {
            Some(node) if has_read_write_access(&node) => PermissionStatus::Authorized,
            _ => PermissionStatus::NotDetermined,
        };
        debug!(status = ?status, "Camera permission status");
        status
    }

    fn request(&self) -> BoxFuture<'_, bool> {
        async move {
            info!("Requesting camera permission");
            match self.status() {
                PermissionStatus::Authorized => return true,
                PermissionStatus::Denied => return false,
                PermissionStatus::NotDetermined => {}
            }

            match portal::access_camera().await {
                Ok(granted) => {
                    self.record(granted);
                    info!(granted, "Portal decision recorded");
                    granted
                }
                Err(e) => {
                    warn!(error = %e, "Camera portal unavailable, treating as denied");
                    false
                }
            }
        }
        .boxed()
    }
}

/// `access(2)` check; opens nothing
fn has_read_write_access(path: &Path) -> bool {
    let Ok(c_path) = CString::new(path.as_os_str().to_string_lossy().as_bytes()) else {
        return false;
    };
    unsafe { libc::access(c_path.as_ptr(), libc::R_OK | libc::W_OK) == 0 }
}

/// Lowest-numbered `videoN` entry under `dev_dir`
fn first_video_node(dev_dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dev_dir).ok()?;
    entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name();
            let index = name.to_str()?.strip_prefix("video")?.parse::<u32>().ok()?;
            Some((index, entry.path()))
        })
        .min_by_key(|(index, _)| *index)
        .map(|(_, path)| path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_video_node_picks_lowest_index() {
        let dir = std::env::temp_dir().join(format!("photobooth-dev-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for name in ["video10", "video2", "video-meta", "media0"] {
            std::fs::write(dir.join(name), b"").unwrap();
        }

        assert_eq!(first_video_node(&dir), Some(dir.join("video2")));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_device_is_not_determined() {
        let permission = DevicePermission::new(Some("/nonexistent/video0".to_string()));
        assert_eq!(permission.status(), PermissionStatus::NotDetermined);
        // Repeated checks do not change anything
        assert_eq!(permission.status(), PermissionStatus::NotDetermined);
    }

    #[test]
    fn test_recorded_decision_wins() {
        let permission = DevicePermission::new(Some("/nonexistent/video0".to_string()));
        permission.record(false);
        assert_eq!(permission.status(), PermissionStatus::Denied);
        permission.record(true);
        assert_eq!(permission.status(), PermissionStatus::Authorized);
    }
}
