// SPDX-License-Identifier: GPL-3.0-only

//! Camera permission providers
//!
//! - [`device`]: device-node access check, consent through the desktop portal
//! - [`fake`]: scripted provider for tests

pub mod device;
pub mod fake;
pub mod portal;

pub use device::DevicePermission;
pub use fake::FakePermission;

use futures::future::BoxFuture;

/// Current authorization for camera access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionStatus {
    /// The user has not been asked yet
    #[default]
    NotDetermined,
    /// Camera access is allowed
    Authorized,
    /// Camera access was refused
    Denied,
}

impl PermissionStatus {
    pub fn is_authorized(&self) -> bool {
        *self == PermissionStatus::Authorized
    }
}

/// Source of truth for camera permission
pub trait PermissionProvider: Send + Sync {
    /// Read the current authorization. Must not prompt or change state.
    fn status(&self) -> PermissionStatus;

    /// Ask for access if the user has not decided yet.
    ///
    /// Resolves once with the outcome. When a decision already exists it is
    /// returned without prompting again.
    fn request(&self) -> BoxFuture<'_, bool>;
}
