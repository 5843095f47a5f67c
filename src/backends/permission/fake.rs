// SPDX-License-Identifier: GPL-3.0-only

//! Scripted permission provider

use super::{PermissionProvider, PermissionStatus};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Permission provider with a fixed answer for the consent prompt
pub struct FakePermission {
    status: Mutex<PermissionStatus>,
    grant_on_prompt: bool,
    prompts: AtomicUsize,
    checks: AtomicUsize,
}

impl FakePermission {
    /// Starts undecided; the prompt answers `grant_on_prompt`
    pub fn new(grant_on_prompt: bool) -> Self {
        Self {
            status: Mutex::new(PermissionStatus::NotDetermined),
            grant_on_prompt,
            prompts: AtomicUsize::new(0),
            checks: AtomicUsize::new(0),
        }
    }

    pub fn authorized() -> Self {
        let permission = Self::new(true);
        permission.set_status(PermissionStatus::Authorized);
        permission
    }

    pub fn denied() -> Self {
        let permission = Self::new(false);
        permission.set_status(PermissionStatus::Denied);
        permission
    }

    pub fn set_status(&self, status: PermissionStatus) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }

    /// Number of times the consent prompt was shown
    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    /// Number of status reads
    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

impl PermissionProvider for FakePermission {
    fn status(&self) -> PermissionStatus {
        self.checks.fetch_add(1, Ordering::SeqCst);
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn request(&self) -> BoxFuture<'_, bool> {
        async move {
            let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
            if *status == PermissionStatus::NotDetermined {
                self.prompts.fetch_add(1, Ordering::SeqCst);
                *status = if self.grant_on_prompt {
                    PermissionStatus::Authorized
                } else {
                    PermissionStatus::Denied
                };
            }
            status.is_authorized()
        }
        .boxed()
    }
}
