/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

use std::cell::Cell;
use std::rc::Rc;

use log::warn;

use super::media_device_manager::MediaDeviceManager;
use crate::error::DeviceError;
use crate::platform;

/// [MediaDeviceAccess] is a utility to request the user's permission to access the microphone and
/// camera.
///
/// A successful request is reported to the [`MediaDeviceManager`] as a permission hint, so
/// the device lists pick up the now-visible labels.
pub struct MediaDeviceAccess {
    manager: MediaDeviceManager,
    granted: Rc<Cell<bool>>,

    // Callback that is called when the user grants access permission
    pub on_granted: Rc<dyn Fn()>,

    // Callback that is called when the user fails to grant access permission
    pub on_denied: Rc<dyn Fn(&DeviceError)>,
}

impl MediaDeviceAccess {
    /// After construction, optionally set the callbacks, then call [`request()`](Self::request).
    pub fn new(manager: MediaDeviceManager) -> Self {
        Self {
            manager,
            granted: Rc::new(Cell::new(false)),
            on_granted: Rc::new(|| {}),
            on_denied: Rc::new(|_| {}),
        }
    }

    /// Returns true if permission has been granted
    pub fn is_granted(&self) -> bool {
        self.granted.get()
    }

    pub fn set_on_granted(&mut self, callback: Rc<dyn Fn()>) {
        self.on_granted = callback;
    }

    pub fn set_on_denied(&mut self, callback: Rc<dyn Fn(&DeviceError)>) {
        self.on_denied = callback;
    }

    /// Causes the platform to request the user's permission to access the microphone and camera.
    ///
    /// This function returns immediately. Eventually, either the [`on_granted`](Self::on_granted)
    /// or [`on_denied`](Self::on_denied) callback will be called.
    ///
    /// # Panics
    ///
    /// On native targets, when not called from within a `tokio::task::LocalSet`.
    pub fn request(&self) {
        let request = self.request_permission();
        platform::spawn_local(async move {
            let _ = request.await;
        });
    }

    /// Like [`request()`](Self::request), but awaitable.
    ///
    /// # Panics
    ///
    /// On native targets, a granted request notifies the manager, which panics as described
    /// in [`MediaDeviceManager::notify_permission_granted`] outside a `tokio::task::LocalSet`.
    pub fn request_permission(&self) -> impl std::future::Future<Output = Result<(), DeviceError>> {
        let manager = self.manager.clone();
        let granted = Rc::clone(&self.granted);
        let on_granted = Rc::clone(&self.on_granted);
        let on_denied = Rc::clone(&self.on_denied);
        let request = manager.source().request_permission();
        async move {
            match request.await {
                Ok(()) => {
                    granted.set(true);
                    manager.notify_permission_granted();
                    on_granted();
                    Ok(())
                }
                Err(e) => {
                    warn!("media permission request failed: {e}");
                    on_denied(&e);
                    Err(e)
                }
            }
        }
    }
}
