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

//! Where raw device lists come from.
//!
//! The manager only talks to a [`DeviceSource`]; the browser implementation lives in
//! `BrowserDeviceSource` (wasm32), and [`StaticDeviceSource`] serves scripted lists to
//! tests and native tools.

#[cfg(target_arch = "wasm32")]
mod browser;

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserDeviceSource;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::{self, LocalBoxFuture};

use crate::device::RawDeviceInfo;
use crate::error::DeviceError;

/// Callback invoked by a source when its device list may have changed.
pub type DeviceChangeHandler = Rc<dyn Fn()>;

/// External collaborator that lists devices and reports topology changes.
pub trait DeviceSource {
    /// List the devices currently attached, optionally prompting for access first.
    fn enumerate_devices(
        &self,
        request_permission: bool,
    ) -> LocalBoxFuture<'static, Result<Vec<RawDeviceInfo>, DeviceError>>;

    /// Install the handler to call whenever the platform reports a device change.
    /// Replaces any previously installed handler.
    fn set_device_change_handler(&self, handler: DeviceChangeHandler);

    /// Ask the platform for access to microphone and camera.
    fn request_permission(&self) -> LocalBoxFuture<'static, Result<(), DeviceError>> {
        let enumeration = self.enumerate_devices(true);
        Box::pin(async move { enumeration.await.map(|_| ()) })
    }
}

#[derive(Default)]
struct StaticSourceState {
    devices: RefCell<Vec<RawDeviceInfo>>,
    failure: RefCell<Option<String>>,
    permission_denied: RefCell<Option<String>>,
    handler: RefCell<Option<DeviceChangeHandler>>,
    held: RefCell<VecDeque<oneshot::Receiver<Vec<RawDeviceInfo>>>>,
    permission_gate: Cell<bool>,
    permission_granted: Cell<bool>,
    enumerations: Cell<usize>,
}

/// A scriptable in-memory [`DeviceSource`].
///
/// With [`with_permission_gate`](Self::with_permission_gate) it behaves like a browser
/// before access is granted: labels are reported empty until a permission request
/// succeeds.
#[derive(Clone, Default)]
pub struct StaticDeviceSource {
    state: Rc<StaticSourceState>,
}

impl StaticDeviceSource {
    pub fn new(devices: Vec<RawDeviceInfo>) -> Self {
        let source = Self::default();
        *source.state.devices.borrow_mut() = devices;
        source
    }

    /// Blank every label until permission is requested or [`grant_permission`](Self::grant_permission) is called.
    pub fn with_permission_gate(self) -> Self {
        self.state.permission_gate.set(true);
        self
    }

    pub fn set_devices(&self, devices: Vec<RawDeviceInfo>) {
        *self.state.devices.borrow_mut() = devices;
    }

    pub fn devices(&self) -> Vec<RawDeviceInfo> {
        self.state.devices.borrow().clone()
    }

    /// Replace the device list and notify the change handler, like a hot-plug would.
    pub fn simulate_device_change(&self, devices: Vec<RawDeviceInfo>) {
        self.set_devices(devices);
        self.notify_device_change();
    }

    /// Fire the change handler without touching the device list.
    pub fn notify_device_change(&self) {
        let handler = self.state.handler.borrow().clone();
        if let Some(handler) = handler {
            handler();
        }
    }

    /// Make every following enumeration fail with `message`.
    pub fn fail_with(&self, message: &str) {
        *self.state.failure.borrow_mut() = Some(message.to_string());
    }

    pub fn clear_failure(&self) {
        *self.state.failure.borrow_mut() = None;
    }

    /// Make every following permission request fail with `message`.
    pub fn deny_permission(&self, message: &str) {
        *self.state.permission_denied.borrow_mut() = Some(message.to_string());
    }

    pub fn grant_permission(&self) {
        *self.state.permission_denied.borrow_mut() = None;
        self.state.permission_granted.set(true);
    }

    pub fn is_permission_granted(&self) -> bool {
        self.state.permission_granted.get()
    }

    /// Keep the next enumeration pending until a device list is sent on the returned
    /// channel; that list is what the enumeration reports. Dropping the sender fails it.
    ///
    /// Held enumerations are served in the order they were requested, which lets tests
    /// resolve overlapping cycles in any order.
    pub fn hold_next_enumeration(&self) -> oneshot::Sender<Vec<RawDeviceInfo>> {
        let (sender, receiver) = oneshot::channel();
        self.state.held.borrow_mut().push_back(receiver);
        sender
    }

    /// Number of enumerations served so far.
    pub fn enumeration_count(&self) -> usize {
        self.state.enumerations.get()
    }

    pub fn has_device_change_handler(&self) -> bool {
        self.state.handler.borrow().is_some()
    }

    fn try_grant(&self) -> Result<(), DeviceError> {
        if let Some(reason) = self.state.permission_denied.borrow().clone() {
            return Err(DeviceError::PermissionDenied(reason));
        }
        self.state.permission_granted.set(true);
        Ok(())
    }

    fn list(&self, request_permission: bool) -> Result<Vec<RawDeviceInfo>, DeviceError> {
        self.state.enumerations.set(self.state.enumerations.get() + 1);
        if let Some(message) = self.state.failure.borrow().clone() {
            return Err(DeviceError::Enumeration(message));
        }
        if request_permission {
            self.try_grant()?;
        }
        let hide_labels = self.state.permission_gate.get() && !self.state.permission_granted.get();
        let devices = self
            .state
            .devices
            .borrow()
            .iter()
            .cloned()
            .map(|mut device| {
                if hide_labels {
                    device.label.clear();
                }
                device
            })
            .collect();
        Ok(devices)
    }
}

impl DeviceSource for StaticDeviceSource {
    fn enumerate_devices(
        &self,
        request_permission: bool,
    ) -> LocalBoxFuture<'static, Result<Vec<RawDeviceInfo>, DeviceError>> {
        let held = self.state.held.borrow_mut().pop_front();
        match held {
            Some(receiver) => {
                self.state.enumerations.set(self.state.enumerations.get() + 1);
                Box::pin(async move {
                    receiver
                        .await
                        .map_err(|_| DeviceError::Enumeration("held enumeration dropped".to_string()))
                })
            }
            None => Box::pin(future::ready(self.list(request_permission))),
        }
    }

    fn set_device_change_handler(&self, handler: DeviceChangeHandler) {
        *self.state.handler.borrow_mut() = Some(handler);
    }

    fn request_permission(&self) -> LocalBoxFuture<'static, Result<(), DeviceError>> {
        Box::pin(future::ready(self.try_grant()))
    }
}
