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

//! Framework-agnostic event types for the device manager.
//!
//! These events are emitted via the [`EventBus`](crate::EventBus) and can be subscribed to by
//! any frontend framework (Yew, Dioxus, Leptos, React via wasm-bindgen, etc.)

use crate::device::DeviceKind;
use crate::media_devices::DeviceSnapshot;

/// Events emitted by the [`MediaDeviceManager`](crate::MediaDeviceManager).
#[derive(Clone, Debug)]
pub enum DeviceEvent {
    /// The first enumeration cycle completed
    InitSucceeded(DeviceSnapshot),

    /// The first enumeration cycle failed; the manager is still usable
    InitFailed(String),

    /// The device topology (or the labels, after a permission grant) changed
    DevicesChanged(DeviceSnapshot),

    /// Access permission may have just been granted
    PermissionHint,

    /// The user picked a device explicitly
    ManuallySelected { kind: DeviceKind, device_id: String },
}

/// Discriminant of [`DeviceEvent`], used to subscribe to a single event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceEventKind {
    InitSucceeded,
    InitFailed,
    DevicesChanged,
    PermissionHint,
    ManuallySelected,
}

impl DeviceEvent {
    pub fn kind(&self) -> DeviceEventKind {
        match self {
            DeviceEvent::InitSucceeded(_) => DeviceEventKind::InitSucceeded,
            DeviceEvent::InitFailed(_) => DeviceEventKind::InitFailed,
            DeviceEvent::DevicesChanged(_) => DeviceEventKind::DevicesChanged,
            DeviceEvent::PermissionHint => DeviceEventKind::PermissionHint,
            DeviceEvent::ManuallySelected { .. } => DeviceEventKind::ManuallySelected,
        }
    }

    /// The snapshot carried by the event, if any.
    pub fn snapshot(&self) -> Option<&DeviceSnapshot> {
        match self {
            DeviceEvent::InitSucceeded(snapshot) | DeviceEvent::DevicesChanged(snapshot) => {
                Some(snapshot)
            }
            _ => None,
        }
    }
}
