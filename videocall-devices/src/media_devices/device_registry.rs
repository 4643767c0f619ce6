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

//! Snapshot of the devices known after one enumeration.
//!
//! A registry is never patched: every enumeration builds a fresh one with
//! [`DeviceRegistry::build`], so entries of detached devices cannot linger.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use super::device_filter::is_valid_device;
use crate::constants::{DEFAULT_DEVICE_ID, UNRECOGNIZED_LABEL_PREFIX};
use crate::device::{DeviceKind, MediaDevice};

/// Ordered devices of one category.
///
/// Every id in the order has an entry in the map, and `"default"` appears exactly once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceList {
    ids: Vec<String>,
    devices: HashMap<String, MediaDevice>,
}

impl DeviceList {
    /// Ids in enumeration order, synthetic default first when it was synthesized.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn get(&self, device_id: &str) -> Option<&MediaDevice> {
        self.devices.get(device_id)
    }

    pub fn contains(&self, device_id: &str) -> bool {
        self.devices.contains_key(device_id)
    }

    pub fn first_id(&self) -> Option<&str> {
        self.ids.first().map(String::as_str)
    }

    /// First device (in order) carrying exactly `label`.
    pub fn find_by_label(&self, label: &str) -> Option<&MediaDevice> {
        self.iter().find(|device| device.label == label)
    }

    /// Devices in order.
    pub fn iter(&self) -> impl Iterator<Item = &MediaDevice> {
        self.ids.iter().filter_map(|id| self.devices.get(id))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn push(&mut self, device: MediaDevice) {
        self.ids.push(device.device_id.clone());
        self.devices.insert(device.device_id.clone(), device);
    }

    fn push_front(&mut self, device: MediaDevice) {
        self.ids.insert(0, device.device_id.clone());
        self.devices.insert(device.device_id.clone(), device);
    }
}

/// Which permission-gated categories have shown a labeled device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    pub microphone: bool,
    pub camera: bool,
}

impl Authorization {
    pub fn all_granted(&self) -> bool {
        self.microphone && self.camera
    }

    /// Flags that are set in either `self` or `other`.
    pub fn merge(self, other: Authorization) -> Authorization {
        Authorization {
            microphone: self.microphone || other.microphone,
            camera: self.camera || other.camera,
        }
    }

    fn mark(&mut self, kind: DeviceKind) {
        match kind {
            DeviceKind::Microphone => self.microphone = true,
            DeviceKind::Camera => self.camera = true,
            DeviceKind::Speaker => {}
        }
    }
}

/// The devices of every category after one enumeration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRegistry {
    pub microphones: DeviceList,
    pub speakers: DeviceList,
    pub cameras: DeviceList,
}

impl DeviceRegistry {
    pub fn list(&self, kind: DeviceKind) -> &DeviceList {
        match kind {
            DeviceKind::Microphone => &self.microphones,
            DeviceKind::Speaker => &self.speakers,
            DeviceKind::Camera => &self.cameras,
        }
    }

    fn list_mut(&mut self, kind: DeviceKind) -> &mut DeviceList {
        match kind {
            DeviceKind::Microphone => &mut self.microphones,
            DeviceKind::Speaker => &mut self.speakers,
            DeviceKind::Camera => &mut self.cameras,
        }
    }

    pub fn get(&self, kind: DeviceKind, device_id: &str) -> Option<&MediaDevice> {
        self.list(kind).get(device_id)
    }

    /// Build a registry from an enumeration.
    ///
    /// Rejected and duplicate entries are dropped, unlabeled devices get an
    /// "Unrecognized {Category}{n}" placeholder, and every category without a native
    /// `"default"` gets a synthetic one labeled `default_label` at its head.
    pub fn build(raw_devices: &[MediaDevice], default_label: &str) -> (Self, Authorization) {
        let mut registry = Self::default();
        let mut authorization = Authorization::default();
        let mut unlabeled = HashMap::<DeviceKind, usize>::new();

        for raw in raw_devices {
            if !is_valid_device(raw.kind, &raw.device_id, &raw.label) {
                debug!("filtered out {} {:?} ({:?})", raw.kind, raw.device_id, raw.label);
                continue;
            }
            if registry.list(raw.kind).contains(&raw.device_id) {
                debug!("duplicate {} {:?} ignored", raw.kind, raw.device_id);
                continue;
            }

            let mut device = raw.clone();
            if device.label.is_empty() {
                let n = unlabeled.entry(device.kind).or_insert(0);
                *n += 1;
                device.label = format!(
                    "{UNRECOGNIZED_LABEL_PREFIX} {}{}",
                    device.kind.display_name(),
                    n
                );
            } else if device.kind.needs_authorization() {
                authorization.mark(device.kind);
            }
            registry.list_mut(device.kind).push(device);
        }

        for kind in DeviceKind::ALL {
            let list = registry.list_mut(kind);
            if !list.contains(DEFAULT_DEVICE_ID) {
                list.push_front(MediaDevice::new(kind, DEFAULT_DEVICE_ID, default_label));
            }
        }

        (registry, authorization)
    }
}
