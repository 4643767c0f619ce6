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

//! Device types shared by every part of the crate.
//!
//! [`RawDeviceInfo`] is what a [`DeviceSource`](crate::DeviceSource) hands us; it mirrors the
//! browser's `MediaDeviceInfo` field for field. It is converted into a validated
//! [`MediaDevice`] before the filter or the registry ever see it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CAMERA_ID_KEY, CAMERA_LABEL_KEY, MICROPHONE_ID_KEY, MICROPHONE_LABEL_KEY, SPEAKER_ID_KEY,
    SPEAKER_LABEL_KEY,
};
use crate::error::{DeviceError, ParseDeviceKindError};

/// The three device categories tracked by the manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Microphone,
    Speaker,
    Camera,
}

impl DeviceKind {
    pub const ALL: [DeviceKind; 3] = [DeviceKind::Microphone, DeviceKind::Speaker, DeviceKind::Camera];

    /// Human readable name, used in placeholder labels.
    pub fn display_name(&self) -> &'static str {
        match self {
            DeviceKind::Microphone => "Microphone",
            DeviceKind::Speaker => "Speaker",
            DeviceKind::Camera => "Camera",
        }
    }

    /// The `MediaDeviceInfo.kind` string for this category.
    pub fn media_kind(&self) -> &'static str {
        match self {
            DeviceKind::Microphone => "audioinput",
            DeviceKind::Speaker => "audiooutput",
            DeviceKind::Camera => "videoinput",
        }
    }

    /// Storage keys `(id_key, label_key)` of the persisted selection.
    pub fn storage_keys(&self) -> (&'static str, &'static str) {
        match self {
            DeviceKind::Microphone => (MICROPHONE_ID_KEY, MICROPHONE_LABEL_KEY),
            DeviceKind::Speaker => (SPEAKER_ID_KEY, SPEAKER_LABEL_KEY),
            DeviceKind::Camera => (CAMERA_ID_KEY, CAMERA_LABEL_KEY),
        }
    }

    /// Whether an access permission gates labels for this category.
    ///
    /// Speakers share the microphone permission, so only microphone and camera
    /// carry an authorization flag.
    pub fn needs_authorization(&self) -> bool {
        matches!(self, DeviceKind::Microphone | DeviceKind::Camera)
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Microphone => write!(f, "microphone"),
            DeviceKind::Speaker => write!(f, "speaker"),
            DeviceKind::Camera => write!(f, "camera"),
        }
    }
}

impl FromStr for DeviceKind {
    type Err = ParseDeviceKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "microphone" | "mic" | "audioinput" => Ok(DeviceKind::Microphone),
            "speaker" | "audiooutput" => Ok(DeviceKind::Speaker),
            "camera" | "videoinput" => Ok(DeviceKind::Camera),
            _ => Err(ParseDeviceKindError::UnknownKind(s.to_string())),
        }
    }
}

/// A device entry exactly as the platform reported it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDeviceInfo {
    pub kind: String,
    pub device_id: String,
    pub label: String,
    pub group_id: String,
}

impl RawDeviceInfo {
    pub fn new(kind: DeviceKind, device_id: &str, label: &str) -> Self {
        Self {
            kind: kind.media_kind().to_string(),
            device_id: device_id.to_string(),
            label: label.to_string(),
            group_id: String::new(),
        }
    }

    pub fn with_group_id(mut self, group_id: &str) -> Self {
        self.group_id = group_id.to_string();
        self
    }
}

/// A validated device, keyed by `(kind, device_id)` in the registry.
///
/// `device_id` is only stable while the device stays attached. `label` is empty until
/// access permission has been granted for the category, except inside the registry
/// where empty labels are replaced with a placeholder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDevice {
    pub kind: DeviceKind,
    pub device_id: String,
    pub label: String,
    pub group_id: String,
}

impl MediaDevice {
    pub fn new(kind: DeviceKind, device_id: &str, label: &str) -> Self {
        Self {
            kind,
            device_id: device_id.to_string(),
            label: label.to_string(),
            group_id: String::new(),
        }
    }
}

impl TryFrom<RawDeviceInfo> for MediaDevice {
    type Error = DeviceError;

    fn try_from(raw: RawDeviceInfo) -> Result<Self, Self::Error> {
        let Some(kind) = DeviceKind::ALL
            .into_iter()
            .find(|kind| kind.media_kind() == raw.kind)
        else {
            return Err(DeviceError::InvalidDevice(format!(
                "unknown device kind {:?} for device {:?}",
                raw.kind, raw.device_id
            )));
        };
        Ok(Self {
            kind,
            device_id: raw.device_id,
            label: raw.label,
            group_id: raw.group_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parses_aliases() {
        assert_eq!("Microphone".parse::<DeviceKind>().unwrap(), DeviceKind::Microphone);
        assert_eq!("mic".parse::<DeviceKind>().unwrap(), DeviceKind::Microphone);
        assert_eq!("audiooutput".parse::<DeviceKind>().unwrap(), DeviceKind::Speaker);
        assert_eq!(" camera ".parse::<DeviceKind>().unwrap(), DeviceKind::Camera);
        assert!("screen".parse::<DeviceKind>().is_err());
    }

    #[test]
    fn test_raw_device_deserializes_browser_shape() {
        let json = r#"{"kind":"videoinput","deviceId":"cam-1","label":"FaceTime HD","groupId":"g1"}"#;
        let raw: RawDeviceInfo = serde_json::from_str(json).unwrap();
        let device = MediaDevice::try_from(raw).unwrap();
        assert_eq!(device.kind, DeviceKind::Camera);
        assert_eq!(device.device_id, "cam-1");
        assert_eq!(device.label, "FaceTime HD");
        assert_eq!(device.group_id, "g1");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let raw: RawDeviceInfo = serde_json::from_str(r#"{"kind":"audioinput"}"#).unwrap();
        let device = MediaDevice::try_from(raw).unwrap();
        assert_eq!(device.device_id, "");
        assert_eq!(device.label, "");
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let raw = RawDeviceInfo {
            kind: "screen".to_string(),
            device_id: "x".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            MediaDevice::try_from(raw),
            Err(DeviceError::InvalidDevice(_))
        ));
    }
}
