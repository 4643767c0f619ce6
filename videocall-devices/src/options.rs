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

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_DEVICE_LABEL;

/// Options for [`MediaDeviceManager`](crate::MediaDeviceManager).
///
/// Every field has a default, so a partial JSON document is a valid configuration:
///
/// ```
/// # use videocall_devices::DeviceManagerOptions;
/// let options: DeviceManagerOptions =
///     serde_json::from_str(r#"{ "match_stored_label": true }"#).unwrap();
/// assert!(options.match_stored_label);
/// assert_eq!(options.default_device_label, "Same as System");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceManagerOptions {
    /// `true` to make a manual selection of an unknown device an error instead of a
    /// logged no-op. Defaults to on in debug builds.
    pub strict_selection: bool,

    /// `true` to ask the device source to request access permission while enumerating
    pub request_permission: bool,

    /// `true` to fall back to a device with the stored label when the stored id is gone
    /// (some platforms reassign ids across browser restarts)
    pub match_stored_label: bool,

    /// Label of the synthetic "default" entry, supplied by the localization layer
    pub default_device_label: String,
}

impl Default for DeviceManagerOptions {
    fn default() -> Self {
        Self {
            strict_selection: cfg!(debug_assertions),
            request_permission: false,
            match_stored_label: false,
            default_device_label: DEFAULT_DEVICE_LABEL.to_string(),
        }
    }
}
