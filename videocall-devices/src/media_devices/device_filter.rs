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

//! Decides which raw devices are shown to the rest of the client.
//!
//! Conferencing apps and audio drivers inject virtual loopback devices that would
//! capture the call's own output, and Windows exposes a "communications" aggregate
//! next to the real endpoints. None of those should ever be selectable.

use crate::constants::COMMUNICATIONS_DEVICE_ID;
use crate::device::DeviceKind;

/// Label fragments (lowercase) of virtual microphones.
const MICROPHONE_LABEL_DENYLIST: &[&str] = &[
    "zoomaudiodevice",
    "zoom audio device",
    "microsoft teams audio",
    "cubebaggregatedevice",
    "vpauaggregateaudiodevice",
    "aggregate device",
    "soundflower",
    "blackhole",
];

/// Label fragments (lowercase) of virtual speakers.
const SPEAKER_LABEL_DENYLIST: &[&str] = &[
    "zoomaudiodevice",
    "zoom audio device",
    "microsoft teams audio",
    "cubebaggregatedevice",
    "vpauaggregateaudiodevice",
];

/// Returns `true` if the device may be listed and selected.
pub fn is_valid_device(kind: DeviceKind, device_id: &str, label: &str) -> bool {
    if device_id.is_empty() {
        return false;
    }
    let denylist = match kind {
        DeviceKind::Camera => return true,
        DeviceKind::Microphone => MICROPHONE_LABEL_DENYLIST,
        DeviceKind::Speaker => SPEAKER_LABEL_DENYLIST,
    };
    if device_id == COMMUNICATIONS_DEVICE_ID {
        return false;
    }
    let label = label.to_lowercase();
    !denylist.iter().any(|pattern| label.contains(pattern))
}
