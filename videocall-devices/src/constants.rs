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

/// Id of the synthetic entry meaning "whatever the platform currently uses".
pub const DEFAULT_DEVICE_ID: &str = "default";

/// Label of the synthetic default entry unless overridden in the options.
pub const DEFAULT_DEVICE_LABEL: &str = "Same as System";

/// Platform aggregate id for the "communications" audio endpoint (Windows).
pub const COMMUNICATIONS_DEVICE_ID: &str = "communications";

/// Prefix of the placeholder label given to devices reported without a label.
pub const UNRECOGNIZED_LABEL_PREFIX: &str = "Unrecognized";

pub const MICROPHONE_ID_KEY: &str = "videocall.devices.microphone.id";
pub const MICROPHONE_LABEL_KEY: &str = "videocall.devices.microphone.label";
pub const SPEAKER_ID_KEY: &str = "videocall.devices.speaker.id";
pub const SPEAKER_LABEL_KEY: &str = "videocall.devices.speaker.label";
pub const CAMERA_ID_KEY: &str = "videocall.devices.camera.id";
pub const CAMERA_LABEL_KEY: &str = "videocall.devices.camera.label";

/// Capacity of the async mirror of the notification bus
pub const EVENT_BUS_CAPACITY: usize = 256;
