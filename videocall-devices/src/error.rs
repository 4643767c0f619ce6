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

//! Error types for device enumeration, selection and persistence.

use thiserror::Error;

use crate::device::DeviceKind;

/// Errors surfaced by the device manager and its collaborators.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The device source failed or is unavailable.
    #[error("Device enumeration failed: {0}")]
    Enumeration(String),

    /// The user (or platform) refused access to the devices.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A manual selection named a device that is not in the registry.
    #[error("No {kind} with id {device_id:?} in the current device list")]
    SelectionRejected { kind: DeviceKind, device_id: String },

    /// Reading or writing the persisted selection failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The initial enumeration cycle failed.
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// A raw device could not be turned into a [`MediaDevice`](crate::MediaDevice).
    #[error("Invalid device: {0}")]
    InvalidDevice(String),
}

/// Errors returned by [`KeyValueStorage`](crate::KeyValueStorage) backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseDeviceKindError {
    #[error("Unknown device kind: {0}")]
    UnknownKind(String),
}
