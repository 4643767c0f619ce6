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

use std::rc::Rc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::device_registry::DeviceRegistry;
use crate::device::DeviceKind;
use crate::error::DeviceError;
use crate::storage::KeyValueStorage;

/// The user's last explicit choice for one category.
///
/// The label is kept next to the id so a later session can still recognise the device
/// if the platform handed out a new id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSelection {
    pub device_id: String,
    pub label: String,
}

/// Persists manual device choices under fixed per-category keys.
#[derive(Clone)]
pub struct SelectionStore {
    storage: Rc<dyn KeyValueStorage>,
    strict: bool,
}

impl SelectionStore {
    /// `strict` turns rejected selections into errors instead of logged no-ops.
    pub fn new(storage: Rc<dyn KeyValueStorage>, strict: bool) -> Self {
        Self { storage, strict }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// The persisted choice for `kind`, or `None` if it was never made or is incomplete.
    ///
    /// Storage failures are logged and read as "no prior selection".
    pub fn get(&self, kind: DeviceKind) -> Option<StoredSelection> {
        let (id_key, label_key) = kind.storage_keys();
        let read = |key: &str| match self.storage.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("failed to read {key}: {e}");
                None
            }
        };
        let device_id = read(id_key).filter(|id| !id.is_empty())?;
        let label = read(label_key)?;
        Some(StoredSelection { device_id, label })
    }

    /// Persist `device_id` (and its current label) as the choice for `kind`.
    ///
    /// Returns `Ok(true)` when written. A device missing from `registry`, or a failing
    /// write, is an error in strict mode and `Ok(false)` otherwise.
    pub fn set(
        &self,
        kind: DeviceKind,
        device_id: &str,
        registry: &DeviceRegistry,
    ) -> Result<bool, DeviceError> {
        let Some(device) = registry.get(kind, device_id) else {
            let error = DeviceError::SelectionRejected {
                kind,
                device_id: device_id.to_string(),
            };
            if self.strict {
                return Err(error);
            }
            warn!("{error}; selection not persisted");
            return Ok(false);
        };

        let (id_key, label_key) = kind.storage_keys();
        let written = self
            .storage
            .set_item(id_key, &device.device_id)
            .and_then(|_| self.storage.set_item(label_key, &device.label));
        match written {
            Ok(()) => {
                debug!("persisted {kind} selection {device_id:?}");
                Ok(true)
            }
            Err(e) if self.strict => Err(e.into()),
            Err(e) => {
                warn!("failed to persist {kind} selection: {e}");
                Ok(false)
            }
        }
    }

    /// Forget the persisted choice for `kind`.
    pub fn clear(&self, kind: DeviceKind) -> Result<(), DeviceError> {
        let (id_key, label_key) = kind.storage_keys();
        self.storage.remove_item(id_key)?;
        self.storage.remove_item(label_key)?;
        Ok(())
    }
}
