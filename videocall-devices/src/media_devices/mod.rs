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

mod device_filter;
mod device_registry;
mod media_device_access;
mod media_device_manager;
mod selection_store;

pub use device_filter::is_valid_device;
pub use device_registry::{Authorization, DeviceList, DeviceRegistry};
pub use media_device_access::MediaDeviceAccess;
pub use media_device_manager::{
    reconcile_active, ActiveSelection, DeviceSnapshot, MediaDeviceManager,
};
pub use selection_store::{SelectionStore, StoredSelection};
