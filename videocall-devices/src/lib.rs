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

//! This crate keeps a videocall client's view of the user's microphones, speakers and
//! cameras consistent with what the platform reports, and decides which device of each
//! kind is active.
//!
//! It intends to make no assumptions about the UI: pickers render
//! [`MediaDeviceManager::snapshot()`] and react to [`DeviceEvent`]s, and the app forwards
//! the active ids to its encoders.
//!
//! Each enumeration rebuilds the device lists from scratch:
//!
//! 1. virtual and aggregate devices are dropped ([`is_valid_device`]),
//! 2. unlabeled devices get a placeholder label and a synthetic `"default"` entry is added
//!    where the platform reported none ([`DeviceRegistry`]),
//! 3. the active device of each kind is chosen: the user's stored choice if present, else
//!    the previously active device if still attached, else the first entry
//!    ([`reconcile_active`]).
//!
//! # Outline of usage
//!
//! ```no_run
//! # use std::rc::Rc;
//! # use videocall_devices::*;
//! # async fn run(source: Rc<dyn DeviceSource>) {
//! let storage = Rc::new(MemoryStorage::new());
//! let manager = MediaDeviceManager::new(source, storage, DeviceManagerOptions::default());
//! manager.init().await;
//!
//! let mut access = MediaDeviceAccess::new(manager.clone());
//! access.set_on_granted(Rc::new(|| log::info!("access granted")));
//! access.request();
//!
//! let snapshot = manager.watch_init_complete().await.unwrap();
//! manager.manually_select_camera(snapshot.cameras.ids()[0].as_str()).ok();
//! # }
//! ```
//!
//! In the browser, use `BrowserDeviceSource` and `LocalStorage` (wasm32 only).

pub mod constants;
mod device;
mod error;
mod event_bus;
mod events;
mod media_devices;
mod options;
pub mod platform;
mod source;
mod storage;

pub use device::{DeviceKind, MediaDevice, RawDeviceInfo};
pub use error::{DeviceError, ParseDeviceKindError, StorageError};
pub use event_bus::{EventBus, Subscription};
pub use events::{DeviceEvent, DeviceEventKind};
pub use media_devices::{
    is_valid_device, reconcile_active, ActiveSelection, Authorization, DeviceList,
    DeviceRegistry, DeviceSnapshot, MediaDeviceAccess, MediaDeviceManager, SelectionStore,
    StoredSelection,
};
pub use options::DeviceManagerOptions;
#[cfg(target_arch = "wasm32")]
pub use source::BrowserDeviceSource;
pub use source::{DeviceChangeHandler, DeviceSource, StaticDeviceSource};
#[cfg(not(target_arch = "wasm32"))]
pub use storage::JsonFileStorage;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
pub use storage::{KeyValueStorage, MemoryStorage};
