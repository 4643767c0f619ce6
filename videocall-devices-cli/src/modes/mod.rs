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

pub mod list;
pub mod reset;
pub mod select;

use std::fs;
use std::path::Path;
use std::rc::Rc;

use anyhow::Context;
use tracing::debug;
use videocall_devices::{
    DeviceManagerOptions, JsonFileStorage, KeyValueStorage, MediaDeviceManager, MemoryStorage,
    RawDeviceInfo, StaticDeviceSource,
};

use crate::cli_args::Opt;

/// Options from `--config`, with `--strict` or `--lenient` on top.
pub fn load_options(opt: &Opt) -> anyhow::Result<DeviceManagerOptions> {
    let mut options = match &opt.config {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => DeviceManagerOptions::default(),
    };
    if opt.strict {
        options.strict_selection = true;
    } else if opt.lenient {
        options.strict_selection = false;
    }
    Ok(options)
}

/// The enumeration captured in `path`, or nothing.
pub fn load_devices(path: Option<&Path>) -> anyhow::Result<Vec<RawDeviceInfo>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading devices {}", path.display()))?;
    let devices: Vec<RawDeviceInfo> = serde_json::from_str(&contents)
        .with_context(|| format!("parsing devices {}", path.display()))?;
    debug!("loaded {} raw devices from {}", devices.len(), path.display());
    Ok(devices)
}

pub fn open_storage(path: Option<&Path>) -> anyhow::Result<Rc<dyn KeyValueStorage>> {
    Ok(match path {
        Some(path) => Rc::new(
            JsonFileStorage::open(path)
                .with_context(|| format!("opening storage {}", path.display()))?,
        ),
        None => Rc::new(MemoryStorage::new()),
    })
}

/// Build a manager over the captured enumeration and run its first cycle.
pub async fn start_manager(opt: &Opt) -> anyhow::Result<MediaDeviceManager> {
    let options = load_options(opt)?;
    let source = StaticDeviceSource::new(load_devices(opt.devices.as_deref())?);
    let storage = open_storage(opt.storage.as_deref())?;

    let manager = MediaDeviceManager::new(Rc::new(source), storage, options);
    manager.init().await;
    Ok(manager)
}
