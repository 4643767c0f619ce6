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

use tracing::{info, warn};
use videocall_devices::{DeviceKind, SelectionStore};

use super::{load_options, open_storage};
use crate::cli_args::{Opt, Reset};

pub fn reset(opt: &Opt, reset: &Reset) -> anyhow::Result<String> {
    if opt.storage.is_none() {
        warn!("no --storage given, nothing is persisted");
    }
    let options = load_options(opt)?;
    let store = SelectionStore::new(open_storage(opt.storage.as_deref())?, options.strict_selection);

    let kinds = match reset.kind {
        Some(kind) => vec![kind],
        None => DeviceKind::ALL.to_vec(),
    };
    for kind in &kinds {
        store.clear(*kind)?;
        info!("cleared stored {kind} selection");
    }
    Ok(kinds
        .iter()
        .map(|kind| format!("Reset {kind}"))
        .collect::<Vec<_>>()
        .join("\n"))
}
