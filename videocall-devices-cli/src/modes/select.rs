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

use anyhow::Context;
use tracing::warn;

use super::list::render;
use super::start_manager;
use crate::cli_args::{Opt, Select};

pub async fn select(opt: &Opt, select: &Select) -> anyhow::Result<String> {
    let manager = start_manager(opt).await?;
    manager
        .manually_select(select.kind, &select.id)
        .with_context(|| format!("selecting {} {:?}", select.kind, select.id))?;

    let persisted = manager
        .stored_selection(select.kind)
        .is_some_and(|stored| stored.device_id == select.id);
    if !persisted {
        warn!(
            "{} {:?} is not in the enumeration; it is active for this run only",
            select.kind, select.id
        );
    }
    render(&manager.snapshot(), opt.format)
}
