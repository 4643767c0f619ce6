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

use std::fmt::Write;

use videocall_devices::{DeviceKind, DeviceSnapshot};

use super::start_manager;
use crate::cli_args::{Opt, OutputFormat};

pub async fn list(opt: &Opt) -> anyhow::Result<String> {
    let manager = start_manager(opt).await?;
    render(&manager.snapshot(), opt.format)
}

pub fn render(snapshot: &DeviceSnapshot, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(snapshot)?),
        OutputFormat::Text => Ok(render_text(snapshot)),
    }
}

/// One block per kind, devices in list order, `*` in front of the active one.
pub fn render_text(snapshot: &DeviceSnapshot) -> String {
    let mut out = String::new();
    for kind in DeviceKind::ALL {
        let list = snapshot.list(kind);
        let active = snapshot.active(kind);
        let _ = writeln!(out, "{}s ({}):", kind.display_name(), list.len());
        let width = list.iter().map(|d| d.device_id.len()).max().unwrap_or(0);
        for device in list.iter() {
            let marker = if device.device_id == active { '*' } else { ' ' };
            let _ = writeln!(
                out,
                "  {marker} {:<width$}  {}",
                device.device_id, device.label
            );
        }
    }
    out.trim_end().to_string()
}
