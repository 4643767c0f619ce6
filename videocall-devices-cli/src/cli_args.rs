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

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use videocall_devices::DeviceKind;

/// Videocall Devices CLI
///
/// Runs the device manager against a captured enumeration (the JSON array returned by
/// `navigator.mediaDevices.enumerateDevices()`) and a persisted selection, and prints which
/// device of every kind ends up active.
#[derive(Parser, Debug)]
#[clap(name = "videocall-devices")]
pub struct Opt {
    /// JSON file with the raw device enumeration. Without it only the synthetic
    /// defaults are listed.
    #[clap(long = "devices", global = true)]
    pub devices: Option<PathBuf>,

    /// JSON file holding the persisted selection. Created on the first `select`.
    /// Without it the selection only lives for the duration of the command.
    #[clap(long = "storage", global = true)]
    pub storage: Option<PathBuf>,

    /// JSON file with device manager options.
    #[clap(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Reject selections of devices that are not in the enumeration.
    #[clap(long = "strict", global = true)]
    pub strict: bool,

    /// Accept selections of unknown devices for this run without persisting them.
    /// Strict selection is the default in debug builds.
    #[clap(long = "lenient", global = true, conflicts_with = "strict")]
    pub lenient: bool,

    /// Output format, `text` or `json`.
    #[clap(long = "format", global = true, default_value = "text")]
    pub format: OutputFormat,

    #[clap(subcommand)]
    pub mode: Mode,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Error, Debug)]
pub enum ParseOutputFormatError {
    #[error("Invalid output format: {0}, please use one of [text, json]")]
    InvalidFormat(String),
}

impl FromStr for OutputFormat {
    type Err = ParseOutputFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(ParseOutputFormatError::InvalidFormat(s.to_string())),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// List every device kind with the active device marked.
    List,

    /// Manually select a device and persist the choice.
    Select(Select),

    /// Forget the persisted selection.
    Reset(Reset),
}

#[derive(Args, Debug, Clone)]
pub struct Select {
    /// Device kind: microphone, speaker or camera.
    #[clap(long = "kind", short = 'k')]
    pub kind: DeviceKind,

    /// Device id as reported by the enumeration.
    #[clap(long = "id")]
    pub id: String,
}

#[derive(Args, Debug, Clone)]
pub struct Reset {
    /// Device kind to reset. All kinds when omitted.
    #[clap(long = "kind", short = 'k')]
    pub kind: Option<DeviceKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let opt = Opt::parse_from([
            "videocall-devices",
            "select",
            "--kind",
            "mic",
            "--id",
            "abc",
            "--strict",
            "--format",
            "json",
        ]);
        assert!(opt.strict);
        assert_eq!(opt.format, OutputFormat::Json);
        match opt.mode {
            Mode::Select(select) => {
                assert_eq!(select.kind, DeviceKind::Microphone);
                assert_eq!(select.id, "abc");
            }
            other => panic!("unexpected mode {other:?}"),
        }
    }

    #[test]
    fn test_strict_and_lenient_conflict() {
        let opt = Opt::parse_from(["videocall-devices", "list", "--lenient"]);
        assert!(opt.lenient);
        assert!(!opt.strict);
        assert!(
            Opt::try_parse_from(["videocall-devices", "list", "--strict", "--lenient"]).is_err()
        );
    }

    #[test]
    fn test_rejects_unknown_kind_and_format() {
        assert!(Opt::try_parse_from(["videocall-devices", "reset", "--kind", "screen"]).is_err());
        assert!(Opt::try_parse_from(["videocall-devices", "list", "--format", "yaml"]).is_err());
    }
}
