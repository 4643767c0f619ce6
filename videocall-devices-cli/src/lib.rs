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

pub mod cli_args;
pub mod modes;

use cli_args::{Mode, Opt};
use tracing::level_filters::LevelFilter;

/// Install the global fmt subscriber, writing to stderr.
///
/// `RUST_LOG` overrides the default INFO level. The library's `log` records are forwarded
/// too. Fails if a global subscriber is already installed.
pub fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(anyhow::Error::msg)
}

/// Run one command and return what it prints.
///
/// Must be called within a `tokio::task::LocalSet`.
pub async fn run(opt: Opt) -> anyhow::Result<String> {
    match &opt.mode {
        Mode::List => modes::list::list(&opt).await,
        Mode::Select(select) => modes::select::select(&opt, select).await,
        Mode::Reset(reset) => modes::reset::reset(&opt, reset),
    }
}
