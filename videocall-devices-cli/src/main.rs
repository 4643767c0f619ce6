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

use clap::Parser;
use videocall_devices_cli::cli_args::Opt;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    videocall_devices_cli::init_tracing()?;

    let opt = Opt::parse();

    // The device manager is single-threaded and spawns its cycles locally.
    let local = tokio::task::LocalSet::new();
    let output = local.run_until(videocall_devices_cli::run(opt)).await?;
    println!("{output}");

    Ok(())
}
