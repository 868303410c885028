// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Prints the ops of a display list saved with `display_list::serialize`.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use display_list::serialize;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Serialized display list, such as a `display_list.dat` capture.
    path: PathBuf,
    /// Also recompute the summary from the records and compare it with the
    /// stored one.
    #[arg(long)]
    check: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let file = File::open(&args.path)
        .with_context(|| format!("Couldn't open {}", args.path.display()))?;
    let list = serialize::read(&mut BufReader::new(file))
        .with_context(|| format!("Couldn't read display list from {}", args.path.display()))?;
    log::info!(
        "Loaded {} ops ({} bytes) from {}",
        list.op_count(),
        list.byte_count(),
        args.path.display()
    );

    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{list}")?;
    stdout.flush()?;

    if args.check {
        let recomputed = list
            .recompute_summary()
            .context("Records are corrupt")?;
        if recomputed != *list.summary() {
            bail!(
                "Stored summary {:?} doesn't match the records, which give {:?}",
                list.summary(),
                recomputed
            );
        }
    }
    Ok(())
}
