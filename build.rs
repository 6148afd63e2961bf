//! Renders the `ecs-volumes(1)` manual page from the clap definitions.
//!
//! The page documents the `create`, `delete`, `resize` and `list-snapshots`
//! subcommands. It is written to `OUT_DIR/ecs-volumes.1` so release archives
//! can ship it beside the binary without a checked-in copy drifting from the
//! parser.

use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::CommandFactory;
use clap_mangen::Man;

#[path = "src/cli/mod.rs"]
mod cli;

use cli::Cli;

const MAN_PAGE: &str = "ecs-volumes.1";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = std::io::stdout();
    for watched in ["build.rs", "src/cli/mod.rs", "Cargo.toml"] {
        writeln!(stdout, "cargo:rerun-if-changed={watched}")?;
    }

    let out_dir = env::var_os("OUT_DIR").map(PathBuf::from).ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "OUT_DIR was not set")
    })?;

    let mut page = BufWriter::new(File::create(out_dir.join(MAN_PAGE))?);
    Man::new(Cli::command()).render(&mut page)?;
    page.flush()?;

    Ok(())
}
