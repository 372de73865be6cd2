//! pm-example entry point.

use clap::error::ErrorKind;
use clap::Parser;
use pm_example::{logging, Cli, GREETING};
use std::io::{self, Write};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if !matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                writeln!(io::stdout(), "{GREETING}")?;
            }
            err.exit()
        }
    };

    let mut out = io::stdout().lock();
    cli.run(&mut out).await
}
