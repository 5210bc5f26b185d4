use clap::Parser;
use intake_relay::{init_logging, run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _handle = init_logging(cli.log_level.into())?;
    run(cli)?;
    Ok(())
}
