mod cli;
pub mod config;
pub mod fetch;
mod input;
mod logging;
pub mod notification;
pub mod pipeline;
pub mod storage;
mod units;
mod utils;

use std::io;

use log::info;

pub use cli::{Cli, LogLevel};
pub use config::Config;
pub use input::{read_user_input, UserInput};
pub use logging::init_logging;
pub use units::Seconds;

use crate::{
    fetch::HttpFetcher, notification::Email, pipeline::run_steps, storage::Database,
};

/// Only fails for problems before the steps start (config or reading stdin),
/// failures of the steps themselves are logged and do not change the result
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.get_config_path().as_deref())?;

    let user_input = read_user_input(io::stdin().lock(), io::stdout())?;
    info!("Received input from user: {user_input:?}");

    let fetcher = HttpFetcher::new(&config.api);
    let database = Database::new(&config.database);
    let email = Email::new(&config.email);
    run_steps(&user_input, &fetcher, &database, &email);
    Ok(())
}
