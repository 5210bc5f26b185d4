use anyhow::Context;
use log::LevelFilter;
use log4rs::Handle;
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        rolling_file::{
            policy::compound::{
                roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger, CompoundPolicy,
            },
            RollingFileAppender,
        },
    },
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} - {m}\n";

/// Sets up logging to stdout (filtered by `level`) and to a size rolled file in `log/`
pub fn init_logging(level: LevelFilter) -> anyhow::Result<Handle> {
    let file_path = "log/intake_relay.log";
    let archive_pattern = "log/intake_relay_{}.log";

    // Diagnostics are expected on stdout next to the prompt
    let stdout = ConsoleAppender::builder()
        .target(Target::Stdout)
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();

    let trigger = SizeTrigger::new(2_097_152); // 2mb (2 * 1024 * 1024)
    let roller = FixedWindowRoller::builder()
        .build(archive_pattern, 10)
        .context("Failed to create FixedWindowRoller")?;
    let policy = CompoundPolicy::new(Box::new(trigger), Box::new(roller));

    let log_file = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(file_path, Box::new(policy))
        .with_context(|| format!("Failed to create log file appender at {file_path:?}"))?;

    let config = Config::builder()
        .appender(Appender::builder().build("log_file", Box::new(log_file)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(level)))
                .build("stdout", Box::new(stdout)),
        )
        .build(
            Root::builder()
                .appender("log_file")
                .appender("stdout")
                .build(level),
        )
        .context("Failed to configure logging")?;

    // Handle allows changing the level at runtime, caller keeps it alive
    let handle = log4rs::init_config(config).context("Failed to init_config")?;

    Ok(handle)
}
