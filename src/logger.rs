use log::LevelFilter;

/// Initializes logging from a log4rs YAML file.
///
/// # Errors
/// Returns an error if the file is missing, malformed, or a logger is already installed.
pub fn init_path(path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    log4rs::init_file(path, log4rs::config::Deserializers::default())?;
    Ok(())
}

#[must_use]
pub fn parse_level(level: Option<&str>) -> LevelFilter {
    match level.unwrap_or("warn").to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Warn,
    }
}

/// Builds the log4rs config: stderr when `dir` is `None`, otherwise a rolling
/// `{dir}/queryrunner.log` that keeps 7 rolled files of 10 MiB.
///
/// # Errors
/// Returns an error if the directory cannot be created or an appender fails to build.
pub fn build_config(
    dir: Option<&std::path::Path>,
    level: LevelFilter,
) -> Result<log4rs::config::Config, Box<dyn std::error::Error>> {
    use log4rs::append::console::{ConsoleAppender, Target};
    use log4rs::append::rolling_file::RollingFileAppender;
    use log4rs::append::rolling_file::policy::compound::{
        CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
    };
    use log4rs::config::{Appender, Config, Root};
    use log4rs::encode::pattern::PatternEncoder;

    let pattern = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
    let appender: Box<dyn log4rs::append::Append> = match dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let roller = FixedWindowRoller::builder()
                .build(&format!("{}", dir.join("queryrunner.{}.log").display()), 7)?;
            let policy =
                CompoundPolicy::new(Box::new(SizeTrigger::new(10 * 1024 * 1024)), Box::new(roller));
            Box::new(
                RollingFileAppender::builder()
                    .encoder(Box::new(PatternEncoder::new(pattern)))
                    .build(dir.join("queryrunner.log"), Box::new(policy))?,
            )
        }
        None => Box::new(
            ConsoleAppender::builder()
                .target(Target::Stderr)
                .encoder(Box::new(PatternEncoder::new("[{l}] {t} - {m}{n}")))
                .build(),
        ),
    };
    let config = Config::builder()
        .appender(Appender::builder().build("main", appender))
        .build(Root::builder().appender("main").build(level))?;
    Ok(config)
}

/// Installs the global logger. Later calls are ignored once a logger is set.
pub fn configure_logging(dir: Option<&std::path::Path>, level: Option<&str>) {
    match build_config(dir, parse_level(level)) {
        Ok(config) => {
            if log4rs::init_config(config).is_err() {
                log::debug!("logger already initialized");
            }
        }
        Err(e) => eprintln!("logging disabled: {e}"),
    }
}
