use std::io::stdout;
use std::time::SystemTime;
use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use fern::{Dispatch, InitError};
use humantime::format_rfc3339_seconds;
use log::LevelFilter;
use crate::initialization::General;

/// Sets up logging to stdout and, if a log path is configured, to file
///
/// # Arguments
///
/// * 'general' - general configuration holding log level and log path
pub fn setup_logger(general: &General) -> Result<(), InitError> {
    let level = general.level().unwrap_or(LevelFilter::Info);

    let colors = ColoredLevelConfig::new()
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red)
        .trace(Magenta);

    let stdout_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                format_rfc3339_seconds(SystemTime::now()),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .chain(stdout());

    let mut dispatch = Dispatch::new()
        .level(level)
        .level_for("reqwest", LevelFilter::Warn)
        .chain(stdout_dispatch);

    if let Some(path) = &general.log_path {
        let file_dispatch = Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{} {} {}] {}",
                    format_rfc3339_seconds(SystemTime::now()),
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .chain(fern::log_file(path)?);

        dispatch = dispatch.chain(file_dispatch);
    }

    dispatch.apply()?;

    Ok(())
}
