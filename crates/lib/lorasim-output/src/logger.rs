use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::LevelFilter;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct LogSettings {
    pub log_path: String,
    pub log_level: String,
    pub log_file_name: String,
    pub log_overwrite: bool,
}

pub fn setup_logging(
    log_level: &str,
    log_file_path: PathBuf,
) -> Result<Config, Box<dyn std::error::Error>> {
    let log_level = get_logging_level(log_level);
    let log_file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y.%m.%d %H:%M:%S)} | {({l}):5.5} | {({f}:{L}):>40.40} - {m}{n}",
        )))
        .build(log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("x", Box::new(log_file)))
        .build(Root::builder().appender("x").build(log_level))?;
    Ok(config)
}

pub fn get_logging_level(log_level: &str) -> LevelFilter {
    match log_level {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

/// Picks the log file. An existing file is removed when overwriting is allowed, otherwise
/// a new file name with the current timestamp is used.
pub fn log_file_path(
    log_path: &Path,
    log_settings: &LogSettings,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let log_file_path = log_path.join(&log_settings.log_file_name);
    if !log_file_path.exists() {
        return Ok(log_file_path);
    }
    if log_settings.log_overwrite {
        fs::remove_file(&log_file_path)?;
        return Ok(log_file_path);
    }

    let hour_minute = Utc::now().format("_%d%m%Y_%H%M%S").to_string();
    let stem = log_settings
        .log_file_name
        .split('.')
        .next()
        .ok_or("failed to read log file name")?;
    let mut new_log_filename = stem.to_string();
    new_log_filename.push_str(hour_minute.as_str());
    new_log_filename.push_str(".log");
    Ok(log_path.join(new_log_filename))
}

pub fn initiate_logger(config_path: &Path, log_settings: &LogSettings, scenario_id: Option<u32>) {
    let mut log_path = config_path.join(&log_settings.log_path);
    log_path = match scenario_id {
        Some(val) => log_path.join(val.to_string()).join("logs"),
        None => log_path.join("logs"),
    };

    if !log_path.exists() {
        fs::create_dir_all(&log_path)
            .unwrap_or_else(|e| panic!("Error while creating the log directory: {}", e));
    }

    let log_file_path = match log_file_path(&log_path, log_settings) {
        Ok(path) => path,
        Err(e) => panic!("Error while preparing the log file: {}", e),
    };

    let logger_config = match setup_logging(&log_settings.log_level, log_file_path) {
        Ok(logger_config) => logger_config,
        Err(e) => {
            panic!("Error while configuring the logger: {}", e);
        }
    };

    match log4rs::init_config(logger_config) {
        Ok(_) => {}
        Err(e) => {
            panic!("Error while initializing logger with config: {}", e);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(log_overwrite: bool) -> LogSettings {
        LogSettings {
            log_path: "output".to_string(),
            log_level: "debug".to_string(),
            log_file_name: "lorasim.log".to_string(),
            log_overwrite,
        }
    }

    fn log_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("lorasim-logger-tests").join(name);
        fs::create_dir_all(&dir).expect("log directory");
        dir
    }

    #[test]
    fn levels_fall_back_to_info() {
        assert_eq!(get_logging_level("trace"), LevelFilter::Trace);
        assert_eq!(get_logging_level("loud"), LevelFilter::Info);
    }

    #[test]
    fn existing_log_is_overwritten() {
        let dir = log_dir("overwrite");
        fs::write(dir.join("lorasim.log"), "old run").expect("old log");
        let path = log_file_path(&dir, &settings(true)).expect("log path");
        assert_eq!(path, dir.join("lorasim.log"));
        assert!(!path.exists());
    }

    #[test]
    fn existing_log_is_kept_with_a_timestamped_sibling() {
        let dir = log_dir("keep");
        fs::write(dir.join("lorasim.log"), "old run").expect("old log");
        let path = log_file_path(&dir, &settings(false)).expect("log path");
        assert_ne!(path, dir.join("lorasim.log"));
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        assert!(name.starts_with("lorasim_"));
        assert!(name.ends_with(".log"));
        assert!(dir.join("lorasim.log").exists());
    }
}
