use crate::configuration::LoggingConfig;
use crate::error::{Error, Result};
use env_logger::Target;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

pub const LOG_FILE_NAME: &str = "proxyhelper.log";

/// Installs the process-wide logger according to `config`.
///
/// Defaults to `warn`, with this crate at `info`; `RUST_LOG` overrides both.
/// With both sinks disabled nothing is installed. A logger that is already
/// in place (e.g. a second helper in the same process) is left alone.
pub fn init(config: &LoggingConfig) -> Result<()> {
    if !config.console && !config.file {
        return Ok(());
    }

    let file = if config.file {
        Some(open_log_file(config)?)
    } else {
        None
    };

    let target = match (config.console, file) {
        (true, None) => Target::Stderr,
        (false, Some(file)) => Target::Pipe(Box::new(file)),
        (true, Some(file)) => Target::Pipe(Box::new(Tee {
            console: io::stderr(),
            file,
        })),
        (false, None) => unreachable!("at least one sink is enabled"),
    };

    let result = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .filter_module("proxyhelper", log::LevelFilter::Info)
        .parse_default_env()
        .target(target)
        .try_init();

    if result.is_ok() {
        log::info!("Logger initialized");
    }
    Ok(())
}

pub fn log_file_path(config: &LoggingConfig) -> PathBuf {
    config.directory.join(LOG_FILE_NAME)
}

fn open_log_file(config: &LoggingConfig) -> Result<File> {
    fs::create_dir_all(&config.directory).map_err(|e| {
        Error::logging(format!(
            "cannot create log directory {}: {}",
            config.directory.display(),
            e
        ))
    })?;

    let path = log_file_path(config);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| Error::logging(format!("cannot open {}: {}", path.display(), e)))
}

/// Writes every record to stderr and the log file.
struct Tee {
    console: io::Stderr,
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.console.write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.console.flush()?;
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_sinks_touch_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            console: false,
            file: false,
            directory: dir.path().join("logs"),
        };
        init(&config).unwrap();
        assert!(!config.directory.exists());
    }

    #[test]
    fn file_sink_creates_the_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            console: false,
            file: true,
            directory: dir.path().join("logs"),
        };
        init(&config).unwrap();
        assert!(log_file_path(&config).exists());
    }

    #[test]
    fn unusable_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();

        let config = LoggingConfig {
            console: true,
            file: true,
            directory: blocker.join("logs"),
        };
        assert!(matches!(init(&config), Err(Error::Logging(_))));
    }
}
