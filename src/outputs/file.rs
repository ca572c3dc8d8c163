//! File output
//!
//! Writes rendered entries through a buffered writer guarded by a mutex, so
//! one file can be shared by several loggers. The buffer is flushed every
//! `flush_size` entries, on [`Output::flush`], and when the output is dropped.

use super::args;
use crate::core::{LoggerError, Output, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Entries written between automatic flushes by default
pub const DEFAULT_FLUSH_SIZE: usize = 64;

/// How the configured path is resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathType {
    /// Relative to the working directory at creation time
    #[default]
    Relative,
    /// Used as given; must be absolute
    Absolute,
}

impl FromStr for PathType {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relative" => Ok(PathType::Relative),
            "absolute" => Ok(PathType::Absolute),
            other => Err(LoggerError::config(
                "FileConfig",
                format!("unknown path type '{}'", other),
            )),
        }
    }
}

/// Open mode of a log file
///
/// Parsed from a comma separated list of `out`, `app`, `trunc` and `binary`.
/// `out` alone truncates, like opening a stream for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenMode {
    pub append: bool,
    pub truncate: bool,
    /// Written as-is; no effect on text handling on this platform
    pub binary: bool,
}

impl OpenMode {
    pub const APPEND: OpenMode = OpenMode {
        append: true,
        truncate: false,
        binary: false,
    };

    pub const TRUNCATE: OpenMode = OpenMode {
        append: false,
        truncate: true,
        binary: false,
    };
}

impl Default for OpenMode {
    fn default() -> Self {
        OpenMode::APPEND
    }
}

impl FromStr for OpenMode {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        let mut mode = OpenMode {
            append: false,
            truncate: false,
            binary: false,
        };
        for token in s.split([',', '|', ' ']).filter(|t| !t.is_empty()) {
            match token.to_ascii_lowercase().as_str() {
                "out" => {}
                "app" => mode.append = true,
                "trunc" => mode.truncate = true,
                "binary" => mode.binary = true,
                other => {
                    return Err(LoggerError::config(
                        "FileConfig",
                        format!("unknown open mode '{}'", other),
                    ));
                }
            }
        }
        if mode.append && mode.truncate {
            return Err(LoggerError::config(
                "FileConfig",
                "open mode cannot both append and truncate",
            ));
        }
        if !mode.append {
            mode.truncate = true;
        }
        Ok(mode)
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.append { "app" } else { "trunc" })?;
        if self.binary {
            f.write_str(",binary")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub path: PathBuf,
    pub path_type: PathType,
    /// Entries per automatic flush; 0 flushes only on demand
    pub flush_size: usize,
    pub open_mode: OpenMode,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("log.txt"),
            path_type: PathType::Relative,
            flush_size: DEFAULT_FLUSH_SIZE,
            open_mode: OpenMode::default(),
        }
    }
}

impl FileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn path_type(mut self, path_type: PathType) -> Self {
        self.path_type = path_type;
        self
    }

    #[must_use]
    pub fn flush_size(mut self, flush_size: usize) -> Self {
        self.flush_size = flush_size;
        self
    }

    #[must_use]
    pub fn open_mode(mut self, open_mode: OpenMode) -> Self {
        self.open_mode = open_mode;
        self
    }

    /// Read `--<id>.path`, `--<id>.pathType`, `--<id>.flushSize` and `--<id>.openMode`
    ///
    /// `path` is required; the other keys keep their defaults when absent.
    ///
    /// ```
    /// use fanout_logger::outputs::{FileConfig, PathType};
    ///
    /// let config = FileConfig::from_command_line(
    ///     "main",
    ///     r#"--main.path = "logs/app.txt" --main.flushSize=1 --main.pathType=Relative"#,
    /// ).expect("config");
    /// assert_eq!(config.flush_size, 1);
    /// assert_eq!(config.path_type, PathType::Relative);
    /// ```
    pub fn from_command_line(id: &str, command_line: &str) -> Result<Self> {
        let mut config = Self::default();
        let mut has_path = false;

        for (key, value) in args::parse_block(id, command_line) {
            match key.as_str() {
                "path" => {
                    if value.is_empty() {
                        return Err(LoggerError::config(
                            "FileConfig",
                            format!("--{}.path has no value", id),
                        ));
                    }
                    config.path = PathBuf::from(value);
                    has_path = true;
                }
                "pathType" => config.path_type = value.parse()?,
                "flushSize" => {
                    config.flush_size = value.parse().map_err(|_| {
                        LoggerError::config(
                            "FileConfig",
                            format!("--{}.flushSize must be a count, got '{}'", id, value),
                        )
                    })?;
                }
                "openMode" => config.open_mode = value.parse()?,
                other => {
                    return Err(LoggerError::config(
                        "FileConfig",
                        format!("unknown option --{}.{}", id, other),
                    ));
                }
            }
        }

        if !has_path {
            return Err(LoggerError::config(
                "FileConfig",
                format!("missing --{}.path", id),
            ));
        }
        Ok(config)
    }

    /// [`FileConfig::from_command_line`] over the arguments of this process
    pub fn from_env_args(id: &str) -> Result<Self> {
        Self::from_command_line(id, &args::env_command_line())
    }

    /// The path a file output would open
    pub fn resolve_path(&self) -> Result<PathBuf> {
        match self.path_type {
            PathType::Absolute if self.path.is_absolute() => Ok(self.path.clone()),
            PathType::Absolute => Err(LoggerError::config(
                "FileConfig",
                format!("'{}' is not an absolute path", self.path.display()),
            )),
            PathType::Relative if self.path.is_absolute() => Ok(self.path.clone()),
            PathType::Relative => {
                let cwd = std::env::current_dir().map_err(|e| {
                    LoggerError::io_operation(
                        "resolve log path",
                        "Failed to read the working directory",
                        e,
                    )
                })?;
                Ok(cwd.join(&self.path))
            }
        }
    }
}

struct FileState {
    writer: BufWriter<File>,
    pending: usize,
}

pub struct FileOutput {
    path: PathBuf,
    config: FileConfig,
    state: Mutex<FileState>,
}

impl FileOutput {
    /// Open the file, creating missing parent directories
    #[track_caller]
    pub fn new(config: FileConfig) -> Result<Self> {
        let path = config.resolve_path()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(parent) {
                return Err(LoggerError::initialization(
                    format!("Failed to create log directory '{}'", parent.display()),
                    Some(&e),
                ));
            }
        }

        let mut options = OpenOptions::new();
        options.create(true);
        if config.open_mode.append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }
        let file = match options.open(&path) {
            Ok(file) => file,
            Err(e) => {
                return Err(LoggerError::initialization(
                    format!("Failed to open log file '{}'", path.display()),
                    Some(&e),
                ));
            }
        };

        Ok(Self {
            path,
            config,
            state: Mutex::new(FileState {
                writer: BufWriter::new(file),
                pending: 0,
            }),
        })
    }

    /// Open a file output ready to be shared between channels
    #[track_caller]
    pub fn create(config: FileConfig) -> Result<Arc<Self>> {
        Self::new(config).map(Arc::new)
    }

    /// Path the file was opened at
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &FileConfig {
        &self.config
    }

    fn flush_locked(&self, state: &mut FileState) -> Result<()> {
        state.pending = 0;
        state.writer.flush().map_err(|e| {
            LoggerError::io_operation(
                "flush log file",
                format!("Failed to flush '{}'", self.path.display()),
                e,
            )
        })
    }
}

impl Output for FileOutput {
    fn write(&self, text: &str, _raw: Option<&[u8]>) -> Result<()> {
        let mut state = self.state.lock();
        state.writer.write_all(text.as_bytes()).map_err(|e| {
            LoggerError::sink_write(
                format!("file:{}", self.path.display()),
                e.to_string(),
            )
        })?;

        state.pending += 1;
        if self.config.flush_size > 0 && state.pending >= self.config.flush_size {
            self.flush_locked(&mut state)?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let mut state = self.state.lock();
        self.flush_locked(&mut state)
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileOutput {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.state.get_mut().writer.flush();
    }
}

impl fmt::Debug for FileOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileOutput")
            .field("path", &self.path)
            .field("config", &self.config)
            .finish()
    }
}
