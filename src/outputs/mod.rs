//! Built-in outputs

pub mod args;
pub mod console;
pub mod custom;
pub mod debug;
pub mod file;

pub use console::{ConsoleConfig, ConsoleOutput};
pub use custom::{CustomOutput, OutputCallback};
pub use debug::DebugOutput;
pub use file::{FileConfig, FileOutput, OpenMode, PathType, DEFAULT_FLUSH_SIZE};
