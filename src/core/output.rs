//! Output trait for rendered log destinations

use super::error::Result;
use std::sync::Arc;

/// A destination for rendered entries
///
/// Outputs are shared: one instance may sit in several channels of several
/// loggers, each with its own dispatcher thread. Implementations therefore
/// take `&self` and serialize their own writes.
pub trait Output: Send + Sync {
    /// Accept one rendered entry, plus the captured bytes of binary entries
    fn write(&self, text: &str, raw: Option<&[u8]>) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Whether VT escape sequences should be sent to this output
    fn supports_style(&self) -> bool {
        false
    }

    fn name(&self) -> &str;
}

/// Reference-counted handle used in channel output lists
pub type SharedOutput = Arc<dyn Output>;
