use std::path::PathBuf;

use treepad_core::Config;

/// Launch options handed over by the binary.
#[derive(Debug, Default)]
pub struct Flags {
    /// Root to open right away, skipping the folder picker
    pub root: Option<PathBuf>,
    pub config: Config,
}
