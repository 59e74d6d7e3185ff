//! Where refresh reads get their bytes.

use std::io;
use std::path::Path;

use fs_err as fs;

/// Blocking byte source for the state file. Reads run on a reader thread, never
/// on the coordinator's own thread.
pub trait StateSource: Send + Sync + 'static {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Reads straight from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSource;

impl StateSource for FileSource {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }
}
