use std::path::PathBuf;

use crate::semaphore::BinarySemaphore;

/// Everything the concurrent tasks share: the path of the file they compete
/// for and the semaphore serializing access to it.
///
/// One instance is built at startup and handed to every worker and to the
/// releaser behind an `Arc`. The semaphore starts occupied, so nothing
/// proceeds until the first release.
pub struct Context {
    pub path: PathBuf,
    pub semaphore: BinarySemaphore,
}

impl Context {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            semaphore: BinarySemaphore::new(),
        }
    }
}
