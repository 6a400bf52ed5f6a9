use std::{fs::File, io::Read, path::Path, sync::Arc};

use thiserror::Error;
use tracing::{error, info, info_span};

use crate::context::Context;

/// Single read request size. Anything past this stays unread; the point is
/// the coordination around the file, not its content.
const READ_BUF_SIZE: usize = 1024;

/// Failures while touching the shared file. Local to one worker: logged and
/// swallowed, never propagated across task boundaries.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
}

/// One worker: wait for the file, read a chunk of it, let go.
///
/// The semaphore guard is held across the file access and dropped on every
/// exit path, so a worker that fails to open or read still releases and the
/// remaining workers cannot deadlock on it.
pub fn run(ctx: Arc<Context>, id: u8) {
    let span = info_span!("worker", id);
    let _entered = span.enter();

    info!("waiting for the file");
    let _claim = ctx.semaphore.acquire();

    info!("claimed the file, reading");
    match read_chunk(&ctx.path) {
        Ok(content) => info!(bytes = content.len(), "read: {}", String::from_utf8_lossy(&content)),
        Err(err) => error!("{err}"),
    }

    info!("releasing the file");
}

/// Opens the file and performs one bounded read. No retries, no streaming;
/// at most [`READ_BUF_SIZE`] bytes come back.
pub fn read_chunk(path: &Path) -> Result<Vec<u8>, AccessError> {
    let display = path.display().to_string();
    let mut file = File::open(path).map_err(|source| AccessError::Open {
        path: display.clone(),
        source,
    })?;

    let mut buf = vec![0u8; READ_BUF_SIZE];
    let n = file.read(&mut buf).map_err(|source| AccessError::Read {
        path: display,
        source,
    })?;
    buf.truncate(n);
    Ok(buf)
}
