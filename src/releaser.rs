use std::{sync::Arc, thread, time::Duration};

use tracing::info;

use crate::context::Context;

/// Timer task that frees the resource after a fixed delay, independent of any
/// worker. Models an external party unblocking the file.
///
/// May race a worker's own release; both just set the flag free and
/// broadcast, so the overlap is harmless.
pub fn run(ctx: Arc<Context>, delay: Duration) {
    thread::sleep(delay);
    ctx.semaphore.release();
    info!(after_ms = delay.as_millis() as u64, "timer released the file");
}
