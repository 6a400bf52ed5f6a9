use parking_lot::{Condvar, Mutex};
use tracing::debug;

/// Binary semaphore guarding a single shared resource.
///
/// `free` is the availability flag: `false` means occupied, `true` means free.
/// The flag is only ever touched while holding the mutex; waiters park on the
/// condvar and re-check the flag in a loop after every wake, since a broadcast
/// can wake several waiters for a single release and only one of them may
/// claim it.
pub struct BinarySemaphore {
    free: Mutex<bool>,
    condvar: Condvar,
}

/// Claim on the resource; releases the semaphore when dropped, so the release
/// happens on every exit path of the holder.
pub struct SemaphoreGuard<'a> {
    semaphore: &'a BinarySemaphore,
}

impl BinarySemaphore {
    /// Starts occupied; nothing can acquire until someone calls
    /// [`release`](BinarySemaphore::release), normally the timer task.
    pub fn new() -> Self {
        Self {
            free: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    /// Blocks until the resource is free, then claims it.
    ///
    /// There is no timeout and no error path: if nobody ever releases, this
    /// parks forever. Which of several blocked callers wins a given release
    /// is up to the scheduler.
    pub fn acquire(&self) -> SemaphoreGuard<'_> {
        let mut free = self.free.lock();
        while !*free {
            debug!("resource busy, waiting");
            self.condvar.wait(&mut free);
        }
        *free = false;
        SemaphoreGuard { semaphore: self }
    }

    /// Marks the resource free and wakes all waiters.
    ///
    /// Broadcast rather than single-wake: every waiter re-validates the flag
    /// itself, so waking all of them for one release is safe (the losers loop
    /// back to waiting). Releasing an already-free semaphore is a no-op.
    pub fn release(&self) {
        let mut free = self.free.lock();
        *free = true;
        self.condvar.notify_all();
    }

    /// Snapshot of the flag, taken under the lock. Observation only; the
    /// answer can be stale by the time the caller looks at it.
    pub fn is_free(&self) -> bool {
        *self.free.lock()
    }
}

impl Default for BinarySemaphore {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SemaphoreGuard<'_> {
    fn drop(&mut self) {
        self.semaphore.release();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        thread,
        time::Duration,
    };

    use super::BinarySemaphore;

    #[test]
    fn starts_occupied() {
        let semaphore = BinarySemaphore::new();
        assert!(!semaphore.is_free());
    }

    #[test]
    fn release_is_idempotent() {
        let semaphore = BinarySemaphore::new();
        semaphore.release();
        semaphore.release();
        assert!(semaphore.is_free());
        let guard = semaphore.acquire();
        assert!(!semaphore.is_free());
        drop(guard);
        assert!(semaphore.is_free());
    }

    #[test]
    fn guard_drop_releases() {
        let semaphore = BinarySemaphore::new();
        semaphore.release();
        {
            let _guard = semaphore.acquire();
            assert!(!semaphore.is_free());
        }
        assert!(semaphore.is_free());
    }

    #[test]
    fn blocked_acquire_wakes_on_release() {
        let semaphore = Arc::new(BinarySemaphore::new());
        let waiter = {
            let semaphore = Arc::clone(&semaphore);
            thread::spawn(move || {
                let _guard = semaphore.acquire();
            })
        };
        // Give the waiter time to park before releasing.
        thread::sleep(Duration::from_millis(50));
        semaphore.release();
        waiter.join().unwrap();
        assert!(semaphore.is_free());
    }

    #[test]
    fn at_most_one_holder() {
        let semaphore = Arc::new(BinarySemaphore::new());
        let holders = Arc::new(AtomicUsize::new(0));

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let semaphore = Arc::clone(&semaphore);
                let holders = Arc::clone(&holders);
                thread::spawn(move || {
                    let _guard = semaphore.acquire();
                    assert_eq!(holders.fetch_add(1, Ordering::SeqCst), 0);
                    thread::sleep(Duration::from_millis(1));
                    holders.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        semaphore.release();
        for thread in threads {
            thread.join().unwrap();
        }
        assert!(semaphore.is_free());
    }
}
