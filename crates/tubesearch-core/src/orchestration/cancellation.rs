use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

const WAIT_SLICE: Duration = Duration::from_millis(100);

/// Cooperative cancellation flag shared between the UI and a blocking worker.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Sleeps up to `duration`, waking early on cancellation.
    /// Returns `true` if the token was cancelled. A duration too large to
    /// represent as a deadline waits for cancellation alone.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let deadline = Instant::now().checked_add(duration);
        loop {
            if self.is_cancelled() {
                return true;
            }
            let slice = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    WAIT_SLICE.min(deadline - now)
                }
                None => WAIT_SLICE,
            };
            std::thread::sleep(slice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn wait_returns_early_once_cancelled() {
        let token = CancellationToken::new();
        let worker = token.clone();
        let handle = std::thread::spawn(move || worker.wait_timeout(Duration::from_secs(30)));

        token.cancel();
        let started = Instant::now();
        assert!(handle.join().unwrap());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn unbounded_wait_still_observes_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        assert!(token.wait_timeout(Duration::MAX));
    }

    #[test]
    fn wait_elapses_without_cancellation() {
        let token = CancellationToken::new();
        assert!(!token.wait_timeout(Duration::from_millis(10)));
    }
}
