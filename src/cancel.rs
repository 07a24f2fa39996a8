use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Shared cooperative cancellation token.
///
/// Set either by the Ctrl-C handler or by the `--timeout` watchdog and
/// polled at directory, file, and chunk boundaries. Workers never block on
/// it; they finish the step in flight and stop pulling new work.
#[derive(Debug, Default)]
pub struct CancelToken {
    cancelled: AtomicBool,
    interrupted: AtomicBool,
}

impl CancelToken {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Cancel due to an elapsed deadline.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Cancel due to an external interrupt signal.
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::Relaxed);
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn was_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::Relaxed)
    }

    /// Spawn a detached watchdog that cancels this token after `secs`.
    pub fn arm_deadline(self: &Arc<Self>, secs: u64) {
        let token = Arc::clone(self);
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_secs(secs));
            token.cancel();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_clear() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        assert!(!token.was_interrupted());
    }

    #[test]
    fn cancel_does_not_mark_interrupted() {
        let token = CancelToken::new();
        token.cancel();
        assert!(token.is_cancelled());
        assert!(!token.was_interrupted());
    }

    #[test]
    fn interrupt_marks_both() {
        let token = CancelToken::new();
        token.interrupt();
        assert!(token.is_cancelled());
        assert!(token.was_interrupted());
    }

    #[test]
    fn deadline_fires() {
        let token = CancelToken::new();
        token.arm_deadline(0);
        std::thread::sleep(Duration::from_millis(100));
        assert!(token.is_cancelled());
        assert!(!token.was_interrupted());
    }
}
