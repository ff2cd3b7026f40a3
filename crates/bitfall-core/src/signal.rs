use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A shared "full reset requested" flag.
///
/// Clones share the same flag. Any holder may raise it; the field controller
/// consumes it with [`ResetSignal::take`], so each request triggers exactly
/// one rebuild.
#[derive(Debug, Clone, Default)]
pub struct ResetSignal(Arc<AtomicBool>);

impl ResetSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a full reset as pending.
    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Consume a pending request, returning whether there was one.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_consumes_once() {
        let signal = ResetSignal::new();
        assert!(!signal.take());

        signal.request();
        assert!(signal.is_requested());
        assert!(signal.take());
        assert!(!signal.take());
    }

    #[test]
    fn test_clones_share_flag() {
        let signal = ResetSignal::new();
        let settings_side = signal.clone();

        settings_side.request();
        settings_side.request();
        assert!(signal.take());
        assert!(!settings_side.is_requested());
    }
}
