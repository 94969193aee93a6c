//! Evaluation-context parameters.

/// Parameters for creating a text model's evaluation context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextParams {
    /// Context window in tokens.
    pub n_ctx: u32,
    /// Worker threads for decoding.
    pub n_threads: i32,
}

impl ContextParams {
    /// Build params from the boundary integers. A thread count ≤ 0 means
    /// "all hardware threads"; a negative window is clamped to 0 (model
    /// default).
    pub fn new(context_size: i32, thread_count: i32) -> Self {
        Self {
            n_ctx: context_size.max(0) as u32,
            n_threads: resolve_threads(thread_count),
        }
    }
}

impl Default for ContextParams {
    fn default() -> Self {
        Self::new(1024, 0)
    }
}

/// `requested` if positive, otherwise the available hardware parallelism.
pub fn resolve_threads(requested: i32) -> i32 {
    if requested > 0 {
        requested
    } else {
        std::thread::available_parallelism()
            .map(|n| n.get() as i32)
            .unwrap_or(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_thread_count_is_kept() {
        assert_eq!(ContextParams::new(512, 3).n_threads, 3);
    }

    #[test]
    fn non_positive_thread_count_uses_hardware() {
        let hw = std::thread::available_parallelism()
            .map(|n| n.get() as i32)
            .unwrap_or(4);
        assert_eq!(resolve_threads(0), hw);
        assert_eq!(resolve_threads(-2), hw);
    }

    #[test]
    fn negative_window_clamps_to_zero() {
        assert_eq!(ContextParams::new(-1, 1).n_ctx, 0);
    }
}
