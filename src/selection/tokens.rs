pub trait TokenEstimator {
    fn estimate(&self, text: &str) -> usize;

    /// Absent text costs nothing.
    fn estimate_opt(&self, text: Option<&str>) -> usize {
        match text {
            Some(t) => self.estimate(t),
            None => 0,
        }
    }
}

/// v0: Approximate GPT-style tokenization
/// tokens(text) := ceil(len(text) / 4)
///
/// Deterministic, O(len), and monotonic: longer text never yields fewer
/// tokens. Exactness is not a goal; the budget math only needs a stable
/// approximation.
#[derive(Debug, Default, Clone, Copy)]
pub struct ApproxTokenEstimator;

impl TokenEstimator for ApproxTokenEstimator {
    fn estimate(&self, text: &str) -> usize {
        // Integer division ceil(len / 4) equivalent to (len + 4 - 1) / 4
        if text.is_empty() {
            0
        } else {
            (text.len() + 3) / 4
        }
    }
}
