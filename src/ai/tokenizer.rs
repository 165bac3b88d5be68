//! Token Counting
//!
//! Approximates the token count of prompt and completion text for budgeting
//! and user feedback.
//!
//! ## Strategy
//! - Encode with the `cl100k_base` BPE vocabulary when it can be loaded
//! - Fall back to `round(words * 1.3)` when the tokenizer is unavailable or fails
//!
//! Estimates are a heuristic for warnings only, never billing-exact.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Once, OnceLock};

use tiktoken_rs::CoreBPE;
use tracing::{debug, warn};

use crate::constants::tokens::WORD_TOKEN_RATIO;

/// Token estimation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenEstimator {
    /// Sub-word BPE encoding, falling back to the word heuristic
    #[default]
    Bpe,
    /// Word-based heuristic only (1.3 tokens per word)
    WordBased,
}

/// Lazily loaded shared vocabulary; `None` once loading has failed
fn shared_bpe() -> Option<&'static CoreBPE> {
    static BPE: OnceLock<Option<CoreBPE>> = OnceLock::new();
    BPE.get_or_init(|| match tiktoken_rs::cl100k_base() {
        Ok(bpe) => Some(bpe),
        Err(e) => {
            warn!("BPE tokenizer unavailable, using word heuristic: {}", e);
            None
        }
    })
    .as_ref()
}

thread_local! {
    static QUIET_PANICS: Cell<bool> = const { Cell::new(false) };
}

/// Run `f`, turning a panic into `None` without reaching the panic hook
///
/// Wraps the installed hook once; panics on other threads still report.
fn quietly<R>(f: impl FnOnce() -> R) -> Option<R> {
    static WRAP_HOOK: Once = Once::new();
    WRAP_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !QUIET_PANICS.with(Cell::get) {
                previous(info);
            }
        }));
    });

    QUIET_PANICS.with(|quiet| quiet.set(true));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    QUIET_PANICS.with(|quiet| quiet.set(false));
    result.ok()
}

/// Token counter for prompt budgeting
#[derive(Debug, Clone, Default)]
pub struct TokenCounter {
    estimator: TokenEstimator,
}

impl TokenCounter {
    pub fn new(estimator: TokenEstimator) -> Self {
        Self { estimator }
    }

    /// Estimate token count for a string. Never fails.
    pub fn count(&self, text: &str) -> usize {
        match self.estimator {
            TokenEstimator::Bpe => self.count_bpe(text).unwrap_or_else(|| {
                debug!("Falling back to word heuristic for {} chars", text.len());
                Self::count_word_based(text)
            }),
            TokenEstimator::WordBased => Self::count_word_based(text),
        }
    }

    /// Saturating `u32` view of [`count`](Self::count), for request budgets
    pub fn count_u32(&self, text: &str) -> u32 {
        u32::try_from(self.count(text)).unwrap_or(u32::MAX)
    }

    fn count_bpe(&self, text: &str) -> Option<usize> {
        let bpe = shared_bpe()?;
        // A panicking encoder is treated like a missing one
        quietly(|| bpe.encode_with_special_tokens(text).len())
    }

    /// `round(words * 1.3)`
    fn count_word_based(text: &str) -> usize {
        let word_count = text.split_whitespace().count();
        (word_count as f64 * WORD_TOKEN_RATIO).round() as usize
    }
}

/// Estimate tokens with the default counter
pub fn estimate_tokens(text: &str) -> usize {
    TokenCounter::default().count(text)
}
