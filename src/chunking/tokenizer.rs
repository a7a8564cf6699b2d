//! Token-count estimation for chunk budgeting.
//!
//! The budget only needs a stable estimate, not an exact count, so the
//! default is a character heuristic (roughly four characters per token for
//! English prose). The `tiktoken` feature swaps in exact BPE counts.

/// Estimates the token count of `text` at ~4 characters per token.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Token length used throughout chunking.
///
/// With the `tiktoken` feature enabled this is an exact `cl100k_base`
/// count; otherwise it falls back to [`estimate_tokens`].
pub fn token_len(text: &str) -> usize {
    #[cfg(feature = "tiktoken")]
    if let Some(count) = bpe_token_len(text) {
        return count;
    }
    estimate_tokens(text)
}

#[cfg(feature = "tiktoken")]
fn bpe_token_len(text: &str) -> Option<usize> {
    use std::sync::OnceLock;
    use tiktoken_rs::CoreBPE;

    static BPE: OnceLock<Option<CoreBPE>> = OnceLock::new();
    BPE.get_or_init(|| tiktoken_rs::cl100k_base().ok())
        .as_ref()
        .map(|bpe| bpe.encode_with_special_tokens(text).len())
}
