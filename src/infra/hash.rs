use std::hash::Hasher;

use twox_hash::XxHash64;

pub fn hash64(text: &str) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(text.as_bytes());
    hasher.finish()
}

/// Hash of diff text after newline normalization, so CRLF and LF copies of the
/// same diff are recognized as identical input.
pub fn hash_diff(diff_text: &str) -> u64 {
    hash64(&super::diff::normalize_newlines(diff_text))
}
