//! Cache file naming from untrusted usernames

use sha2::{Digest, Sha256};

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
///
/// Dots and path separators never survive, so the result can't climb out of
/// the cache directory.
pub fn sanitize_username(username: &str) -> String {
    username
        .trim()
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}

/// Derive the cache file name for a username.
///
/// GitHub logins are case-insensitive, so the name is lowercased first. The
/// hash suffix keeps `a/b` and `a_b` apart. Returns `None` when nothing
/// identifying is left after sanitizing.
pub fn cache_file_name(username: &str) -> Option<String> {
    let login = username.trim().to_lowercase();
    let sanitized = sanitize_username(&login);
    if sanitized.chars().all(|c| c == '_') {
        return None;
    }

    let mut hasher = Sha256::new();
    hasher.update(login.as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    Some(format!("{}-{}.json", sanitized, &digest[..12]))
}
