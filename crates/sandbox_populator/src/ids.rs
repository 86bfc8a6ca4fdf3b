//! Deterministic naming for populated entities.
//!
//! Everything the pipeline creates is named from (username, index) alone,
//! which is what makes re-runs recognise their own output.

/// Derive the short bank-id prefix for a username: lowercase, keep only
/// ASCII letters and digits, drop vowels, truncate to 4 characters.
///
/// This is a heuristic, not a collision-free scheme: distinct usernames can
/// reduce to the same stub, and the sandbox's own uniqueness constraints
/// are the only guard.
pub fn bank_id_prefix(username: &str) -> String {
    username
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .filter(|c| !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'))
        .take(4)
        .collect()
}

/// Bank id for the i-th bank under a prefix, e.g. `lc.bnk.1`
pub fn bank_id(prefix: &str, index: u32) -> String {
    format!("{}.bnk.{}", prefix, index)
}

/// Display name for the i-th bank, e.g. `alice Test Bank 1`
pub fn bank_full_name(username: &str, index: u32) -> String {
    format!("{} Test Bank {}", username, index)
}

/// Short name for the i-th bank, e.g. `TB1`
pub fn bank_short_name(index: u32) -> String {
    format!("TB{}", index)
}

/// Bank code for the i-th bank, e.g. `TB1BW`
pub fn bank_code(index: u32) -> String {
    format!("TB{}BW", index)
}

/// Label for the j-th account at a bank, e.g. `Account 1`
pub fn account_label(index: u32) -> String {
    format!("Account {}", index)
}

/// Description for the transfer `month` months back (zero-based), e.g.
/// `Monthly transfer 1` for the current month
pub fn transfer_description(month: u32) -> String {
    format!("Monthly transfer {}", month + 1)
}
