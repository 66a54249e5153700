//! Username admission rule.
//!
//! There is no authentication beyond this: a player is whoever they say
//! they are, as long as the name is plain ASCII letters and digits.

use crate::RegistryError;

/// Longest username accepted.
pub const MAX_USERNAME_LEN: usize = 32;

/// Checks that `username` is non-empty, at most [`MAX_USERNAME_LEN`]
/// bytes, and ASCII alphanumeric only.
///
/// ```rust
/// use trivia_registry::validate_username;
///
/// assert!(validate_username("alice42").is_ok());
/// assert!(validate_username("alice 42").is_err());
/// ```
pub fn validate_username(username: &str) -> Result<(), RegistryError> {
    let valid = !username.is_empty()
        && username.len() <= MAX_USERNAME_LEN
        && username.bytes().all(|b| b.is_ascii_alphanumeric());

    if valid {
        Ok(())
    } else {
        Err(RegistryError::InvalidUsername(username.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_accepts_letters_and_digits() {
        assert!(validate_username("a").is_ok());
        assert!(validate_username("Player1").is_ok());
        assert!(validate_username("123").is_ok());
    }

    #[test]
    fn test_validate_username_rejects_empty() {
        assert!(validate_username("").is_err());
    }

    #[test]
    fn test_validate_username_rejects_symbols_and_spaces() {
        for name in ["bad name", "bad_name", "bad-name", "name!", " alice", "alice\n"] {
            assert!(
                matches!(validate_username(name), Err(RegistryError::InvalidUsername(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_username_rejects_non_ascii_letters() {
        assert!(validate_username("zoë").is_err());
    }

    #[test]
    fn test_validate_username_rejects_overlong() {
        let name = "a".repeat(MAX_USERNAME_LEN + 1);
        assert!(validate_username(&name).is_err());
        assert!(validate_username(&name[..MAX_USERNAME_LEN]).is_ok());
    }
}
