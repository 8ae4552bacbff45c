//! Deterministic resource naming
//!
//! Re-running a deployment must target the same underlying resources, so
//! every generated name embeds a short digest of its semantic key instead
//! of a random suffix.

use sha2::{Digest, Sha256};

/// Length of the generated identifier in hex characters
const ID_LEN: usize = 10;

/// Derive a stable short identifier from a semantic key.
///
/// Same key, same id, on every run. Callers include the stack name in the
/// key to keep deployments from colliding with each other.
pub fn deterministic_id(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    let mut id = String::with_capacity(ID_LEN);
    for byte in digest.iter() {
        if id.len() >= ID_LEN {
            break;
        }
        id.push_str(&format!("{byte:02x}"));
    }
    id.truncate(ID_LEN);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_across_calls() {
        let a = deterministic_id("demo/jira");
        let b = deterministic_id("demo/jira");
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_keys_differ() {
        assert_ne!(deterministic_id("demo/jira"), deterministic_id("demo/slack"));
        assert_ne!(deterministic_id("demo/jira"), deterministic_id("other/jira"));
    }

    #[test]
    fn test_format() {
        let id = deterministic_id("demo/jira");
        assert_eq!(id.len(), 10);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
