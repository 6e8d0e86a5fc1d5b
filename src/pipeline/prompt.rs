//! Prompt template for batch log review

/// System role directive sent with every batch
pub const SYSTEM_PROMPT: &str = "You are a security analyst.";

/// Separator placed between entries of one batch, and expected between
/// per-entry fragments of a response
pub const ENTRY_DELIMITER: &str = "\n\n";

/// Joins batch entries with [`ENTRY_DELIMITER`].
pub fn combine_entries<'a>(entries: impl IntoIterator<Item = &'a str>) -> String {
    entries.into_iter().collect::<Vec<_>>().join(ENTRY_DELIMITER)
}

/// Builds the user message for one combined batch.
///
/// When `framework` is set, each entry is additionally asked to be mapped to
/// that threat framework (for example `MITRE ATT&CK`).
pub fn user_prompt(combined_logs: &str, framework: Option<&str>) -> String {
    match framework {
        Some(name) => format!(
            "Analyze these logs for security threats. For each log entry, map any \
             identified threat to the matching {name} tactic and technique:\n{combined_logs}"
        ),
        None => format!("Analyze these logs for security threats:\n{combined_logs}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_entries() {
        assert_eq!(combine_entries(["a", "b", "c"]), "a\n\nb\n\nc");
        assert_eq!(combine_entries(["only"]), "only");
    }

    #[test]
    fn test_user_prompt_plain() {
        assert_eq!(
            user_prompt("failed login", None),
            "Analyze these logs for security threats:\nfailed login"
        );
    }

    #[test]
    fn test_user_prompt_with_framework() {
        let prompt = user_prompt("failed login", Some("MITRE ATT&CK"));
        assert!(prompt.contains("MITRE ATT&CK"));
        assert!(prompt.ends_with(":\nfailed login"));
    }
}
