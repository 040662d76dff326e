use crate::constants::CRISIS_MARKER;

/// Companion reply with the crisis control marker removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanReply {
    pub text: String,
    /// The raw reply carried the marker; crisis resources must be surfaced.
    pub crisis: bool,
}

/// Strip every occurrence of the crisis marker from `raw`.
#[must_use]
pub fn extract_crisis_marker(raw: &str) -> CleanReply {
    if !raw.contains(CRISIS_MARKER) {
        return CleanReply { text: raw.to_owned(), crisis: false };
    }
    CleanReply {
        text: raw.replace(CRISIS_MARKER, "").trim().to_owned(),
        crisis: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_reply_untouched() {
        let reply = extract_crisis_marker("  You are doing well. ");
        assert_eq!(reply.text, "  You are doing well. ");
        assert!(!reply.crisis);
    }

    #[test]
    fn marker_stripped_and_flagged() {
        let reply = extract_crisis_marker("[TRIGGER_SOS] Please reach out to someone you trust.");
        assert_eq!(reply.text, "Please reach out to someone you trust.");
        assert!(reply.crisis);
    }

    #[test]
    fn repeated_marker_fully_removed() {
        let reply = extract_crisis_marker("Stay safe.[TRIGGER_SOS][TRIGGER_SOS]");
        assert_eq!(reply.text, "Stay safe.");
        assert!(reply.crisis);
    }
}
