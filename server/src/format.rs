//! ANSI presentation for the message kinds the server emits.
//!
//! Formatting is cosmetic: clients print these lines as-is. The four
//! kinds (broadcast, private, info, error) stay visually distinguishable
//! and the payload text is carried verbatim.

const YELLOW_BOLD_BRIGHT: &str = "\u{1b}[1;93m";
const WHITE_BOLD: &str = "\u{1b}[1;37m";
const RED_BOLD_BRIGHT: &str = "\u{1b}[1;91m";
const BLUE_BACKGROUND: &str = "\u{1b}[44m";
const RESET: &str = "\u{1b}[0m";

/// Regular chat message, prefixed with the highlighted sender.
pub fn broadcast(sender: &str, msg: &str) -> String {
    format!("{YELLOW_BOLD_BRIGHT}{sender}{RESET}❯ {msg}")
}

/// Private message; double chevron sets it apart from broadcasts.
pub fn private(sender: &str, msg: &str) -> String {
    format!("{YELLOW_BOLD_BRIGHT}{sender}{RESET}❯❯ {msg}")
}

/// Informational notice (welcome, join, departure, goodbye).
pub fn info(msg: &str) -> String {
    format!("{WHITE_BOLD}{msg}{RESET}")
}

/// Error reported back to the requesting client only.
pub fn error(msg: &str) -> String {
    format!("{RED_BOLD_BRIGHT}⚠ ERROR: {msg}{RESET}")
}

/// Fact banner; renders as multiple lines on the client's terminal.
pub fn fact(fact: &str) -> String {
    format!("{BLUE_BACKGROUND}\nDid you know: {fact}\n\n{RESET}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_is_carried_verbatim() {
        assert!(broadcast("alice", "hello there").contains("hello there"));
        assert!(private("alice", "psst").contains("psst"));
        assert!(info("alice joined the chat!").contains("alice joined the chat!"));
        assert!(error("nope").contains("nope"));
        assert!(fact("Penguins!").contains("Penguins!"));
    }

    #[test]
    fn kinds_are_distinguishable() {
        let plain = broadcast("alice", "msg");
        let whisper = private("alice", "msg");
        assert_ne!(plain, whisper);
        assert!(plain.contains("❯ "));
        assert!(whisper.contains("❯❯ "));
        assert!(error("msg").contains("⚠ ERROR:"));
        assert!(fact("msg").contains("Did you know:"));
    }

    #[test]
    fn sender_prefix_names_the_sender() {
        assert!(broadcast("bob", "hi").contains("bob"));
        assert!(private("bob", "hi").contains("bob"));
    }
}
