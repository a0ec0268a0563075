//! Reply sanitization: replace vendor mentions with the product name.

use regex::Regex;

use nimbus_core::defaults;

/// Compile the case-insensitive whole-word vendor pattern.
pub fn vendor_pattern() -> Regex {
    Regex::new(r"(?i)\b(?:gemini|google)\b").expect("vendor pattern is valid")
}

/// Replace every whole-word vendor mention with the neutral assistant
/// name. Partial-word matches are left untouched.
pub fn sanitize_reply(pattern: &Regex, reply: &str) -> String {
    pattern
        .replace_all(reply, defaults::ASSISTANT_NAME)
        .into_owned()
}
