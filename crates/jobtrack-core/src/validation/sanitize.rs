//! Input sanitization helpers.

/// Strip NUL and other C0/C1 control characters from a string and trim
/// surrounding whitespace. Multi-line fields keep `\n` and `\t`.
pub fn strip_control_chars(s: &str, keep_newlines: bool) -> String {
    s.chars()
        .filter(|c| {
            if c.is_control() {
                keep_newlines && (*c == '\n' || *c == '\t')
            } else {
                true
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Normalize a phone number to digits with an optional leading `+`.
/// Punctuation and spacing accepted by validation are dropped.
pub fn normalize_phone(s: &str) -> String {
    let trimmed = s.trim();
    let mut normalized = String::with_capacity(trimmed.len());
    for (i, c) in trimmed.chars().enumerate() {
        if c == '+' && i == 0 {
            normalized.push(c);
        } else if c.is_ascii_digit() {
            normalized.push(c);
        }
    }
    normalized
}
