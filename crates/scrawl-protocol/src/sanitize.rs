//! Normalization of free-text input from clients.

/// Longest username kept, in characters.
pub const MAX_USERNAME_LENGTH: usize = 20;
/// Longest chat message kept, in characters.
pub const MAX_CHAT_LENGTH: usize = 100;
/// Longest avatar seed kept, in characters.
pub const MAX_AVATAR_SEED_LENGTH: usize = 64;

const DEFAULT_USERNAME: &str = "Player";

/// Trims, drops control characters, and truncates a username. Falls back
/// to `"Player"` when nothing is left.
pub fn sanitize_username(raw: &str) -> String {
    let name: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_USERNAME_LENGTH)
        .collect();
    let name = name.trim();
    if name.is_empty() {
        DEFAULT_USERNAME.to_string()
    } else {
        name.to_string()
    }
}

/// Trims and truncates a chat message. Returns `None` for empty input.
pub fn sanitize_chat(raw: &str) -> Option<String> {
    let text: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_CHAT_LENGTH)
        .collect();
    let text = text.trim_end();
    (!text.is_empty()).then(|| text.to_string())
}

/// Normalizes a guess for comparison against the current word.
pub fn sanitize_guess(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn sanitize_avatar_seed(raw: &str) -> String {
    raw.chars().take(MAX_AVATAR_SEED_LENGTH).collect()
}

/// `#rgb` or `#rrggbb`.
pub fn is_hex_color(raw: &str) -> bool {
    match raw.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}
