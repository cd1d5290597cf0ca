//! System prompt rendering.

/// Placeholder replaced with the sentinel in the prompt template.
pub const SENTINEL_PLACEHOLDER: &str = "{sentinel}";

/// Substitute the sentinel into a prompt template and trim surrounding blank lines.
pub fn render_system_prompt(template: &str, sentinel: &str) -> String {
    template.replace(SENTINEL_PLACEHOLDER, sentinel).trim().to_string()
}
