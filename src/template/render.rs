//! Placeholder substitution for message templates

use super::payload::Payload;

const PLACEHOLDER_OPEN: &str = "{{.";
const PLACEHOLDER_CLOSE: &str = "}}";

/// Render a template by replacing every `{{.key}}` with the matching payload value.
///
/// The template is scanned once, left to right, so text produced by a
/// substitution is never scanned again and the result does not depend on the
/// payload's iteration order. Placeholders without a matching key are kept as
/// they are.
pub fn render(template: &str, payload: &Payload) -> String {
    if payload.is_empty() {
        return template.to_string();
    }

    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(PLACEHOLDER_OPEN) {
        rendered.push_str(&rest[..start]);
        let after_open = &rest[start + PLACEHOLDER_OPEN.len()..];

        let substitution = after_open.find(PLACEHOLDER_CLOSE).and_then(|end| {
            payload
                .get(&after_open[..end])
                .map(|value| (end, value))
        });

        match substitution {
            Some((end, value)) => {
                rendered.push_str(&value.to_string());
                rest = &after_open[end + PLACEHOLDER_CLOSE.len()..];
            }
            None => {
                // Keep the opener and resume right after it, so a real
                // placeholder nested in an unknown one is still found.
                rendered.push_str(PLACEHOLDER_OPEN);
                rest = after_open;
            }
        }
    }

    rendered.push_str(rest);
    rendered
}
