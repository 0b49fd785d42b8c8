//! Rendering of search hits into a prompt-ready context block.

use super::types::SearchHit;

/// Returned when a query matched nothing.
pub const NO_RESULTS: &str = "No relevant documents found.";
const HIT_SEPARATOR: &str = "\n\n---\n\n";

/// Render `hits` as `Heading:`/`Content:` blocks separated by horizontal rules.
pub fn render_context(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return NO_RESULTS.to_string();
    }
    hits.iter()
        .map(|hit| format!("Heading: {}\nContent: {}", hit.title, hit.content))
        .collect::<Vec<_>>()
        .join(HIT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(title: &str, content: &str) -> SearchHit {
        SearchHit {
            id: title.into(),
            score: None,
            title: title.into(),
            content: content.into(),
            source: "manual.pdf".into(),
        }
    }

    #[test]
    fn empty_hits_render_placeholder() {
        assert_eq!(render_context(&[]), NO_RESULTS);
    }

    #[test]
    fn hits_are_separated_by_rules() {
        let rendered = render_context(&[hit("Setup", "Plug it in."), hit("Reset", "Hold the button.")]);
        assert_eq!(
            rendered,
            "Heading: Setup\nContent: Plug it in.\n\n---\n\nHeading: Reset\nContent: Hold the button."
        );
    }
}
