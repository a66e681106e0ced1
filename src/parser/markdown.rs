use pulldown_cmark::{Event, Parser, Tag, TagEnd};

const MAX_DESCRIPTION_CHARS: usize = 80;

/// Extracts a one-line description from a prompt body.
///
/// Takes the plain text of the first heading or paragraph, keeps only its
/// first sentence and truncates it to 80 characters (Unicode-safe).
/// Returns `None` when the body has no text block.
///
/// # Example
/// ```
/// use pal::parser::extract_description;
/// let body = "# Create a `git` commit\n\nMore details.";
/// assert_eq!(extract_description(body).as_deref(), Some("Create a git commit"));
/// ```
pub fn extract_description(body: &str) -> Option<String> {
    let mut text = String::new();
    let mut in_block = false;

    for event in Parser::new(body) {
        match event {
            Event::Start(Tag::Heading { .. }) | Event::Start(Tag::Paragraph) => {
                in_block = true;
            }
            Event::End(TagEnd::Heading(_)) | Event::End(TagEnd::Paragraph) => {
                if !text.trim().is_empty() {
                    break;
                }
                in_block = false;
                text.clear();
            }
            Event::Text(t) | Event::Code(t) if in_block => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak if in_block => text.push(' '),
            _ => {}
        }
    }

    let mut line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if line.is_empty() {
        return None;
    }

    if let Some(idx) = line.find(". ") {
        line.truncate(idx + 1);
    }

    if line.chars().count() > MAX_DESCRIPTION_CHARS {
        let truncate_index = line
            .char_indices()
            .nth(MAX_DESCRIPTION_CHARS - 3)
            .map(|(i, _)| i)
            .unwrap_or(line.len());
        line.truncate(truncate_index);
        line.push_str("...");
    }

    Some(line)
}
