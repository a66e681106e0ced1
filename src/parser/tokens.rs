//! Quote-aware word splitting shared by the command-line parser, the
//! argument validator and the curl tool.

/// A whitespace-delimited word with its span in the source string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Word text with surrounding quotes removed
    pub text: String,
    /// Byte offset of the first character (including an opening quote)
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
    /// Whether the word began with a quote
    pub quoted: bool,
}

/// Split `input` into words.
///
/// A quote only opens at the start of a word, so apostrophes inside words
/// (`Today's`) stay literal. Inside double quotes a backslash escapes the
/// next character. An unterminated quote runs to the end of the input.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut text = String::new();
        let mut end = start;
        let quoted = c == '"' || c == '\'';

        if quoted {
            chars.next();
            end = start + c.len_utf8();
            while let Some((idx, ch)) = chars.next() {
                end = idx + ch.len_utf8();
                if ch == c {
                    break;
                }
                if ch == '\\' && c == '"' {
                    if let Some(&(next_idx, next)) = chars.peek() {
                        if next == '"' || next == '\\' {
                            chars.next();
                            end = next_idx + next.len_utf8();
                            text.push(next);
                            continue;
                        }
                    }
                }
                text.push(ch);
            }
        }

        // Unquoted word, or characters glued to a closing quote
        while let Some(&(idx, ch)) = chars.peek() {
            if ch.is_whitespace() {
                break;
            }
            chars.next();
            end = idx + ch.len_utf8();
            text.push(ch);
        }

        tokens.push(Token {
            text,
            start,
            end,
            quoted,
        });
    }

    tokens
}
