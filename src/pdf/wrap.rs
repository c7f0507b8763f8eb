//! Line wrapping for table cells.

/// Measures rendered text width, in the same unit as the wrap width.
pub trait TextMeasure {
    fn width(&self, text: &str) -> f32;
}

/// Characters a line may break after, besides whitespace.
const BREAK_CHARS: [char; 6] = ['/', '-', '(', ')', ',', '.'];

#[derive(Debug, PartialEq, Eq)]
struct Token<'a> {
    text: &'a str,
    /// Whitespace separated it from the previous token in the source.
    spaced: bool,
}

/// Split into words and single break characters, dropping whitespace.
fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    let mut spaced = false;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() || BREAK_CHARS.contains(&c) {
            if let Some(s) = start.take() {
                tokens.push(Token { text: &text[s..i], spaced });
                spaced = false;
            }
            if c.is_whitespace() {
                spaced = true;
            } else {
                tokens.push(Token { text: &text[i..i + c.len_utf8()], spaced });
                spaced = false;
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(Token { text: &text[s..], spaced });
    }
    tokens
}

/// Wrap `text` into lines no wider than `width`.
///
/// Lines break at whitespace or after `/ - ( ) , .`. A word wider than the
/// whole line is split between characters. Empty input yields one empty line.
pub fn wrap_text(text: &str, width: f32, measure: &impl TextMeasure) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for token in tokenize(text) {
        let candidate = if current.is_empty() {
            token.text.to_string()
        } else if token.spaced {
            format!("{current} {}", token.text)
        } else {
            format!("{current}{}", token.text)
        };

        if measure.width(&candidate) <= width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if measure.width(token.text) <= width {
            current = token.text.to_string();
            continue;
        }

        for c in token.text.chars() {
            current.push(c);
            if measure.width(&current) > width && current.chars().count() > 1 {
                current.pop();
                lines.push(std::mem::replace(&mut current, c.to_string()));
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
