//! Left-aligned text inside a widget rectangle

use super::fonts::FontSource;
use crate::geometry::Rectangle;

/// Gap between the rectangle edge and the text
pub const PADDING: f64 = 1.0;

/// Lines of one text box at one font size
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub lines: Vec<String>,
    pub font_size: f64,
    pub line_height: f64,
    /// Vertical space left after the last line; negative on overflow
    pub fit: f64,
    /// Lines that fit inside the box
    pub visible: usize,
}

impl TextLayout {
    pub fn overflows(&self) -> bool {
        self.fit < 0.0
    }

    pub fn visible_lines(&self) -> &[String] {
        &self.lines[..self.visible]
    }
}

/// Break `word` into pieces no wider than `max_width`; a piece holds at
/// least one character
fn break_word(word: &str, font: &FontSource, font_size: f64, max_width: f64) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut width = 0.0;
    for ch in word.chars() {
        let w = font.char_width(ch, font_size);
        if !current.is_empty() && width + w > max_width {
            pieces.push(std::mem::take(&mut current));
            width = 0.0;
        }
        current.push(ch);
        width += w;
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Greedy word wrap. Explicit newlines always start a new line, words
/// wider than the box are broken by character.
pub fn wrap(text: &str, font: &FontSource, font_size: f64, max_width: f64) -> Vec<String> {
    let space = font.char_width(' ', font_size);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        let mut width = 0.0;

        for word in paragraph.split_whitespace() {
            let word_width = font.text_width(word, font_size);

            if word_width > max_width {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                let mut pieces = break_word(word, font, font_size, max_width);
                let last = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
                width = font.text_width(&last, font_size);
                line = last;
                continue;
            }

            if line.is_empty() {
                line.push_str(word);
                width = word_width;
            } else if width + space + word_width <= max_width {
                line.push(' ');
                line.push_str(word);
                width += space + word_width;
            } else {
                lines.push(std::mem::replace(&mut line, word.to_string()));
                width = word_width;
            }
        }
        lines.push(line);
    }

    // Trailing blank lines take space without showing anything
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines
}

/// Lay out `text` in `rect` at `font_size`
pub fn layout(text: &str, font: &FontSource, rect: &Rectangle, font_size: f64) -> TextLayout {
    let inner = rect.inset(PADDING, PADDING);
    let lines = wrap(text, font, font_size, inner.width());
    let line_height = font.line_height(font_size);
    let needed = lines.len() as f64 * line_height;
    let fit = inner.height() - needed;
    let visible = if line_height > 0.0 {
        ((inner.height() / line_height).floor().max(0.0) as usize).min(lines.len())
    } else {
        0
    };

    TextLayout {
        lines,
        font_size,
        line_height,
        fit,
        visible,
    }
}

/// Base size when the text fits, otherwise the fallback size with the
/// lines that fit there
pub fn fit_text(
    text: &str,
    font: &FontSource,
    rect: &Rectangle,
    base_size: f64,
    fallback_size: f64,
) -> TextLayout {
    let first = layout(text, font, rect, base_size);
    if !first.overflows() {
        return first;
    }
    tracing::debug!(
        fit = first.fit,
        base_size,
        fallback_size,
        "text overflows widget, retrying smaller"
    );
    layout(text, font, rect, fallback_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn helvetica() -> FontSource {
        FontSource::Standard
    }

    #[test]
    fn test_wrap_words() {
        // "aaa" = 3 * 556 = 1668 units -> 16.68 pt at 10 pt
        let lines = wrap("aaa aaa aaa", &helvetica(), 10.0, 40.0);
        assert_eq!(lines, vec!["aaa aaa", "aaa"]);
    }

    #[test]
    fn test_wrap_honours_newlines() {
        let lines = wrap("Jan\nKowalski", &helvetica(), 9.0, 500.0);
        assert_eq!(lines, vec!["Jan", "Kowalski"]);
    }

    #[test]
    fn test_wrap_breaks_long_words() {
        // each 'a' is 5.56 pt at 10 pt; 20 pt holds three
        let lines = wrap("aaaaaaa", &helvetica(), 10.0, 20.0);
        assert_eq!(lines, vec!["aaa", "aaa", "a"]);
    }

    #[test]
    fn test_wrap_never_drops_characters() {
        let text = "Upadek na śliskiej podłodze w hali magazynowej";
        let lines = wrap(text, &helvetica(), 9.0, 30.0);
        let joined = lines.concat().replace(' ', "");
        let expected: String = text.split_whitespace().collect();
        assert_eq!(joined, expected);
    }

    #[test]
    fn test_layout_single_line_fits() {
        let rect = Rectangle::from_position_and_size(0.0, 0.0, 200.0, 14.0);
        let layout = layout("Jan Kowalski", &helvetica(), &rect, 9.0);
        assert_eq!(layout.lines.len(), 1);
        assert!(!layout.overflows());
        assert_eq!(layout.visible, 1);
    }

    #[test]
    fn test_fit_text_falls_back_and_truncates() {
        let rect = Rectangle::from_position_and_size(0.0, 0.0, 120.0, 30.0);
        let text = "Poszkodowany poślizgnął się na mokrej posadzce. ".repeat(6);
        let result = fit_text(&text, &helvetica(), &rect, 9.0, 7.0);

        assert_eq!(result.font_size, 7.0);
        assert!(result.overflows());
        assert!(result.visible >= 1);
        assert!(result.visible < result.lines.len());
        assert_eq!(result.visible_lines().len(), result.visible);
    }

    #[test]
    fn test_fit_text_keeps_base_size() {
        let rect = Rectangle::from_position_and_size(0.0, 0.0, 200.0, 40.0);
        let result = fit_text("10.03.2024", &helvetica(), &rect, 9.0, 7.0);
        assert_eq!(result.font_size, 9.0);
    }
}
