//! Text layout: tokenizing, greedy line breaking and justification
//!
//! Lines are measured in points through a [`TextMeasure`]; callers convert to
//! document units. Hard line breaks (`\n`) always start a new paragraph.

use crate::fonts::TextMeasure;
use unicode_script::{Script, UnicodeScript};
use unicode_segmentation::UnicodeSegmentation;

/// Text tokens for paragraph composition.
#[derive(Debug, Clone, PartialEq)]
pub enum TextToken {
    Word(String),
    Space(String),
}

impl TextToken {
    pub fn as_str(&self) -> &str {
        match self {
            TextToken::Word(text) | TextToken::Space(text) => text,
        }
    }
}

/// A laid-out line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedLine {
    pub text: String,
    /// Natural width in points.
    pub width: f32,
    /// Extra points added after every space when justified.
    pub word_spacing: f32,
    /// Last line of a hard line (never justified).
    pub ends_paragraph: bool,
}

impl FormattedLine {
    fn new(text: String, width: f32) -> Self {
        Self {
            text,
            width,
            word_spacing: 0.0,
            ends_paragraph: false,
        }
    }

    pub fn space_count(&self) -> usize {
        self.text.chars().filter(|ch| *ch == ' ').count()
    }

    pub fn is_justified(&self) -> bool {
        self.word_spacing > 0.0
    }

    /// Width in points once justification is applied.
    pub fn justified_width(&self) -> f32 {
        self.width + self.word_spacing * self.space_count() as f32
    }
}

/// Ideographic scripts break between any two characters.
pub fn is_ideographic(ch: char) -> bool {
    matches!(
        ch.script(),
        Script::Han | Script::Hiragana | Script::Katakana | Script::Bopomofo
    )
}

/// Splits text into words and runs of whitespace.
///
/// Punctuation stays attached to the word it touches so a line never starts
/// with a stray comma; ideographs become words of their own.
pub fn tokenize(text: &str) -> Vec<TextToken> {
    let mut tokens: Vec<TextToken> = Vec::new();
    let mut current_word = String::new();

    for segment in text.split_word_bounds() {
        if segment.chars().all(char::is_whitespace) {
            if !current_word.is_empty() {
                tokens.push(TextToken::Word(std::mem::take(&mut current_word)));
            }
            match tokens.last_mut() {
                Some(TextToken::Space(run)) => run.push_str(segment),
                _ => tokens.push(TextToken::Space(segment.to_string())),
            }
        } else if segment.chars().next().is_some_and(is_ideographic) {
            if !current_word.is_empty() {
                tokens.push(TextToken::Word(std::mem::take(&mut current_word)));
            }
            tokens.push(TextToken::Word(segment.to_string()));
        } else {
            current_word.push_str(segment);
        }
    }

    if !current_word.is_empty() {
        tokens.push(TextToken::Word(current_word));
    }

    tokens
}

/// Greedy line breaker.
pub struct TextLayoutEngine<M: TextMeasure> {
    measure: M,
}

impl<M: TextMeasure> TextLayoutEngine<M> {
    pub fn new(measure: M) -> Self {
        Self { measure }
    }

    /// Breaks `text` into lines no wider than `max_width` points where possible.
    ///
    /// Without a width every hard line becomes one line. A word wider than the
    /// limit is placed alone on its own line rather than split.
    pub fn wrap(&self, text: &str, max_width: Option<f32>) -> Vec<FormattedLine> {
        let mut lines = Vec::new();

        for paragraph in text.split('\n') {
            let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
            let start = lines.len();

            match max_width {
                Some(limit) => self.greedy_line_breaks(paragraph, limit, &mut lines),
                None => lines.push(self.line(paragraph.to_string())),
            }

            if lines.len() == start {
                lines.push(self.line(String::new()));
            }
            if let Some(last) = lines.last_mut() {
                last.ends_paragraph = true;
            }
        }

        lines
    }

    fn greedy_line_breaks(&self, paragraph: &str, max_width: f32, out: &mut Vec<FormattedLine>) {
        let mut current: Vec<TextToken> = Vec::new();
        let mut width = 0.0;
        let mut has_word = false;

        for token in tokenize(paragraph) {
            let token_width = self.measure.text_width(token.as_str());
            match token {
                // Leading whitespace of a line is dropped.
                TextToken::Space(_) if current.is_empty() => {}
                TextToken::Space(_) => {
                    width += token_width;
                    current.push(token);
                }
                TextToken::Word(_) => {
                    if has_word && width + token_width > max_width {
                        out.push(self.finish_line(&mut current));
                        width = 0.0;
                    }
                    width += token_width;
                    has_word = true;
                    current.push(token);
                }
            }
        }

        if !current.is_empty() {
            out.push(self.finish_line(&mut current));
        }
    }

    fn finish_line(&self, tokens: &mut Vec<TextToken>) -> FormattedLine {
        while matches!(tokens.last(), Some(TextToken::Space(_))) {
            tokens.pop();
        }
        let text: String = tokens.drain(..).map(|token| match token {
            TextToken::Word(word) | TextToken::Space(word) => word,
        }).collect();
        self.line(text)
    }

    fn line(&self, text: String) -> FormattedLine {
        let width = self.measure.text_width(&text);
        FormattedLine::new(text, width)
    }
}

/// Spreads the slack of a line over its spaces so it fills `max_width` points.
///
/// The last line of a paragraph, lines without spaces and overfull lines are
/// left untouched.
pub fn justify_line(line: &mut FormattedLine, max_width: f32) {
    if line.ends_paragraph {
        return;
    }
    let spaces = line.space_count();
    let slack = max_width - line.width;
    if spaces == 0 || slack <= 0.0 {
        return;
    }
    line.word_spacing = slack / spaces as f32;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One point per character.
    struct Mono;

    impl TextMeasure for Mono {
        fn text_width(&self, text: &str) -> f32 {
            text.chars().count() as f32
        }
    }

    fn texts(lines: &[FormattedLine]) -> Vec<&str> {
        lines.iter().map(|line| line.text.as_str()).collect()
    }

    #[test]
    fn test_tokenize_keeps_punctuation_with_words() {
        let tokens = tokenize("Hello, world!");
        assert_eq!(
            tokens,
            vec![
                TextToken::Word("Hello,".into()),
                TextToken::Space(" ".into()),
                TextToken::Word("world!".into()),
            ]
        );
    }

    #[test]
    fn test_tokenize_splits_ideographs() {
        let tokens = tokenize("中文ab");
        let words: Vec<&str> = tokens.iter().map(TextToken::as_str).collect();
        assert_eq!(words, vec!["中", "文", "ab"]);
    }

    #[test]
    fn test_wrap_without_width_splits_only_hard_lines() {
        let engine = TextLayoutEngine::new(Mono);
        let lines = engine.wrap("one two\nthree", None);
        assert_eq!(texts(&lines), vec!["one two", "three"]);
        assert!(lines.iter().all(|line| line.ends_paragraph));
    }

    #[test]
    fn test_greedy_breaks() {
        let engine = TextLayoutEngine::new(Mono);
        let lines = engine.wrap("aaa bbb ccc ddd", Some(7.0));
        assert_eq!(texts(&lines), vec!["aaa bbb", "ccc ddd"]);
        assert!(!lines[0].ends_paragraph);
        assert!(lines[1].ends_paragraph);
    }

    #[test]
    fn test_exact_fit_does_not_break() {
        let engine = TextLayoutEngine::new(Mono);
        let lines = engine.wrap("abc def", Some(7.0));
        assert_eq!(texts(&lines), vec!["abc def"]);
    }

    #[test]
    fn test_long_word_stands_alone() {
        let engine = TextLayoutEngine::new(Mono);
        let lines = engine.wrap("a incomprehensibilities b", Some(5.0));
        assert_eq!(texts(&lines), vec!["a", "incomprehensibilities", "b"]);
    }

    #[test]
    fn test_empty_text_is_one_empty_line() {
        let engine = TextLayoutEngine::new(Mono);
        let lines = engine.wrap("", Some(10.0));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].width, 0.0);
    }

    #[test]
    fn test_justify_skips_paragraph_end() {
        let engine = TextLayoutEngine::new(Mono);
        let mut lines = engine.wrap("aa bb cc dd ee", Some(9.0));
        for line in &mut lines {
            justify_line(line, 9.0);
        }
        assert_eq!(texts(&lines), vec!["aa bb cc", "dd ee"]);
        assert!((lines[0].word_spacing - 0.5).abs() < 1e-6);
        assert!((lines[0].justified_width() - 9.0).abs() < 1e-6);
        assert_eq!(lines[1].word_spacing, 0.0);
    }

    #[test]
    fn test_justify_ignores_lines_without_spaces() {
        let mut line = FormattedLine::new("abc".into(), 3.0);
        justify_line(&mut line, 10.0);
        assert!(!line.is_justified());
    }
}
