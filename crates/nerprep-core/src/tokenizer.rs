//! Rule-based tokenizer
//!
//! Splits on whitespace, then peels leading and trailing punctuation off
//! each chunk into single-character tokens. Infix punctuation (hyphens,
//! apostrophes inside words) stays attached.

use crate::doc::Token;

/// Whitespace + punctuation tokenizer
#[derive(Debug, Clone)]
pub struct Tokenizer {
    prefixes: Vec<char>,
    suffixes: Vec<char>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self {
            prefixes: vec!['"', '\'', '(', '[', '{', '<', '$', '¿', '¡', '“', '‘'],
            suffixes: vec![
                '.', ',', '!', '?', ';', ':', ')', ']', '}', '>', '"', '\'', '%', '”', '’',
            ],
        }
    }
}

impl Tokenizer {
    /// Tokenize text into tokens with character offsets
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let chars: Vec<char> = text.chars().collect();
        let mut tokens = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            if chars[i].is_whitespace() {
                i += 1;
                continue;
            }

            let start = i;
            while i < chars.len() && !chars[i].is_whitespace() {
                i += 1;
            }
            self.split_chunk(&chars, start, i, &mut tokens);

            if i < chars.len() {
                if let Some(last) = tokens.last_mut() {
                    last.whitespace = true;
                }
            }
        }

        tokens
    }

    fn split_chunk(&self, chars: &[char], mut start: usize, mut end: usize, out: &mut Vec<Token>) {
        while start < end && self.prefixes.contains(&chars[start]) {
            out.push(make_token(chars, start, start + 1));
            start += 1;
        }

        let mut suffixes = Vec::new();
        while end > start && self.suffixes.contains(&chars[end - 1]) {
            suffixes.push(end - 1);
            end -= 1;
        }

        if start < end {
            out.push(make_token(chars, start, end));
        }
        for idx in suffixes.into_iter().rev() {
            out.push(make_token(chars, idx, idx + 1));
        }
    }
}

fn make_token(chars: &[char], start: usize, end: usize) -> Token {
    Token::new(chars[start..end].iter().collect::<String>(), start, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_basic_split() {
        let tokens = Tokenizer::default().tokenize("Hello, world!");
        assert_eq!(texts(&tokens), vec!["Hello", ",", "world", "!"]);
        assert_eq!(tokens[2].idx, 7);
        assert!(tokens[1].whitespace);
        assert!(!tokens[0].whitespace);
        assert!(!tokens[3].whitespace);
    }

    #[test]
    fn test_prefix_and_suffix() {
        let tokens = Tokenizer::default().tokenize("(\"quoted\")...");
        assert_eq!(
            texts(&tokens),
            vec!["(", "\"", "quoted", "\"", ")", ".", ".", "."]
        );
    }

    #[test]
    fn test_infix_kept() {
        let tokens = Tokenizer::default().tokenize("state-of-the-art don't");
        assert_eq!(texts(&tokens), vec!["state-of-the-art", "don't"]);
    }

    #[test]
    fn test_multiple_spaces() {
        let tokens = Tokenizer::default().tokenize("  a   b ");
        assert_eq!(texts(&tokens), vec!["a", "b"]);
        assert_eq!(tokens[0].idx, 2);
        assert_eq!(tokens[1].idx, 6);
        assert!(tokens[1].whitespace);
    }

    #[test]
    fn test_empty() {
        assert!(Tokenizer::default().tokenize("").is_empty());
        assert!(Tokenizer::default().tokenize(" \n\t").is_empty());
    }
}
