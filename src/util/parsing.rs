//! Token-level parsing shared by the grammar loaders.

use nom::branch::alt;
use nom::bytes::complete::{escaped_transform, is_not};
use nom::character::complete::{char, space0};
use nom::combinator::{all_consuming, map, opt, value};
use nom::multi::many0;
use nom::sequence::{delimited, preceded, terminated};
use nom::IResult;

/// A token of a grammar rule alternative.
///
/// A *token* can be of one of the following two forms:
///
/// * a bare string containing neither whitespace nor `'"'`, or
/// * a string delimited by `'"'` on both sides, in which `'\\'` and `'"'`
///   are backslash-escaped; the carried value is the unescaped content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Bare(String),
    Quoted(String),
}

impl Token {
    /// The terminal value the token denotes, with quoting stripped.
    pub fn unquoted(&self) -> &str {
        match self {
            Token::Bare(s) | Token::Quoted(s) => s,
        }
    }
}

fn quoted(input: &str) -> IResult<&str, Token> {
    map(
        delimited(
            char('"'),
            opt(escaped_transform(
                is_not("\\\""),
                '\\',
                alt((value("\\", char('\\')), value("\"", char('"')))),
            )),
            char('"'),
        ),
        |content: Option<String>| Token::Quoted(content.unwrap_or_default()),
    )(input)
}

fn bare(input: &str) -> IResult<&str, Token> {
    map(is_not(" \t\""), |s: &str| Token::Bare(s.to_owned()))(input)
}

fn token(input: &str) -> IResult<&str, Token> {
    alt((quoted, bare))(input)
}

/// Splits one rule alternative into tokens, respecting quoting.
/// Returns `None` if the alternative is not a sequence of valid tokens.
pub fn tokenize_alternative(input: &str) -> Option<Vec<Token>> {
    all_consuming(terminated(many0(preceded(space0, token)), space0))(input.trim())
        .ok()
        .map(|(_, tokens)| tokens)
}

/// `true` iff `name` is a terminal helper nonterminal (`T` followed by digits).
pub fn is_terminal_helper(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next() == Some('T')
        && name.len() >= 2
        && chars.all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_bare() {
        assert_eq!(
            tokenize_alternative("T0 A1"),
            Some(vec![
                Token::Bare("T0".to_owned()),
                Token::Bare("A1".to_owned()),
            ])
        );
    }

    #[test]
    fn tokenize_quoted_with_spaces() {
        assert_eq!(
            tokenize_alternative("  \"hello world\" "),
            Some(vec![Token::Quoted("hello world".to_owned())])
        );
    }

    #[test]
    fn tokenize_quoted_escapes() {
        assert_eq!(
            tokenize_alternative(r#""a\\b\"c""#),
            Some(vec![Token::Quoted("a\\b\"c".to_owned())])
        );
    }

    #[test]
    fn tokenize_empty() {
        assert_eq!(tokenize_alternative("   "), Some(vec![]));
    }

    #[test]
    fn tokenize_rejects_unterminated_quote() {
        assert_eq!(tokenize_alternative("\"abc"), None);
    }

    #[test]
    fn terminal_helper_names() {
        assert!(is_terminal_helper("T0"));
        assert!(is_terminal_helper("T17"));
        assert!(!is_terminal_helper("T"));
        assert!(!is_terminal_helper("Tx"));
        assert!(!is_terminal_helper("A0"));
        assert!(!is_terminal_helper("T0x"));
    }
}
