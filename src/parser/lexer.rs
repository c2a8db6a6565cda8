// Lexical helpers shared by the encoding parser

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, take_while},
    character::complete::{char, multispace0, satisfy},
    combinator::{map, opt, recognize, value},
    sequence::{delimited, pair},
    IResult,
};

/// Wrap a parser so it skips surrounding whitespace
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Bare column name: a letter or underscore, then letters, digits, `_` or `.`
pub fn identifier(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            satisfy(|c| c.is_alphabetic() || c == '_'),
            take_while(|c: char| c.is_alphanumeric() || c == '_' || c == '.'),
        )),
        String::from,
    )(input)
}

/// Double-quoted string with `\"`, `\\` and `\n` escapes
pub fn string_literal(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(
                is_not("\\\""),
                '\\',
                alt((
                    value("\\", tag("\\")),
                    value("\"", tag("\"")),
                    value("\n", tag("n")),
                )),
            )),
            Option::unwrap_or_default,
        ),
        char('"'),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier() {
        assert_eq!(identifier("sepal_length, y"), Ok((", y", "sepal_length".to_string())));
        assert_eq!(identifier("score.1)"), Ok((")", "score.1".to_string())));
        assert!(identifier("1abc").is_err());
        assert!(identifier("").is_err());
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(
            string_literal("\"Body Mass (g)\" rest"),
            Ok((" rest", "Body Mass (g)".to_string()))
        );
        assert_eq!(string_literal(r#""say \"hi\"""#), Ok(("", "say \"hi\"".to_string())));
        assert_eq!(string_literal("\"\""), Ok(("", String::new())));
        assert!(string_literal("\"unterminated").is_err());
    }

    #[test]
    fn test_ws() {
        let mut p = ws(identifier);
        assert_eq!(p("   abc  ,"), Ok((",", "abc".to_string())));
    }
}
