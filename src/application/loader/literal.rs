//! Parser for flat list literals such as `['1970s', "1980s", 3, None]`.
//!
//! Fixtures exported by spreadsheet tooling write array columns in this
//! notation. Items are quoted strings, numbers, `True`, `False` or `None`.
//! Anything else, bare words and nested containers included, is an error so
//! the caller can fall back to the raw string.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralError {
    pub position: usize,
    pub message: &'static str,
}

impl std::fmt::Display for LiteralError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at byte {}", self.message, self.position)
    }
}

impl std::error::Error for LiteralError {}

/// Parse a list literal into its items rendered as strings.
///
/// Quoted items keep their text, numbers and booleans keep their spelling and
/// `None` becomes a missing item.
pub fn parse_list(input: &str) -> Result<Vec<Option<String>>, LiteralError> {
    let mut parser = Parser {
        chars: input.char_indices().peekable(),
        len: input.len(),
    };
    let items = parser.list()?;
    parser.skip_whitespace();
    match parser.chars.peek() {
        None => Ok(items),
        Some(&(pos, _)) => Err(LiteralError {
            position: pos,
            message: "trailing characters after list",
        }),
    }
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    len: usize,
}

impl Parser<'_> {
    fn position(&mut self) -> usize {
        self.chars.peek().map_or(self.len, |&(pos, _)| pos)
    }

    fn error(&mut self, message: &'static str) -> LiteralError {
        LiteralError {
            position: self.position(),
            message,
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn list(&mut self) -> Result<Vec<Option<String>>, LiteralError> {
        self.skip_whitespace();
        if !matches!(self.chars.next(), Some((_, '['))) {
            return Err(LiteralError {
                position: 0,
                message: "expected '['",
            });
        }

        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.chars.peek() {
                Some((_, ']')) => {
                    self.chars.next();
                    return Ok(items);
                }
                None => return Err(self.error("unterminated list")),
                _ => {}
            }

            items.push(self.item()?);

            self.skip_whitespace();
            match self.chars.next() {
                Some((_, ',')) => continue,
                Some((_, ']')) => return Ok(items),
                Some(_) => return Err(self.error("expected ',' or ']'")),
                None => return Err(self.error("unterminated list")),
            }
        }
    }

    fn item(&mut self) -> Result<Option<String>, LiteralError> {
        match self.chars.peek() {
            Some(&(_, quote @ ('\'' | '"'))) => {
                self.chars.next();
                self.quoted(quote).map(Some)
            }
            Some((_, '[' | '{' | '(')) => Err(self.error("nested containers are not supported")),
            _ => self.bare(),
        }
    }

    fn quoted(&mut self, quote: char) -> Result<String, LiteralError> {
        let mut out = String::new();
        loop {
            match self.chars.next() {
                None => return Err(self.error("unterminated string")),
                Some((_, c)) if c == quote => return Ok(out),
                Some((_, '\\')) => match self.chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, 'r')) => out.push('\r'),
                    Some((_, '0')) => out.push('\0'),
                    Some((_, c @ ('\\' | '\'' | '"'))) => out.push(c),
                    Some((_, c)) => {
                        out.push('\\');
                        out.push(c);
                    }
                    None => return Err(self.error("unterminated escape")),
                },
                Some((_, c)) => out.push(c),
            }
        }
    }

    fn bare(&mut self) -> Result<Option<String>, LiteralError> {
        let start = self.position();
        let mut out = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if c == ',' || c == ']' || c.is_whitespace() {
                break;
            }
            out.push(c);
            self.chars.next();
        }
        if out.is_empty() {
            return Err(self.error("empty list item"));
        }
        if out == "None" {
            return Ok(None);
        }
        if out == "True" || out == "False" || is_number(&out) {
            return Ok(Some(out));
        }
        Err(LiteralError {
            position: start,
            message: "bare item is not a number, boolean or None",
        })
    }
}

/// Integer or float spelling: optional sign, digits with `_` separators, an
/// optional fraction and exponent.
fn is_number(text: &str) -> bool {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(at) => (&unsigned[..at], Some(&unsigned[at + 1..])),
        None => (unsigned, None),
    };
    let digits = |part: &str| {
        !part.starts_with('_')
            && !part.ends_with('_')
            && part.chars().all(|c| c.is_ascii_digit() || c == '_')
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let mantissa_ok = !(whole.is_empty() && fraction.is_empty())
        && digits(whole)
        && digits(fraction)
        && !mantissa.starts_with('_');
    let exponent_ok = exponent.map_or(true, |exp| {
        let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
        !exp.is_empty() && digits(exp)
    });
    mantissa_ok && exponent_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(texts: &[&str]) -> Vec<Option<String>> {
        texts.iter().map(|t| Some((*t).to_string())).collect()
    }

    #[test]
    fn parses_single_quoted_items() {
        assert_eq!(
            parse_list("['1970s', '1980s']").unwrap(),
            items(&["1970s", "1980s"])
        );
    }

    #[test]
    fn parses_json_style_and_mixed_quotes() {
        assert_eq!(
            parse_list(r#"["boho", 'retro']"#).unwrap(),
            items(&["boho", "retro"])
        );
    }

    #[test]
    fn empty_list_and_trailing_comma() {
        assert!(parse_list("[]").unwrap().is_empty());
        assert!(parse_list("  [ ]  ").unwrap().is_empty());
        assert_eq!(parse_list("['a',]").unwrap(), items(&["a"]));
    }

    #[test]
    fn bare_scalars_keep_their_spelling() {
        assert_eq!(
            parse_list("[1, -2.5, 1_000, 3e2, .5, True, False]").unwrap(),
            items(&["1", "-2.5", "1_000", "3e2", ".5", "True", "False"])
        );
    }

    #[test]
    fn none_is_a_missing_item() {
        assert_eq!(
            parse_list("['a', None]").unwrap(),
            vec![Some("a".to_string()), None]
        );
    }

    #[test]
    fn bare_words_are_rejected() {
        assert!(parse_list("[vintage, retro]").is_err());
        assert!(parse_list("['a', none]").is_err());
        assert!(parse_list("[1.2.3]").is_err());
        assert!(parse_list("[1e]").is_err());
        assert!(parse_list("[nan]").is_err());
        assert!(parse_list("[-]").is_err());
    }

    #[test]
    fn escapes_and_embedded_quotes() {
        assert_eq!(
            parse_list(r#"['it\'s', "say \"hi\"", 'a,b']"#).unwrap(),
            items(&["it's", "say \"hi\"", "a,b"])
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_list("['unterminated").is_err());
        assert!(parse_list("['a' 'b']").is_err());
        assert!(parse_list("[['nested']]").is_err());
        assert!(parse_list("['a'] extra").is_err());
        assert!(parse_list("not a list").is_err());
        assert!(parse_list("[a b]").is_err());
    }
}
