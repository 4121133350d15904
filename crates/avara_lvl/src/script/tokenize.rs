/// Error returned when a quoted token isn't closed before the end of the line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unterminated {quote} quote in `{line}`")]
pub struct UnclosedQuote {
    pub quote: char,
    pub line: String,
}

/// Splits a line the way a POSIX shell would.
///
/// Tokens are separated by whitespace. Single quotes keep everything up to the closing quote
/// verbatim, double quotes allow `\"` and `\\` escapes inside. Outside of quotes a backslash
/// escapes any character. Quotes may appear in the middle of a token, `a"b c"d` is `ab cd`.
///
/// ## Example
/// ```
/// # use avara_lvl::script::split_line;
/// let tokens = split_line(r#"designer = "Jane Doe" 'x y'"#).unwrap();
/// assert_eq!(tokens, ["designer", "=", "Jane Doe", "x y"]);
/// ```
pub fn split_line(line: &str) -> Result<Vec<String>, UnclosedQuote> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // A token can be empty (`""`), so whitespace alone doesn't tell if one was started
    let mut in_token = false;

    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            '\'' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => return Err(unclosed('\'', line)),
                    }
                }
            }
            '"' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c @ ('"' | '\\')) => current.push(c),
                            Some(c) => {
                                current.push('\\');
                                current.push(c);
                            }
                            None => return Err(unclosed('"', line)),
                        },
                        Some(c) => current.push(c),
                        None => return Err(unclosed('"', line)),
                    }
                }
            }
            '\\' => {
                in_token = true;
                if let Some(c) = chars.next() {
                    current.push(c);
                }
            }
            c => {
                in_token = true;
                current.push(c);
            }
        }
    }

    if in_token {
        tokens.push(current);
    }

    Ok(tokens)
}

fn unclosed(quote: char, line: &str) -> UnclosedQuote {
    UnclosedQuote {
        quote,
        line: line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_words() {
        assert_eq!(split_line("  wa   2\t").unwrap(), ["wa", "2"]);
        assert!(split_line("").unwrap().is_empty());
        assert!(split_line("   ").unwrap().is_empty());
    }

    #[test]
    fn quotes_group_words() {
        assert_eq!(
            split_line(r#"information "A long one" end"#).unwrap(),
            ["information", "A long one", "end"]
        );
        assert_eq!(split_line(r#"a"b c"d"#).unwrap(), ["ab cd"]);
        assert_eq!(split_line(r#"x "" y"#).unwrap(), ["x", "", "y"]);
    }

    #[test]
    fn escapes() {
        assert_eq!(split_line(r#"a\ b"#).unwrap(), ["a b"]);
        assert_eq!(split_line(r#""say \"hi\"""#).unwrap(), [r#"say "hi""#]);
        assert_eq!(split_line(r#"'no \escapes'"#).unwrap(), [r#"no \escapes"#]);
        assert_eq!(split_line(r#""keep \n""#).unwrap(), [r#"keep \n"#]);
    }

    #[test]
    fn unclosed_quotes_are_errors() {
        let error = split_line(r#"designer "Jane"#).unwrap_err();
        assert_eq!(error.quote, '"');
        assert!(split_line("'abc").is_err());
    }
}
