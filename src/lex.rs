use thiserror::Error;

/// Why a single value could not be read from a field line.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValueError {
  /// No valid number starts at the given byte column.
  #[error("expected a number at column {column}")]
  MalformedNumber {
    /// Byte offset into the line.
    column: usize,
  },
  /// The line ended where a value was expected.
  #[error("expected a value at column {column} but the line ended")]
  MissingValue {
    /// Byte offset into the line.
    column: usize,
  },
  /// One component of a three-number value could not be read.
  #[error("expected three numbers but component {component} is malformed")]
  IncompleteVector {
    /// Zero-based index of the failing component.
    component: usize,
  },
  /// More option modifiers than one line may carry.
  #[error("more than {limit} option modifiers before column {column}")]
  TooManyOptions {
    /// Byte offset of the first modifier past the limit.
    column: usize,
    /// The most modifiers a line may carry.
    limit: usize,
  },
  /// A word outside a closed vocabulary, such as `on`/`off`.
  #[error("expected one of {expected} at column {column}")]
  UnexpectedWord {
    /// Byte offset into the line.
    column: usize,
    /// The accepted words, for display.
    expected: &'static str,
  },
}

/// What went wrong on a line.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ErrorKind {
  /// A recognized field whose value could not be read. The field keeps
  /// its previous value.
  #[error("failed parsing `{keyword}` value(s) for material `{material}`: {error}")]
  Field {
    /// The field's keyword.
    keyword: &'static str,
    /// Name of the material the field belongs to.
    material: String,
    /// The lexer failure.
    #[source]
    error: ValueError,
  },
  /// A field line appeared before any `newmtl`.
  #[error("no material yet, skipping `{line}`")]
  OrphanField {
    /// The discarded line.
    line: String,
  },
  /// The schema let through a value or modifier no material field accepts.
  #[error("`{keyword}` has no material field for {what}")]
  Unmapped {
    /// The field's keyword.
    keyword: &'static str,
    /// Description of the value or modifier that was left over.
    what: String,
  },
}

/// A parsing diagnostic, with location information.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("line {line_number}: {kind}")]
pub struct ParseError {
  /// The line of input the error is on.
  pub line_number: usize,
  /// What went wrong.
  pub kind: ErrorKind,
}

/// Characters skipped before every value. Quotes are transparent
/// punctuation, never separators.
#[inline]
fn is_optional_char(c: u8) -> bool {
  c == b' ' || c == b'\t' || c == b'\r' || c == b'\'' || c == b'"'
}

#[inline]
fn is_whitespace(c: u8) -> bool {
  c == b' ' || c == b'\t' || c == b'\r'
}

/// A read position within a single line.
#[derive(Clone, Debug)]
pub(crate) struct Cursor<'a> {
  line: &'a str,
  pos: usize,
}

impl<'a> Cursor<'a> {
  pub(crate) fn new(line: &'a str) -> Cursor<'a> {
    Cursor { line, pos: 0 }
  }

  pub(crate) fn position(&self) -> usize {
    self.pos
  }

  fn bytes(&self) -> &'a [u8] {
    &self.line.as_bytes()[self.pos..]
  }

  fn peek(&self) -> Option<u8> {
    self.line.as_bytes().get(self.pos).copied()
  }

  /// Whether only whitespace remains.
  pub(crate) fn at_end(&self) -> bool {
    self.bytes().iter().all(|&c| is_whitespace(c))
  }

  /// The unread remainder of the line.
  pub(crate) fn rest(&self) -> &'a str {
    &self.line[self.pos..]
  }

  /// Advance past characters while the given condition is true.
  ///
  /// Returns whether or not any of the input was skipped.
  fn skip_while<F: Fn(u8) -> bool>(&mut self, is_true: F) -> bool {
    let start = self.pos;
    while let Some(c) = self.peek() {
      if !is_true(c) {
        break;
      }
      self.pos += 1;
    }
    self.pos != start
  }

  /// Skips spaces, tabs and quote characters.
  pub(crate) fn skip_optional_chars(&mut self) -> bool {
    self.skip_while(is_optional_char)
  }

  /// Whether `word` starts at the cursor and is followed by whitespace or
  /// the end of the line. `Ka` does not match `Kaaa`.
  pub(crate) fn starts_with_word(&self, word: &str) -> bool {
    let bytes = self.bytes();
    bytes.starts_with(word.as_bytes())
      && bytes
        .get(word.len())
        .map(|&c| is_whitespace(c))
        .unwrap_or(true)
  }

  /// Consumes `word` if [`Cursor::starts_with_word`] holds.
  pub(crate) fn eat_word(&mut self, word: &str) -> bool {
    if self.starts_with_word(word) {
      self.pos += word.len();
      true
    } else {
      false
    }
  }

  fn read_number<N: lexical::FromLexical>(&mut self) -> Result<N, ValueError> {
    self.skip_optional_chars();
    let bytes = self.bytes();
    if let Ok((value, read)) = lexical::parse_partial::<N, _>(bytes) {
      if read > 0 {
        self.pos += read;
        return Ok(value);
      }
    }

    // An unfinished exponent (`1e`, `2.5e+`) or an integer that overflows
    // fails as a whole, so back off to the longest prefix that parses.
    let span = bytes
      .iter()
      .take_while(|&&c| c.is_ascii_digit() || matches!(c, b'+' | b'-' | b'.' | b'e' | b'E'))
      .count();
    for end in (1..=span).rev() {
      if let Ok(value) = lexical::parse::<N, _>(&bytes[..end]) {
        self.pos += end;
        return Ok(value);
      }
    }
    Err(ValueError::MalformedNumber { column: self.pos })
  }

  /// Reads the longest numeric prefix at the cursor as a float.
  pub(crate) fn read_float(&mut self) -> Result<f64, ValueError> {
    self.read_number()
  }

  /// Reads the longest numeric prefix at the cursor as an integer.
  pub(crate) fn read_int(&mut self) -> Result<i32, ValueError> {
    self.read_number()
  }

  /// Reads three floats. Nothing is returned unless all three parse.
  pub(crate) fn read_float3(&mut self) -> Result<[f64; 3], ValueError> {
    let mut out = [0.0; 3];
    for (component, slot) in out.iter_mut().enumerate() {
      *slot = self
        .read_float()
        .map_err(|_| ValueError::IncompleteVector { component })?;
    }
    Ok(out)
  }

  /// Reads a float only when a whole whitespace-delimited number is at the
  /// cursor. Otherwise the cursor is left untouched.
  pub(crate) fn try_float_token(&mut self) -> Option<f64> {
    let saved = self.pos;
    match self.read_float() {
      Ok(value) if self.peek().map(is_optional_char).unwrap_or(true) => Some(value),
      _ => {
        self.pos = saved;
        None
      }
    }
  }

  /// Reads up to the next space, quote, or the end of the line.
  pub(crate) fn read_word(&mut self) -> Result<&'a str, ValueError> {
    self.skip_optional_chars();
    let start = self.pos;
    if !self.skip_while(|c| !is_optional_char(c)) {
      return Err(ValueError::MissingValue { column: start });
    }
    Ok(&self.line[start..self.pos])
  }

  /// Reads `on` or `off`.
  pub(crate) fn read_switch(&mut self) -> Result<bool, ValueError> {
    self.skip_optional_chars();
    let column = self.pos;
    match self.read_word()? {
      "on" => Ok(true),
      "off" => Ok(false),
      _ => Err(ValueError::UnexpectedWord {
        column,
        expected: "on, off",
      }),
    }
  }

  /// Reads a word, or everything up to the closing quote when the word
  /// opens with one.
  pub(crate) fn read_token(&mut self) -> Result<&'a str, ValueError> {
    self.skip_while(is_whitespace);
    let quote = match self.peek() {
      Some(q) if q == b'"' || q == b'\'' => q,
      _ => return self.read_word(),
    };
    let start = self.pos + 1;
    let end = self.line.as_bytes()[start..]
      .iter()
      .position(|&c| c == quote)
      .map(|n| start + n)
      .unwrap_or_else(|| self.line.len());
    if end == start {
      return Err(ValueError::MissingValue { column: start });
    }
    self.pos = (end + 1).min(self.line.len());
    Ok(&self.line[start..end])
  }

  /// Whether only whitespace or a `#` comment remains.
  pub(crate) fn at_comment_or_end(&self) -> bool {
    let mut rest = self.clone();
    rest.skip_while(is_whitespace);
    rest.at_end() || rest.peek() == Some(b'#')
  }

  /// Reads the rest of the line, minus surrounding whitespace and quotes.
  /// Used for file names, which may contain spaces. A `#` after whitespace
  /// and outside double quotes starts a comment.
  pub(crate) fn read_rest(&mut self) -> Result<&'a str, ValueError> {
    let bytes = self.bytes();
    let mut quoted = false;
    let mut end = bytes.len();
    for (i, &c) in bytes.iter().enumerate() {
      match c {
        b'"' => quoted = !quoted,
        b'#' if !quoted && (i == 0 || is_whitespace(bytes[i - 1])) => {
          end = i;
          break;
        }
        _ => {}
      }
    }
    let value = self.line[self.pos..self.pos + end].trim_matches(is_optional_punct);
    if value.is_empty() {
      return Err(ValueError::MissingValue { column: self.pos });
    }
    self.pos += end;
    Ok(value)
  }
}

fn is_optional_punct(c: char) -> bool {
  c.is_ascii() && is_optional_char(c as u8)
}

#[test]
fn test_read_float_skips_quotes_and_spaces() {
  let mut c = Cursor::new(" '\" 0.25 \"1e2");
  assert_eq!(c.read_float(), Ok(0.25));
  assert_eq!(c.position(), 8);
  assert_eq!(c.read_float(), Ok(100.0));
  assert!(c.at_end());
}

#[test]
fn test_read_float_longest_prefix() {
  let mut c = Cursor::new("0.5abc");
  assert_eq!(c.read_float(), Ok(0.5));
  assert_eq!(c.rest(), "abc");
  assert_eq!(c.read_float(), Err(ValueError::MalformedNumber { column: 3 }));
}

#[test]
fn test_read_float_unfinished_exponent() {
  let mut c = Cursor::new("1e");
  assert_eq!(c.read_float(), Ok(1.0));
  assert_eq!(c.rest(), "e");

  let mut c = Cursor::new("2.5e+ 3");
  assert_eq!(c.read_float(), Ok(2.5));
  assert_eq!(c.rest(), "e+ 3");
}

#[test]
fn test_read_int_overflow_keeps_prefix() {
  let mut c = Cursor::new("99999999999");
  assert_eq!(c.read_int(), Ok(999_999_999));
  assert_eq!(c.rest(), "99");
}

#[test]
fn test_read_int() {
  let mut c = Cursor::new("illum 2");
  assert!(c.eat_word("illum"));
  assert_eq!(c.read_int(), Ok(2));
  assert_eq!(c.read_int(), Err(ValueError::MalformedNumber { column: 7 }));
}

#[test]
fn test_read_float3() {
  let mut c = Cursor::new("0.1 0.2 0.3");
  assert_eq!(c.read_float3(), Ok([0.1, 0.2, 0.3]));

  let mut c = Cursor::new("0.1 notanumber 0.3");
  assert_eq!(
    c.read_float3(),
    Err(ValueError::IncompleteVector { component: 1 })
  );

  let mut c = Cursor::new("1 2");
  assert_eq!(
    c.read_float3(),
    Err(ValueError::IncompleteVector { component: 2 })
  );
}

#[test]
fn test_read_word() {
  let mut c = Cursor::new("  file.rfl 0.5");
  assert_eq!(c.read_word(), Ok("file.rfl"));
  assert_eq!(c.rest(), " 0.5");

  let mut c = Cursor::new("   ");
  assert_eq!(c.read_word(), Err(ValueError::MissingValue { column: 3 }));
}

#[test]
fn test_word_boundaries() {
  let c = Cursor::new("Kaaa 1 2 3");
  assert!(!c.starts_with_word("Ka"));
  assert!(c.starts_with_word("Kaaa"));
  assert!(Cursor::new("Ka").starts_with_word("Ka"));
  assert!(Cursor::new("Ka\t1").starts_with_word("Ka"));
}

#[test]
fn test_read_rest_stops_at_comment() {
  let mut c = Cursor::new(" tex.png # diffuse");
  assert_eq!(c.read_rest(), Ok("tex.png"));

  let mut c = Cursor::new(" \"my #1.png\" # note");
  assert_eq!(c.read_rest(), Ok("my #1.png"));

  let mut c = Cursor::new(" tile#2.png");
  assert_eq!(c.read_rest(), Ok("tile#2.png"));

  let mut c = Cursor::new("  # only a comment");
  assert_eq!(c.read_rest(), Err(ValueError::MissingValue { column: 0 }));
}

#[test]
fn test_read_token() {
  let mut c = Cursor::new(" \"my wood.rfl\" 0.5");
  assert_eq!(c.read_token(), Ok("my wood.rfl"));
  assert_eq!(c.read_float(), Ok(0.5));

  let mut c = Cursor::new(" wood.rfl 0.5");
  assert_eq!(c.read_token(), Ok("wood.rfl"));
  assert!(!c.at_comment_or_end());

  let mut c = Cursor::new(" '' ");
  assert_eq!(c.read_token(), Err(ValueError::MissingValue { column: 2 }));

  assert!(Cursor::new("  # factor").at_comment_or_end());
}

#[test]
fn test_try_float_token() {
  let mut c = Cursor::new("1 2 3.png");
  assert_eq!(c.try_float_token(), Some(1.0));
  assert_eq!(c.try_float_token(), Some(2.0));
  assert_eq!(c.try_float_token(), None);
  assert_eq!(c.rest(), " 3.png");
}

#[test]
fn test_read_rest_and_switch() {
  let mut c = Cursor::new(" off \"my texture.png\" ");
  assert_eq!(c.read_switch(), Ok(false));
  assert_eq!(c.read_rest(), Ok("my texture.png"));
  assert!(c.at_end());

  let mut c = Cursor::new("maybe");
  assert_eq!(
    c.read_switch(),
    Err(ValueError::UnexpectedWord {
      column: 0,
      expected: "on, off"
    })
  );
}
