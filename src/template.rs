//! Named-placeholder templates.
//!
//! A template is hand-written SQL in which parameters are spelled `:name`.
//! [`parse`] rewrites it into the driver's positional form and records which
//! positions each name occupies.
//!
//! The scanner is a small lexical state machine. It understands just enough SQL
//! to avoid treating the prefix as a parameter where it is literal text:
//!
//! - `'...'`, `"..."` and `` `...` `` regions, with doubled-quote escapes
//! - `-- ...` line comments and nested `/* ... */` block comments
//! - PostgreSQL `$tag$ ... $tag$` dollar quoting, not inside identifiers
//! - under [`Dialect::MySql`], backslash escapes in `'...'` and `"..."` and
//!   `# ...` line comments
//!
//! It is not a validator: an unterminated quote or comment simply runs to the end
//! of the template.

use std::collections::HashMap;

use regex::Regex;

const IDENTIFIER: &str = r"^[A-Za-z_][A-Za-z0-9_]*";

/// Marker the driver expects in place of each parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderStyle {
    /// A bare `?` (MySQL).
    #[default]
    Question,
    /// `?1`, `?2`, ... (SQLite).
    Numbered,
    /// `$1`, `$2`, ... (PostgreSQL).
    Dollar,
}

impl PlaceholderStyle {
    fn write_marker(self, out: &mut String, position: usize) {
        match self {
            PlaceholderStyle::Question => out.push('?'),
            PlaceholderStyle::Numbered => {
                out.push('?');
                out.push_str(&position.to_string());
            }
            PlaceholderStyle::Dollar => {
                out.push('$');
                out.push_str(&position.to_string());
            }
        }
    }
}

/// Lexical rules for quoted text and comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// MySQL's default SQL mode: `\` escapes the next byte inside `'...'` and
    /// `"..."`, and `#` starts a line comment.
    #[default]
    MySql,
    /// Standard SQL (SQLite, PostgreSQL, MySQL with `NO_BACKSLASH_ESCAPES`):
    /// quotes are escaped only by doubling and `#` is ordinary text.
    Standard,
}

/// How named parameters are written in a template and rendered for the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateSyntax {
    pub prefix: char,
    pub style: PlaceholderStyle,
    pub dialect: Dialect,
}

impl Default for TemplateSyntax {
    fn default() -> Self {
        Self {
            prefix: ':',
            style: PlaceholderStyle::Question,
            dialect: Dialect::MySql,
        }
    }
}

impl TemplateSyntax {
    #[must_use]
    pub fn with_prefix(mut self, prefix: char) -> Self {
        self.prefix = prefix;
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: PlaceholderStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    fn prefix_byte(self) -> crate::Result<u8> {
        let byte = match self.prefix {
            '\'' | '"' | '`' | '-' | '/' | '*' | '_' => None,
            c if c.is_ascii_punctuation() => u8::try_from(c).ok(),
            _ => None,
        };
        byte.ok_or_else(|| crate::Error::Parse {
            offset: 0,
            reason: format!("'{}' cannot be used as a parameter prefix", self.prefix),
        })
    }
}

/// One named parameter and the positions it occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    positions: Vec<usize>,
}

impl Parameter {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 1-based positions, in template order.
    #[must_use]
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }
}

/// A template rewritten to positional form.
///
/// Every position `1..=N` belongs to exactly one parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTemplate {
    template: String,
    positional_sql: String,
    parameters: Vec<Parameter>,
    by_name: HashMap<String, usize>,
    /// Parameter index for each position, offset by one.
    owners: Vec<usize>,
}

impl ParsedTemplate {
    /// The template text as supplied by the caller.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The SQL handed to the driver.
    #[must_use]
    pub fn positional_sql(&self) -> &str {
        &self.positional_sql
    }

    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.owners.len()
    }

    /// Parameters in order of first appearance.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    #[must_use]
    pub fn positions(&self, name: &str) -> Option<&[usize]> {
        self.parameter(name).map(Parameter::positions)
    }

    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.by_name.get(name).map(|&idx| &self.parameters[idx])
    }

    /// Name of the parameter at a 1-based position.
    #[must_use]
    pub fn name_at(&self, position: usize) -> Option<&str> {
        let idx = *self.owners.get(position.checked_sub(1)?)?;
        Some(self.parameters[idx].name())
    }

    fn record(&mut self, name: &str) -> usize {
        let position = self.owners.len() + 1;
        let idx = match self.by_name.get(name) {
            Some(&idx) => idx,
            None => {
                self.parameters.push(Parameter {
                    name: name.to_owned(),
                    positions: Vec::new(),
                });
                self.by_name.insert(name.to_owned(), self.parameters.len() - 1);
                self.parameters.len() - 1
            }
        };
        self.parameters[idx].positions.push(position);
        self.owners.push(idx);
        position
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    Backtick,
    LineComment,
    BlockComment(u32),
    DollarQuoted(String),
}

/// Parses a template with named placeholders.
///
/// # Errors
///
/// Returns [`crate::Error::Parse`] if a prefix character is not followed by an
/// identifier, or if the configured prefix is unusable.
///
/// # Examples
///
/// ```
/// use sqlx_named_exec::template::{parse, TemplateSyntax};
///
/// let parsed = parse("INSERT INTO t(a, b) VALUES (:x, :y)", TemplateSyntax::default())?;
/// assert_eq!(parsed.positional_sql(), "INSERT INTO t(a, b) VALUES (?, ?)");
/// assert_eq!(parsed.positions("x"), Some(&[1][..]));
/// assert_eq!(parsed.positions("y"), Some(&[2][..]));
/// # Ok::<(), sqlx_named_exec::Error>(())
/// ```
pub fn parse(template: &str, syntax: TemplateSyntax) -> crate::Result<ParsedTemplate> {
    let prefix = syntax.prefix_byte()?;
    let identifier = Regex::new(IDENTIFIER)?;

    let mut parsed = ParsedTemplate {
        template: template.to_owned(),
        positional_sql: String::with_capacity(template.len()),
        parameters: Vec::new(),
        by_name: HashMap::new(),
        owners: Vec::new(),
    };

    let mysql = syntax.dialect == Dialect::MySql;
    let bytes = template.as_bytes();
    let mut state = State::Normal;
    let mut idx = 0;
    // Start of the text not yet copied to the output.
    let mut pending = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                _ if b == prefix => {
                    if bytes.get(idx + 1) == Some(&prefix) {
                        // `::type` cast
                        idx += 2;
                        continue;
                    }
                    let name = identifier
                        .find(&template[idx + 1..])
                        .map(|m| m.as_str())
                        .ok_or_else(|| crate::Error::Parse {
                            offset: idx,
                            reason: format!("'{}' is not followed by a parameter name", syntax.prefix),
                        })?;
                    parsed.positional_sql.push_str(&template[pending..idx]);
                    let position = parsed.record(name);
                    syntax.style.write_marker(&mut parsed.positional_sql, position);
                    idx += 1 + name.len();
                    pending = idx;
                    continue;
                }
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'`' => state = State::Backtick,
                b'-' if bytes.get(idx + 1) == Some(&b'-') => {
                    state = State::LineComment;
                    idx += 1;
                }
                b'#' if mysql => state = State::LineComment,
                b'/' if bytes.get(idx + 1) == Some(&b'*') => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'$' if idx == 0 || !is_identifier_byte(bytes[idx - 1]) => {
                    if let Some((tag, end)) = dollar_quote_tag(bytes, idx) {
                        state = State::DollarQuoted(tag.to_owned());
                        idx = end;
                    }
                }
                _ => {}
            },
            State::SingleQuoted | State::DoubleQuoted | State::Backtick => {
                let quote = match state {
                    State::SingleQuoted => b'\'',
                    State::DoubleQuoted => b'"',
                    _ => b'`',
                };
                if b == b'\\' && mysql && quote != b'`' {
                    idx += 1;
                } else if b == quote {
                    if bytes.get(idx + 1) == Some(&quote) {
                        idx += 1; // escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if b == b'/' && bytes.get(idx + 1) == Some(&b'*') {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if b == b'*' && bytes.get(idx + 1) == Some(&b'/') {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 1;
                }
            }
            State::DollarQuoted(ref tag) => {
                if b == b'$' && closes_dollar_quote(bytes, idx, tag) {
                    idx += tag.len() + 1;
                    state = State::Normal;
                }
            }
        }
        idx += 1;
    }

    parsed.positional_sql.push_str(&template[pending..]);
    tracing::debug!(
        placeholders = parsed.placeholder_count(),
        parameters = parsed.parameters.len(),
        "parsed SQL template"
    );
    Ok(parsed)
}

/// Converts named placeholders (`:name`) to positional placeholders (`?`).
///
/// One-shot form of [`parse`] with the default syntax, for callers that only
/// need the rewritten SQL.
///
/// # Examples
///
/// ```
/// use sqlx_named_exec::template::build_query;
///
/// let sql = build_query("SELECT * FROM users WHERE id = :id AND name = :name")?;
/// assert_eq!(sql, "SELECT * FROM users WHERE id = ? AND name = ?");
/// # Ok::<(), sqlx_named_exec::Error>(())
/// ```
pub fn build_query(template: &str) -> crate::Result<String> {
    parse(template, TemplateSyntax::default()).map(|parsed| parsed.positional_sql)
}

/// Recognizes `$tag$` at `start`, returning the tag and the index of its closing `$`.
fn dollar_quote_tag(bytes: &[u8], start: usize) -> Option<(&str, usize)> {
    let mut idx = start + 1;
    while idx < bytes.len() && bytes[idx] != b'$' {
        let b = bytes[idx];
        if !(b.is_ascii_alphanumeric() || b == b'_') {
            return None;
        }
        idx += 1;
    }
    if idx >= bytes.len() {
        return None;
    }
    let tag = std::str::from_utf8(&bytes[start + 1..idx]).ok()?;
    // `$1` style markers are not tags.
    if tag.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some((tag, idx))
}

fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || !b.is_ascii()
}

fn closes_dollar_quote(bytes: &[u8], idx: usize, tag: &str) -> bool {
    let rest = &bytes[idx + 1..];
    rest.starts_with(tag.as_bytes()) && rest.get(tag.len()) == Some(&b'$')
}
