//! Safe SQL identifier handling.
//!
//! [`Ident`] is a validated schema/table/column/alias name. It never carries quote
//! characters of its own: rendering goes through [`Dialect::quote_identifier`], so the
//! same identifier becomes `` `dbo`.`Airport` `` on MySQL and `[dbo].[Airport]` on SQL
//! Server.
//!
//! - Plain parts are validated against: `[A-Za-z_][A-Za-z0-9_$]*`
//! - `"Quoted"` parts allow any characters except NUL (`""` escapes a double quote)
//!
//! # Example
//! ```ignore
//! use sqlweave::{Ident, MySql};
//!
//! let t = Ident::parse("dbo.Airport")?;
//! assert_eq!(t.render(&MySql), "`dbo`.`Airport`");
//! # Ok::<(), sqlweave::SqlError>(())
//! ```

use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use std::fmt;

/// A validated SQL identifier, possibly dotted (`schema.table`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    parts: Vec<String>,
}

impl Ident {
    /// Create a single-part identifier from an arbitrary name.
    ///
    /// Dots are kept as part of the name; only NUL is rejected.
    pub fn quoted(name: &str) -> SqlResult<Self> {
        if name.is_empty() {
            return Err(SqlError::invalid_identifier("Empty quoted identifier"));
        }
        if name.contains('\0') {
            return Err(SqlError::invalid_identifier(
                "Identifier cannot contain NUL character",
            ));
        }
        Ok(Self {
            parts: vec![name.to_string()],
        })
    }

    /// Parse an identifier string.
    ///
    /// - Plain: `AirportCode`
    /// - Dotted: `dbo.Airport`
    /// - Quoted: `"Order Details"`, `dbo."Order Details"`
    pub fn parse(s: &str) -> SqlResult<Self> {
        if s.is_empty() {
            return Err(SqlError::invalid_identifier("Identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(SqlError::invalid_identifier(
                "Identifier cannot contain NUL character",
            ));
        }

        let mut parts = Vec::new();
        let mut chars = s.chars().peekable();

        while chars.peek().is_some() {
            if !parts.is_empty() {
                match chars.next() {
                    Some('.') => {
                        if chars.peek().is_none() {
                            return Err(SqlError::invalid_identifier(format!(
                                "Trailing '.' in identifier '{s}'"
                            )));
                        }
                    }
                    Some(c) => {
                        return Err(SqlError::invalid_identifier(format!(
                            "Expected '.' between identifier parts in '{s}', got '{c}'"
                        )));
                    }
                    None => break,
                }
            }

            if chars.peek() == Some(&'"') {
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('"') => {
                            if chars.peek() == Some(&'"') {
                                chars.next();
                                name.push('"');
                            } else {
                                break;
                            }
                        }
                        Some(c) => name.push(c),
                        None => {
                            return Err(SqlError::invalid_identifier(format!(
                                "Unclosed quoted identifier in '{s}'"
                            )));
                        }
                    }
                }
                if name.is_empty() {
                    return Err(SqlError::invalid_identifier("Empty quoted identifier"));
                }
                parts.push(name);
                continue;
            }

            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c == '.' {
                    break;
                }
                let valid = if name.is_empty() {
                    c == '_' || c.is_ascii_alphabetic()
                } else {
                    c == '_' || c == '$' || c.is_ascii_alphanumeric()
                };
                if !valid {
                    return Err(SqlError::invalid_identifier(format!(
                        "Invalid character '{c}' in identifier '{s}'"
                    )));
                }
                name.push(c);
                chars.next();
            }
            if name.is_empty() {
                return Err(SqlError::invalid_identifier(format!(
                    "Empty identifier segment in '{s}'"
                )));
            }
            parts.push(name);
        }

        if parts.is_empty() {
            return Err(SqlError::invalid_identifier("Empty identifier"));
        }

        Ok(Self { parts })
    }

    /// Build a `schema.table` identifier from two already-separate names.
    pub fn qualified(schema: &str, name: &str) -> SqlResult<Self> {
        Ok(Self::parse(schema)?.join(Self::parse(name)?))
    }

    /// Append the parts of `other` (`schema` + `table` → `schema.table`).
    pub fn join(mut self, other: Ident) -> Self {
        self.parts.extend(other.parts);
        self
    }

    /// The unquoted parts of this identifier.
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// The last part (the bare column/table name).
    pub fn name(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or_default()
    }

    /// Render the identifier with the dialect's quoting.
    pub fn render(&self, dialect: &dyn Dialect) -> String {
        dialect.format_identifier(self)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.parts.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySql, SqlServer};

    #[test]
    fn ident_simple() {
        let ident = Ident::parse("Airport").unwrap();
        assert_eq!(ident.render(&MySql), "`Airport`");
        assert_eq!(ident.render(&SqlServer), "[Airport]");
    }

    #[test]
    fn ident_dotted() {
        let ident = Ident::parse("dbo.Airport").unwrap();
        assert_eq!(ident.render(&SqlServer), "[dbo].[Airport]");
        assert_eq!(ident.name(), "Airport");
    }

    #[test]
    fn ident_qualified() {
        let ident = Ident::qualified("TestSchema", "TestEntity").unwrap();
        assert_eq!(ident.render(&MySql), "`TestSchema`.`TestEntity`");
    }

    #[test]
    fn ident_quoted_part_keeps_spaces() {
        let ident = Ident::parse(r#"dbo."Order Details""#).unwrap();
        assert_eq!(ident.render(&SqlServer), "[dbo].[Order Details]");
    }

    #[test]
    fn ident_closing_quote_is_escaped() {
        let ident = Ident::quoted("odd]name").unwrap();
        assert_eq!(ident.render(&SqlServer), "[odd]]name]");

        let ident = Ident::quoted("odd`name").unwrap();
        assert_eq!(ident.render(&MySql), "`odd``name`");
    }

    #[test]
    fn ident_with_dollar() {
        let ident = Ident::parse("my_var$1").unwrap();
        assert_eq!(ident.to_string(), "my_var$1");
    }

    #[test]
    fn ident_rejects_empty() {
        assert!(Ident::parse("").is_err());
    }

    #[test]
    fn ident_rejects_start_digit() {
        assert!(Ident::parse("1table").is_err());
    }

    #[test]
    fn ident_rejects_injection() {
        assert!(Ident::parse("Airport; DROP TABLE Airport; --").is_err());
        assert!(Ident::parse("Airport]").is_err());
        assert!(Ident::parse("my table").is_err());
    }

    #[test]
    fn ident_rejects_double_dot() {
        assert!(Ident::parse("schema..table").is_err());
    }

    #[test]
    fn ident_rejects_trailing_dot() {
        assert!(Ident::parse("schema.").is_err());
    }

    #[test]
    fn ident_rejects_unclosed_quote() {
        assert!(Ident::parse(r#""unclosed"#).is_err());
    }
}
