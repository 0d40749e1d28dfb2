//! Filter expressions for `find`, `search`, `list` and friends
//!
//! Builds the parenthesized syntax understood since protocol 0.21, e.g.
//! `((Album == "Blue") AND (AlbumArtist == "Joni Mitchell"))`. The whole
//! expression is later sent as a single quoted argument.

use rmpdc_core::tag::TagType;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Clause {
    TagEquals(TagType, String),
    TagContains(TagType, String),
    FileEquals(String),
    Base(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag_eq(mut self, tag: TagType, value: impl Into<String>) -> Self {
        self.clauses.push(Clause::TagEquals(tag, value.into()));
        self
    }

    /// Case-insensitive substring match
    pub fn tag_contains(mut self, tag: TagType, value: impl Into<String>) -> Self {
        self.clauses.push(Clause::TagContains(tag, value.into()));
        self
    }

    pub fn file_eq(mut self, uri: impl Into<String>) -> Self {
        self.clauses.push(Clause::FileEquals(uri.into()));
        self
    }

    /// Restrict to a directory
    pub fn base(mut self, directory: impl Into<String>) -> Self {
        self.clauses.push(Clause::Base(directory.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn to_expression(&self) -> String {
        let parts: Vec<String> = self.clauses.iter().map(clause_expression).collect();
        match parts.len() {
            0 => String::new(),
            1 => parts.into_iter().next().unwrap_or_default(),
            _ => format!("({})", parts.join(" AND ")),
        }
    }
}

fn clause_expression(clause: &Clause) -> String {
    match clause {
        Clause::TagEquals(tag, value) => format!("({} == {})", tag, escape_value(value)),
        Clause::TagContains(tag, value) => format!("({} contains {})", tag, escape_value(value)),
        Clause::FileEquals(uri) => format!("(file == {})", escape_value(uri)),
        Clause::Base(dir) => format!("(base {})", escape_value(dir)),
    }
}

/// Quote a value inside a filter expression
fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\'' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('"');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;

    #[test]
    fn test_single_clause() {
        let filter = Filter::new().tag_eq(TagType::Genre, "Jazz");
        assert_eq!(filter.to_expression(), "(Genre == \"Jazz\")");
    }

    #[test]
    fn test_conjunction() {
        let filter = Filter::new()
            .tag_eq(TagType::Album, "Blue")
            .tag_eq(TagType::AlbumArtist, "Joni Mitchell");
        assert_eq!(
            filter.to_expression(),
            "((Album == \"Blue\") AND (AlbumArtist == \"Joni Mitchell\"))"
        );
    }

    #[test]
    fn test_value_escaping_survives_argument_quoting() {
        let filter = Filter::new().tag_eq(TagType::Artist, "Guns N' Roses");
        assert_eq!(filter.to_expression(), "(Artist == \"Guns N\\' Roses\")");

        let line = Command::new("find").arg(filter.to_expression()).to_line().unwrap();
        assert_eq!(line, "find \"(Artist == \\\"Guns N\\\\' Roses\\\")\"\n");
    }

    #[test]
    fn test_base_and_file() {
        assert_eq!(Filter::new().base("Jazz/Blue").to_expression(), "(base \"Jazz/Blue\")");
        assert_eq!(Filter::new().file_eq("a.flac").to_expression(), "(file == \"a.flac\")");
        assert!(Filter::new().is_empty());
    }
}
