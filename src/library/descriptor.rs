//! Parser for the sectioned `key = value` format used by `meta.txt`.
//!
//! ```text
//! [meta]
//! name = Foo
//! version = v1.2.0
//!
//! [check]
//! src/foo.c = lib/foo.c
//! ```
//!
//! Keys keep their case. `#` and `;` start full-line comments. A line
//! indented deeper than the key above it continues that key's value.

use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl SyntaxError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Entries in the order they appear in the file.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Descriptor {
    sections: Vec<Section>,
}

impl Descriptor {
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }
}

impl FromStr for Descriptor {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut sections: Vec<Section> = Vec::new();
        // Indent of the key whose value a deeper-indented line may extend.
        let mut value_indent: Option<usize> = None;

        for (idx, raw) in s.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = raw.trim();

            if trimmed.is_empty() {
                value_indent = None;
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            let indent = raw.len() - raw.trim_start().len();
            if value_indent.is_some_and(|key_indent| indent > key_indent) {
                if let Some((_, value)) = sections.last_mut().and_then(|s| s.entries.last_mut()) {
                    value.push('\n');
                    value.push_str(trimmed);
                }
                continue;
            }

            if let Some(header) = trimmed.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| SyntaxError::new(line_no, "malformed section header"))?;
                if sections.iter().any(|s| s.name == name) {
                    return Err(SyntaxError::new(
                        line_no,
                        format!("duplicate section [{}]", name),
                    ));
                }
                sections.push(Section {
                    name: name.to_string(),
                    entries: Vec::new(),
                });
                value_indent = None;
                continue;
            }

            let section = sections
                .last_mut()
                .ok_or_else(|| SyntaxError::new(line_no, "key outside of any section"))?;

            let split_at = trimmed
                .find(['=', ':'])
                .ok_or_else(|| SyntaxError::new(line_no, "expected 'key = value'"))?;
            let key = trimmed[..split_at].trim();
            let value = trimmed[split_at + 1..].trim();

            if key.is_empty() {
                return Err(SyntaxError::new(line_no, "empty key"));
            }
            if section.get(key).is_some() {
                return Err(SyntaxError::new(
                    line_no,
                    format!("duplicate key '{}' in [{}]", key, section.name),
                ));
            }

            section.entries.push((key.to_string(), value.to_string()));
            value_indent = Some(indent);
        }

        Ok(Descriptor { sections })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_descriptor() {
        let text = "\
# Vendored copy of foo
[meta]
name = Foo
version = v1.2.0

[github]
repository = acme/foo

[check]
src/foo.c = lib/foo.c
include/Foo.h = include/Foo.h
";
        let desc: Descriptor = text.parse().unwrap();

        let meta = desc.section("meta").unwrap();
        assert_eq!(meta.get("name"), Some("Foo"));
        assert_eq!(meta.get("version"), Some("v1.2.0"));
        assert_eq!(
            desc.section("github").unwrap().get("repository"),
            Some("acme/foo")
        );

        let check = desc.section("check").unwrap();
        assert_eq!(
            check.entries(),
            &[
                ("src/foo.c".to_string(), "lib/foo.c".to_string()),
                ("include/Foo.h".to_string(), "include/Foo.h".to_string()),
            ]
        );
        assert!(desc.section("nuget").is_none());
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let desc: Descriptor = "[check]\nWebView2.h = build/native/include/WebView2.h\n"
            .parse()
            .unwrap();
        let check = desc.section("check").unwrap();
        assert_eq!(
            check.get("WebView2.h"),
            Some("build/native/include/WebView2.h")
        );
        assert_eq!(check.get("webview2.h"), None);
    }

    #[test]
    fn test_colon_delimiter_and_empty_value() {
        let desc: Descriptor = "[meta]\nname: Foo\nversion =\n".parse().unwrap();
        let meta = desc.section("meta").unwrap();
        assert_eq!(meta.get("name"), Some("Foo"));
        assert_eq!(meta.get("version"), Some(""));
    }

    #[test]
    fn test_first_delimiter_wins() {
        let desc: Descriptor = "[check]\na.txt = https://example.com/a=b\n"
            .parse()
            .unwrap();
        assert_eq!(
            desc.section("check").unwrap().get("a.txt"),
            Some("https://example.com/a=b")
        );
    }

    #[test]
    fn test_comments_are_ignored() {
        let desc: Descriptor = "; leading\n[meta]\n  # indented comment\nname = Foo\n"
            .parse()
            .unwrap();
        assert_eq!(desc.section("meta").unwrap().entries().len(), 1);
    }

    #[test]
    fn test_continuation_line() {
        let desc: Descriptor = "[meta]\nname = Foo\n  Bar\nversion = 1\n".parse().unwrap();
        let meta = desc.section("meta").unwrap();
        assert_eq!(meta.get("name"), Some("Foo\nBar"));
        assert_eq!(meta.get("version"), Some("1"));
    }

    #[test]
    fn test_indented_keys_are_not_continuations() {
        let desc: Descriptor = "[meta]\n  name = Foo\n  version = 1\n    rc\n"
            .parse()
            .unwrap();
        let meta = desc.section("meta").unwrap();
        assert_eq!(meta.get("name"), Some("Foo"));
        assert_eq!(meta.get("version"), Some("1\nrc"));
    }

    #[test]
    fn test_key_outside_section() {
        let err = "name = Foo\n".parse::<Descriptor>().unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("outside"));
    }

    #[test]
    fn test_duplicate_section() {
        let err = "[meta]\nname = a\n[meta]\n".parse::<Descriptor>().unwrap_err();
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_duplicate_key() {
        let err = "[meta]\nname = a\nname = b\n"
            .parse::<Descriptor>()
            .unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains("duplicate key 'name'"));
    }

    #[test]
    fn test_line_without_delimiter() {
        let err = "[meta]\nname\n".parse::<Descriptor>().unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_malformed_header() {
        assert!("[meta\n".parse::<Descriptor>().is_err());
        assert!("[]\n".parse::<Descriptor>().is_err());
    }

    #[test]
    fn test_empty_input() {
        let desc: Descriptor = "".parse().unwrap();
        assert!(desc.section("meta").is_none());
    }
}
