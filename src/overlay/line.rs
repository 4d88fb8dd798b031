//! Line classification for `key = value` configuration files.

/// A configuration file line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// A line with at least one `=`. Both sides are trimmed; the split is on
    /// the first `=`, so values may contain `=` themselves.
    Entry { key: &'a str, value: &'a str },
    /// Comments, section headers, blank lines: copied as they are.
    Passthrough,
}

pub fn parse_line(line: &str) -> Line<'_> {
    match line.split_once('=') {
        Some((key, value)) => Line::Entry {
            key: key.trim(),
            value: value.trim(),
        },
        None => Line::Passthrough,
    }
}

/// Render an entry in the canonical `key = value` shape.
pub fn render_entry(key: &str, value: &str) -> String {
    format!("{} = {}", key.trim(), value.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entry() {
        assert_eq!(
            parse_line("  db_host =  postgres "),
            Line::Entry {
                key: "db_host",
                value: "postgres"
            }
        );
    }

    #[test]
    fn test_parse_splits_on_first_delimiter() {
        assert_eq!(
            parse_line("db_filter = ^%d$=x"),
            Line::Entry {
                key: "db_filter",
                value: "^%d$=x"
            }
        );
    }

    #[test]
    fn test_parse_empty_value() {
        assert_eq!(
            parse_line("admin_passwd ="),
            Line::Entry {
                key: "admin_passwd",
                value: ""
            }
        );
    }

    #[test]
    fn test_parse_passthrough() {
        assert_eq!(parse_line("[options]"), Line::Passthrough);
        assert_eq!(parse_line("; comment"), Line::Passthrough);
        assert_eq!(parse_line(""), Line::Passthrough);
    }

    #[test]
    fn test_render_entry_trims() {
        assert_eq!(render_entry(" workers ", " 4 "), "workers = 4");
    }
}
