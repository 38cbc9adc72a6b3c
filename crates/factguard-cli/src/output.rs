use chrono::{DateTime, Utc};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

/// Format an upstream timestamp, leaving non-RFC 3339 values untouched
pub fn format_created_at(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| format_timestamp(&dt.with_timezone(&Utc)))
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string_unchanged() {
        assert_eq!(truncate_string("short", 10), "short");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate_string("abcdefghij", 8), "abcde...");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_string("Проверка фактов", 8), "Прове...");
    }

    #[test]
    fn test_format_created_at() {
        assert_eq!(format_created_at("2026-02-25T09:15:00Z"), "2026-02-25 09:15");
        assert_eq!(format_created_at("2026-02-25T12:15:00+03:00"), "2026-02-25 09:15");
        assert_eq!(format_created_at("yesterday"), "yesterday");
    }
}
