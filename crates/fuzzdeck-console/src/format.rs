//! Display formatting helpers.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

const UNITS: [&str; 9] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Human readable size with binary multiples and at most two decimals,
/// trailing zeros dropped: `1536 -> "1.5 KB"`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut scaled = bytes as f64;
    let mut exp = 0;
    while scaled >= 1024.0 && exp < UNITS.len() - 1 {
        scaled /= 1024.0;
        exp += 1;
    }
    let fixed = format!("{:.2}", scaled);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[exp])
}

/// Backend timestamp rendered in the operator's local time.
pub fn format_date(raw: &str) -> String {
    format_date_in(raw, &Local)
}

/// Backend timestamps come either as RFC 3339 or as SQLite
/// `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Render a backend timestamp in `tz`. Anything unparseable is shown verbatim.
pub fn format_date_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match parse_timestamp(raw) {
        Some(dt) => dt.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string(),
        None => raw.to_string(),
    }
}

/// Escape text for inclusion in markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 Bytes");
        assert_eq!(format_bytes(512), "512 Bytes");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1024 * 1024), "1 MB");
        assert_eq!(format_bytes(4_000_000), "3.81 MB");
        assert_eq!(format_bytes(8_000_000), "7.63 MB");
        assert_eq!(format_bytes(u64::MAX), "16 EB");
    }

    #[test]
    fn test_format_date_variants() {
        assert_eq!(
            format_date_in("2023-04-01T10:00:00Z", &Utc),
            "2023-04-01 10:00:00"
        );
        assert_eq!(
            format_date_in("2023-04-01T12:00:00+02:00", &Utc),
            "2023-04-01 10:00:00"
        );
        assert_eq!(
            format_date_in("2023-04-01 10:00:00", &Utc),
            "2023-04-01 10:00:00"
        );
        assert_eq!(format_date_in("yesterday", &Utc), "yesterday");
    }

    #[test]
    fn test_parse_timestamp_keeps_fractions_and_offsets() {
        let whole = parse_timestamp("2023-04-01T10:00:00Z").expect("rfc 3339");
        let half = parse_timestamp("2023-04-01T10:00:00.5Z").expect("fractional");
        let offset = parse_timestamp("2023-04-01T11:00:00+02:00").expect("offset");
        assert!(half > whole);
        assert!(offset < whole);
        assert_eq!(parse_timestamp("2023-04-01 10:00:00"), Some(whole));
        assert_eq!(parse_timestamp("1"), None);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<img src=x onerror=\"a&b\">"),
            "&lt;img src=x onerror=&quot;a&amp;b&quot;&gt;"
        );
    }
}
