//! Centralized file-name parsing for the `YYYY-MM-DD-name` blog convention.
//!
//! Blog posts may carry their publication date as a file-name prefix. The
//! prefix is optional; a front-matter `date` overrides it either way:
//!
//! - `2019-05-30-welcome.md` → date 2019-05-30, name `welcome`
//! - `2019-05-30.md` → date 2019-05-30, name `2019-05-30`
//! - `welcome.md` → no date, name `welcome`
//!
//! Nested posts keep their directory in the name (`2020/01-01-x` is not a
//! date prefix, but `news/2020-01-01-x` is).

use chrono::NaiveDate;

/// Result of parsing a post file stem like `2019-05-30-welcome`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPostName {
    /// Date prefix if present and a valid calendar date.
    pub date: Option<NaiveDate>,
    /// Name after the date prefix, directory kept. The full stem when there
    /// is no prefix, or when the prefix is the whole stem.
    pub name: String,
}

const DATE_LEN: usize = "YYYY-MM-DD".len();

/// Parse a post path (relative to the blog dir, extension stripped).
///
/// Handles these patterns:
/// - `"2019-05-30-welcome"` → date=Some(2019-05-30), name="welcome"
/// - `"news/2019-05-30-welcome"` → date=Some(2019-05-30), name="news/welcome"
/// - `"2019-05-30"` → date=Some(2019-05-30), name="2019-05-30"
/// - `"2019-13-40-bad"` → date=None, name="2019-13-40-bad"
/// - `"welcome"` → date=None, name="welcome"
pub fn parse_post_name(stem: &str) -> ParsedPostName {
    let (dir, file) = match stem.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, stem),
    };
    let with_dir = |name: &str| match dir {
        Some(dir) => format!("{dir}/{name}"),
        None => name.to_string(),
    };

    let date = file
        .get(..DATE_LEN)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok());
    let Some(date) = date else {
        return ParsedPostName {
            date: None,
            name: stem.to_string(),
        };
    };

    match file[DATE_LEN..].strip_prefix('-') {
        Some(rest) if !rest.is_empty() => ParsedPostName {
            date: Some(date),
            name: with_dir(rest),
        },
        _ if file.len() == DATE_LEN => ParsedPostName {
            date: Some(date),
            name: stem.to_string(),
        },
        // `2019-05-30x`: a date followed by something that is not a name
        _ => ParsedPostName {
            date: None,
            name: stem.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn dated_with_multi_word_name() {
        let p = parse_post_name("2019-05-30-hello-world");
        assert_eq!(p.date, ymd(2019, 5, 30));
        assert_eq!(p.name, "hello-world");
    }

    #[test]
    fn date_only() {
        let p = parse_post_name("2019-05-30");
        assert_eq!(p.date, ymd(2019, 5, 30));
        assert_eq!(p.name, "2019-05-30");
    }

    #[test]
    fn date_with_trailing_dash() {
        let p = parse_post_name("2019-05-30-");
        assert_eq!(p.date, None);
        assert_eq!(p.name, "2019-05-30-");
    }

    #[test]
    fn undated() {
        let p = parse_post_name("welcome");
        assert_eq!(p.date, None);
        assert_eq!(p.name, "welcome");
    }

    #[test]
    fn invalid_calendar_date_is_not_a_prefix() {
        let p = parse_post_name("2019-13-40-bad");
        assert_eq!(p.date, None);
        assert_eq!(p.name, "2019-13-40-bad");
    }

    #[test]
    fn nested_keeps_directory() {
        let p = parse_post_name("news/2020-02-29-leap");
        assert_eq!(p.date, ymd(2020, 2, 29));
        assert_eq!(p.name, "news/leap");
    }

    #[test]
    fn year_directory_is_not_a_date() {
        let p = parse_post_name("2020/01-01-x");
        assert_eq!(p.date, None);
        assert_eq!(p.name, "2020/01-01-x");
    }

    #[test]
    fn short_stem() {
        let p = parse_post_name("2019");
        assert_eq!(p.date, None);
        assert_eq!(p.name, "2019");
    }
}
