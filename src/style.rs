use std::sync::OnceLock;

use fancy_regex::Regex;

use crate::{Error, Result};

fn url_pattern() -> Result<&'static Regex> {
    static PATTERN: OnceLock<std::result::Result<Regex, String>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(
                r#"^\s*url\(\s*(?:"((?:\\.|[^"\\])*)"|'((?:\\.|[^'\\])*)'|([^"'\s()]*))\s*\)\s*$"#,
            )
            .map_err(|err| err.to_string())
        })
        .as_ref()
        .map_err(|msg| Error::Dom(format!("invalid url pattern: {msg}")))
}

/// Formats `path` as a double-quoted CSS `url()` value.
pub fn css_url(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 7);
    out.push_str("url(\"");
    for ch in path.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push_str("\")");
    out
}

/// Extracts the path from a `background-image` value such as
/// `url("/img/a.webp")`. Returns `None` for anything that is not a single
/// `url()`.
pub fn background_image_url(value: &str) -> Result<Option<String>> {
    let captures = url_pattern()?
        .captures(value)
        .map_err(|err| Error::Dom(format!("url match failed: {err}")))?;
    let Some(captures) = captures else {
        return Ok(None);
    };
    let Some(raw) = captures
        .get(1)
        .or_else(|| captures.get(2))
        .or_else(|| captures.get(3))
    else {
        return Ok(None);
    };

    let mut out = String::with_capacity(raw.as_str().len());
    let mut chars = raw.as_str().chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(ch);
        }
    }
    Ok(Some(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_url_quotes_and_escapes() {
        assert_eq!(
            css_url("/static/img/hero/hero-1.webp"),
            r#"url("/static/img/hero/hero-1.webp")"#
        );
        assert_eq!(css_url(r#"/a"b\c"#), r#"url("/a\"b\\c")"#);
    }

    #[test]
    fn background_image_url_accepts_all_quote_styles() -> Result<()> {
        assert_eq!(
            background_image_url(r#"url("/a.webp")"#)?.as_deref(),
            Some("/a.webp")
        );
        assert_eq!(
            background_image_url("url('/b.webp')")?.as_deref(),
            Some("/b.webp")
        );
        assert_eq!(
            background_image_url(" url( /c.webp ) ")?.as_deref(),
            Some("/c.webp")
        );
        Ok(())
    }

    #[test]
    fn background_image_url_round_trips_escaped_quotes() -> Result<()> {
        let path = r#"/odd "name".webp"#;
        assert_eq!(background_image_url(&css_url(path))?.as_deref(), Some(path));
        Ok(())
    }

    #[test]
    fn background_image_url_rejects_other_values() -> Result<()> {
        assert_eq!(background_image_url("")?, None);
        assert_eq!(background_image_url("none")?, None);
        assert_eq!(background_image_url(r#"url("/a.webp"#)?, None);
        assert_eq!(background_image_url("linear-gradient(red, blue)")?, None);
        Ok(())
    }
}
