//! Custom Askama template filters.

use std::fmt::Display;

/// Returns the current year, for the page footer.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

#[cfg(test)]
mod tests {
    use askama::Template;

    use crate::filters;

    #[derive(Template)]
    #[template(source = "{{ \"\"|current_year }}", ext = "txt")]
    struct Footer;

    #[test]
    fn test_current_year_renders_this_year() {
        use chrono::Datelike;
        let rendered = Footer.render().unwrap();
        assert_eq!(rendered, chrono::Utc::now().year().to_string());
    }
}
