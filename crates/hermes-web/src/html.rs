//! Page chrome and HTML helpers shared by the handlers.

use hermes_common::Notification;

/// Navigation HTML shared across all pages
pub const NAV_HTML: &str = include_str!("../templates/nav.html");

/// Escape text for element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Full document around `body`.
pub fn page(title: &str, body: &str) -> String {
    format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{} - HERMES</title>
    <link rel="stylesheet" href="/static/css/main.css">
</head>
<body>
<div class="app-container">
{}
<main class="main-content">
{}
</main>
</div>
<script src="/static/js/hermes.js"></script>
</body>
</html>"#, escape(title), NAV_HTML, body)
}

pub fn notification(n: &Notification) -> String {
    format!(
        r#"<div class="notice notice-{}"><strong>{}</strong> {}</div>"#,
        n.level.as_str(),
        escape(&n.title),
        escape(&n.message)
    )
}

pub fn checked(on: bool) -> &'static str {
    if on { " checked" } else { "" }
}

pub fn selected(on: bool) -> &'static str {
    if on { " selected" } else { "" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
        assert_eq!(escape("orb_period"), "orb_period");
    }

    #[test]
    fn test_notification_markup() {
        let html = notification(&Notification::warning("No data", "There are <no> rows."));
        assert!(html.contains("notice-warning"));
        assert!(html.contains("There are &lt;no&gt; rows."));
    }
}
