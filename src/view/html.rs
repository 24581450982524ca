use crate::model::{Company, Severity};

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn icon_html(company: &Company) -> String {
    let initial = escape_html(&company.initial());
    match company.icon_url() {
        Some(url) => format!(
            r#"<img src="{}" alt="{}" data-initial="{}" onerror="this.parentElement.textContent=this.dataset.initial">"#,
            escape_html(url),
            escape_html(&company.name),
            initial
        ),
        None => initial,
    }
}

pub fn severity_badge(severity: &Severity) -> String {
    format!(
        r#"<span class="severity-badge {}">{}</span>"#,
        severity.css_class(),
        escape_html(severity.as_str())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_and_quotes() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn icon_uses_initial_without_url() {
        let company = Company {
            name: "Zoom".to_string(),
            ..Default::default()
        };
        assert_eq!(icon_html(&company), "Z");
    }

    #[test]
    fn icon_image_carries_initial_fallback() {
        let company = Company {
            name: "Zoom".to_string(),
            icon_url: Some("https://zoom.us/favicon.ico".to_string()),
            ..Default::default()
        };
        let html = icon_html(&company);
        assert!(html.starts_with("<img src=\"https://zoom.us/favicon.ico\""));
        assert!(html.contains("data-initial=\"Z\""));
        assert!(html.contains("onerror="));
    }
}
