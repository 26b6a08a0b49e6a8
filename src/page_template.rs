use std::collections::BTreeMap;

/// Markup for one header or footer band, with optional variants for the first and
/// last page.
///
/// Placeholders:
/// - `{page}`: 1-based page number
/// - `{pages}`: total page count
/// - `{field:name}`: a value from [`PageTemplate::fields`], HTML-escaped
///
/// Unknown or unclosed tokens are left as written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BandTemplate {
    pub first: Option<String>,
    pub each: Option<String>,
    pub last: Option<String>,
}

impl BandTemplate {
    pub fn each(markup: impl Into<String>) -> Self {
        Self {
            each: Some(markup.into()),
            ..Self::default()
        }
    }

    pub fn with_first(mut self, markup: impl Into<String>) -> Self {
        self.first = Some(markup.into());
        self
    }

    pub fn with_last(mut self, markup: impl Into<String>) -> Self {
        self.last = Some(markup.into());
        self
    }

    pub fn select(&self, page_number: usize, total_pages: usize) -> Option<&str> {
        if total_pages == 1 {
            // A single page is both first and last; prefer `last` so closing text
            // still shows on one-page documents.
            self.last
                .as_deref()
                .or(self.first.as_deref())
                .or(self.each.as_deref())
        } else if page_number == 1 {
            self.first.as_deref().or(self.each.as_deref())
        } else if page_number == total_pages {
            self.last.as_deref().or(self.each.as_deref())
        } else {
            self.each.as_deref()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTemplate {
    pub header: BandTemplate,
    pub footer: BandTemplate,
    pub fields: BTreeMap<String, String>,
}

impl Default for PageTemplate {
    fn default() -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("client".to_string(), "Client Name".to_string());
        fields.insert("date".to_string(), String::new());
        Self {
            header: BandTemplate::each(
                "<span class=\"page-band-left\">Confidential</span>\
                 <span class=\"page-band-center\">Legal Document</span>\
                 <span class=\"page-band-right\">{field:date}</span>",
            ),
            footer: BandTemplate::each(
                "<span class=\"page-band-left\">Prepared for: {field:client}</span>\
                 <span class=\"page-band-center\">Page {page} of {pages}</span>\
                 <span class=\"page-band-right\">&copy; LawFirm</span>",
            ),
            fields,
        }
    }
}

impl PageTemplate {
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn header_for(&self, page_number: usize, total_pages: usize) -> String {
        self.band(&self.header, page_number, total_pages)
    }

    pub fn footer_for(&self, page_number: usize, total_pages: usize) -> String {
        self.band(&self.footer, page_number, total_pages)
    }

    fn band(&self, band: &BandTemplate, page_number: usize, total_pages: usize) -> String {
        band.select(page_number, total_pages)
            .map(|tpl| substitute_placeholders(tpl, page_number, total_pages, &self.fields))
            .unwrap_or_default()
    }
}

pub fn substitute_placeholders(
    template: &str,
    page_number: usize,
    page_count: usize,
    fields: &BTreeMap<String, String>,
) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        rest = &rest[start + 1..];

        let Some(end) = rest.find('}') else {
            // Unclosed token; keep as-is.
            out.push('{');
            out.push_str(rest);
            return out;
        };

        let token = &rest[..end];
        match resolve_token(token, page_number, page_count, fields) {
            Some(rep) => out.push_str(&rep),
            None => {
                out.push('{');
                out.push_str(token);
                out.push('}');
            }
        }

        rest = &rest[end + 1..];
    }
    out.push_str(rest);
    out
}

fn resolve_token(
    token: &str,
    page_number: usize,
    page_count: usize,
    fields: &BTreeMap<String, String>,
) -> Option<String> {
    match token.trim() {
        "page" => return Some(page_number.to_string()),
        "pages" => return Some(page_count.to_string()),
        _ => {}
    }
    let (kind, key) = token.split_once(':')?;
    if kind.trim() != "field" {
        return None;
    }
    fields.get(key.trim()).map(|value| escape_html(value))
}

pub(crate) fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        fields.insert("client".to_string(), "Smith & Sons".to_string());
        fields
    }

    #[test]
    fn page_placeholders() {
        assert_eq!(
            substitute_placeholders("Page {page} of {pages}", 2, 5, &BTreeMap::new()),
            "Page 2 of 5"
        );
    }

    #[test]
    fn field_values_are_escaped() {
        assert_eq!(
            substitute_placeholders("For {field:client}", 1, 1, &fields()),
            "For Smith &amp; Sons"
        );
    }

    #[test]
    fn unknown_and_unclosed_tokens_survive() {
        assert_eq!(
            substitute_placeholders("{field:missing} {other} {page", 1, 1, &fields()),
            "{field:missing} {other} {page"
        );
    }

    #[test]
    fn band_selection_follows_first_each_last() {
        let band = BandTemplate::each("each")
            .with_first("first")
            .with_last("last");
        assert_eq!(band.select(1, 3), Some("first"));
        assert_eq!(band.select(2, 3), Some("each"));
        assert_eq!(band.select(3, 3), Some("last"));
        assert_eq!(band.select(1, 1), Some("last"));

        let only_first = BandTemplate::default().with_first("cover");
        assert_eq!(only_first.select(1, 2), Some("cover"));
        assert_eq!(only_first.select(2, 2), None);
        assert_eq!(only_first.select(1, 1), Some("cover"));
    }

    #[test]
    fn default_footer_counts_pages() {
        let template = PageTemplate::default().with_field("client", "ACME");
        let footer = template.footer_for(2, 4);
        assert!(footer.contains("Page 2 of 4"));
        assert!(footer.contains("Prepared for: ACME"));
        assert!(template.header_for(1, 4).contains("Confidential"));
    }
}
