//! Page-break marker contract shared with the editor extension.
//!
//! The extension serializes every break as an atomic element that carries
//! [`PAGE_BREAK_ATTR`] on its outermost node. The decorative children it renders
//! for the editing surface are not content; the paginator drops them together with
//! the marker.

use kuchiki::NodeRef;

pub const PAGE_BREAK_ATTR: &str = "data-page-break";

const PAGE_BREAK_LABEL: &str = "\u{2014} Page Break \u{2014}";

/// Markup emitted by `insertPageBreak()`.
pub fn page_break_markup() -> String {
    format!(
        "<div {PAGE_BREAK_ATTR}=\"true\" class=\"page-break-element\" contenteditable=\"false\">\
         <div class=\"page-break-visual\"><div class=\"page-break-line\"></div>\
         <div class=\"page-break-label\">{PAGE_BREAK_LABEL}</div></div></div>"
    )
}

/// Markup emitted by `insertPageBreakWithContent()`: the break plus an empty
/// paragraph so the cursor has somewhere to land.
pub fn page_break_with_content_markup() -> String {
    let mut out = page_break_markup();
    out.push_str("<p></p>");
    out
}

/// Older documents stored breaks as rules.
pub fn legacy_page_break_markup() -> String {
    format!("<hr {PAGE_BREAK_ATTR}=\"true\">")
}

pub(crate) fn is_marker(node: &NodeRef, attr: &str) -> bool {
    node.as_element()
        .map(|element| element.attributes.borrow().contains(attr))
        .unwrap_or(false)
}

pub(crate) fn contains_marker(node: &NodeRef, attr: &str) -> bool {
    node.descendants().any(|desc| is_marker(&desc, attr))
}
