use crate::page_template::PageTemplate;
use crate::paginate::PageFragment;
use crate::types::PageGeometry;

pub const PREVIEW_PANEL_LABEL: &str = "Preview tab";
pub const EDITOR_PANEL_LABEL: &str = "Editor tab";

/// Wraps page fragments in fixed-size frames with header and footer bands.
///
/// Fragments are inserted verbatim. The body band height comes from the geometry
/// but nothing is measured, so overflowing content is clipped by the stylesheet
/// rather than moved to another page.
#[derive(Debug, Clone, Default)]
pub struct PageRenderer {
    geometry: PageGeometry,
    template: PageTemplate,
}

impl PageRenderer {
    pub fn new(geometry: PageGeometry, template: PageTemplate) -> Self {
        Self { geometry, template }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn template(&self) -> &PageTemplate {
        &self.template
    }

    pub fn render_page(&self, index: usize, total: usize, fragment: &PageFragment) -> String {
        let page_number = index + 1;
        let size = self.geometry.size;
        let mut out = String::with_capacity(fragment.html.len() + 512);
        out.push_str(&format!(
            "<div class=\"page\" data-page-number=\"{page_number}\" style=\"width:{};height:{}\">",
            size.width.css(),
            size.height.css()
        ));
        out.push_str(&format!(
            "<div class=\"page-header\">{}</div>",
            self.template.header_for(page_number, total)
        ));
        out.push_str(&format!(
            "<div class=\"page-body\" style=\"height:{}\">",
            self.geometry.body_height().css()
        ));
        out.push_str(&fragment.html);
        out.push_str("</div>");
        out.push_str(&format!(
            "<div class=\"page-footer\">{}</div>",
            self.template.footer_for(page_number, total)
        ));
        out.push_str("</div>");
        out
    }

    pub fn render_pages(&self, pages: &[PageFragment]) -> Vec<String> {
        let total = pages.len();
        pages
            .iter()
            .enumerate()
            .map(|(idx, page)| self.render_page(idx, total, page))
            .collect()
    }

    /// The preview tab panel: every frame in order.
    pub fn render_preview(&self, pages: &[PageFragment]) -> String {
        let mut out = format!(
            "<div role=\"tabpanel\" aria-label=\"{PREVIEW_PANEL_LABEL}\" class=\"preview-pages\">"
        );
        for frame in self.render_pages(pages) {
            out.push_str(&frame);
        }
        out.push_str("</div>");
        out
    }

    /// Frame styles plus the print rules: one frame per physical page and nothing
    /// but the preview panel on paper.
    pub fn stylesheet(&self) -> String {
        let header = self.geometry.header_height.css();
        let footer = self.geometry.footer_height.css();
        format!(
            ".page {{ background: white; box-shadow: 0 8px 32px rgba(0,0,0,0.08); display: flex; \
             flex-direction: column; position: relative; margin: 0 auto 2rem; \
             break-inside: avoid; page-break-inside: avoid; }}\n\
             .page-header {{ height: {header}; flex-shrink: 0; display: flex; \
             justify-content: space-between; align-items: center; padding: 0 24px; \
             border-bottom: 1px solid #e2e8f0; background: #f9fafb; font-size: 12px; }}\n\
             .page-footer {{ height: {footer}; flex-shrink: 0; display: flex; \
             justify-content: space-between; align-items: center; padding: 0 24px; \
             border-top: 1px solid #e2e8f0; background: #f9fafb; font-size: 12px; }}\n\
             .page-body {{ flex: 1; overflow: hidden; padding: 0 24px; margin-top: 20px; \
             box-sizing: border-box; }}\n\
             @media print {{\n\
             body {{ background: white !important; }}\n\
             .page {{ box-shadow: none; margin: 0; break-after: page; page-break-after: always; }}\n\
             .page-header, .page-footer {{ background: white; }}\n\
             [role=\"tabpanel\"]:not([aria-label=\"{PREVIEW_PANEL_LABEL}\"]) {{ display: none !important; }}\n\
             }}\n"
        )
    }
}

/// Styles for the marker widget on the editing surface.
pub fn page_break_styles() -> &'static str {
    ".page-break-element { margin: 2rem 0; padding: 0; user-select: none; cursor: pointer; }\n\
     .page-break-visual { position: relative; height: 24px; display: flex; \
     align-items: center; justify-content: center; }\n\
     .page-break-line { position: absolute; top: 50%; left: 0; right: 0; height: 1px; \
     background: #94a3b8; }\n\
     .page-break-label { position: relative; z-index: 1; background: white; color: #64748b; \
     font-size: 11px; padding: 4px 12px; border: 1px solid #cbd5e1; border-radius: 12px; \
     text-transform: uppercase; letter-spacing: 0.5px; }\n\
     @media print { .page-break-element { display: none; } }\n"
}
