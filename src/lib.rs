mod debounce;
mod error;
mod marker;
mod page_template;
mod paginate;
mod perf;
mod render;
mod session;
mod types;
#[cfg(feature = "wasm")]
mod wasm;

pub use debounce::{DEFAULT_DEBOUNCE_WAIT, DebounceState, Debouncer};
pub use error::FolioError;
pub use marker::{
    PAGE_BREAK_ATTR, legacy_page_break_markup, page_break_markup,
    page_break_with_content_markup,
};
pub use page_template::{BandTemplate, PageTemplate, substitute_placeholders};
pub use paginate::{
    PageFragment, Pagination, PaginationReport, Paginator, SplitDepth, paginate,
};
use perf::PerfLogger;
pub use render::{EDITOR_PANEL_LABEL, PREVIEW_PANEL_LABEL, PageRenderer, page_break_styles};
pub use session::{PreviewSession, PreviewSessionBuilder, ViewTab};
use std::sync::Arc;
pub use types::{
    BODY_BUFFER_PX, FOOTER_HEIGHT_PX, HEADER_HEIGHT_PX, PAGE_HEIGHT_MM, PAGE_WIDTH_MM,
    PageGeometry, Px, Size, mm_to_px,
};

#[derive(Clone)]
pub struct PaginatorBuilder {
    marker_attr: String,
    split_depth: SplitDepth,
    perf_enabled: bool,
    perf_path: Option<std::path::PathBuf>,
}

impl Default for PaginatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PaginatorBuilder {
    pub fn new() -> Self {
        Self {
            marker_attr: PAGE_BREAK_ATTR.to_string(),
            split_depth: SplitDepth::default(),
            perf_enabled: false,
            perf_path: None,
        }
    }

    // Attribute names are matched after HTML parsing, which lowercases them.
    pub fn marker_attr(mut self, attr: impl Into<String>) -> Self {
        self.marker_attr = attr.into().trim().to_ascii_lowercase();
        self
    }

    pub fn split_depth(mut self, depth: SplitDepth) -> Self {
        self.split_depth = depth;
        self
    }

    // JSON-lines span and count log, one set of lines per pass.
    pub fn perf_log(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.perf_enabled = true;
        self.perf_path = Some(path.into());
        self
    }

    // Toggle performance logging (uses the default file when no path is set).
    pub fn perf_enabled(mut self, enabled: bool) -> Self {
        self.perf_enabled = enabled;
        self
    }

    pub fn build(self) -> Result<Paginator, FolioError> {
        if self.marker_attr.is_empty() {
            return Err(FolioError::InvalidConfiguration(
                "marker attribute must not be empty".to_string(),
            ));
        }
        if self
            .marker_attr
            .chars()
            .any(|ch| ch.is_whitespace() || matches!(ch, '"' | '\'' | '>' | '/' | '=' | '<'))
        {
            return Err(FolioError::InvalidConfiguration(format!(
                "marker attribute {:?} is not a valid attribute name",
                self.marker_attr
            )));
        }
        let perf = if self.perf_enabled || self.perf_path.is_some() {
            let path = self
                .perf_path
                .unwrap_or_else(|| std::path::PathBuf::from(perf::DEFAULT_PERF_LOG));
            Some(Arc::new(PerfLogger::new(path)?))
        } else {
            None
        };
        Ok(Paginator::new(self.marker_attr, self.split_depth, perf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_match_free_function() {
        let paginator = PaginatorBuilder::new().build().expect("paginator");
        assert_eq!(paginator.marker_attr(), PAGE_BREAK_ATTR);
        assert_eq!(paginator.split_depth(), SplitDepth::Shallow);
        let html = "<p>x</p><div data-page-break></div><p>y</p>";
        assert_eq!(paginator.paginate(html).into_html(), paginate(html));
    }

    #[test]
    fn marker_attr_is_normalized() {
        let paginator = PaginatorBuilder::new()
            .marker_attr("  Data-Sheet-Break ")
            .build()
            .expect("paginator");
        assert_eq!(paginator.marker_attr(), "data-sheet-break");
        let pages = paginator
            .paginate("<p>a</p><div DATA-SHEET-BREAK></div><p>b</p>")
            .into_html();
        assert_eq!(pages, vec!["<p>a</p>", "<p>b</p>"]);
    }

    #[test]
    fn invalid_marker_attrs_are_rejected() {
        for attr in ["", "   ", "data page", "a=b", "x>"] {
            let result = PaginatorBuilder::new().marker_attr(attr).build();
            assert!(
                matches!(result, Err(FolioError::InvalidConfiguration(_))),
                "accepted {attr:?}"
            );
        }
    }

    #[test]
    fn perf_log_records_each_pass() {
        let path = std::env::temp_dir().join(format!(
            "folio_builder_{}_perf.log",
            std::process::id()
        ));
        {
            let paginator = PaginatorBuilder::new()
                .perf_log(&path)
                .build()
                .expect("paginator");
            paginator.paginate("<p>a</p><div data-page-break></div><p>b</p>");
            paginator.paginate("<p>c</p>");
        }
        let body = std::fs::read_to_string(&path).expect("perf log");
        assert_eq!(body.matches("\"paginate.parse\"").count(), 2);
        assert!(body.contains("\"paginate.result\""));
        let _ = std::fs::remove_file(&path);
        let hot = path.with_file_name(format!(
            "folio_builder_{}_perf_hot.log",
            std::process::id()
        ));
        let _ = std::fs::remove_file(hot);
    }
}
