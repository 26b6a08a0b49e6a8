use crate::PaginatorBuilder;
use crate::debounce::{DEFAULT_DEBOUNCE_WAIT, Debouncer};
use crate::error::FolioError;
use crate::page_template::PageTemplate;
use crate::paginate::{PageFragment, PaginationReport, Paginator, SplitDepth};
use crate::render::{EDITOR_PANEL_LABEL, PageRenderer, page_break_styles};
use crate::types::PageGeometry;
use sha2::{Digest, Sha256};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewTab {
    #[default]
    Edit,
    Preview,
}

impl ViewTab {
    pub fn panel_label(self) -> &'static str {
        match self {
            ViewTab::Edit => EDITOR_PANEL_LABEL,
            ViewTab::Preview => crate::render::PREVIEW_PANEL_LABEL,
        }
    }
}

struct PreviewState {
    paginator: Paginator,
    pages: Vec<PageFragment>,
    report: Option<PaginationReport>,
    fingerprint: Option<[u8; 32]>,
    passes: u64,
    skipped: u64,
}

impl PreviewState {
    fn apply(&mut self, html: String) {
        let fingerprint: [u8; 32] = Sha256::digest(html.as_bytes()).into();
        if self.fingerprint == Some(fingerprint) {
            self.skipped += 1;
            debug!(skipped = self.skipped, "snapshot unchanged; keeping current pages");
            return;
        }
        let pagination = self.paginator.paginate(&html);
        self.pages = pagination.pages;
        self.report = Some(pagination.report);
        self.fingerprint = Some(fingerprint);
        self.passes += 1;
    }
}

type Callback = Box<dyn FnMut(String)>;

/// One editor session's preview pipeline: change events are debounced into
/// pagination passes, and the latest pages are rendered on demand.
///
/// The host drives time. Forward every editor update to
/// [`PreviewSession::on_content_change`] and call [`PreviewSession::tick`] when
/// [`PreviewSession::next_deadline`] passes.
pub struct PreviewSession {
    state: Rc<RefCell<PreviewState>>,
    debouncer: Debouncer<String, Callback>,
    renderer: PageRenderer,
    active_tab: ViewTab,
}

impl PreviewSession {
    pub fn builder() -> PreviewSessionBuilder {
        PreviewSessionBuilder::new()
    }

    /// Paginates immediately so the preview has pages before the first edit.
    pub fn mount(&mut self, html: &str) {
        self.debouncer.invoke_now(html.to_string());
    }

    pub fn on_content_change(&mut self, html: &str, now: Duration) {
        self.debouncer.call(html.to_string(), now);
    }

    /// Runs the pending pass if it is due. Returns whether pages were refreshed;
    /// a due snapshot identical to the current one is consumed but returns false.
    pub fn tick(&mut self, now: Duration) -> bool {
        let before = self.passes();
        self.debouncer.poll(now) && self.passes() > before
    }

    /// Runs the pending pass now, same return as [`PreviewSession::tick`].
    pub fn flush(&mut self) -> bool {
        let before = self.passes();
        self.debouncer.flush() && self.passes() > before
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.debouncer.deadline()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn debounce_wait(&self) -> Duration {
        self.debouncer.wait()
    }

    pub fn pages(&self) -> Vec<PageFragment> {
        self.state.borrow().pages.clone()
    }

    pub fn page_count(&self) -> usize {
        self.state.borrow().pages.len()
    }

    pub fn last_report(&self) -> Option<PaginationReport> {
        self.state.borrow().report.clone()
    }

    /// Pagination passes actually run, excluding unchanged snapshots.
    pub fn passes(&self) -> u64 {
        self.state.borrow().passes
    }

    pub fn active_tab(&self) -> ViewTab {
        self.active_tab
    }

    pub fn set_active_tab(&mut self, tab: ViewTab) {
        self.active_tab = tab;
    }

    pub fn renderer(&self) -> &PageRenderer {
        &self.renderer
    }

    pub fn render_preview(&self) -> String {
        self.renderer.render_preview(&self.state.borrow().pages)
    }

    /// Standalone document for the print dialog: the preview panel and the print
    /// stylesheet, whichever tab is active.
    pub fn print_document(&self) -> String {
        format!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><style>{}{}</style></head><body>{}</body></html>",
            self.renderer.stylesheet(),
            page_break_styles(),
            self.render_preview()
        )
    }
}

impl Drop for PreviewSession {
    fn drop(&mut self) {
        if self.debouncer.cancel().is_some() {
            debug!("preview session closed with a pending snapshot; dropped it");
        }
    }
}

#[derive(Clone)]
pub struct PreviewSessionBuilder {
    paginator: PaginatorBuilder,
    debounce_wait: Duration,
    geometry: PageGeometry,
    template: PageTemplate,
    active_tab: ViewTab,
}

impl Default for PreviewSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewSessionBuilder {
    pub fn new() -> Self {
        Self {
            paginator: PaginatorBuilder::new(),
            debounce_wait: DEFAULT_DEBOUNCE_WAIT,
            geometry: PageGeometry::default(),
            template: PageTemplate::default(),
            active_tab: ViewTab::default(),
        }
    }

    pub fn marker_attr(mut self, attr: impl Into<String>) -> Self {
        self.paginator = self.paginator.marker_attr(attr);
        self
    }

    pub fn split_depth(mut self, depth: SplitDepth) -> Self {
        self.paginator = self.paginator.split_depth(depth);
        self
    }

    pub fn perf_log(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.paginator = self.paginator.perf_log(path);
        self
    }

    pub fn debounce_wait(mut self, wait: Duration) -> Self {
        self.debounce_wait = wait;
        self
    }

    pub fn geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn template(mut self, template: PageTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.template = self.template.with_field(name, value);
        self
    }

    pub fn initial_tab(mut self, tab: ViewTab) -> Self {
        self.active_tab = tab;
        self
    }

    pub fn build(self) -> Result<PreviewSession, FolioError> {
        if self.debounce_wait.is_zero() {
            return Err(FolioError::InvalidConfiguration(
                "debounce wait must be greater than zero".to_string(),
            ));
        }
        let size = self.geometry.size;
        if !size.width.is_positive() || !size.height.is_positive() {
            return Err(FolioError::InvalidConfiguration(
                "page width and height must be positive".to_string(),
            ));
        }
        if !self.geometry.body_height().is_positive() {
            return Err(FolioError::InvalidConfiguration(
                "header, footer and buffer leave no room for the page body".to_string(),
            ));
        }
        let paginator = self.paginator.build()?;

        let state = Rc::new(RefCell::new(PreviewState {
            paginator,
            pages: Vec::new(),
            report: None,
            fingerprint: None,
            passes: 0,
            skipped: 0,
        }));
        let sink = Rc::clone(&state);
        let callback: Callback = Box::new(move |html: String| sink.borrow_mut().apply(html));

        Ok(PreviewSession {
            state,
            debouncer: Debouncer::new(self.debounce_wait, callback),
            renderer: PageRenderer::new(self.geometry, self.template),
            active_tab: self.active_tab,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Px, Size};

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn session() -> PreviewSession {
        PreviewSession::builder().build().expect("session")
    }

    #[test]
    fn mount_paginates_without_waiting() {
        let mut session = session();
        session.mount("<p>Start typing your legal document here...</p>");
        assert_eq!(session.page_count(), 1);
        assert_eq!(session.passes(), 1);
        assert!(!session.is_pending());
    }

    #[test]
    fn typing_burst_runs_one_pass_with_latest_snapshot() {
        let mut session = session();
        session.mount("<p>a</p>");
        session.on_content_change("<p>ab</p>", ms(0));
        session.on_content_change("<p>ab</p><div data-page-break></div>", ms(50));
        session.on_content_change("<p>ab</p><div data-page-break></div><p>c</p>", ms(100));
        assert!(!session.tick(ms(200)));
        assert_eq!(session.next_deadline(), Some(ms(250)));
        assert!(session.tick(ms(250)));
        assert_eq!(session.passes(), 2);
        assert_eq!(
            session.pages(),
            vec![
                PageFragment { html: "<p>ab</p>".into() },
                PageFragment { html: "<p>c</p>".into() },
            ]
        );
    }

    #[test]
    fn unchanged_snapshot_skips_pagination() {
        let mut session = session();
        session.mount("<p>same</p>");
        session.on_content_change("<p>same</p>", ms(0));
        assert!(!session.flush());
        assert!(!session.is_pending());
        assert_eq!(session.passes(), 1);
    }

    #[test]
    fn tick_reports_no_refresh_for_identical_snapshot() {
        let mut session = session();
        session.mount("<p>same</p>");
        session.on_content_change("<p>same</p>", ms(0));
        assert!(!session.tick(ms(200)));
        assert!(!session.is_pending());
        assert_eq!(session.passes(), 1);

        session.on_content_change("<p>changed</p>", ms(300));
        assert!(session.tick(ms(500)));
        assert_eq!(session.passes(), 2);
    }

    #[test]
    fn preview_and_print_include_every_page() {
        let mut session = PreviewSession::builder()
            .field("client", "Jane Roe")
            .build()
            .expect("session");
        session.mount("<p>one</p><div data-page-break></div><p>two</p>");
        let preview = session.render_preview();
        assert!(preview.contains("Page 1 of 2"));
        assert!(preview.contains("Page 2 of 2"));
        assert!(preview.contains("Prepared for: Jane Roe"));

        let print = session.print_document();
        assert!(print.starts_with("<!DOCTYPE html>"));
        assert!(print.contains("@media print"));
        assert_eq!(print.matches("class=\"page\" ").count(), 2);
    }

    #[test]
    fn tabs_switch() {
        let mut session = PreviewSession::builder()
            .initial_tab(ViewTab::Preview)
            .build()
            .expect("session");
        assert_eq!(session.active_tab(), ViewTab::Preview);
        session.set_active_tab(ViewTab::Edit);
        assert_eq!(session.active_tab().panel_label(), "Editor tab");
    }

    #[test]
    fn recursive_depth_reaches_the_paginator() {
        let mut session = PreviewSession::builder()
            .split_depth(SplitDepth::Recursive)
            .build()
            .expect("session");
        session.mount("<div><p>a<span data-page-break></span>b</p></div>");
        assert_eq!(session.page_count(), 2);
        assert_eq!(session.last_report().map(|r| r.buried_markers), Some(0));
    }

    #[test]
    fn rejects_zero_wait() {
        let err = PreviewSession::builder()
            .debounce_wait(Duration::ZERO)
            .build()
            .err()
            .expect("zero wait rejected");
        assert!(matches!(err, FolioError::InvalidConfiguration(_)));
    }

    #[test]
    fn rejects_geometry_without_body_room() {
        let geometry = PageGeometry {
            header_height: Px::from_f32(600.0),
            footer_height: Px::from_f32(600.0),
            ..PageGeometry::default()
        };
        assert!(PreviewSession::builder().geometry(geometry).build().is_err());

        let flat = PageGeometry {
            size: Size {
                width: Px::ZERO,
                height: Px::from_f32(100.0),
            },
            ..PageGeometry::default()
        };
        assert!(PreviewSession::builder().geometry(flat).build().is_err());
    }
}
