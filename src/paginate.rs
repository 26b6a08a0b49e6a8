//! Marker-driven pagination.
//!
//! The snapshot is parsed into a private tree that nothing else can observe. Nodes
//! are moved out of that tree into page pieces, so untouched subtrees serialize
//! exactly as they were parsed; only elements that straddle a break are rebuilt,
//! as shallow clones carrying the original tag and attributes.

use crate::marker::{PAGE_BREAK_ATTR, contains_marker, is_marker};
use crate::perf::PerfLogger;
use html5ever::{LocalName, Namespace, QualName};
use kuchiki::traits::TendrilSink;
use kuchiki::{NodeData, NodeRef};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, warn};

/// How far below a top-level node a marker may sit and still split its ancestors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitDepth {
    /// Top-level markers, and markers that are direct children of a top-level
    /// element. A marker buried deeper leaves its branch whole; the marker itself is
    /// removed and counted in [`PaginationReport::buried_markers`].
    #[default]
    Shallow,
    /// Markers at any depth partition every ancestor.
    Recursive,
}

impl SplitDepth {
    fn splits_at(self, level: usize) -> bool {
        match self {
            SplitDepth::Shallow => level == 0,
            SplitDepth::Recursive => true,
        }
    }
}

/// Content of one preview page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFragment {
    pub html: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationReport {
    pub markers: usize,
    pub partial_clones: usize,
    pub blank_pages_dropped: usize,
    pub buried_markers: usize,
    /// Set when no page had content and the raw snapshot became the only page.
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub pages: Vec<PageFragment>,
    pub report: PaginationReport,
}

impl Pagination {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn into_html(self) -> Vec<String> {
        self.pages.into_iter().map(|page| page.html).collect()
    }
}

pub struct Paginator {
    marker_attr: String,
    split_depth: SplitDepth,
    perf: Option<Arc<PerfLogger>>,
    passes: AtomicU64,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            marker_attr: PAGE_BREAK_ATTR.to_string(),
            split_depth: SplitDepth::default(),
            perf: None,
            passes: AtomicU64::new(0),
        }
    }
}

/// Splits `html` at page-break markers using the default configuration.
pub fn paginate(html: &str) -> Vec<String> {
    Paginator::default().paginate(html).into_html()
}

impl Paginator {
    pub(crate) fn new(
        marker_attr: String,
        split_depth: SplitDepth,
        perf: Option<Arc<PerfLogger>>,
    ) -> Self {
        Self {
            marker_attr,
            split_depth,
            perf,
            passes: AtomicU64::new(0),
        }
    }

    pub fn marker_attr(&self) -> &str {
        &self.marker_attr
    }

    pub fn split_depth(&self) -> SplitDepth {
        self.split_depth
    }

    pub fn paginate(&self, html: &str) -> Pagination {
        let pass = self.passes.fetch_add(1, Ordering::Relaxed) + 1;
        let perf = self.perf.as_deref();
        // Instant is unavailable on some wasm targets; only read the clock when timing.
        let clock = || perf.map(|_| Instant::now());

        let t_parse = clock();
        let root = parse_snapshot(html);
        span(perf, "paginate.parse", pass, t_parse);

        let t_split = clock();
        let mut splitter = Splitter {
            attr: &self.marker_attr,
            depth: self.split_depth,
            report: PaginationReport::default(),
        };
        let mut pieces: Vec<Vec<NodeRef>> = vec![Vec::new()];
        for node in root.children().collect::<Vec<_>>() {
            let node_pieces = splitter.pieces(&node, 0);
            extend_runs(&mut pieces, node_pieces);
        }
        let mut report = splitter.report;
        span(perf, "paginate.split", pass, t_split);

        let t_serialize = clock();
        let mut pages = Vec::with_capacity(pieces.len());
        for piece in pieces {
            let fragment: String = piece.iter().map(NodeRef::to_string).collect();
            if fragment.trim().is_empty() {
                report.blank_pages_dropped += 1;
                continue;
            }
            pages.push(PageFragment { html: fragment });
        }
        if pages.is_empty() {
            report.fallback = true;
            pages.push(PageFragment {
                html: html.to_string(),
            });
        }
        span(perf, "paginate.serialize", pass, t_serialize);

        if let Some(perf) = perf {
            perf.log_counts(
                "paginate.result",
                Some(pass),
                &[
                    ("pages", pages.len() as u64),
                    ("markers", report.markers as u64),
                    ("partial_clones", report.partial_clones as u64),
                    ("bytes", html.len() as u64),
                ],
            );
            perf.flush();
        }
        debug!(
            pass,
            pages = pages.len(),
            markers = report.markers,
            partial_clones = report.partial_clones,
            blank_pages_dropped = report.blank_pages_dropped,
            fallback = report.fallback,
            "paginated snapshot"
        );

        Pagination { pages, report }
    }
}

/// Parses `html` the way a `<div>`'s `innerHTML` is set, so `<style>`, `<title>`,
/// `<meta>` and friends stay in the flow instead of moving to a head. Returns the
/// container whose children are the top-level nodes.
fn parse_snapshot(html: &str) -> NodeRef {
    let context = QualName::new(
        None,
        Namespace::from("http://www.w3.org/1999/xhtml"),
        LocalName::from("div"),
    );
    let document = kuchiki::parse_fragment(context, Vec::new()).one(html);
    document
        .children()
        .find(|node| node.as_element().is_some())
        .unwrap_or(document)
}

fn span(perf: Option<&PerfLogger>, name: &str, pass: u64, started: Option<Instant>) {
    if let (Some(perf), Some(started)) = (perf, started) {
        perf.log_span_ms(name, Some(pass), started.elapsed().as_secs_f64() * 1000.0);
    }
}

struct Splitter<'a> {
    attr: &'a str,
    depth: SplitDepth,
    report: PaginationReport,
}

impl Splitter<'_> {
    /// The runs of `node`'s content that fall between breaks, in order. There is
    /// always at least one run; every break adds one more, and runs may be empty.
    fn pieces(&mut self, node: &NodeRef, level: usize) -> Vec<Vec<NodeRef>> {
        if is_marker(node, self.attr) {
            self.report.markers += 1;
            return vec![Vec::new(), Vec::new()];
        }
        if !contains_marker(node, self.attr) {
            return vec![vec![node.clone()]];
        }
        if !self.depth.splits_at(level) {
            let buried = strip_markers(node, self.attr);
            self.report.buried_markers += buried;
            warn!(
                buried,
                depth = level,
                "page break nested too deep to split; kept its block on one page"
            );
            return vec![vec![node.clone()]];
        }

        let mut runs: Vec<Vec<NodeRef>> = vec![Vec::new()];
        for child in node.children().collect::<Vec<_>>() {
            let child_pieces = self.pieces(&child, level + 1);
            extend_runs(&mut runs, child_pieces);
        }
        if runs.len() == 1 {
            // Nothing below split, so every child is still attached to `node`.
            return vec![vec![node.clone()]];
        }

        runs.into_iter()
            .map(|run| {
                if run.is_empty() {
                    return run;
                }
                let Some(partial) = shallow_clone(node) else {
                    return run;
                };
                for child in run {
                    partial.append(child);
                }
                self.report.partial_clones += 1;
                vec![partial]
            })
            .collect()
    }
}

/// Continues the last run with the first piece and opens a new run per break.
fn extend_runs(runs: &mut Vec<Vec<NodeRef>>, pieces: Vec<Vec<NodeRef>>) {
    let mut pieces = pieces.into_iter();
    if let (Some(head), Some(last)) = (pieces.next(), runs.last_mut()) {
        last.extend(head);
    }
    runs.extend(pieces);
}

fn shallow_clone(node: &NodeRef) -> Option<NodeRef> {
    let NodeData::Element(element) = node.data() else {
        return None;
    };
    let attributes = element.attributes.borrow().map.clone();
    Some(NodeRef::new_element(element.name.clone(), attributes))
}

/// Removes every marker below `node`, outermost first. Returns how many were removed.
fn strip_markers(node: &NodeRef, attr: &str) -> usize {
    let mut removed = 0;
    while let Some(marker) = node.descendants().find(|desc| is_marker(desc, attr)) {
        marker.detach();
        removed += 1;
    }
    removed
}
