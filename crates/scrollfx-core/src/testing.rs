//! In-memory host ports for unit tests

use crate::host::{DocumentGeometry, FrameScheduler, NodeLayout, RenderSurface, StyleCommit};

#[derive(Debug, Clone)]
struct FakeNode {
    selector: String,
    layout: Option<NodeLayout>,
    parent: Option<usize>,
}

/// Surface whose nodes match exactly one selector string each and which
/// records every commit in order
#[derive(Debug, Clone)]
pub(crate) struct RecordingSurface {
    nodes: Vec<FakeNode>,
    geometry: DocumentGeometry,
    commits: Vec<(usize, StyleCommit)>,
}

impl RecordingSurface {
    pub fn new(document_height: f64, viewport_height: f64) -> Self {
        Self {
            nodes: Vec::new(),
            geometry: DocumentGeometry::new(document_height, viewport_height),
            commits: Vec::new(),
        }
    }

    fn push(&mut self, selector: &str, layout: Option<NodeLayout>, parent: Option<usize>) -> usize {
        self.nodes.push(FakeNode {
            selector: selector.to_string(),
            layout,
            parent,
        });
        self.nodes.len() - 1
    }

    pub fn add(&mut self, selector: &str, top: f64, height: f64) -> usize {
        self.push(selector, Some(NodeLayout::new(top, height)), None)
    }

    pub fn add_child(&mut self, parent: usize, selector: &str, top: f64, height: f64) -> usize {
        self.push(selector, Some(NodeLayout::new(top, height)), Some(parent))
    }

    pub fn add_detached(&mut self, selector: &str) -> usize {
        self.push(selector, None, None)
    }

    pub fn set_layout(&mut self, node: usize, top: f64, height: f64) {
        self.nodes[node].layout = Some(NodeLayout::new(top, height));
    }

    pub fn set_geometry(&mut self, document_height: f64, viewport_height: f64) {
        self.geometry = DocumentGeometry::new(document_height, viewport_height);
    }

    pub fn commits(&self) -> &[(usize, StyleCommit)] {
        &self.commits
    }

    pub fn take_commits(&mut self) -> Vec<(usize, StyleCommit)> {
        std::mem::take(&mut self.commits)
    }

    /// Commits made to one node, in order
    pub fn commits_for(&self, node: usize) -> Vec<StyleCommit> {
        self.commits
            .iter()
            .filter(|(target, _)| *target == node)
            .map(|(_, commit)| commit.clone())
            .collect()
    }

    fn is_descendant(&self, node: usize, ancestor: usize) -> bool {
        let mut current = self.nodes[node].parent;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.nodes[parent].parent;
        }
        false
    }
}

impl RenderSurface for RecordingSurface {
    type Node = usize;

    fn query_all(&self, selector: &str) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|&i| self.nodes[i].selector == selector)
            .collect()
    }

    fn query_within(&self, node: &usize, selector: &str) -> Vec<usize> {
        self.query_all(selector)
            .into_iter()
            .filter(|&i| self.is_descendant(i, *node))
            .collect()
    }

    fn closest(&self, node: &usize, selector: &str) -> Option<usize> {
        let mut current = Some(*node);
        while let Some(i) = current {
            if self.nodes[i].selector == selector {
                return Some(i);
            }
            current = self.nodes[i].parent;
        }
        None
    }

    fn layout(&self, node: &usize) -> Option<NodeLayout> {
        self.nodes.get(*node).and_then(|n| n.layout)
    }

    fn geometry(&self) -> DocumentGeometry {
        self.geometry
    }

    fn commit(&mut self, node: &usize, style: StyleCommit) {
        self.commits.push((*node, style));
    }
}

/// Scheduler that only counts requests; tests fire frames by hand
#[derive(Debug, Default)]
pub(crate) struct CountingScheduler {
    pub requests: usize,
}

impl FrameScheduler for CountingScheduler {
    fn request_frame(&mut self) {
        self.requests += 1;
    }
}
