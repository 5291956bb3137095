//! In-memory page used as the render surface for replays.
//!
//! Pages are described in TOML: document and viewport heights plus a tree of
//! nodes with tag, classes, id, attributes and an optional vertical layout.
//!
//! ```toml
//! document_height = 4000
//! viewport_height = 800
//!
//! [[nodes]]
//! tag = "div"
//! class = ["stars", "stars1"]
//! top = 0
//! height = 800
//! ```

pub mod selector;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use scrollfx_core::{DocumentGeometry, NodeLayout, RenderSurface, StyleCommit};

use selector::{Element, Selector};

#[derive(Debug, Clone, Deserialize)]
pub struct PageSpec {
    pub document_height: f64,
    pub viewport_height: f64,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeSpec {
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub class: Vec<String>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    /// Document offset of the top edge; nodes without one have no layout
    #[serde(default)]
    pub top: Option<f64>,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

fn default_tag() -> String {
    "div".to_string()
}

#[derive(Debug, Clone)]
struct PageNode {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    layout: Option<NodeLayout>,
    parent: Option<usize>,
}

impl Element for &PageNode {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// One style write as it landed on the page
#[derive(Debug, Clone, PartialEq)]
pub struct CommitRecord {
    pub node: usize,
    pub commit: StyleCommit,
}

/// Flattened page tree in document order
#[derive(Debug, Clone)]
pub struct StaticPage {
    nodes: Vec<PageNode>,
    geometry: DocumentGeometry,
    commits: Vec<CommitRecord>,
}

impl StaticPage {
    pub fn from_spec(spec: PageSpec) -> Self {
        let mut page = Self {
            nodes: Vec::new(),
            geometry: DocumentGeometry::new(spec.document_height, spec.viewport_height),
            commits: Vec::new(),
        };
        for node in spec.nodes {
            page.insert(node, None);
        }
        page
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let spec: PageSpec = toml::from_str(content).context("Failed to parse page description")?;
        Ok(Self::from_spec(spec))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read page {}", path.display()))?;
        Self::from_toml(&content)
    }

    fn insert(&mut self, spec: NodeSpec, parent: Option<usize>) {
        let index = self.nodes.len();
        self.nodes.push(PageNode {
            tag: spec.tag,
            id: spec.id,
            classes: spec.class,
            attrs: spec.attrs,
            layout: spec.top.map(|top| NodeLayout::new(top, spec.height)),
            parent,
        });
        for child in spec.children {
            self.insert(child, Some(index));
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn set_geometry(&mut self, geometry: DocumentGeometry) {
        self.geometry = geometry;
    }

    /// Short human-readable label, e.g. `div.stars.stars1` or `section#intro`
    pub fn describe(&self, node: usize) -> String {
        let Some(n) = self.nodes.get(node) else {
            return format!("#{}", node);
        };
        let mut label = n.tag.clone();
        if let Some(id) = &n.id {
            label.push('#');
            label.push_str(id);
        }
        for class in &n.classes {
            label.push('.');
            label.push_str(class);
        }
        label
    }

    #[cfg(test)]
    pub fn has_class(&self, node: usize, class: &str) -> bool {
        self.nodes
            .get(node)
            .map_or(false, |n| n.classes.iter().any(|c| c == class))
    }

    /// Commits made since the last drain
    pub fn drain_commits(&mut self) -> Vec<CommitRecord> {
        std::mem::take(&mut self.commits)
    }

    fn parse(&self, selector: &str) -> Option<Selector> {
        match Selector::parse(selector) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(error = %e, "Ignoring selector");
                None
            }
        }
    }

    fn matching(&self, selector: &Selector, candidates: impl Iterator<Item = usize>) -> Vec<usize> {
        let element_of = |i: usize| &self.nodes[i];
        let parent_of = |i: usize| self.nodes[i].parent;
        candidates
            .filter(|&i| selector.matches(i, &element_of, &parent_of))
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

impl RenderSurface for StaticPage {
    type Node = usize;

    fn query_all(&self, selector: &str) -> Vec<usize> {
        match self.parse(selector) {
            Some(parsed) => self.matching(&parsed, 0..self.nodes.len()),
            None => Vec::new(),
        }
    }

    fn query_within(&self, node: &usize, selector: &str) -> Vec<usize> {
        let Some(parsed) = self.parse(selector) else {
            return Vec::new();
        };
        let root = *node;
        self.matching(&parsed, (0..self.nodes.len()).filter(|&i| self.is_descendant(i, root)))
    }

    fn closest(&self, node: &usize, selector: &str) -> Option<usize> {
        let parsed = self.parse(selector)?;
        let mut current = Some(*node).filter(|&i| i < self.nodes.len());
        while let Some(i) = current {
            if !self.matching(&parsed, std::iter::once(i)).is_empty() {
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
        let Some(target) = self.nodes.get_mut(*node) else {
            return;
        };

        // Classes feed back into selector matching; other styles are only recorded
        if let StyleCommit::Class { name, enabled, .. } = &style {
            let present = target.classes.iter().any(|c| c == name);
            if *enabled && !present {
                target.classes.push(name.clone());
            } else if !*enabled && present {
                target.classes.retain(|c| c != name);
            }
        }

        self.commits.push(CommitRecord {
            node: *node,
            commit: style,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const PAGE: &str = r#"
        document_height = 3000
        viewport_height = 800

        [[nodes]]
        class = ["stars", "stars1"]
        top = 0
        height = 800

        [[nodes]]
        tag = "section"
        id = "intro"
        top = 800
        height = 1200

        [[nodes.children]]
        class = ["step"]
        attrs = { "data-step" = "0" }
        top = 800
        height = 600

        [[nodes.children.children]]
        tag = "p"
        class = ["fade-in"]
        top = 900
        height = 40

        [[nodes.children]]
        tag = "img"
        top = 1500
        height = 300
    "#;

    #[test]
    fn test_flattens_in_document_order() {
        let page = StaticPage::from_toml(PAGE).unwrap();
        assert_eq!(page.len(), 5);
        assert_eq!(page.describe(0), "div.stars.stars1");
        assert_eq!(page.describe(1), "section#intro");
        assert_eq!(page.describe(3), "p.fade-in");
        assert_eq!(page.geometry(), DocumentGeometry::new(3000.0, 800.0));
    }

    #[test]
    fn test_queries() {
        let page = StaticPage::from_toml(PAGE).unwrap();
        assert_eq!(page.query_all(".stars1"), vec![0]);
        assert_eq!(page.query_all("section > div"), vec![2]);
        assert_eq!(page.query_all("section img"), vec![4]);
        assert_eq!(page.query_within(&2, ".fade-in"), vec![3]);
        assert_eq!(page.query_within(&0, ".fade-in"), Vec::<usize>::new());
        assert_eq!(page.closest(&4, "section"), Some(1));
        assert_eq!(page.closest(&1, "section"), Some(1));
        assert_eq!(page.closest(&0, "section"), None);
        assert_eq!(page.layout(&4), Some(NodeLayout::new(1500.0, 300.0)));
    }

    #[test]
    fn test_invalid_selector_matches_nothing() {
        let page = StaticPage::from_toml(PAGE).unwrap();
        assert!(page.query_all("div >").is_empty());
    }

    #[test]
    fn test_commits_are_recorded_and_classes_applied() {
        let mut page = StaticPage::from_toml(PAGE).unwrap();
        page.commit(&0, StyleCommit::opacity(0.5));
        page.commit(&0, StyleCommit::opacity(0.25));
        page.commit(&2, StyleCommit::class("active", true, Duration::ZERO));

        assert_eq!(
            page.commits.iter().map(|r| r.node).collect::<Vec<_>>(),
            vec![0, 0, 2]
        );
        assert_eq!(page.commits[1].commit, StyleCommit::opacity(0.25));
        assert!(page.has_class(2, "active"));
        assert_eq!(page.query_all(".step.active"), vec![2]);

        page.commit(&2, StyleCommit::class("active", false, Duration::ZERO));
        assert!(!page.has_class(2, "active"));
        assert_eq!(page.drain_commits().len(), 4);
        assert!(page.drain_commits().is_empty());
    }
}
