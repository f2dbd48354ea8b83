//! Directory tree model.
//!
//! Directory nodes live in a map keyed by their path relative to the root,
//! so expansion state belongs to a location rather than to whichever widget
//! happens to draw it. Listings are never cached across expansions: every
//! transition into the expanded state produces a fresh [`ListRequest`].

use std::collections::{HashMap, HashSet};

use crate::fs::{DirEntry, DirHandle, EntryHandle, FileHandle, FsError, FsResult};
use crate::{CoreError, CoreResult, Generation};

/// Location of a node, as path components below the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath(Vec<String>);

impl NodePath {
    /// The root node.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns the path of the child `name`.
    pub fn join(&self, name: &str) -> Self {
        let mut components = self.0.clone();
        components.push(name.to_string());
        Self(components)
    }

    /// Nesting depth; the root is at depth 0.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if `self` lies strictly below `ancestor`.
    pub fn is_descendant_of(&self, ancestor: &NodePath) -> bool {
        self.0.len() > ancestor.0.len() && self.0.starts_with(&ancestor.0)
    }

    /// Returns the ancestor at `depth` (or `self` if already that shallow).
    fn prefix(&self, depth: usize) -> NodePath {
        Self(self.0.iter().take(depth).cloned().collect())
    }
}

impl std::fmt::Display for NodePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_root() {
            write!(f, "/")
        } else {
            write!(f, "{}", self.0.join("/"))
        }
    }
}

/// Whether a directory starts out expanded.
///
/// Only the root may, and only when its name is not excluded.
pub fn default_expanded(depth: usize, name: &str, excluded: &[String]) -> bool {
    depth == 0 && !excluded.iter().any(|e| e == name)
}

/// Puts directories before files.
///
/// Within each group the incoming order is kept as is.
pub fn order_entries(entries: Vec<DirEntry>) -> Vec<DirEntry> {
    let (mut ordered, files): (Vec<_>, Vec<_>) =
        entries.into_iter().partition(DirEntry::is_directory);
    ordered.extend(files);
    ordered
}

/// A listing the tree wants performed.
#[derive(Debug, Clone)]
pub struct ListRequest {
    pub path: NodePath,
    pub dir: DirHandle,
    pub generation: Generation,
}

/// What happened to a listing result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingOutcome {
    /// The node now shows these many entries.
    Applied { entries: usize },
    /// The node is in an error state.
    Failed(FsError),
    /// A newer listing was requested, or the node is gone.
    Stale,
}

/// One line of the rendered tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub path: NodePath,
    pub name: String,
    pub depth: usize,
    pub kind: RowKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    /// Header of a directory node.
    Directory {
        expanded: bool,
        loading: bool,
        error: Option<FsError>,
    },
    /// A file leaf.
    File(FileHandle),
    /// Placeholder shown until a node's first listing arrives.
    Loading,
}

#[derive(Debug)]
struct DirNode {
    name: String,
    handle: DirHandle,
    expanded: bool,
    /// Last listing received, already ordered.
    entries: Option<Vec<DirEntry>>,
    pending: Option<Generation>,
    error: Option<FsError>,
}

impl DirNode {
    fn new(name: String, handle: DirHandle, expanded: bool) -> Self {
        Self {
            name,
            handle,
            expanded,
            entries: None,
            pending: None,
            error: None,
        }
    }
}

/// Expansion state and listings for every directory seen under a root.
#[derive(Debug)]
pub struct DirectoryTree {
    nodes: HashMap<NodePath, DirNode>,
    collapsed_by_default: Vec<String>,
}

impl DirectoryTree {
    /// Builds the tree for `root`, returning the listing it needs first.
    pub fn new(root: DirHandle, collapsed_by_default: Vec<String>) -> (Self, Vec<ListRequest>) {
        let expanded = default_expanded(0, root.name(), &collapsed_by_default);
        let mut nodes = HashMap::new();
        nodes.insert(
            NodePath::root(),
            DirNode::new(root.name().to_string(), root, expanded),
        );

        let mut tree = Self {
            nodes,
            collapsed_by_default,
        };

        let requests = if expanded {
            tree.issue(&NodePath::root()).into_iter().collect()
        } else {
            Vec::new()
        };
        (tree, requests)
    }

    /// Returns whether the node at `path` is expanded.
    pub fn is_expanded(&self, path: &NodePath) -> Option<bool> {
        self.nodes.get(path).map(|n| n.expanded)
    }

    /// Returns the last listing received for `path`.
    pub fn entries(&self, path: &NodePath) -> Option<&[DirEntry]> {
        self.nodes.get(path).and_then(|n| n.entries.as_deref())
    }

    /// Returns the error shown on `path`, if any.
    pub fn error(&self, path: &NodePath) -> Option<&FsError> {
        self.nodes.get(path).and_then(|n| n.error.as_ref())
    }

    /// Flips a node's expansion.
    ///
    /// Expanding lists the node again, along with every expanded
    /// descendant that becomes visible with it. Collapsing keeps whatever
    /// was fetched and requests nothing.
    pub fn toggle(&mut self, path: &NodePath) -> CoreResult<Vec<ListRequest>> {
        let node = self
            .nodes
            .get_mut(path)
            .ok_or_else(|| CoreError::NodeNotFound(path.clone()))?;
        node.expanded = !node.expanded;

        if !node.expanded {
            tracing::debug!("Collapsed {}", path);
            return Ok(Vec::new());
        }

        let mut targets = Vec::new();
        self.collect_visible_dirs(path, &mut targets);
        Ok(targets.iter().filter_map(|p| self.issue(p)).collect())
    }

    /// Lists an expanded node again, e.g. after an error.
    ///
    /// A collapsed node only has its error cleared and yields no request:
    /// its next expansion lists it anyway.
    pub fn refresh(&mut self, path: &NodePath) -> CoreResult<Option<ListRequest>> {
        let node = self
            .nodes
            .get_mut(path)
            .ok_or_else(|| CoreError::NodeNotFound(path.clone()))?;
        if !node.expanded {
            node.error = None;
            return Ok(None);
        }
        Ok(self.issue(path))
    }

    /// Clears the error shown on `path`.
    pub fn dismiss_error(&mut self, path: &NodePath) {
        if let Some(node) = self.nodes.get_mut(path) {
            node.error = None;
        }
    }

    /// Clears every node's error.
    pub fn dismiss_all_errors(&mut self) {
        for node in self.nodes.values_mut() {
            node.error = None;
        }
    }

    /// Paths of nodes currently showing an error.
    pub fn failed_paths(&self) -> Vec<NodePath> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.error.is_some())
            .map(|(p, _)| p.clone())
            .collect()
    }

    /// Applies a listing result if it answers the node's latest request.
    pub fn apply_listing(
        &mut self,
        request: &ListRequest,
        result: FsResult<Vec<DirEntry>>,
    ) -> ListingOutcome {
        let Some(node) = self.nodes.get_mut(&request.path) else {
            tracing::debug!("Dropping listing for vanished node {}", request.path);
            return ListingOutcome::Stale;
        };
        if node.pending != Some(request.generation) {
            tracing::debug!(
                "Dropping stale listing {} for {}",
                request.generation,
                request.path
            );
            return ListingOutcome::Stale;
        }
        node.pending = None;

        match result {
            Ok(entries) => {
                let entries = order_entries(entries);
                let count = entries.len();
                self.sync_children(&request.path, &entries);
                if let Some(node) = self.nodes.get_mut(&request.path) {
                    node.entries = Some(entries);
                    node.error = None;
                }
                tracing::debug!("Listed {} ({} entries)", request.path, count);
                ListingOutcome::Applied { entries: count }
            }
            Err(err) => {
                tracing::warn!("Listing {} failed: {}", request.path, err);
                node.error = Some(err.clone());
                ListingOutcome::Failed(err)
            }
        }
    }

    /// Flattens the visible tree into rows, parents before children.
    pub fn rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        self.push_rows(&NodePath::root(), &mut rows);
        rows
    }

    fn push_rows(&self, path: &NodePath, rows: &mut Vec<TreeRow>) {
        let Some(node) = self.nodes.get(path) else {
            return;
        };
        let depth = path.depth();

        rows.push(TreeRow {
            path: path.clone(),
            name: node.name.clone(),
            depth,
            kind: RowKind::Directory {
                expanded: node.expanded,
                loading: node.pending.is_some(),
                error: node.error.clone(),
            },
        });

        if !node.expanded {
            return;
        }

        let Some(entries) = &node.entries else {
            if node.pending.is_some() {
                rows.push(TreeRow {
                    path: path.clone(),
                    name: String::new(),
                    depth: depth + 1,
                    kind: RowKind::Loading,
                });
            }
            return;
        };

        for entry in entries {
            let child = path.join(&entry.name);
            match &entry.handle {
                EntryHandle::Directory(_) => self.push_rows(&child, rows),
                EntryHandle::File(handle) => rows.push(TreeRow {
                    path: child,
                    name: entry.name.clone(),
                    depth: depth + 1,
                    kind: RowKind::File(handle.clone()),
                }),
            }
        }
    }

    fn collect_visible_dirs(&self, path: &NodePath, out: &mut Vec<NodePath>) {
        let Some(node) = self.nodes.get(path) else {
            return;
        };
        if !node.expanded {
            return;
        }
        out.push(path.clone());

        if let Some(entries) = &node.entries {
            for entry in entries.iter().filter(|e| e.is_directory()) {
                self.collect_visible_dirs(&path.join(&entry.name), out);
            }
        }
    }

    fn issue(&mut self, path: &NodePath) -> Option<ListRequest> {
        let generation = Generation::next();
        let node = self.nodes.get_mut(path)?;
        node.pending = Some(generation);
        node.error = None;
        Some(ListRequest {
            path: path.clone(),
            dir: node.handle.clone(),
            generation,
        })
    }

    /// Creates nodes for new subdirectories and drops those that vanished,
    /// together with everything below them.
    fn sync_children(&mut self, parent: &NodePath, entries: &[DirEntry]) {
        let depth = parent.depth() + 1;
        let mut present = HashSet::new();

        for entry in entries {
            let EntryHandle::Directory(handle) = &entry.handle else {
                continue;
            };
            let path = parent.join(&entry.name);
            match self.nodes.get_mut(&path) {
                Some(existing) => existing.handle = handle.clone(),
                None => {
                    let expanded = default_expanded(depth, &entry.name, &self.collapsed_by_default);
                    self.nodes.insert(
                        path.clone(),
                        DirNode::new(entry.name.clone(), handle.clone(), expanded),
                    );
                }
            }
            present.insert(path);
        }

        self.nodes.retain(|path, _| {
            !path.is_descendant_of(parent) || present.contains(&path.prefix(depth))
        });
    }
}
