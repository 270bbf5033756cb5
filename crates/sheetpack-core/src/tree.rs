//! Hierarchical asset model mirroring the source directory tree.
//!
//! The tree only carries shape and image sizes. Placements live in a separate
//! [`Layout`](crate::model::Layout) keyed by [`KeyedLeaf::key`], and the index
//! emitter joins the two.

use std::path::{Path, PathBuf};

/// Separator used when joining group names into a leaf key.
pub const KEY_SEPARATOR: char = '/';

/// A single image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// File the raster was decoded from, if it came from disk.
    pub source: Option<PathBuf>,
}

impl Leaf {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            source: None,
        }
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

/// A directory. Only the root group is unnamed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    pub name: Option<String>,
    pub children: Vec<AssetNode>,
}

impl Group {
    pub fn new(name: impl Into<String>, children: Vec<AssetNode>) -> Self {
        Self {
            name: Some(name.into()),
            children,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetNode {
    Leaf(Leaf),
    Group(Group),
}

impl From<Leaf> for AssetNode {
    fn from(leaf: Leaf) -> Self {
        AssetNode::Leaf(leaf)
    }
}

impl From<Group> for AssetNode {
    fn from(group: Group) -> Self {
        AssetNode::Group(group)
    }
}

/// A leaf together with its `/`-joined key, as produced by [`AssetTree::leaves`].
#[derive(Debug, Clone)]
pub struct KeyedLeaf<'a> {
    pub key: String,
    pub leaf: &'a Leaf,
}

/// Tree of groups and leaves under an unnamed root group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetTree {
    root: Group,
}

impl AssetTree {
    pub fn new(children: Vec<AssetNode>) -> Self {
        Self {
            root: Group {
                name: None,
                children,
            },
        }
    }

    pub fn root(&self) -> &Group {
        &self.root
    }

    /// Top-level nodes (children of the unnamed root).
    pub fn children(&self) -> &[AssetNode] {
        &self.root.children
    }

    /// All leaves in depth-first pre-order, each with its `/`-joined key.
    pub fn leaves(&self) -> Vec<KeyedLeaf<'_>> {
        let mut out = Vec::new();
        collect_leaves(&self.root.children, &mut String::new(), &mut out);
        out
    }

    pub fn leaf_count(&self) -> usize {
        count_leaves(&self.root.children)
    }

    pub fn is_empty(&self) -> bool {
        self.leaf_count() == 0
    }
}

/// Joins a parent key prefix and a child name.
pub fn join_key(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}{KEY_SEPARATOR}{name}")
    }
}

fn collect_leaves<'a>(nodes: &'a [AssetNode], prefix: &mut String, out: &mut Vec<KeyedLeaf<'a>>) {
    for node in nodes {
        match node {
            AssetNode::Leaf(leaf) => out.push(KeyedLeaf {
                key: join_key(prefix, &leaf.name),
                leaf,
            }),
            AssetNode::Group(group) => {
                let len = prefix.len();
                let name = group.name.as_deref().unwrap_or_default();
                *prefix = join_key(prefix, name);
                collect_leaves(&group.children, prefix, out);
                prefix.truncate(len);
            }
        }
    }
}

fn count_leaves(nodes: &[AssetNode]) -> usize {
    nodes
        .iter()
        .map(|node| match node {
            AssetNode::Leaf(_) => 1,
            AssetNode::Group(g) => count_leaves(&g.children),
        })
        .sum()
}
