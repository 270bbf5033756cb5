//! Index emission.
//!
//! [`emit_index`] walks the asset tree in construction order and reports a
//! stream of begin-group / leaf / end-group events to an [`IndexSink`],
//! joining each leaf with its placement from the [`Layout`]. The root group
//! itself is never reported, only its children. Sinks turn the stream into a
//! concrete format.

use crate::config::{IndexFormat, PackerConfig};
use crate::error::{Result, SheetPackError};
use crate::model::Layout;
use crate::tree::{AssetNode, AssetTree, join_key};
use serde::Serialize;
use serde_json::{Map, Value, json};

/// Placement record of one leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeafRecord {
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexEvent {
    BeginGroup(String),
    Leaf(LeafRecord),
    EndGroup,
}

/// Consumer of the index event stream.
pub trait IndexSink {
    fn begin_group(&mut self, name: &str) -> Result<()>;
    /// `key` is the leaf's `/`-joined path; `record.name` its own name.
    fn leaf(&mut self, key: &str, record: &LeafRecord) -> Result<()>;
    fn end_group(&mut self) -> Result<()>;
}

impl IndexSink for Vec<IndexEvent> {
    fn begin_group(&mut self, name: &str) -> Result<()> {
        self.push(IndexEvent::BeginGroup(name.to_string()));
        Ok(())
    }
    fn leaf(&mut self, _key: &str, record: &LeafRecord) -> Result<()> {
        self.push(IndexEvent::Leaf(record.clone()));
        Ok(())
    }
    fn end_group(&mut self) -> Result<()> {
        self.push(IndexEvent::EndGroup);
        Ok(())
    }
}

/// Walks `tree` and reports every group and leaf to `sink`.
pub fn emit_index<S: IndexSink + ?Sized>(tree: &AssetTree, layout: &Layout, sink: &mut S) -> Result<()> {
    emit_nodes(tree.children(), "", layout, sink)
}

fn emit_nodes<S: IndexSink + ?Sized>(
    nodes: &[AssetNode],
    prefix: &str,
    layout: &Layout,
    sink: &mut S,
) -> Result<()> {
    for node in nodes {
        match node {
            AssetNode::Leaf(leaf) => {
                let key = join_key(prefix, &leaf.name);
                let rect = layout
                    .placement(&key)
                    .ok_or_else(|| SheetPackError::MissingPlacement(key.clone()))?;
                let record = LeafRecord {
                    name: leaf.name.clone(),
                    x: rect.x,
                    y: rect.y,
                    width: rect.w,
                    height: rect.h,
                };
                sink.leaf(&key, &record)?;
            }
            AssetNode::Group(group) => {
                let name = group.name.as_deref().ok_or_else(|| {
                    SheetPackError::InvalidInput(format!(
                        "unnamed group below `{}`",
                        if prefix.is_empty() { "<root>" } else { prefix }
                    ))
                })?;
                sink.begin_group(name)?;
                emit_nodes(&group.children, &join_key(prefix, name), layout, sink)?;
                sink.end_group()?;
            }
        }
    }
    Ok(())
}

/// Collects the event stream into a vector.
pub fn index_events(tree: &AssetTree, layout: &Layout) -> Result<Vec<IndexEvent>> {
    let mut events = Vec::new();
    emit_index(tree, layout, &mut events)?;
    Ok(events)
}

/// Builds nested JSON values: groups are `{ name, children }`, leaves are
/// `{ name, x, y, width, height }`.
#[derive(Debug)]
pub struct JsonSink {
    // one frame per open group; frame 0 is the root
    stack: Vec<(String, Vec<Value>)>,
}

impl Default for JsonSink {
    fn default() -> Self {
        Self {
            stack: vec![(String::new(), Vec::new())],
        }
    }
}

impl JsonSink {
    /// Top-level entries. Fails if a group was left open.
    pub fn finish(mut self) -> Result<Vec<Value>> {
        match (self.stack.pop(), self.stack.is_empty()) {
            (Some((_, entries)), true) => Ok(entries),
            _ => Err(SheetPackError::Encode("unbalanced group markers".into())),
        }
    }
}

impl IndexSink for JsonSink {
    fn begin_group(&mut self, name: &str) -> Result<()> {
        self.stack.push((name.to_string(), Vec::new()));
        Ok(())
    }
    fn leaf(&mut self, _key: &str, record: &LeafRecord) -> Result<()> {
        let value = serde_json::to_value(record).map_err(|e| SheetPackError::Encode(e.to_string()))?;
        if let Some((_, entries)) = self.stack.last_mut() {
            entries.push(value);
        }
        Ok(())
    }
    fn end_group(&mut self) -> Result<()> {
        if self.stack.len() < 2 {
            return Err(SheetPackError::Encode("end of group without a begin".into()));
        }
        if let Some((name, children)) = self.stack.pop() {
            if let Some((_, entries)) = self.stack.last_mut() {
                entries.push(json!({ "name": name, "children": children }));
            }
        }
        Ok(())
    }
}

/// Flat map keyed by leaf path. Group markers only contribute to the keys.
#[derive(Debug, Default)]
pub struct JsonHashSink {
    frames: Map<String, Value>,
}

impl JsonHashSink {
    pub fn finish(self) -> Map<String, Value> {
        self.frames
    }
}

impl IndexSink for JsonHashSink {
    fn begin_group(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }
    fn leaf(&mut self, key: &str, record: &LeafRecord) -> Result<()> {
        self.frames.insert(
            key.to_string(),
            json!({ "x": record.x, "y": record.y, "w": record.width, "h": record.height }),
        );
        Ok(())
    }
    fn end_group(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Tab-indented text: `name {` / `name: (x, y, width, height)` / `}`.
#[derive(Debug, Default)]
pub struct TextSink {
    out: String,
    depth: usize,
}

impl TextSink {
    pub fn finish(self) -> String {
        self.out
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push('\t');
        }
    }
}

impl IndexSink for TextSink {
    fn begin_group(&mut self, name: &str) -> Result<()> {
        self.indent();
        self.out.push_str(name);
        self.out.push_str(" {\n");
        self.depth += 1;
        Ok(())
    }
    fn leaf(&mut self, _key: &str, r: &LeafRecord) -> Result<()> {
        self.indent();
        self.out.push_str(&format!(
            "{}: ({}, {}, {}, {})\n",
            r.name, r.x, r.y, r.width, r.height
        ));
        Ok(())
    }
    fn end_group(&mut self) -> Result<()> {
        self.depth = self.depth.checked_sub(1).ok_or_else(|| {
            SheetPackError::Encode("end of group without a begin".into())
        })?;
        self.indent();
        self.out.push_str("}\n");
        Ok(())
    }
}

fn meta(layout: &Layout, cfg: &PackerConfig) -> Value {
    json!({
        "app": "sheetpack",
        "version": env!("CARGO_PKG_VERSION"),
        "format": "RGBA8888",
        "size": { "w": layout.width, "h": layout.height },
        "padding": cfg.padding,
    })
}

/// Nested index document `{ entries, meta }`.
pub fn to_json(tree: &AssetTree, layout: &Layout, cfg: &PackerConfig) -> Result<Value> {
    let mut sink = JsonSink::default();
    emit_index(tree, layout, &mut sink)?;
    Ok(json!({ "entries": sink.finish()?, "meta": meta(layout, cfg) }))
}

/// Flat index document `{ frames: { "dir/name.png": { x, y, w, h } }, meta }`.
pub fn to_json_hash(tree: &AssetTree, layout: &Layout, cfg: &PackerConfig) -> Result<Value> {
    let mut sink = JsonHashSink::default();
    emit_index(tree, layout, &mut sink)?;
    Ok(json!({ "frames": sink.finish(), "meta": meta(layout, cfg) }))
}

pub fn to_text(tree: &AssetTree, layout: &Layout) -> Result<String> {
    let mut sink = TextSink::default();
    emit_index(tree, layout, &mut sink)?;
    Ok(sink.finish())
}

/// Renders the index in `cfg.index_format`.
pub fn render_index(tree: &AssetTree, layout: &Layout, cfg: &PackerConfig) -> Result<String> {
    let pretty = |v: Value| {
        serde_json::to_string_pretty(&v).map_err(|e| SheetPackError::Encode(e.to_string()))
    };
    match cfg.index_format {
        IndexFormat::Json => pretty(to_json(tree, layout, cfg)?),
        IndexFormat::JsonHash => pretty(to_json_hash(tree, layout, cfg)?),
        IndexFormat::Text => to_text(tree, layout),
    }
}
