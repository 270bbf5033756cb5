use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Order in which flattened leaves are fed to the placement engine.
/// Every order is a stable sort: ties keep tree traversal order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Tallest first. Produces the reference layouts.
    HeightDesc,
    AreaDesc,
    MaxSideDesc,
    WidthDesc,
    /// Traversal order.
    None,
}

impl FromStr for SortOrder {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "height_desc" => Ok(Self::HeightDesc),
            "area_desc" => Ok(Self::AreaDesc),
            "max_side_desc" => Ok(Self::MaxSideDesc),
            "width_desc" => Ok(Self::WidthDesc),
            "none" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

/// Persistence format of the placement index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IndexFormat {
    /// Nested JSON: groups hold `children`, leaves hold their placement.
    Json,
    /// Flat JSON object keyed by leaf path.
    JsonHash,
    /// Tab-indented text, one line per leaf and per group boundary.
    Text,
}

impl FromStr for IndexFormat {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "json-hash" | "json_hash" => Ok(Self::JsonHash),
            "text" | "stdx" => Ok(Self::Text),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackerConfig {
    #[serde(default = "default_sort_order")]
    pub sort_order: SortOrder,
    /// Pixels kept free to the right of and below every image.
    ///
    /// The gap is part of each placed slot, so it counts against
    /// `max_width`/`max_height`: under a ceiling of 64 with padding 2, an
    /// image may end at 62 at most.
    #[serde(default)]
    pub padding: u32,
    /// Optional ceiling on the atlas width. None means unbounded.
    #[serde(default)]
    pub max_width: Option<u32>,
    /// Optional ceiling on the atlas height. None means unbounded.
    #[serde(default)]
    pub max_height: Option<u32>,
    /// Round canvas sides up to a power of two.
    #[serde(default)]
    pub power_of_two: bool,
    /// Force a square canvas (max(width,height)).
    #[serde(default)]
    pub square: bool,
    /// Draw red outlines around every image (debug).
    #[serde(default)]
    pub outlines: bool,
    #[serde(default = "default_index_format")]
    pub index_format: IndexFormat,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            sort_order: default_sort_order(),
            padding: 0,
            max_width: None,
            max_height: None,
            power_of_two: false,
            square: false,
            outlines: false,
            index_format: default_index_format(),
        }
    }
}

impl PackerConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if a dimension ceiling is zero or if the padding
    /// leaves no usable space under a ceiling.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::SheetPackError;

        if self.max_width == Some(0) || self.max_height == Some(0) {
            return Err(SheetPackError::InvalidDimensions {
                width: self.max_width.unwrap_or(0),
                height: self.max_height.unwrap_or(0),
            });
        }

        for (axis, limit) in [("max_width", self.max_width), ("max_height", self.max_height)] {
            if let Some(limit) = limit {
                if self.padding >= limit {
                    return Err(SheetPackError::InvalidConfig(format!(
                        "padding ({}) leaves no usable space under {} ({})",
                        self.padding, axis, limit
                    )));
                }
            }
        }

        Ok(())
    }

    /// Create a fluent builder for `PackerConfig`.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }
}

fn default_sort_order() -> SortOrder {
    SortOrder::HeightDesc
}
fn default_index_format() -> IndexFormat {
    IndexFormat::Json
}

/// Builder for `PackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }
    pub fn sort_order(mut self, v: SortOrder) -> Self {
        self.cfg.sort_order = v;
        self
    }
    pub fn padding(mut self, v: u32) -> Self {
        self.cfg.padding = v;
        self
    }
    pub fn with_max_dimensions(mut self, w: u32, h: u32) -> Self {
        self.cfg.max_width = Some(w);
        self.cfg.max_height = Some(h);
        self
    }
    pub fn pow2(mut self, v: bool) -> Self {
        self.cfg.power_of_two = v;
        self
    }
    pub fn square(mut self, v: bool) -> Self {
        self.cfg.square = v;
        self
    }
    pub fn outlines(mut self, v: bool) -> Self {
        self.cfg.outlines = v;
        self
    }
    pub fn index_format(mut self, v: IndexFormat) -> Self {
        self.cfg.index_format = v;
        self
    }
    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}
