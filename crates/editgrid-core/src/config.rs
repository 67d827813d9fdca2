//! # Configuration
//!
//! Grid tuning is loaded with [`confique`] from an optional TOML file, with
//! environment variables taking priority.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `EDITGRID_TABLET_BREAKPOINT`, `EDITGRID_DEBOUNCE_MS`,
//!    `EDITGRID_PAGE_SIZE`.
//! 2. **Config file**: the path handed to [`GridConfig::load`]. A missing file is skipped.
//! 3. **Compiled defaults**.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `tablet_breakpoint` | `768` | Viewport width below which secondary columns collapse |
//! | `debounce_ms` | `300` | Window for coalescing view-state writes |
//! | `page_size` | `25` | Rows per page |
//! | `placeholder` | `-` | Text shown for empty readonly cells |

use crate::error::Result;
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GridConfig {
    /// Viewport width (px or terminal columns) below which collapse mode may engage.
    #[config(default = 768, env = "EDITGRID_TABLET_BREAKPOINT")]
    pub tablet_breakpoint: u32,

    /// Debounce window for view-state writes, in milliseconds.
    #[config(default = 300, env = "EDITGRID_DEBOUNCE_MS")]
    pub debounce_ms: u64,

    /// Rows per page.
    #[config(default = 25, env = "EDITGRID_PAGE_SIZE")]
    pub page_size: usize,

    /// Readonly placeholder for empty values.
    #[config(default = "-")]
    pub placeholder: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tablet_breakpoint: crate::layout::DEFAULT_TABLET_BREAKPOINT,
            debounce_ms: 300,
            page_size: 25,
            placeholder: crate::render::PLACEHOLDER.to_string(),
        }
    }
}

impl GridConfig {
    /// Env first, then `path` if it exists, then defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = path {
            builder = builder.file(path);
        }
        Ok(builder.load()?)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
