//! # Editgrid Architecture
//!
//! Editgrid is a **UI-agnostic data grid engine**. It knows how rows are edited,
//! filtered, sorted, laid out and selected; it does not know how any of that is
//! painted. A web front end, a TUI and the bundled terminal host all drive the
//! same engine.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Host (e.g. the `editgrid` binary)                          │
//! │  - Paints LayoutPlans and CellViews, owns the event loop    │
//! │  - Commits rows, implements GridHost                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - GridApi: owns all per-instance state                     │
//! │  - Keeps the engine modules consistent with each other      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Engine (edit, filter, sort, layout, render, selection)     │
//! │  - Pure state machines and functions over Rust types        │
//! │  - No I/O whatsoever                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Persistence (persist/)                                     │
//! │  - SessionBackend trait: FsBackend, MemBackend              │
//! │  - Debounced, merge-on-write view state                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: The Host Owns the Data
//!
//! The engine never stores rows. Saves and deletes are raised through
//! [`api::GridHost`] with plain owned rows; the host commits them and hands fresh
//! rows back with [`api::GridApi::set_rows`]. The only thing the engine persists
//! itself is *view state*: sorting, column visibility and filters.
//!
//! ## Error Model
//!
//! - Misconfiguration that can be survived (a select without options) degrades
//!   to an inline badge and a `tracing` warning.
//! - Invalid transitions (starting add while editing) are no-ops.
//! - Persistence failures are logged and swallowed.
//! - Only truly unusable input (duplicate column ids, unreadable config) is an
//!   [`error::GridError`].
//!
//! ## Module Overview
//!
//! - [`api`]: The facade, entry point for all operations
//! - [`model`]: Rows, row ids and values
//! - [`column`]: Column descriptors and validation
//! - [`edit`]: The none/edit/add state machine
//! - [`filter`]: Global and per-column text filtering
//! - [`sort`]: Multi-column sorting
//! - [`pagination`]: Page slicing
//! - [`layout`]: Responsive column priority and collapse mode
//! - [`render`]: Cell renderer dispatch
//! - [`selection`]: Row selection and bulk-action availability
//! - [`export`]: JSON and CSV export
//! - [`persist`]: View-state storage
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod column;
pub mod config;
pub mod edit;
pub mod error;
pub mod export;
pub mod filter;
pub mod layout;
pub mod model;
pub mod pagination;
pub mod persist;
pub mod render;
pub mod selection;
pub mod sort;
