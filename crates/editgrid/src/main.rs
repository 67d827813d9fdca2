//! # Editgrid CLI Architecture
//!
//! `editgrid` is a terminal host for the `editgrid-core` engine. The binary is
//! intentionally thin: the CLI lives in `src/cli/`, while this file only invokes
//! `cli::run()` and handles process termination.
//!
//! ## Workspace Structure
//!
//! - `crates/editgrid-core/`: the UI-agnostic grid engine
//! - `crates/editgrid/`: this host, depends on the engine
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/editgrid/src/cli/)                       │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Grid documents on disk (document.rs)                     │
//! │  - Command handlers (commands.rs)                           │
//! │  - Terminal painting of layouts and cells (render.rs)       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/editgrid-core/src/api.rs)                │
//! │  - GridApi owns one grid's state                            │
//! │  - Returns LayoutPlans, CellViews and SavePayloads          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every invocation is one grid "page view": the document is loaded, view state
//! is restored from the session directory, the command's flags are applied as
//! user interactions, and the grid is dropped, which flushes any view-state
//! change back to the session. Running `show` again without flags therefore
//! shows the grid sorted and filtered the way it was left.
//!
//! ## Testing Approach
//!
//! - **Engine (`crates/editgrid-core`)**: unit tests per module plus property
//!   tests.
//! - **CLI (`crates/editgrid/tests`)**: end-to-end runs of the binary against
//!   temporary documents and session directories.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
