use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "editgrid",
    bin_name = "editgrid",
    version,
    disable_help_subcommand = true
)]
#[command(about = "Editable, filterable data grids in the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding this session's view state (env: EDITGRID_SESSION_DIR)
    #[arg(long, global = true, help_heading = "Options")]
    pub session_dir: Option<PathBuf>,

    /// Config file (TOML)
    #[arg(long, global = true, help_heading = "Options")]
    pub config: Option<PathBuf>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the grid laid out for a viewport width
    #[command(display_order = 1)]
    Show {
        /// Grid document (JSON)
        doc: PathBuf,

        #[command(flatten)]
        view: ViewArgs,

        /// Viewport width in columns (defaults to the terminal width)
        #[arg(long)]
        width: Option<u32>,

        /// Expand a row's detail panel (repeatable)
        #[arg(long = "expand", value_name = "ID")]
        expand: Vec<String>,

        /// Select a row (repeatable)
        #[arg(long = "select", value_name = "ID")]
        select: Vec<String>,

        /// Page to show, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Print the filtered, sorted rows
    #[command(display_order = 2)]
    Export {
        /// Grid document (JSON)
        doc: PathBuf,

        #[command(flatten)]
        view: ViewArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = FormatArg::Json)]
        format: FormatArg,
    },

    /// Edit a row and print the save payload
    #[command(display_order = 3)]
    Edit {
        /// Grid document (JSON)
        doc: PathBuf,

        /// Row id
        #[arg(long)]
        row: String,

        /// Cell assignment COL=VALUE (repeatable)
        #[arg(long = "set", value_name = "COL=VALUE", required = true)]
        set: Vec<String>,
    },

    /// Fill the add-mode row and print the save payload
    #[command(display_order = 4)]
    Add {
        /// Grid document (JSON)
        doc: PathBuf,

        /// Cell assignment COL=VALUE (repeatable)
        #[arg(long = "set", value_name = "COL=VALUE")]
        set: Vec<String>,
    },

    /// Delete rows and print what the host receives
    #[command(display_order = 5)]
    Delete {
        /// Grid document (JSON)
        doc: PathBuf,

        /// Row id (repeatable)
        #[arg(long = "row", value_name = "ID", required = true)]
        rows: Vec<String>,
    },

    /// Inspect or clear persisted view state
    #[command(display_order = 6)]
    State {
        #[command(subcommand)]
        action: StateCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum StateCommands {
    /// Print the stored view state of a grid
    Show {
        /// Grid document (JSON)
        doc: PathBuf,
    },

    /// Remove stored view state (one grid, or the whole session)
    Clear {
        /// Grid document (JSON); omit to clear every grid
        doc: Option<PathBuf>,
    },
}

/// Interactions applied before printing. Each one is persisted like a UI change.
#[derive(Args, Debug, Default)]
pub struct ViewArgs {
    /// Global filter text
    #[arg(long)]
    pub global: Option<String>,

    /// Column filter COL=TEXT (repeatable, switches to individual mode)
    #[arg(long = "filter", value_name = "COL=TEXT")]
    pub filter: Vec<String>,

    /// Sort by COL or COL:desc (repeatable for multi-sort)
    #[arg(long = "sort", value_name = "COL[:desc]")]
    pub sort: Vec<String>,

    /// Hide a column (repeatable)
    #[arg(long = "hide", value_name = "COL")]
    pub hide: Vec<String>,

    /// Show a previously hidden column (repeatable)
    #[arg(long = "unhide", value_name = "COL")]
    pub unhide: Vec<String>,

    /// Clear all filter values first
    #[arg(long)]
    pub clear_filters: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Json,
    Csv,
}

/// Splits `KEY=VALUE`. The value may itself contain `=`.
pub fn split_assignment(raw: &str) -> Option<(&str, &str)> {
    let (key, value) = raw.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_show_with_view_flags() {
        let cli = Cli::try_parse_from([
            "editgrid",
            "show",
            "grid.json",
            "--width",
            "60",
            "--filter",
            "name=ar",
            "--sort",
            "level:desc",
            "--expand",
            "r1",
            "--expand",
            "r2",
        ])
        .unwrap();

        match cli.command {
            Commands::Show {
                width,
                view,
                expand,
                ..
            } => {
                assert_eq!(width, Some(60));
                assert_eq!(view.filter, vec!["name=ar"]);
                assert_eq!(view.sort, vec!["level:desc"]);
                assert_eq!(expand, vec!["r1", "r2"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["editgrid", "state", "clear", "--session-dir", "/tmp/s", "-v"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.session_dir, Some(PathBuf::from("/tmp/s")));
    }

    #[test]
    fn edit_requires_assignments() {
        assert!(Cli::try_parse_from(["editgrid", "edit", "g.json", "--row", "1"]).is_err());
    }

    #[test]
    fn assignment_splitting() {
        assert_eq!(split_assignment("note=a=b"), Some(("note", "a=b")));
        assert_eq!(split_assignment("name="), Some(("name", "")));
        assert_eq!(split_assignment("=x"), None);
        assert_eq!(split_assignment("novalue"), None);
    }
}
