use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "md2zim")]
#[command(author, version)]
#[command(about = "Convert a Markdown document to Zim wiki markup")]
#[command(after_help = "\
EXAMPLES:

    # Convert notes.md to notes_md2zim.txt
    md2zim notes.md

    # Choose the output file
    md2zim notes.md --out ~/Notebooks/Notes/Page.txt

    # Keep an existing output file, writing notes_md2zim_(1).txt instead
    md2zim --no-overwrite notes.md

CONFIGURATION:

md2zim looks for configuration files in this order:
  1. Explicit --config path
  2. md2zim.toml or .md2zim.toml in the input's directory and its parents
  3. ~/.config/md2zim/config.toml (XDG)
  4. Built-in defaults

Example .md2zim.toml:

    tab_width = 4
    max_link_text_scan = 3000
    max_depth = 64
    output_suffix = \"_md2zim\"")]
pub struct Cli {
    /// Markdown file to convert
    pub file: PathBuf,

    /// Output path
    #[arg(short, long)]
    #[arg(
        long_help = "Output path. Defaults to the input path with its extension replaced \
        by the configured suffix and `.txt`, e.g. notes.md -> notes_md2zim.txt."
    )]
    pub out: Option<PathBuf>,

    /// Log file I/O and configuration lookup
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Never replace an existing output file; pick a numbered name instead
    #[arg(long)]
    pub no_overwrite: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Default log filter for the chosen verbosity.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "info"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }
}
