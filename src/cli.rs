use clap::{Args, Parser, Subcommand};
use figma_audit::{OutputFormat, RuleId};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "figma-audit")]
#[command(
    version,
    about = "Figma Audit - Simplify Figma designs and audit them for consistency issues",
    long_about = "Figma Audit\n\nModes:\n- simplify: turn a Figma file or node subtree into a compact simplified design with a shared style registry.\n- audit: run the rule set (naming, auto layout, detached styles, export settings, descriptions, contrast, typography, duplicates, AI patterns) and print a report.\n- images: download image fills and rendered nodes of a Figma file, cropping fills to their visible region.\n- rules: list rule definitions and their state.\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose (debug) logging on stderr")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML); defaults to ~/.config/figma-audit/config.toml when present"
    )]
    pub config: Option<PathBuf>,
}

/// Where the raw design comes from: a saved API response or the Figma API.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    #[arg(
        long,
        value_name = "PATH",
        conflicts_with = "file_key",
        help = "Raw Figma API response (files or file-nodes endpoint) saved as JSON"
    )]
    pub input: Option<PathBuf>,

    #[arg(long, help = "Figma file key to fetch")]
    pub file_key: Option<String>,

    #[arg(long, requires = "file_key", help = "Fetch only this node subtree (e.g. 1:23)")]
    pub node_id: Option<String>,

    #[arg(long, help = "Maximum depth to fetch and to keep in the simplified tree")]
    pub depth: Option<u32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Simplify a Figma design
    Simplify {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(
            long,
            default_value = "all",
            help = "Extractor preset (all, layout-and-text, content, visuals, layout)"
        )]
        extractors: String,

        #[arg(long, value_enum, help = "Output format (json or yaml); defaults to config")]
        format: Option<OutputFormat>,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },

    /// Audit a Figma design
    Audit {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(long, value_enum, help = "Output format (json, yaml or markdown); defaults to config")]
        format: Option<OutputFormat>,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,

        #[arg(
            long,
            value_delimiter = ',',
            value_name = "IDS",
            help = "Rule ids to disable for this run, in addition to the config (comma-separated)"
        )]
        disable: Vec<RuleId>,

        #[arg(long, help = "Skip AI-assisted rules even when an LLM key is configured")]
        no_ai: bool,

        #[arg(long, help = "Exit with status 1 when the report has issues")]
        fail_on_issues: bool,
    },

    /// Download image fills and rendered nodes
    Images {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(
            long,
            value_name = "DIR",
            default_value = "images",
            help = "Directory the images are written to"
        )]
        dest: PathBuf,

        #[arg(
            long,
            value_delimiter = ',',
            value_name = "IDS",
            help = "Node ids to render as whole images (comma-separated)"
        )]
        render: Vec<String>,

        #[arg(long, help = "Render nodes as SVG instead of PNG")]
        svg: bool,

        #[arg(long, default_value_t = 2.0, help = "Scale for rendered PNGs")]
        png_scale: f32,

        #[arg(long, help = "Only render --render nodes; skip the image fills of the design")]
        no_fills: bool,

        #[arg(long, short, help = "Output file for the JSON summary (stdout if omitted)")]
        output: Option<PathBuf>,
    },

    /// List rule definitions
    Rules {
        #[arg(long, value_enum, help = "Output format; defaults to config")]
        format: Option<OutputFormat>,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
