//! CLI argument definitions
//!
//! All Clap derive structs for `privchain` command-line parsing.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use privchain_core::layout::EdgeKind;
use privchain_export::ExportFormat;

use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Browser privilege-escalation attack chain simulator.
#[derive(Parser, Debug)]
#[command(name = "privchain", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "PRIVCHAIN_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(long, default_value = "human", global = true, env = "PRIVCHAIN_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Catalog file to use instead of the built-in browser catalog.
    #[arg(long, global = true, env = "PRIVCHAIN_CATALOG")]
    pub catalog: Option<PathBuf>,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect or validate catalogs.
    Catalog(CatalogCommand),

    /// List the moves available after replaying a chain.
    Moves(MovesArgs),

    /// Build a chain and export it.
    Chain(ChainArgs),

    /// Lay out the full catalog tree.
    Layout(LayoutArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Catalog Command
// ============================================================================

/// Catalog commands.
#[derive(Args, Debug)]
pub struct CatalogCommand {
    /// Catalog subcommand.
    #[command(subcommand)]
    pub subcommand: CatalogSubcommand,
}

/// Catalog subcommands.
#[derive(Subcommand, Debug)]
pub enum CatalogSubcommand {
    /// Print the active catalog.
    Show(CatalogShowArgs),

    /// Validate catalog files.
    Validate(CatalogValidateArgs),
}

/// Arguments for `catalog show`.
#[derive(Args, Debug)]
pub struct CatalogShowArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `catalog validate`.
#[derive(Args, Debug)]
pub struct CatalogValidateArgs {
    /// Catalog files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Enable strict validation (warnings become errors).
    #[arg(long)]
    pub strict: bool,
}

// ============================================================================
// Chain Commands
// ============================================================================

/// Arguments for `moves`.
#[derive(Args, Debug)]
pub struct MovesArgs {
    /// Step to replay before listing, as COMPONENT/TECHNIQUE. Repeatable.
    #[arg(short = 's', long = "step", value_name = "COMPONENT/TECHNIQUE")]
    pub steps: Vec<StepRef>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `chain`.
#[derive(Args, Debug)]
pub struct ChainArgs {
    /// Step to apply, as COMPONENT/TECHNIQUE. Repeatable, applied in order.
    #[arg(short = 's', long = "step", value_name = "COMPONENT/TECHNIQUE")]
    pub steps: Vec<StepRef>,

    /// Export format.
    #[arg(short, long, default_value = "json")]
    pub format: ChainFormat,

    /// Write the artifact to this file instead of stdout.
    #[arg(short, long, conflicts_with = "out_dir")]
    pub output: Option<PathBuf>,

    /// Write every artifact (`attack-chain.*`) into this directory.
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

/// Arguments for `layout`.
#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Horizontal gap between nodes in a rank.
    #[arg(long)]
    pub node_sep: Option<f64>,

    /// Vertical gap between ranks.
    #[arg(long)]
    pub rank_sep: Option<f64>,

    /// Only list edges of this kind (human output).
    #[arg(long)]
    pub edges: Option<EdgeKind>,
}

// ============================================================================
// Completions / Version
// ============================================================================

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Types
// ============================================================================

/// One chain step on the command line: `COMPONENT/TECHNIQUE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRef {
    /// Component id
    pub component: String,
    /// Technique id
    pub technique: String,
}

impl FromStr for StepRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((component, technique))
                if !component.is_empty() && !technique.is_empty() && !technique.contains('/') =>
            {
                Ok(Self {
                    component: component.to_string(),
                    technique: technique.to_string(),
                })
            }
            _ => Err(format!("expected COMPONENT/TECHNIQUE, got '{s}'")),
        }
    }
}

impl std::fmt::Display for StepRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.component, self.technique)
    }
}

/// Text export formats selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ChainFormat {
    /// Structured step list.
    #[default]
    Json,
    /// PlantUML activity diagram.
    #[value(name = "plantuml")]
    PlantUml,
    /// Mermaid flowchart.
    Mermaid,
    /// LaTeX/TikZ report.
    Latex,
}

impl From<ChainFormat> for ExportFormat {
    fn from(format: ChainFormat) -> Self {
        match format {
            ChainFormat::Json => Self::Json,
            ChainFormat::PlantUml => Self::PlantUml,
            ChainFormat::Mermaid => Self::Mermaid,
            ChainFormat::Latex => Self::Latex,
        }
    }
}

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================
