use std::path::PathBuf;

use clap::{ArgAction, Args, ColorChoice, Parser, Subcommand};

use super::options::OutputFormat;
use super::styles::{cli_styles, long_version};

/// Command-line arguments accepted by the `termitheme` binary.
#[derive(Parser, Debug)]
#[command(
    name = "termitheme",
    version,
    long_version = long_version(),
    about = "Share terminal color themes between terminals and machines",
    color = ColorChoice::Auto,
    styles = cli_styles()
)]
pub(crate) struct CliArgs {
    #[arg(
        long = "config",
        value_name = "FILE",
        env = "TERMITHEME_CONFIG",
        action = ArgAction::Append,
        global = true,
        help = "Additional configuration file to merge (default: none)"
    )]
    pub(crate) config: Vec<PathBuf>,
    #[arg(
        long = "no-config",
        global = true,
        help = "Skip loading default configuration files (default: disabled)"
    )]
    pub(crate) no_config: bool,
    #[arg(
        long = "list-terminals",
        help = "List known terminal types and exit (default: disabled)"
    )]
    pub(crate) list_terminals: bool,
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true,
        help = "Log more detail; repeat for debug and trace output"
    )]
    pub(crate) verbose: u8,
    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Save a terminal profile as a theme file
    Export(ExportArgs),
    /// Create or update a terminal profile from a theme file
    Import(ImportArgs),
    /// List the profiles of a terminal
    List(ListArgs),
}

impl Command {
    /// Terminal type requested on the command line, if any.
    pub(crate) fn terminal(&self) -> Option<&str> {
        match self {
            Command::Export(args) => args.terminal.as_deref(),
            Command::Import(args) => args.terminal.as_deref(),
            Command::List(args) => args.terminal.as_deref(),
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    #[arg(
        short = 'c',
        long = "credits",
        value_name = "FILE",
        help = "Include the contents of FILE as credits in the exported file"
    )]
    pub(crate) credits: Option<PathBuf>,
    #[arg(
        short = 'n',
        long = "name",
        value_name = "NAME",
        help = "Set the profile name in the exported file (default: PROFILE)"
    )]
    pub(crate) name: Option<String>,
    #[arg(
        short = 't',
        long = "terminal",
        value_name = "TYPE",
        help = "Export from terminal type TYPE (default: first available)"
    )]
    pub(crate) terminal: Option<String>,
    #[arg(
        short = 'U',
        long = "utf-8",
        visible_alias = "utf8",
        help = "Treat the credits file as UTF-8 (default: locale charset)"
    )]
    pub(crate) utf8: bool,
    #[arg(value_name = "PROFILE")]
    pub(crate) profile: String,
    #[arg(value_name = "FILENAME", help = "Theme file to create (default: NAME.zip)")]
    pub(crate) filename: Option<PathBuf>,
}

impl ExportArgs {
    /// Name stored in the theme file.
    pub(crate) fn theme_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.profile)
    }

    pub(crate) fn output_path(&self) -> PathBuf {
        self.filename
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.zip", self.theme_name())))
    }
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    #[arg(
        short = 'b',
        long = "base",
        value_name = "PROFILE",
        help = "Base the new profile on PROFILE (default: the default profile)"
    )]
    pub(crate) base: Option<String>,
    #[arg(short = 'c', long = "credits", help = "Print the theme credits and exit")]
    pub(crate) credits: bool,
    #[arg(
        short = 'n',
        long = "name",
        value_name = "NAME",
        help = "Name the imported profile NAME (default: the theme's name)"
    )]
    pub(crate) name: Option<String>,
    #[arg(
        short = 'o',
        long = "overwrite",
        help = "Allow updating an existing profile"
    )]
    pub(crate) overwrite: bool,
    #[arg(
        short = 't',
        long = "terminal",
        value_name = "TYPE",
        help = "Import to terminal type TYPE (default: first available)"
    )]
    pub(crate) terminal: Option<String>,
    #[arg(value_name = "FILENAME")]
    pub(crate) filename: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct ListArgs {
    #[arg(
        short = 't',
        long = "terminal",
        value_name = "TYPE",
        help = "List profiles of terminal type TYPE (default: first available)"
    )]
    pub(crate) terminal: Option<String>,
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Plain, help = "Choose how to print the profile names")]
    pub(crate) format: OutputFormat,
}
