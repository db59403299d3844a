mod args;
mod output;

pub(crate) use args::{CliArgs, Command, ExportArgs, ImportArgs, OutputFormat, parse_cli};
pub(crate) use output::{print_json, print_plain, terminal_lines};
