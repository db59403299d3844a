mod cli;
mod settings;
mod workflow;

use std::process::ExitCode;

use cli::{CliArgs, Command, OutputFormat, parse_cli, print_json, print_plain, terminal_lines};
use termitheme::{BackendRegistry, logging};
use workflow::{CommandError, Workflow};

fn main() -> ExitCode {
    let cli = parse_cli();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("termitheme: {err:#}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: CliArgs) -> Result<(), CommandError> {
    let resolved = settings::load(&cli)?;
    if let Err(err) = logging::initialize(resolved.log_level) {
        eprintln!("termitheme: logging unavailable: {err}");
    }

    let registry = BackendRegistry::detect();
    if cli.list_terminals {
        for line in terminal_lines(registry) {
            println!("{line}");
        }
        return Ok(());
    }

    let Some(command) = cli.command else {
        return Err(CommandError::Usage(
            "no command given (try 'termitheme --help')".into(),
        ));
    };

    let workflow = Workflow::new(registry, resolved);
    match command {
        Command::Export(args) => println!("{}", workflow.export(&args)?),
        Command::Import(args) => println!("{}", workflow.import(&args)?),
        Command::List(args) => {
            let (terminal, names) = workflow.list()?;
            match args.format {
                OutputFormat::Plain => print_plain(&names),
                OutputFormat::Json => print_json(&terminal, &names)?,
            }
        }
    }

    Ok(())
}
