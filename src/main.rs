use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use udm_import::directory::JsonDirectory;
use udm_import::model::Action;
use udm_import::report::{ConsoleReporter, Reporter};
use udm_import::run::Importer;
use udm_import::{ImportError, Result};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            let code = if error.use_stderr() { 1 } else { 0 };
            let _ = error.print();
            std::process::exit(code);
        }
    };

    let mut reporter = ConsoleReporter;
    match run(cli, &mut reporter) {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            reporter.error(&error.to_string());
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli, reporter: &mut ConsoleReporter) -> Result<i32> {
    init_logging()?;
    reporter.info(&format!(
        "Running udm-import version {}",
        env!("CARGO_PKG_VERSION")
    ));

    if !cli.filename.exists() {
        return Err(ImportError::MissingInput(cli.filename));
    }

    let mut directory = JsonDirectory::open(&cli.directory)?;
    let mut importer = Importer::new(&mut directory, reporter, &cli.udm_module, cli.action.into())?;
    let result = importer.run(&cli.filename)?;
    Ok(result.exit_code())
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ImportError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Create, modify or remove UDM objects defined in a CSV file."
)]
struct Cli {
    /// Name of a UDM module like "users/user" or "groups/group".
    udm_module: String,

    /// Operation applied to every row.
    #[arg(value_enum)]
    action: ActionArg,

    /// CSV file to read. The first row names the columns.
    filename: PathBuf,

    /// JSON snapshot holding the directory's modules and objects.
    #[arg(long, env = "UDM_IMPORT_DIRECTORY", default_value = "directory.json")]
    directory: PathBuf,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ActionArg {
    Create,
    Modify,
    Remove,
}

impl From<ActionArg> for Action {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Create => Action::Create,
            ActionArg::Modify => Action::Modify,
            ActionArg::Remove => Action::Remove,
        }
    }
}
