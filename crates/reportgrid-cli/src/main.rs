mod cli;
mod extract_cmd;
mod filter_cmd;
mod merge_cmd;
mod page_range;
mod samples_cmd;
mod scan_cmd;
mod shared;
mod tables_cmd;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default = if verbose { "reportgrid=info" } else { "reportgrid=warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        cli::Commands::Scan {
            ref files,
            ref keyword,
            ref format,
        } => scan_cmd::run(files, keyword, format),
        cli::Commands::Tables {
            ref file,
            ref pages,
            ref format,
            ref tolerances,
        } => tables_cmd::run(file, pages, format, tolerances),
        cli::Commands::Extract {
            ref files,
            ref keyword,
            ref output,
            ref tolerances,
        } => extract_cmd::run(files, keyword, output, tolerances),
        cli::Commands::Filter {
            ref files,
            ref keywords,
        } => filter_cmd::run(files, keywords),
        cli::Commands::Merge {
            ref files,
            ref output,
        } => merge_cmd::run(files, output),
        cli::Commands::Samples { ref format } => samples_cmd::run(format),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
