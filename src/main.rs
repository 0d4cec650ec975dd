use clap::Parser;
use tredweb::{
    cli::{init_verbose, Cli, Command, FULL_VERSION},
    commands::{list, loci, remove, report, run},
    utils::{handle_error_and_exit, Result},
};

fn runner() -> Result<()> {
    let cli = Cli::parse();
    init_verbose(&cli);
    let subcommand_name = match cli.command {
        Command::Run(_) => "run",
        Command::Report(_) => "report",
        Command::List(_) => "list",
        Command::Remove(_) => "remove",
        Command::Loci(_) => "loci",
    };

    log::info!(
        "Running {}-{} [{}]",
        env!("CARGO_PKG_NAME"),
        *FULL_VERSION,
        subcommand_name
    );
    match cli.command {
        Command::Run(args) => run::run(args)?,
        Command::Report(args) => report::report(args)?,
        Command::List(args) => list::list(args)?,
        Command::Remove(args) => remove::remove(args)?,
        Command::Loci(args) => loci::loci(args)?,
    }
    log::info!("{} end", env!("CARGO_PKG_NAME"));
    Ok(())
}

fn main() {
    if let Err(e) = runner() {
        handle_error_and_exit(e);
    }
}
