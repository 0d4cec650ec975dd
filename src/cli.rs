use crate::exec::RunEnv;
use crate::utils::Result;
use chrono::Datelike;
use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{io::Write, path::PathBuf};

pub static FULL_VERSION: Lazy<String> = Lazy::new(|| env!("CARGO_PKG_VERSION").to_string());

#[derive(Parser)]
#[command(name="tredweb",
          author="Haibao Tang <tanghaibao@gmail.com>",
          version=&**FULL_VERSION,
          long_about = None,
          disable_help_subcommand = true,
          after_help = format!("Copyright (C) 2017-{}     Human Longevity, Inc.
This program comes with ABSOLUTELY NO WARRANTY; it is intended for
Research Use Only and not for use in diagnostic procedures.", chrono::Utc::now().year()),
          help_template = "{name} {version}\n{author}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Run the genotyper on a BAM and locus, memoized by command")]
    Run(RunArgs),
    #[clap(about = "Render a stored genotyper result")]
    Report(ReportArgs),
    #[clap(about = "List stored execution records")]
    List(ListArgs),
    #[clap(about = "Remove a stored execution record")]
    Remove(RemoveArgs),
    #[clap(about = "Show the known STR disease loci")]
    Loci(LociArgs),
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("run")))]
#[command(arg_required_else_help(true))]
pub struct RunArgs {
    #[clap(required = true)]
    #[clap(short = 'b')]
    #[clap(long = "bam")]
    #[clap(help = "BAM file reference (path, URL, or sample key)")]
    #[clap(value_name = "BAM")]
    #[arg(value_parser = check_nonempty)]
    pub bam: String,

    #[clap(required = true)]
    #[clap(short = 't')]
    #[clap(long = "tred")]
    #[clap(help = "STR disease locus to genotype (e.g. HD)")]
    #[clap(value_name = "TRED")]
    #[arg(value_parser = check_nonempty)]
    pub tred: String,

    #[clap(short = 'r')]
    #[clap(long = "ref")]
    #[clap(help = "Reference genome build")]
    #[clap(value_name = "REF")]
    #[clap(default_value = "hg38")]
    #[arg(value_parser = check_nonempty)]
    pub genome_build: String,

    #[clap(short = 's')]
    #[clap(long = "store")]
    #[clap(help = "Path of the persisted execution store")]
    #[clap(value_name = "STORE")]
    #[clap(default_value = "documents.json")]
    pub store: PathBuf,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "env")]
    #[clap(value_name = "ENV")]
    #[clap(help = "Deployment environment (internal or public)")]
    #[clap(default_value = "internal")]
    pub env: RunEnv,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "no-docker")]
    #[clap(help = "Run the genotyper command directly instead of inside Docker")]
    pub no_docker: bool,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "treds")]
    #[clap(value_name = "TREDS")]
    #[clap(help = "JSON file with the locus reference table (built-in table by default)")]
    pub treds: Option<PathBuf>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "timeout")]
    #[clap(value_name = "SECS")]
    #[clap(help = "Seconds to wait for the result (0 waits forever)")]
    #[clap(default_value = "0")]
    pub timeout_secs: u64,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "raw")]
    #[clap(help = "Print captured stdout/stderr instead of the rendered result")]
    pub raw: bool,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("report")))]
#[command(arg_required_else_help(true))]
pub struct ReportArgs {
    #[clap(short = 'b')]
    #[clap(long = "bam")]
    #[clap(help = "BAM file reference used for the original run")]
    #[clap(value_name = "BAM")]
    #[clap(required_unless_present = "key")]
    #[arg(value_parser = check_nonempty)]
    pub bam: Option<String>,

    #[clap(required = true)]
    #[clap(short = 't')]
    #[clap(long = "tred")]
    #[clap(help = "STR disease locus to render")]
    #[clap(value_name = "TRED")]
    #[arg(value_parser = check_nonempty)]
    pub tred: String,

    #[clap(short = 'r')]
    #[clap(long = "ref")]
    #[clap(help = "Reference genome build")]
    #[clap(value_name = "REF")]
    #[clap(default_value = "hg38")]
    pub genome_build: String,

    #[clap(short = 's')]
    #[clap(long = "store")]
    #[clap(help = "Path of the persisted execution store")]
    #[clap(value_name = "STORE")]
    #[clap(default_value = "documents.json")]
    pub store: PathBuf,

    #[clap(help_heading("Advanced"))]
    #[clap(short = 'k')]
    #[clap(long = "key")]
    #[clap(value_name = "KEY")]
    #[clap(help = "Exact command key to look up, bypassing the command builder")]
    pub key: Option<String>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "treds")]
    #[clap(value_name = "TREDS")]
    #[clap(help = "JSON file with the locus reference table (built-in table by default)")]
    pub treds: Option<PathBuf>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "raw")]
    #[clap(help = "Print captured stdout/stderr instead of the rendered result")]
    pub raw: bool,
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    #[clap(short = 's')]
    #[clap(long = "store")]
    #[clap(help = "Path of the persisted execution store")]
    #[clap(value_name = "STORE")]
    #[clap(default_value = "documents.json")]
    pub store: PathBuf,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("remove")))]
#[command(arg_required_else_help(true))]
pub struct RemoveArgs {
    #[clap(short = 'b')]
    #[clap(long = "bam")]
    #[clap(help = "BAM file reference used for the original run")]
    #[clap(value_name = "BAM")]
    #[clap(required_unless_present = "key")]
    pub bam: Option<String>,

    #[clap(short = 't')]
    #[clap(long = "tred")]
    #[clap(help = "STR disease locus used for the original run")]
    #[clap(value_name = "TRED")]
    #[clap(required_unless_present = "key")]
    pub tred: Option<String>,

    #[clap(short = 'r')]
    #[clap(long = "ref")]
    #[clap(help = "Reference genome build")]
    #[clap(value_name = "REF")]
    #[clap(default_value = "hg38")]
    pub genome_build: String,

    #[clap(short = 'k')]
    #[clap(long = "key")]
    #[clap(value_name = "KEY")]
    #[clap(help = "Exact command key to remove, bypassing the command builder")]
    pub key: Option<String>,

    #[clap(short = 's')]
    #[clap(long = "store")]
    #[clap(help = "Path of the persisted execution store")]
    #[clap(value_name = "STORE")]
    #[clap(default_value = "documents.json")]
    pub store: PathBuf,
}

#[derive(Parser, Debug)]
pub struct LociArgs {
    #[clap(short = 't')]
    #[clap(long = "tred")]
    #[clap(help = "Show the full metadata block for one locus")]
    #[clap(value_name = "TRED")]
    pub tred: Option<String>,

    #[clap(long = "treds")]
    #[clap(value_name = "TREDS")]
    #[clap(help = "JSON file with the locus reference table (built-in table by default)")]
    pub treds: Option<PathBuf>,
}

pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_nonempty(s: &str) -> Result<String> {
    if s.trim().is_empty() {
        Err("Value cannot be an empty string".to_string())
    } else {
        Ok(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_nonempty() {
        assert!(check_nonempty("HD").is_ok());
        assert!(check_nonempty("  ").is_err());
    }

    #[test]
    fn test_run_args_parse() {
        let cli = Cli::parse_from([
            "tredweb", "run", "--bam", "sample.bam", "--tred", "HD", "--no-docker",
        ]);
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.bam, "sample.bam");
                assert_eq!(args.tred, "HD");
                assert_eq!(args.genome_build, "hg38");
                assert_eq!(args.env, RunEnv::Internal);
                assert!(args.no_docker);
                assert_eq!(args.timeout_secs, 0);
            }
            _ => panic!("Expected run subcommand"),
        }
    }

    #[test]
    fn test_report_args_require_bam_or_key() {
        assert!(Cli::try_parse_from(["tredweb", "report", "--tred", "HD"]).is_err());
        assert!(Cli::try_parse_from([
            "tredweb", "report", "--tred", "HD", "--key", "tred.py x --tred HD --ref hg38",
        ])
        .is_ok());
    }
}
