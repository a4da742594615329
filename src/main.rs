use colored::Colorize;
use std::process::ExitCode;

use probe_layouts::config::{load_config, save_config, Config};
use probe_layouts::runner::{self, ExportSummary};
use probe_layouts::utils::log::init_logging;
use probe_layouts::{ProbeError, ProbeFamily};

const USAGE: &str = "\
Usage:
  main generate <family|all> [output_dir]   standard geometry, default file names
  main run <config.yaml>                    every family listed in a config file
  main init-config <path> [output_dir]      write the standard config

Families: a4x16, neuropixels_1, neuropixels_2, ucla_128k, ucla_256f
Options:  -v, --verbose";

fn generate(family: &str, directory: &str) -> Result<Vec<ExportSummary>, ProbeError> {
    if family == "all" {
        return runner::run(&Config::standard(directory));
    }
    let family: ProbeFamily = family.parse()?;
    Ok(vec![runner::run_family(family, directory)?])
}

fn run_config(path: &str) -> Result<Vec<ExportSummary>, ProbeError> {
    let config = load_config(path)?;
    runner::run(&config)
}

fn init_config(path: &str, directory: &str) -> Result<Vec<ExportSummary>, ProbeError> {
    save_config(&Config::standard(directory), path)?;
    println!("{} {}", "Wrote config".green(), path);
    Ok(Vec::new())
}

fn print_summary(summaries: &[ExportSummary]) {
    for summary in summaries {
        println!(
            "{} {:<16} {:>5} electrodes -> {}",
            "Exported".green(),
            summary.family.to_string().bold(),
            summary.electrodes,
            summary.path.display()
        );
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = args.iter().any(|a| a == "-v" || a == "--verbose");
    let args: Vec<&str> = args
        .iter()
        .map(String::as_str)
        .filter(|a| *a != "-v" && *a != "--verbose")
        .collect();

    init_logging(verbose);

    let result = match args.as_slice() {
        ["generate", family] => generate(family, "."),
        ["generate", family, directory] => generate(family, directory),
        ["run", path] => run_config(path),
        ["init-config", path] => init_config(path, "probes"),
        ["init-config", path, directory] => init_config(path, directory),
        _ => {
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(summaries) => {
            print_summary(&summaries);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
