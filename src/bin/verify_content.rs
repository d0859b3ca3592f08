use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{ensure, Result};
use clap::Parser;

use team_site::verify::verify_site;

/// Check a site directory before publishing.
#[derive(Parser)]
#[command(name = "verify-content", version, about = "Check content.json and the site files")]
struct Cli {
    /// Directory holding index.html, styles.css and content.json
    #[arg(default_value = ".")]
    root: PathBuf,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    ensure!(cli.root.is_dir(), "{} is not a directory", cli.root.display());

    let findings = verify_site(&cli.root);
    let (errors, warnings): (Vec<_>, Vec<_>) = findings.iter().partition(|f| f.is_error());

    for warning in &warnings {
        println!("{}", warning);
    }
    if errors.is_empty() {
        println!("Verification OK: content.json looks fine and required files are present");
        return Ok(ExitCode::SUCCESS);
    }
    println!("Verification FAILED:");
    for error in &errors {
        println!("-  {}", error);
    }
    Ok(ExitCode::from(2))
}
