//! Binary entry point: parses the CLI and dispatches to the driver (§6, C8).

use clap::Parser;
use kernel_svm::cli::{self, Cli};

fn main() {
    let cli = Cli::parse();
    std::process::exit(cli::run(cli));
}
