//! # gantry — compose to Go compiler
//!
//! Reads compose-style deployment descriptors and writes a Go program that
//! rebuilds the same deployment through the fluent builder API.

mod cli;
mod generate;
mod gofmt;
mod output;

use clap::Parser;

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    generate::execute(&cli)
}
