//! Command-line flags.

use std::path::PathBuf;

use clap::Parser;
use gantry_common::config::GenerateOptions;
use gantry_common::constants::{DEFAULT_API_MODULE, DEFAULT_PACKAGE};
use gantry_compose::LoadOptions;

/// gantry — compile compose descriptors into Go builder programs.
#[derive(Parser, Debug)]
#[command(name = "gantry", version, about, long_about = None)]
pub struct Cli {
    /// Descriptor file; repeat to merge several, later files win.
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Write the generated source here instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Go package clause of the generated file.
    #[arg(long, default_value = DEFAULT_PACKAGE)]
    pub package: String,

    /// Also emit a runnable `main` that brings the project up.
    #[arg(long = "main")]
    pub emit_main: bool,

    /// Override the project name.
    #[arg(long, value_name = "NAME")]
    pub project_name: Option<String>,

    /// Dotenv file used for variable interpolation.
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Profile passed to the generated up/down calls; repeatable.
    #[arg(long = "profile", value_name = "NAME")]
    pub profiles: Vec<String>,

    /// Pipe the output through `gofmt` found on PATH.
    #[arg(long)]
    pub gofmt: bool,

    /// Go module root of the builder API.
    #[arg(long, env = "GANTRY_API_MODULE", default_value = DEFAULT_API_MODULE)]
    pub api_module: String,
}

impl Cli {
    /// Loader inputs for the given descriptor files.
    pub fn load_options(&self, files: Vec<PathBuf>) -> LoadOptions {
        LoadOptions {
            files,
            env_file: self.env_file.clone(),
            project_name: self.project_name.clone(),
        }
    }

    /// Generator options from the flags.
    ///
    /// The project name override is applied by the loader, which also
    /// lowercases it, so it is not repeated here.
    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            package: self.package.clone(),
            emit_main: self.emit_main,
            project_name: None,
            profiles: self.profiles.clone(),
            api_module: self.api_module.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["gantry"]).expect("parse");
        assert!(cli.files.is_empty());
        assert_eq!(cli.package, "main");
        assert!(!cli.emit_main);
        assert!(!cli.gofmt);
        let opts = cli.generate_options();
        assert_eq!(opts, GenerateOptions {
            api_module: cli.api_module.clone(),
            ..GenerateOptions::default()
        });
    }

    #[test]
    fn repeated_files_and_profiles() {
        let cli = Cli::try_parse_from([
            "gantry",
            "-f",
            "base.yaml",
            "--file",
            "override.yaml",
            "--profile",
            "debug",
            "--profile",
            "tools",
            "--main",
            "--package",
            "deploy",
            "-o",
            "out.go",
        ])
        .expect("parse");
        assert_eq!(
            cli.files,
            vec![PathBuf::from("base.yaml"), PathBuf::from("override.yaml")]
        );
        assert_eq!(cli.output, Some(PathBuf::from("out.go")));
        let opts = cli.generate_options();
        assert!(opts.emit_main);
        assert_eq!(opts.package, "deploy");
        assert_eq!(opts.profiles, vec!["debug", "tools"]);
    }

    #[test]
    fn project_name_goes_to_the_loader() {
        let cli = Cli::try_parse_from(["gantry", "--project-name", "shop", "--env-file", "x.env"])
            .expect("parse");
        let load = cli.load_options(vec![PathBuf::from("compose.yaml")]);
        assert_eq!(load.project_name.as_deref(), Some("shop"));
        assert_eq!(load.env_file, Some(PathBuf::from("x.env")));
        assert_eq!(cli.generate_options().project_name, None);
    }
}
