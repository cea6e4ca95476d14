use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use doc_toc::{config::Config, error::Result, format, Loader, TableOfContents};
use log::{debug, info, LevelFilter};
use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

const DEFAULT_CONFIG: &str = "toc.toml";

#[derive(Parser, Debug)]
#[command(name = "dtoc")]
#[command(about = "Validate, format and inspect documentation table of contents files", long_about = None)]
struct Cli {
    /// Logging verbosity [OFF, ERROR, WARN, INFO, DEBUG, TRACE]
    #[arg(global = true, short, long, default_value_t = LevelFilter::Warn)]
    verbosity: LevelFilter,

    /// Path to the configuration file, `toc.toml` in the current directory by default.
    #[arg(global = true, short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load the table of contents and report the first schema violation.
    Check {
        /// The table of contents to check, the configured `source` by default.
        file: Option<PathBuf>,
    },
    /// Print the table of contents in normalized form.
    Fmt {
        file: Option<PathBuf>,

        /// Rewrite the file in place instead of printing it.
        #[arg(long, conflicts_with = "check")]
        write: bool,

        /// Fail when the file is not already in normalized form.
        #[arg(long)]
        check: bool,
    },
    /// Print the table of contents as an indented outline.
    Tree {
        file: Option<PathBuf>,

        /// Print each node's full slug path instead of indenting.
        #[arg(long)]
        slugs: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::builder()
        .format_timestamp(None)
        .filter_level(cli.verbosity)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let (config, root) = load_config(cli.config.as_deref())?;
    let loader = Loader::new(config.load_options());
    let resolve = |file: Option<PathBuf>| file.unwrap_or_else(|| root.join(&config.toc.source));

    match cli.command {
        Commands::Check { file } => {
            let path = resolve(file);
            let toc = loader.load(&path)?;
            info!(
                "{} is valid: {} sections, {} entries",
                path.display(),
                toc.sections.len(),
                toc.len()
            );
        }
        Commands::Fmt { file, write, check } => {
            let path = resolve(file);
            let toc = loader.load(&path)?;
            let formatted = format::to_string_pretty(&toc, config.toc.indent)?;

            if check {
                check_formatted(&path, &formatted)?;
            } else if write {
                fs::write(&path, formatted)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Formatted {}", path.display());
            } else {
                print!("{formatted}");
            }
        }
        Commands::Tree { file, slugs } => {
            let toc = loader.load(resolve(file))?;
            print_tree(&toc, slugs);
        }
    }

    Ok(())
}

/// Load the configuration and the directory relative paths in it resolve against.
fn load_config(path: Option<&Path>) -> Result<(Config, PathBuf)> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG);
            if !default.exists() {
                debug!("No {} found, using the default configuration", DEFAULT_CONFIG);
                return Ok((Config::default(), PathBuf::from(".")));
            }

            default
        }
    };

    let config = Config::load(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    let root = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    Ok((config, root))
}

fn check_formatted(path: &Path, formatted: &str) -> Result<()> {
    let current = fs::read_to_string(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    if current != formatted {
        bail!("{} is not formatted, run `dtoc fmt --write`", path.display());
    }

    Ok(())
}

fn print_tree(toc: &TableOfContents, slugs: bool) {
    let outline = toc.outline();

    if slugs {
        print!("{}", outline.with_slug_paths());
    } else {
        print!("{outline}");
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;

        Cli::command().debug_assert();
    }

    #[test]
    fn formatted_files_pass_the_check() {
        let mut file = NamedTempFile::new().expect("failed to create temp file");
        write!(file, "{{\n  \"intro\": {{\n    \"name\": \"Introduction\"\n  }}\n}}\n")
            .expect("failed to write temp file");

        let toc = Loader::default().load(file.path()).expect("failed to load");
        let formatted = format::to_string_pretty(&toc, 2).expect("failed to format");

        check_formatted(file.path(), &formatted).expect("file should be formatted");
    }

    #[test]
    fn unformatted_files_fail_the_check() {
        let mut file = NamedTempFile::new().expect("failed to create temp file");
        write!(file, r#"{{"intro": {{"name": "Introduction"}}}}"#)
            .expect("failed to write temp file");

        let toc = Loader::default().load(file.path()).expect("failed to load");
        let formatted = format::to_string_pretty(&toc, 2).expect("failed to format");

        assert!(check_formatted(file.path(), &formatted).is_err());
    }

    #[test]
    fn resolves_the_source_relative_to_the_config() {
        let dir = tempdir().expect("failed to create temp dir");
        let config_path = dir.path().join("toc.toml");
        fs::write(&config_path, "[toc]\nsource = \"docs/toc.json\"\nmax-depth = 1\n")
            .expect("failed to write config");

        let (config, root) = load_config(Some(&config_path)).expect("failed to load config");

        assert_eq!(dir.path(), root.as_path());
        assert_eq!(dir.path().join("docs/toc.json"), root.join(&config.toc.source));
        assert_eq!(Some(1), config.load_options().max_depth);
    }

    #[test]
    fn runs_check_against_the_configured_source() {
        let dir = tempdir().expect("failed to create temp dir");
        let config_path = dir.path().join("toc.toml");
        fs::write(&config_path, "").expect("failed to write config");
        fs::write(
            dir.path().join("toc.json"),
            r#"{"start": {"name": "Start", "children": {"install": 1}}}"#,
        )
        .expect("failed to write toc");

        let config_arg = config_path.to_string_lossy().into_owned();
        let cli = Cli::parse_from(["dtoc", "--config", config_arg.as_str(), "check"]);
        let error = run(cli).expect_err("invalid toc should fail the check");

        assert!(format!("{error:#}").contains("start.children.install"));
    }
}
