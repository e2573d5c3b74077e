use clap::{Parser, Subcommand};
use goluau::commands::{BuildFlags, cmd_build, cmd_translate};
use goluau_pack::Layout;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "goluau", version, about = "Translate Go source into Luau")]
struct Cli {
    /// Log debug output to stderr (otherwise `GOLUAU_LOG`, default `warn`)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Translate one Go file into a Luau module
    Translate {
        file: PathBuf,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the lowered declarations as JSON
        #[arg(long)]
        ast: bool,
    },
    /// Build a project directory into a Luau tree
    Build {
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Output directory (default: `out` under the project)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Output layout: flat or rojo
        #[arg(long)]
        layout: Option<Layout>,
        /// Skip go.mod dependencies
        #[arg(long)]
        no_deps: bool,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("GOLUAU_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match cli.command {
        Command::Translate { file, output, ast } => cmd_translate(&file, output.as_deref(), ast),
        Command::Build {
            dir,
            out,
            layout,
            no_deps,
        } => cmd_build(&dir, BuildFlags { out, layout, no_deps }),
    };
    std::process::exit(code);
}
