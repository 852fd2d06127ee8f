use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mdag",
    about = "Content-addressed Merkle DAGs for files and directories",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Object store directory
    #[arg(long, global = true, default_value = ".mdag/objects")]
    pub store: PathBuf,

    /// TOML file with chunk_size, max_fanout and hash
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build a file or directory into the store and print its root digest
    Add(AddArgs),
    /// Write the bytes at a path beneath a root to stdout
    Cat(CatArgs),
    /// List the links of the object at a path beneath a root
    Ls(LsArgs),
    /// Re-hash every object reachable from a root
    Verify(VerifyArgs),
}

#[derive(Args)]
pub struct AddArgs {
    pub path: PathBuf,
}

#[derive(Args)]
pub struct CatArgs {
    /// Root digest, hex
    pub root: String,
    #[arg(default_value = "")]
    pub path: String,
}

#[derive(Args)]
pub struct LsArgs {
    /// Root digest, hex
    pub root: String,
    #[arg(default_value = "")]
    pub path: String,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Root digest, hex
    pub root: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn globals_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "mdag", "cat", "abcd", "dir/file", "--store", "/tmp/s", "--format", "json", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.store, PathBuf::from("/tmp/s"));
        match cli.command {
            Command::Cat(args) => {
                assert_eq!(args.root, "abcd");
                assert_eq!(args.path, "dir/file");
            }
            _ => panic!("expected cat"),
        }
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["mdag", "ls", "abcd"]).unwrap();
        assert_eq!(cli.store, PathBuf::from(".mdag/objects"));
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.config.is_none());
        match cli.command {
            Command::Ls(args) => assert_eq!(args.path, ""),
            _ => panic!("expected ls"),
        }
    }
}
