//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use crate::posts::DateFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gitstamp: git-derived creation times for a content blog
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root (any directory inside the repository)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: gitstamp.toml)
    #[arg(short = 'C', long, default_value = "gitstamp.toml")]
    pub config: PathBuf,

    /// Content directory path (relative to repository root)
    #[arg(short, long)]
    pub content: Option<String>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// History query overrides shared by the resolving commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Only consider add-events after this revision
    #[arg(long)]
    pub from: Option<String>,

    /// Only consider add-events up to this revision
    #[arg(long)]
    pub to: Option<String>,

    /// Seconds before the history query is killed (0 disables)
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Output arguments shared by Module and Watch
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ModuleArgs {
    /// Emit JSON instead of a JS module
    #[arg(long)]
    pub json: bool,

    /// Write the module to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the creation time of each path
    Resolve {
        /// Repository-relative paths
        #[arg(required = true)]
        paths: Vec<String>,

        /// Output representation
        #[arg(short, long, value_enum, default_value_t)]
        format: DateFormat,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Generate the creation times module once
    Module {
        #[command(flatten)]
        module: ModuleArgs,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Generate the module and regenerate it whenever HEAD or a branch moves
    Watch {
        #[command(flatten)]
        module: ModuleArgs,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Print a post's creation time, falling back to now
    Post {
        /// Post id, relative to the content directory (e.g. `hello.md`)
        id: String,

        /// Output representation
        #[arg(short, long, value_enum, default_value_t)]
        format: DateFormat,

        /// Also print the post's source URL (needs `[links].github_base`)
        #[arg(long)]
        source: bool,
    },

    /// Rewrite anchors in an HTML file (`github://` links, external targets)
    Links {
        /// HTML file to rewrite
        file: PathBuf,

        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Base URL for `github://` links
        #[arg(long = "github-base")]
        github_base: Option<String>,
    },

    /// Highlight fenced code blocks in a Markdown file
    Highlight {
        /// Markdown source file
        file: PathBuf,

        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Prepend the highlight stylesheet import to a compiled Markdown module
    Styles {
        /// Compiled module file
        file: PathBuf,

        /// Module id used for the Markdown check (default: the file path)
        #[arg(long)]
        id: Option<String>,

        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stylesheet to import
        #[arg(long)]
        import: Option<String>,
    },
}

impl Cli {
    /// History query overrides of the current command, if it has any.
    pub const fn query_args(&self) -> Option<&QueryArgs> {
        match &self.command {
            Commands::Resolve { query, .. }
            | Commands::Module { query, .. }
            | Commands::Watch { query, .. } => Some(query),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_resolve() {
        let cli = Cli::parse_from([
            "gitstamp", "resolve", "posts/a.md", "posts/b.md", "-f", "iso-string", "--from", "v1",
        ]);
        match &cli.command {
            Commands::Resolve { paths, format, query } => {
                assert_eq!(paths, &["posts/a.md", "posts/b.md"]);
                assert_eq!(*format, DateFormat::IsoString);
                assert_eq!(query.from.as_deref(), Some("v1"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(cli.query_args().is_some());
    }

    #[test]
    fn test_parse_watch() {
        let cli = Cli::parse_from(["gitstamp", "-r", "/blog", "watch", "--json", "-o", "out.json"]);
        assert_eq!(cli.root, Some(PathBuf::from("/blog")));
        match cli.command {
            Commands::Watch { module, .. } => {
                assert!(module.json);
                assert_eq!(module.output, Some(PathBuf::from("out.json")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_requires_paths() {
        assert!(Cli::try_parse_from(["gitstamp", "resolve"]).is_err());
    }

    #[test]
    fn test_parse_highlight() {
        let cli = Cli::parse_from(["gitstamp", "highlight", "post.md", "-o", "post.html.md"]);
        match cli.command {
            Commands::Highlight { file, output } => {
                assert_eq!(file, PathBuf::from("post.md"));
                assert_eq!(output, Some(PathBuf::from("post.html.md")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_post_default_format() {
        let cli = Cli::parse_from(["gitstamp", "post", "hello.md"]);
        assert!(cli.query_args().is_none());
        match cli.command {
            Commands::Post { id, format, source } => {
                assert_eq!(id, "hello.md");
                assert_eq!(format, DateFormat::Date);
                assert!(!source);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
