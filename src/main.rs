//! gitstamp - git-derived creation times for a content blog.

mod cli;
mod config;
mod data;
mod posts;
mod resolver;
mod utils;
mod watch;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use cli::{Cli, Commands, ModuleArgs};
use config::Config;
use data::{ModuleFormat, ModuleProvider, VirtualModule};
use resolver::{
    CreationTimeCache, CreationTimeResolver, GitCli, ResolveError, normalize_path,
};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::runtime::Runtime;
use utils::{css::inject_styles, git::RepoLayout, highlight::highlight_markdown, xml};
use watch::RefWatcher;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let result = run(&cli, &config, &rt);

    // A failed history query exits with git's own status.
    if let Err(err) = &result
        && let Some(code) = err.downcast_ref::<ResolveError>().and_then(ResolveError::exit_code)
    {
        log!("error"; "{err:#}");
        std::process::exit(code);
    }
    result
}

fn run(cli: &Cli, config: &Config, rt: &Runtime) -> Result<()> {
    match &cli.command {
        Commands::Resolve { paths, format, .. } => {
            let (_, resolver) = build_resolver(config)?;
            let times = rt.block_on(resolver.resolve(paths))?;
            for path in paths.iter().map(|p| normalize_path(p)) {
                if let Some(time) = times.get(&path) {
                    println!("{path}\t{}", posts::format_time(*time, *format));
                }
            }
            Ok(())
        }
        Commands::Module { module, .. } => generate_module(rt, config, module),
        Commands::Watch { module, .. } => watch_module(rt, config, module),
        Commands::Post { id, format, source } => {
            let (layout, resolver) = build_resolver(config)?;
            let key = posts::post_key(&config.content.dir, id);
            let times = rt.block_on(resolver.resolve([&key]))?;
            let now = Utc::now().fixed_offset();
            println!("{}", posts::creation_time(&times, &config.content.dir, id, *format, now));

            if *source {
                print_source(config, &layout, &key)?;
            }
            Ok(())
        }
        Commands::Links { file, output, .. } => {
            let html = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
            let rewritten = xml::rewrite_links(&html, config.links.github_base.as_deref())
                .with_context(|| format!("Failed to rewrite links in {}", file.display()))?;
            write_output(output.as_deref(), &rewritten)
        }
        Commands::Highlight { file, output } => {
            let source = fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let html = highlight_markdown(&source)
                .with_context(|| format!("Failed to highlight {}", file.display()))?;
            write_output(output.as_deref(), html.as_bytes())
        }
        Commands::Styles { file, id, output, .. } => {
            let code = fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let id = id.clone().unwrap_or_else(|| file.display().to_string());
            let code = inject_styles(&code, &id, &config.styles.import).unwrap_or_else(|| {
                log!("styles"; "{id} is not a Markdown module, left unchanged");
                code
            });
            write_output(output.as_deref(), code.as_bytes())
        }
    }
}

/// Load and validate configuration from CLI arguments.
///
/// A missing config file means all defaults.
fn load_config(cli: &Cli) -> Result<Config> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        Config::from_path(&config_path)?
    } else {
        Config::default()
    };
    config.update_with_cli(cli);
    config.validate(cli)?;

    Ok(config)
}

/// Discover the repository and build a resolver over its history.
fn build_resolver(config: &Config) -> Result<(RepoLayout, CreationTimeResolver<GitCli>)> {
    let layout = RepoLayout::discover(config.get_root())?;
    let history = GitCli::new(&layout.workdir)
        .with_command(config.git.command.clone())
        .with_timeout(config.git.timeout());
    let resolver = CreationTimeResolver::new(history, Arc::new(CreationTimeCache::new()))
        .with_range(config.git.range());
    Ok((layout, resolver))
}

fn build_module(config: &Config) -> Result<(RepoLayout, VirtualModule<GitCli>)> {
    let (layout, resolver) = build_resolver(config)?;
    let module = VirtualModule::new(resolver, &layout.workdir, &config.content.dir)
        .with_id(&config.module.id);
    Ok((layout, module))
}

const fn module_format(args: &ModuleArgs) -> ModuleFormat {
    if args.json {
        ModuleFormat::Json
    } else {
        ModuleFormat::Js
    }
}

/// Load the module once through its import id, as a bundler would.
fn generate_module(rt: &Runtime, config: &Config, args: &ModuleArgs) -> Result<()> {
    let (_, module) = build_module(config)?;

    let id = match module_format(args) {
        ModuleFormat::Js => module.id().to_owned(),
        ModuleFormat::Json => format!("{}.json", module.id()),
    };
    let resolved = module
        .resolve_id(&id)
        .with_context(|| format!("`{id}` is not provided by this module"))?;
    let text = rt
        .block_on(module.provide(&resolved))?
        .with_context(|| format!("No source for `{id}`"))?;

    write_output(config.module.output.as_deref(), text.as_bytes())
}

fn watch_module(rt: &Runtime, config: &Config, args: &ModuleArgs) -> Result<()> {
    let (layout, module) = build_module(config)?;
    let module = module.keep_last_good(true);
    let output = config.module.output.as_deref();

    let watcher = RefWatcher::new(&layout, &module, module_format(args), output);
    watcher.refresh(rt)?;

    let cache = module.resolver().cache();
    if cache.is_empty() {
        log!("watch"; "no committed files under {} yet", config.content.dir);
    } else {
        log!("watch"; "{} creation times cached", cache.len());
    }

    if !config.watch.enable {
        log!("watch"; "disabled by [watch].enable");
        return Ok(());
    }
    watcher.watch_blocking(rt)
}

/// Print the repository URL of a post's source file.
fn print_source(config: &Config, layout: &RepoLayout, key: &str) -> Result<()> {
    let Some(base) = config.links.github_base.as_deref() else {
        log!("post"; "no [links].github_base configured, skipping source link");
        return Ok(());
    };
    let file: PathBuf = layout.workdir.join(key);
    println!("{}", xml::link::github_link(&layout.workdir, &file, base)?);
    Ok(())
}

/// Write `bytes` to `output`, or to stdout when unset.
pub(crate) fn write_output(output: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
            Ok(())
        }
    }
}
