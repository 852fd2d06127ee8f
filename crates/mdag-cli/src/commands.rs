use std::io::Write;
use std::path::Path;

use anyhow::Context as _;
use colored::Colorize;
use mdag_dag::{DagBuilder, DagConfig, DagResolver, FsSource};
use mdag_store::FsObjectStore;
use mdag_types::Digest;
use serde_json::json;

use crate::cli::*;

/// Store, configuration and output format shared by every command.
struct Context {
    store: FsObjectStore,
    config: DagConfig,
    format: OutputFormat,
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let cx = Context {
        store: FsObjectStore::open(&cli.store)
            .with_context(|| format!("cannot open store at {}", cli.store.display()))?,
        config: load_config(cli.config.as_deref())?,
        format: cli.format,
    };
    match cli.command {
        Command::Add(args) => cmd_add(&cx, args),
        Command::Cat(args) => cmd_cat(&cx, args),
        Command::Ls(args) => cmd_ls(&cx, args),
        Command::Verify(args) => cmd_verify(&cx, args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<DagConfig> {
    match path {
        Some(path) => DagConfig::load(path)
            .with_context(|| format!("cannot load config {}", path.display())),
        None => Ok(DagConfig::default()),
    }
}

fn parse_root(hex: &str) -> anyhow::Result<Digest> {
    Digest::from_hex(hex).with_context(|| format!("invalid root digest {hex:?}"))
}

fn cmd_add(cx: &Context, args: AddArgs) -> anyhow::Result<()> {
    let source = FsSource::open(&args.path)
        .with_context(|| format!("cannot open {}", args.path.display()))?;
    let builder = DagBuilder::with_config(&cx.store, cx.config.clone())?;
    let (root, stats) = builder
        .add_with_stats(&source)
        .with_context(|| format!("cannot add {}", args.path.display()))?;

    match cx.format {
        OutputFormat::Text => {
            println!("{}", root.to_hex());
            eprintln!(
                "{} {} ({} objects, {} bytes)",
                "✓".green().bold(),
                args.path.display().to_string().bold(),
                stats.objects_written,
                stats.bytes
            );
        }
        OutputFormat::Json => {
            let out = json!({ "root": root.to_hex(), "stats": stats });
            println!("{out}");
        }
    }
    Ok(())
}

fn cmd_cat(cx: &Context, args: CatArgs) -> anyhow::Result<()> {
    let root = parse_root(&args.root)?;
    let resolver = DagResolver::with_config(&cx.store, &cx.config);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    resolver
        .write_to(&root, &args.path, &mut out)
        .with_context(|| format!("cannot resolve {:?} under {}", args.path, root.short_hex()))?;
    out.flush()?;
    Ok(())
}

fn cmd_ls(cx: &Context, args: LsArgs) -> anyhow::Result<()> {
    let root = parse_root(&args.root)?;
    let resolver = DagResolver::with_config(&cx.store, &cx.config);
    let (_, object) = resolver
        .locate(&root, &args.path)
        .with_context(|| format!("cannot resolve {:?} under {}", args.path, root.short_hex()))?;

    match cx.format {
        OutputFormat::Text => {
            if object.is_leaf() {
                println!(
                    "{} ({} bytes)",
                    object.kind().to_string().cyan(),
                    object.payload().len()
                );
            }
            for (i, link) in object.links.iter().enumerate() {
                let tag = object
                    .tag_at(i)
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "?".into());
                println!(
                    "{:<4} {:>12} {} {}",
                    tag.cyan(),
                    link.size,
                    link.hash.to_hex().yellow(),
                    link.name.bold()
                );
            }
        }
        OutputFormat::Json => {
            let entries: Vec<_> = object
                .links
                .iter()
                .enumerate()
                .map(|(i, link)| {
                    json!({
                        "name": link.name,
                        "hash": link.hash.to_hex(),
                        "size": link.size,
                        "tag": object.tag_at(i).map(|t| t.to_string()),
                    })
                })
                .collect();
            let out = json!({ "kind": object.kind().to_string(), "links": entries });
            println!("{out}");
        }
    }
    Ok(())
}

fn cmd_verify(cx: &Context, args: VerifyArgs) -> anyhow::Result<()> {
    let root = parse_root(&args.root)?;
    let checked = DagResolver::with_config(&cx.store, &cx.config)
        .verify(&root)
        .with_context(|| format!("verification failed for {}", root.short_hex()))?;

    match cx.format {
        OutputFormat::Text => println!(
            "{} {} objects verified under {}",
            "✓".green().bold(),
            checked,
            root.short_hex().yellow()
        ),
        OutputFormat::Json => {
            println!("{}", json!({ "root": root.to_hex(), "objects": checked, "ok": true }))
        }
    }
    Ok(())
}
