use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use livepath::{EffectKind, HostDocument, HostItem, registry, write_path_text};

#[derive(Parser, Debug)]
#[command(name = "livepath", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply each item's effect stack and print the resulting path text.
    Apply(ApplyArgs),
    /// Attach a new effect to an item and write the updated document.
    Add(AddArgs),
    /// List the registered effect kinds and their parameters.
    Kinds,
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    /// Input host document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Only this item (default: all items).
    #[arg(long)]
    item: Option<String>,

    /// Also print indicator paths, prefixed with `#`.
    #[arg(long, default_value_t = false)]
    indicators: bool,
}

#[derive(Parser, Debug)]
struct AddArgs {
    /// Input host document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Item to attach the effect to.
    #[arg(long)]
    item: String,

    /// Effect kind key, see `livepath kinds`.
    #[arg(long)]
    kind: String,

    /// Parameter override `key=value`; repeatable.
    #[arg(long = "set", value_parser = parse_assignment)]
    set: Vec<(String, String)>,

    /// Output document (default: overwrite the input).
    #[arg(long)]
    out: Option<PathBuf>,
}

fn parse_assignment(text: &str) -> Result<(String, String), String> {
    let (key, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{text}'"))?;
    Ok((key.trim().to_string(), value.to_string()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Apply(args) => cmd_apply(args),
        Command::Add(args) => cmd_add(args),
        Command::Kinds => cmd_kinds(),
    }
}

fn load(path: &Path) -> anyhow::Result<HostDocument> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read document '{}'", path.display()))?;
    HostDocument::from_json(&text).with_context(|| format!("parse document '{}'", path.display()))
}

fn find_item<'a>(doc: &'a HostDocument, id: &str) -> anyhow::Result<&'a HostItem> {
    doc.item(id).with_context(|| format!("no item '{id}' in document"))
}

fn cmd_apply(args: ApplyArgs) -> anyhow::Result<()> {
    let doc = load(&args.in_path)?;
    let items: Vec<&HostItem> = match &args.item {
        Some(id) => vec![find_item(&doc, id)?],
        None => doc.items.iter().collect(),
    };

    for item in items {
        let base = item.base_path()?;
        let bbox = item.bbox()?;
        let mut stack = doc.stack_for(item);
        for effect in stack.effects() {
            for d in effect.diagnostics() {
                tracing::warn!(
                    item = %item.id,
                    effect = effect.node_id(),
                    key = %d.key,
                    text = %d.text,
                    "attribute ignored, using default"
                );
            }
        }
        for orphan in stack.orphans() {
            tracing::warn!(
                item = %item.id,
                reference = %orphan.reference,
                reason = %orphan.reason,
                "orphan effect"
            );
        }

        let out = stack.apply(&base, bbox);
        if out.broken {
            tracing::warn!(
                item = %item.id,
                "effect stack is broken; failed stages passed their input through"
            );
        }
        println!("{}\t{}", item.id, write_path_text(&out.path));
        if args.indicators {
            for indicator in &out.indicators {
                println!("{}\t# {}", item.id, write_path_text(indicator));
            }
        }
    }
    Ok(())
}

fn cmd_add(args: AddArgs) -> anyhow::Result<()> {
    let mut doc = load(&args.in_path)?;
    let item = find_item(&doc, &args.item)?.clone();
    let kind = EffectKind::from_key(&args.kind)
        .with_context(|| format!("unknown effect kind '{}'", args.kind))?;

    let mut stack = doc.stack_for(&item);
    let id = stack.create(kind, &item.base_path()?, item.bbox()?)?;
    let effect = stack
        .effect_mut(id)
        .context("created effect missing from its stack")?;
    for (key, value) in &args.set {
        anyhow::ensure!(
            effect.set_param_text(key, value),
            "cannot set {} parameter '{key}' to '{value}'",
            kind.key()
        );
    }
    let node_id = effect.node_id().to_string();
    doc.store_stack(&item.id, &stack);

    let out = args.out.as_ref().unwrap_or(&args.in_path);
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(out, doc.to_json()?)
        .with_context(|| format!("write document '{}'", out.display()))?;

    eprintln!("added {node_id} ({}) to {}", kind.key(), item.id);
    Ok(())
}

fn cmd_kinds() -> anyhow::Result<()> {
    for kind in registry().kinds() {
        let op = registry().construct(kind)?;
        let params: Vec<String> = op
            .as_effect()
            .params()
            .iter()
            .map(|p| format!("{}={}", p.key(), p.write_to_text()))
            .collect();
        println!("{}\t{}\t{}", kind.key(), kind.label(), params.join(" "));
    }
    Ok(())
}
