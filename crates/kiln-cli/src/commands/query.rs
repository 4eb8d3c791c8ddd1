//! Asset query commands: list, info, cat

use anyhow::{anyhow, Result};
use clap::Args;
use kiln_asset::{AssetType, Resolver};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Backing sources shared by every query command. Loose directories are
/// registered above all packs, so a loose file overrides its packed copy.
#[derive(Args)]
pub struct SourceArgs {
    /// Loose asset directory (repeatable; overrides packs)
    #[arg(long = "dir")]
    pub dirs: Vec<PathBuf>,

    /// Pack archive (repeatable)
    #[arg(long = "pack")]
    pub packs: Vec<PathBuf>,

    /// Key for keyed packs
    #[arg(long)]
    pub key: Option<String>,

    /// Read every pack payload into memory up front
    #[arg(long)]
    pub preload: bool,

    /// Skip packs that fail to open instead of aborting
    #[arg(long)]
    pub allow_missing: bool,
}

pub fn build_resolver(sources: &SourceArgs) -> Result<Resolver> {
    let mut resolver = Resolver::new();
    for (i, pack) in sources.packs.iter().enumerate() {
        resolver.add_pack(
            pack,
            sources.key.as_deref(),
            i as i32,
            sources.preload,
            sources.allow_missing,
        )?;
    }
    for (i, dir) in sources.dirs.iter().enumerate() {
        resolver.add_directory(dir, 1000 + i as i32)?;
    }
    Ok(resolver)
}

fn parse_type(s: &str) -> Result<AssetType> {
    s.parse::<AssetType>().map_err(|e| anyhow!(e))
}

pub fn list(sources: &SourceArgs, kind: Option<&str>) -> Result<()> {
    let resolver = build_resolver(sources)?;
    let kinds = match kind {
        Some(s) => vec![parse_type(s)?],
        None => AssetType::ALL.to_vec(),
    };

    for kind in kinds {
        for name in resolver.enumerate(kind) {
            println!("{}\t{}", kind, name);
        }
    }
    Ok(())
}

pub fn info(sources: &SourceArgs, name: &str, kind: &str) -> Result<()> {
    let kind = parse_type(kind)?;
    let resolver = build_resolver(sources)?;
    let meta = resolver.metadata(name, kind)?;

    println!("name: {}", name);
    println!("type: {}", kind);
    let mut keys: Vec<&String> = meta.keys().collect();
    keys.sort();
    for key in keys {
        println!("{}: {}", key, meta[key]);
    }
    Ok(())
}

pub fn cat(sources: &SourceArgs, name: &str, kind: &str, output: Option<&Path>) -> Result<()> {
    let kind = parse_type(kind)?;
    let resolver = build_resolver(sources)?;
    let mut stream = resolver.get_stream(name, kind)?;

    match output {
        Some(path) => {
            let mut file = std::fs::File::create(path)?;
            io::copy(&mut stream, &mut file)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            io::copy(&mut stream, &mut handle)?;
            handle.flush()?;
        }
    }
    Ok(())
}
