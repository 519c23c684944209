use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use manifestor_core::config::Config;
use manifestor_core::paths;
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration (file values merged over defaults)
    Show,

    /// Write a default .manifestor.yaml if none exists
    Init,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Init => init(root),
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;

    if json {
        return print_json(&config);
    }

    println!("root:      {}", root.display());
    println!("manifest:  {}", config.manifest_path(root).display());
    println!("listener:  {}", config.listener.name);
    println!("format:    {}", config.output.format);
    match config.output_path(root) {
        Some(p) => println!("output:    {}", p.display()),
        None => println!("output:    (stdout)"),
    }
    Ok(())
}

fn init(root: &Path) -> anyhow::Result<()> {
    let path = paths::config_path(root);
    if path.exists() {
        println!("{} already exists, leaving it unchanged.", path.display());
        return Ok(());
    }
    Config::default()
        .save(root)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(())
}
