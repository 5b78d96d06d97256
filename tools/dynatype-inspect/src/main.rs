// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use anyhow::Context;
use clap::{Parser, Subcommand};
use dynatype::schema::ModelDocument;
use dynatype::{load_model, Container, Namespace, NamespaceRoot, TypeRegistry, TypeSystemConfig};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dynatype-inspect")]
#[command(about = "Load type models, resolve forward references and inspect the result")]
#[command(version)]
struct Cli {
    /// Type system configuration (TOML)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a model and report unresolved or failing types
    Check {
        /// Model file (.json or .toml)
        #[arg(value_name = "FILE")]
        model: PathBuf,
    },

    /// Print member descriptors of one type as JSON
    Describe {
        #[arg(value_name = "FILE")]
        model: PathBuf,

        /// Registered type name
        #[arg(short = 't', long = "type", value_name = "NAME")]
        type_name: String,

        /// Include static members
        #[arg(long)]
        statics: bool,
    },

    /// Print the namespace tree
    Tree {
        #[arg(value_name = "FILE")]
        model: PathBuf,

        /// Show the global mirror instead of the models tree
        #[arg(long)]
        global: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let mut container = build_container(cli.config.as_deref())?;
    let output = match cli.command {
        Commands::Check { model } => cmd_check(&mut container, &model)?,
        Commands::Describe {
            model,
            type_name,
            statics,
        } => cmd_describe(&mut container, &model, &type_name, statics)?,
        Commands::Tree { model, global } => cmd_tree(&mut container, &model, global)?,
    };
    println!("{}", output);
    Ok(())
}

fn build_container(config: Option<&Path>) -> anyhow::Result<Container> {
    let config = match config {
        Some(path) => TypeSystemConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TypeSystemConfig::default(),
    };
    Ok(Container::with_config(config)?)
}

fn load(container: &mut Container, model: &Path) -> anyhow::Result<Vec<dynatype::TypeId>> {
    let document = ModelDocument::from_file(model)
        .with_context(|| format!("reading model {}", model.display()))?;
    let ids = load_model(container, &document)?;
    log::debug!("[inspect] {} types from {}", ids.len(), model.display());
    Ok(ids)
}

fn cmd_check(container: &mut Container, model: &Path) -> anyhow::Result<String> {
    let ids = load(container, model)?;
    let container = &*container;
    let mut lines = Vec::with_capacity(ids.len() + 1);
    for id in &ids {
        let ty = container
            .get_type(*id)
            .context("loaded type vanished")?;
        let (own, children) = ty.resolver().pending();
        lines.push(format!(
            "  {:<40} {:>3} members  {:?}{}",
            ty.full_name(),
            container.member_definitions(*id).as_array().len(),
            container.resolution_state(*id),
            if own + children > 0 {
                format!(" ({} pending)", own + children)
            } else {
                String::new()
            }
        ));
    }
    lines.insert(0, format!("[OK] {}: {} types", model.display(), ids.len()));
    Ok(lines.join("\n"))
}

fn cmd_describe(
    container: &mut Container,
    model: &Path,
    type_name: &str,
    statics: bool,
) -> anyhow::Result<String> {
    load(container, model)?;
    let container = &*container;
    let id = container.resolve_type(type_name)?;
    let ty = container.get_type(id).context("registered type vanished")?;

    let members: Vec<serde_json::Value> = container
        .member_definitions(id)
        .as_array()
        .iter()
        .map(|d| d.to_json(container))
        .collect();
    let mut out = serde_json::json!({
        "name": ty.full_name(),
        "base": ty.inherits_from().map(|b| container.resolve_name(b)).transpose()?,
        "baseTypes": ty
            .base_types()
            .iter()
            .map(|b| container.resolve_name(*b))
            .collect::<Result<Vec<_>, _>>()?,
        "members": members,
    });
    if statics {
        out["staticMembers"] = container
            .static_definitions(id)
            .as_array()
            .iter()
            .map(|d| d.to_json(container))
            .collect();
    }
    Ok(serde_json::to_string_pretty(&out)?)
}

fn cmd_tree(container: &mut Container, model: &Path, global: bool) -> anyhow::Result<String> {
    load(container, model)?;
    let root = if global {
        NamespaceRoot::Global
    } else {
        NamespaceRoot::Models
    };
    let mut lines = Vec::new();
    render_namespace(container.namespace(root), 0, &mut lines);
    Ok(lines.join("\n"))
}

fn render_namespace(ns: &Namespace, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    for (name, id) in ns.types() {
        lines.push(format!("{}{} {}", indent, name, id));
    }
    for (name, child) in ns.children() {
        lines.push(format!("{}{}/", indent, name));
        render_namespace(child, depth + 1, lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn model_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{ "types": [
                {{ "name": "Inv.Item", "base": "$data.Entity",
                   "members": {{ "sku": {{ "type": "string", "key": true }},
                                "bin": {{ "type": "Inv.Bin" }} }} }},
                {{ "name": "Inv.Bin", "base": "$data.Entity", "members": {{ "row": 0 }} }}
            ] }}"#
        )
        .unwrap();
        file
    }

    #[test]
    fn check_reports_every_type() {
        let file = model_file();
        let mut c = build_container(None).unwrap();
        let out = cmd_check(&mut c, file.path()).unwrap();
        assert!(out.starts_with("[OK]"));
        assert!(out.contains("Inv.Item"));
        assert!(out.contains("Resolved"));
        assert!(!out.contains("pending"));
    }

    #[test]
    fn describe_renders_resolved_types_by_name() {
        let file = model_file();
        let mut c = build_container(None).unwrap();
        let out = cmd_describe(&mut c, file.path(), "Inv.Item", false).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["base"], "$data.Entity");
        let bin = json["members"]
            .as_array()
            .unwrap()
            .iter()
            .find(|m| m["name"] == "bin")
            .unwrap();
        assert_eq!(bin["type"], "Inv.Bin");
        assert!(json.get("staticMembers").is_none());
    }

    #[test]
    fn tree_lists_namespaces() {
        let file = model_file();
        let mut c = build_container(None).unwrap();
        let out = cmd_tree(&mut c, file.path(), false).unwrap();
        assert!(out.contains("Inv/"));
        assert!(out.contains("  Item #"));
    }

    #[test]
    fn config_file_is_applied() {
        let mut cfg = tempfile::NamedTempFile::new().unwrap();
        writeln!(cfg, "escape_marker = \"!\"").unwrap();
        let c = build_container(Some(cfg.path())).unwrap();
        assert_eq!(c.config().escape_marker, "!");
    }
}
