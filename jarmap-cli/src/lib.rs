use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jarmap_classfile::ClassDescriptor;
use jarmap_loader::{
    build_registry, read_class_entries, LoadSummary, MemoryClassLoader, RecordingBridge,
    SkippedUnit,
};
use serde::Serialize;
use tracing::info;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List every class in an archive and every entry that was skipped
    Inspect {
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,

        /// Print a JSON report instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the order in which classes would be defined
    Order {
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,

        /// Print the full load summary as JSON
        #[arg(long)]
        json: bool,
    },
}

/// One parsed class as reported by `inspect`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassRow {
    pub name: String,
    pub kind: &'static str,
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub super_name: String,
    pub interfaces: Vec<String>,
}

impl From<&ClassDescriptor> for ClassRow {
    fn from(descriptor: &ClassDescriptor) -> Self {
        Self {
            name: descriptor.qualified_name().to_string(),
            kind: descriptor.access().kind(),
            version: descriptor.version().to_string(),
            super_name: descriptor.super_name().to_string(),
            interfaces: descriptor.interface_names().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    pub classes: Vec<ClassRow>,
    pub skipped: Vec<SkippedUnit>,
}

/// Parse every class entry of `archive` without defining anything.
pub fn inspect_archive(archive: &[u8]) -> Result<InspectReport> {
    let entries = read_class_entries(archive)?;
    let (registry, skipped) = build_registry(entries);
    Ok(InspectReport {
        classes: registry.descriptors().map(ClassRow::from).collect(),
        skipped,
    })
}

pub fn write_report<W: Write>(report: &InspectReport, json: bool, out: &mut W) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)?;
        return Ok(());
    }

    for class in &report.classes {
        write!(out, "{} {} [{}]", class.kind, class.name, class.version)?;
        if !class.super_name.is_empty() {
            write!(out, " extends {}", class.super_name)?;
        }
        if !class.interfaces.is_empty() {
            write!(out, " implements {}", class.interfaces.join(", "))?;
        }
        writeln!(out)?;
    }
    for unit in &report.skipped {
        writeln!(out, "skipped {}: {}", unit.entry, unit.reason)?;
    }
    Ok(())
}

/// Load `archive` into an in-process host and report what happened.
pub fn dry_run(archive: &[u8]) -> Result<LoadSummary> {
    let mut loader = MemoryClassLoader::new(RecordingBridge::new());
    Ok(loader.load(archive)?)
}

/// Definition order of `archive`, computed against an in-process host.
pub fn definition_order(archive: &[u8]) -> Result<Vec<String>> {
    Ok(dry_run(archive)?.defined)
}

pub fn write_order<W: Write>(summary: &LoadSummary, json: bool, out: &mut W) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, summary)?;
        writeln!(out)?;
        return Ok(());
    }

    for (position, name) in summary.defined.iter().enumerate() {
        writeln!(out, "{:>4} {name}", position + 1)?;
    }
    Ok(())
}

fn read_archive(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn run<W: Write>(args: Args, out: &mut W) -> Result<()> {
    match args.command {
        Command::Inspect { archive, json } => {
            let report = inspect_archive(&read_archive(&archive)?)
                .with_context(|| format!("failed to inspect {}", archive.display()))?;
            info!(
                classes = report.classes.len(),
                skipped = report.skipped.len(),
                "inspected archive"
            );
            write_report(&report, json, out)
        }
        Command::Order { archive, json } => {
            let summary = dry_run(&read_archive(&archive)?)
                .with_context(|| format!("failed to order {}", archive.display()))?;
            write_order(&summary, json, out)
        }
    }
}
