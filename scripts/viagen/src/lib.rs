use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use clap::Parser;
use log::{debug, info};
use sky130_common_pdk::Sky130Pdk;
use tempdir::TempDir;
use viastack::deps::arcstr::ArcStr;
use viastack::emit::{emit, Artifact, Encode, Encoding, MagFile, MagicScript};
use viastack::error::{with_err_context, ErrorContext, ErrorSource, Result};
use viastack::io::{
    artifact_path, canonicalize, create_dir_all, create_file, ensure_absent, write_artifact,
};
use viastack::pack::{GrowthPolicy, Packer, ViaRequest, ViaStack};
use viastack::pdk::Pdk;
use viastack::rules::RuleTable;

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about,
    long_about = "Generate DRC-clean via stacks for the Magic layout tool"
)]
pub struct Args {
    /// The bottom metal layer (1 for met1).
    #[arg(short, long)]
    pub start: usize,
    /// The top metal layer.
    #[arg(short, long)]
    pub end: usize,
    /// The requested width, in layout units.
    #[arg(short = 'W', long)]
    pub width: String,
    /// The requested height, in layout units.
    #[arg(short = 'H', long)]
    pub height: String,
    /// The directory in which to place the generated via.
    #[arg(short, long, default_value = ".")]
    pub dest: PathBuf,
    /// The output encoding: `mag` for a layout file or `script` for Magic commands.
    #[arg(long, default_value = "mag")]
    pub encoding: String,
    /// A TOML or CSV rule table to use instead of the built-in SKY130 rules.
    #[arg(long)]
    pub rules: Option<PathBuf>,
    /// How to grow boxes that only fit a single via.
    #[arg(long, default_value = "larger-axis")]
    pub policy: GrowthPolicy,
    /// Run Magic on the generated commands and save the resulting layout.
    #[arg(long)]
    pub run_magic: bool,
    /// The Magic executable.
    #[arg(long, default_value = "magic")]
    pub magic: PathBuf,
    /// The `.magicrc` Magic is started with.
    #[arg(long, default_value = ".magicrc")]
    pub magicrc: PathBuf,
    /// Print the artifact instead of writing it.
    #[arg(long)]
    pub dry_run: bool,
    /// Also print the packed geometry as JSON.
    #[arg(long)]
    pub json: bool,
}

/// What [`generate`] produced.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Outcome {
    /// The artifact was not persisted.
    Printed(Artifact),
    /// The artifact was written to `path`.
    Written { artifact: Artifact, path: PathBuf },
    /// Magic ran the artifact and saved a layout to `layout`.
    Ran { artifact: Artifact, layout: PathBuf },
}

impl Outcome {
    pub fn artifact(&self) -> &Artifact {
        match self {
            Self::Printed(artifact) => artifact,
            Self::Written { artifact, .. } => artifact,
            Self::Ran { artifact, .. } => artifact,
        }
    }
}

/// Packs, encodes, and persists the via stack described by `args`.
pub fn generate(args: &Args) -> Result<Outcome> {
    let pdk = match &args.rules {
        Some(path) => Sky130Pdk::with_rules(RuleTable::load(path)?),
        None => Sky130Pdk::new(),
    };
    debug!("using {} ({})", pdk.name(), pdk.process());

    let stack = pack_request(args, &pdk)?;
    if args.json {
        println!("{}", stack.to_json()?);
    }

    let encoding = args.encoding.parse::<Encoding>()?;
    if args.run_magic && encoding != Encoding::from(MagicScript) {
        return Err(ErrorSource::InvalidArgs(format!(
            "--run-magic requires the script encoding, not `{encoding}`"
        ))
        .into());
    }
    let artifact = emit(&stack, &encoding, &pdk);

    if args.dry_run {
        return Ok(Outcome::Printed(artifact));
    }

    if args.run_magic {
        let layout = run_magic(&artifact, &args.dest, &args.magic, &args.magicrc)?;
        info!(
            "Generated via M{}-M{} of size [{}, {}] at {layout:?}",
            stack.start_layer(),
            stack.end_layer(),
            stack.final_dims().w(),
            stack.final_dims().h()
        );
        return Ok(Outcome::Ran { artifact, layout });
    }

    let path = write_artifact(&artifact, &args.dest)?;
    info!(
        "Generated via M{}-M{} of size [{}, {}] at {path:?}",
        stack.start_layer(),
        stack.end_layer(),
        stack.final_dims().w(),
        stack.final_dims().h()
    );
    Ok(Outcome::Written { artifact, path })
}

fn pack_request(args: &Args, pdk: &impl Pdk) -> Result<ViaStack> {
    let request = ViaRequest::parse(args.start, args.end, &args.width, &args.height)?;
    let packer = Packer::builder()
        .rules(pdk.via_rules())
        .policy(args.policy)
        .build()
        .map_err(|e| ErrorSource::InvalidArgs(e.to_string()))?;
    packer.pack(&request)
}

/// Wraps Magic commands in a shell script that runs Magic headless and saves to `layout`.
pub fn magic_shell_script(
    artifact: &Artifact,
    layout: &Path,
    magic: &Path,
    magicrc: &Path,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(artifact.body.len() + 5);
    lines.push("#!/bin/sh".to_string());
    lines.push(format!(
        "{} -dnull -noconsole -rcfile {} << EOF",
        magic.display(),
        magicrc.display()
    ));
    lines.extend(artifact.body.iter().cloned());
    lines.push(format!("save {}", layout.display()));
    lines.push("quit -noprompt".to_string());
    lines.push("EOF".to_string());
    lines
}

/// Runs Magic on a script artifact, saving a `.mag` layout into `dest`.
///
/// Fails without running Magic if the layout already exists or `magicrc` is missing.
pub fn run_magic(
    artifact: &Artifact,
    dest: &Path,
    magic: &Path,
    magicrc: &Path,
) -> Result<PathBuf> {
    let layout_artifact = Artifact {
        extension: ArcStr::from(MagFile.extension()),
        ..artifact.clone()
    };
    ensure_absent(artifact_path(&layout_artifact, dest))?;

    if !magicrc.is_file() {
        return Err(ErrorSource::MissingFile(magicrc.to_path_buf()).into());
    }
    let magicrc = canonicalize(magicrc)?;

    create_dir_all(dest)?;
    let dest = canonicalize(dest)?;
    let layout = artifact_path(&layout_artifact, &dest);

    let tmp = with_err_context(TempDir::new("viagen"), || {
        ErrorContext::Task("creating temporary directory".to_string())
    })?;
    let script_path = tmp.path().join("run_magic.sh");
    let mut script = create_file(&script_path)?;
    let contents = magic_shell_script(artifact, &layout, magic, &magicrc).join("\n") + "\n";
    with_err_context(script.write_all(contents.as_bytes()), || {
        ErrorContext::CreateFile(script_path.clone())
    })?;
    drop(script);

    debug!("running {script_path:?} in {dest:?}");
    let status = with_err_context(
        Command::new("sh")
            .arg(&script_path)
            .current_dir(&dest)
            .status(),
        || ErrorContext::Task(format!("running {}", magic.display())),
    )?;
    if !status.success() {
        return Err(ErrorSource::ToolFailed(format!("magic exited with {status}")).into());
    }
    // Magic can exit successfully even when `save` fails.
    if !layout.is_file() {
        return Err(ErrorSource::ToolFailed(format!("magic did not write {layout:?}")).into());
    }
    Ok(layout)
}
