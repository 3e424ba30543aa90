use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use picoasm::export::{hex, listing, template};
use picoasm::export::template::HdlFlavor;
use picoasm::{Assembler, Diagnostics, ProgramImage, TargetConfig};

// `-V` is the VHDL output, so the version flag is long-only.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "PicoBlaze (KCPSM3) cross-assembler",
    disable_version_flag = true
)]
struct Opts {
    /// Print version
    #[arg(long, action = clap::ArgAction::Version)]
    version: (),
    /// Assembly source file
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,
    /// ROM template (default: ROM_form.vhd / ROM_form.v next to the source)
    #[arg(short, long, value_name = "FILE")]
    template: Option<PathBuf>,
    /// Write a Verilog ROM
    #[arg(short = 'v', long, value_name = "FILE")]
    verilog: Option<PathBuf>,
    /// Write a VHDL ROM
    #[arg(short = 'V', long, value_name = "FILE")]
    vhdl: Option<PathBuf>,
    /// Entity/module name (default: source file stem)
    #[arg(short = 'm', long)]
    name: Option<String>,
    /// Write the hex dump
    #[arg(short = 'H', long, value_name = "FILE")]
    hex: Option<PathBuf>,
    /// Write the listing
    #[arg(short, long, value_name = "FILE")]
    listing: Option<PathBuf>,
    /// Target description in JSON (program_words, scratchpad_bytes)
    #[arg(long, value_name = "FILE")]
    target: Option<PathBuf>,
    /// Write the symbol table as JSON
    #[arg(long, value_name = "FILE")]
    symbols: Option<PathBuf>,
    /// How diagnostics are printed
    #[arg(long, value_enum, default_value_t = DiagFormat::Text)]
    diagnostics: DiagFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DiagFormat {
    Text,
    Json,
}

fn load_target(path: Option<&Path>) -> Result<TargetConfig> {
    let Some(path) = path else {
        return Ok(TargetConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading target {}", path.display()))?;
    let target: TargetConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing target {}", path.display()))?;
    target.validate()?;
    Ok(target)
}

fn report(diags: &Diagnostics, input: &Path, format: DiagFormat) -> Result<()> {
    match format {
        DiagFormat::Text => {
            for d in diags {
                eprintln!("{}:{d}", input.display());
            }
        }
        DiagFormat::Json => println!("{}", serde_json::to_string_pretty(diags)?),
    }
    Ok(())
}

fn write_rom(
    opts: &Opts,
    flavor: HdlFlavor,
    out: &Path,
    name: &str,
    image: &ProgramImage,
) -> Result<()> {
    let template_path = match &opts.template {
        Some(p) => p.clone(),
        None => opts
            .input
            .parent()
            .unwrap_or(Path::new("."))
            .join(flavor.default_template()),
    };
    let text = std::fs::read_to_string(&template_path)
        .with_context(|| format!("reading template {}", template_path.display()))?;
    let rom = template::fill_template(&text, name, image)?;
    std::fs::write(out, rom).with_context(|| format!("writing {}", out.display()))?;
    info!(path = %out.display(), ?flavor, "wrote ROM");
    Ok(())
}

fn run(opts: &Opts) -> Result<bool> {
    let target = load_target(opts.target.as_deref())?;
    let source = std::fs::read_to_string(&opts.input)
        .with_context(|| format!("reading {}", opts.input.display()))?;

    let mut asm = Assembler::new(target);
    asm.set_source(source);
    let result = asm.assemble();

    if let Some(path) = &opts.symbols {
        let json = serde_json::to_string_pretty(asm.symbols())?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    }
    if let Err(diags) = result {
        report(&diags, &opts.input, opts.diagnostics)?;
        return Ok(false);
    }
    let Some(image) = asm.image() else {
        return Ok(false);
    };
    info!(words = image.len(), "assembled {}", opts.input.display());

    let name = match &opts.name {
        Some(n) => n.clone(),
        None => opts
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "prog_rom".to_string()),
    };

    // Each output is attempted even if an earlier one failed.
    let mut ok = true;
    let mut attempt = |what: &str, r: Result<()>| {
        if let Err(e) = r {
            error!("{what}: {e:#}");
            eprintln!("error: {what}: {e:#}");
            ok = false;
        }
    };
    if let Some(out) = &opts.hex {
        let text = hex::to_hex(image, asm.target().program_words);
        attempt(
            "hex",
            std::fs::write(out, text).with_context(|| format!("writing {}", out.display())),
        );
    }
    if let Some(out) = &opts.vhdl {
        attempt("vhdl", write_rom(opts, HdlFlavor::Vhdl, out, &name, image));
    }
    if let Some(out) = &opts.verilog {
        attempt("verilog", write_rom(opts, HdlFlavor::Verilog, out, &name, image));
    }
    if let Some(out) = &opts.listing {
        let source_name = opts.input.display().to_string();
        let text = listing::merge_listing(asm.source(), &source_name, image);
        attempt(
            "listing",
            std::fs::write(out, text).with_context(|| format!("writing {}", out.display())),
        );
    }
    Ok(ok)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    match run(&opts) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
