use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use std::fmt::Write as _;
use std::path::Path;

use picoasm::decoder::Decoder;
use picoasm::disasm::fmt_op;
use picoasm::isa::kcpsm3::Kcpsm3Decoder;

use picoblaze_disasm::model::{load_hex, read_word, Image};

#[derive(Parser, Debug)]
#[command(author, version, about = "PicoBlaze (KCPSM3) disassembler CLI", long_about = None)]
struct Cli {
    /// Input hex image (one 5-digit word per line)
    #[arg(value_name = "HEXFILE")]
    input: String,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize the image
    Info,
    /// Disassemble the word range [start, end)
    Range {
        /// Start address (hex or dec)
        #[arg(default_value = "0")]
        start: String,
        /// End address (hex or dec, exclusive; default: last used word)
        end: Option<String>,
        /// Output format: text or json
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, serde::Serialize)]
struct LineOut {
    addr: usize,
    word: u32,
    text: String,
}

fn parse_addr(s: &str) -> Result<usize> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(usize::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse::<usize>()?)
    }
}

fn disassemble(img: &Image, start: usize, end: usize) -> Vec<LineOut> {
    let dec = Kcpsm3Decoder::new();
    (start..end)
        .filter_map(|addr| {
            let word = read_word(img, addr)?;
            let text = match dec.decode(word) {
                Some(op) => fmt_op(&op),
                None => format!(".word {word:05X}"),
            };
            Some(LineOut { addr, word, text })
        })
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let img = load_hex(Path::new(&cli.input))?;

    match cli.cmd {
        Command::Info => {
            println!("words: {}", img.words.len());
            println!("used:  {}", img.used());
        }
        Command::Range { start, end, format, out } => {
            let start = parse_addr(&start)?;
            let end = match end {
                Some(e) => parse_addr(&e)?,
                None => img.used(),
            };
            anyhow::ensure!(end >= start, "end must be >= start");

            let lines = disassemble(&img, start, end.min(img.words.len()));
            let buf = match format {
                OutputFormat::Text => {
                    let mut buf = String::new();
                    for l in &lines {
                        let _ = writeln!(buf, "{:03X}  {:05X}  {}", l.addr, l.word, l.text);
                    }
                    buf
                }
                OutputFormat::Json => serde_json::to_string_pretty(&lines)?,
            };
            if let Some(path) = out {
                std::fs::write(path, buf)?;
            } else {
                print!("{buf}");
            }
        }
    }
    Ok(())
}
