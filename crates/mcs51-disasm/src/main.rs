use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use mcs51::{IsaError, disassemble};
use tracing::{error, info, warn};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
struct Args {
    /// ROM file to load
    #[arg(value_name = "ROM_FILE")]
    rom_file: PathBuf,

    /// Code address the first byte of the file is loaded at
    #[arg(long, default_value = "0", value_parser = parse_address)]
    origin: u16,

    /// First code address to disassemble (defaults to the origin)
    #[arg(long, value_parser = parse_address)]
    start: Option<u16>,

    /// Maximum number of instructions to disassemble
    #[arg(short, long, default_value = "1000")]
    max_instructions: u64,

    /// Enable trace output
    #[arg(short, long)]
    trace: bool,
}

fn parse_address(s: &str) -> Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address {s:?}: {e}"))
}

fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Code memory ends at FFFFh; bytes loaded beyond it are unreachable.
fn clip_to_code_space(end: usize) -> usize {
    end.min(u16::MAX as usize + 1)
}

pub fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.trace {
            LevelFilter::TRACE
        } else {
            LevelFilter::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    let image = match fs::read(&args.rom_file) {
        Ok(image) => image,
        Err(e) => {
            error!("failed to read {}: {e}", args.rom_file.display());
            return ExitCode::FAILURE;
        }
    };

    let origin = args.origin as usize;
    let end = origin + image.len();
    let mut pc = args.start.map_or(origin, usize::from);
    if pc < origin || pc > end {
        error!("start {pc:04X}h is outside the image ({origin:04X}h-{end:04X}h)");
        return ExitCode::FAILURE;
    }

    let code_end = clip_to_code_space(end);
    if code_end < end {
        warn!(
            "image extends past FFFFh by {} bytes; they are not disassembled",
            end - code_end
        );
    }

    let mut instruction_count = 0;
    while pc < code_end && instruction_count < args.max_instructions {
        let code = &image[pc - origin..];
        match disassemble(code, pc as u16) {
            Ok(instruction) => {
                println!("{pc:04X}: {:10} {instruction}", hex_bytes(&instruction.bytes));
                pc += instruction.bytes.len();
            }
            Err(IsaError::UnknownOpcode(opcode)) => {
                warn!("unknown opcode {opcode:02X}h at {pc:04X}h");
                println!("{pc:04X}: {:10} DB {opcode:02X}h", hex_bytes(&[opcode]));
                pc += 1;
            }
            Err(e) => {
                warn!("{e}");
                println!("{pc:04X}: {:10} DB ...", hex_bytes(code));
                break;
            }
        }
        instruction_count += 1;
    }

    info!("disassembled {instruction_count} instructions, stopped at {pc:04X}h");
    ExitCode::SUCCESS
}
