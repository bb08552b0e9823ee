//! CLI front end for `dis-core`: loads a ROM, runs the analysis pipeline,
//! and writes ca65-style assembly text to stdout or a file.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use colored::Colorize;
use dis_core::cdl::CodeDataLog;
use dis_core::constants::ConstantsResolver;
use dis_core::cpu::{Chip8, CpuProfile, Mos6502};
use dis_core::emitter::emit_ca65;
use dis_core::program::AssemblyOptions;
use dis_core::rom::Rom;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Disassemble a 6502/NES or CHIP-8 ROM", long_about = None)]
struct Cli {
    /// Path to the ROM to disassemble (.nes for 6502, a flat binary for CHIP-8)
    rom: PathBuf,

    /// Target CPU profile
    #[arg(long, value_enum, default_value_t = Profile::Mos6502)]
    profile: Profile,

    /// Output assembler dialect (only `ca65` is implemented; the flag is a
    /// hook for the contract spec.md §6 names)
    #[arg(long, default_value = "ca65")]
    assembler: String,

    /// Optional FCEUX-format code/data log to seed the worklist from
    #[arg(long = "code-data-log")]
    code_data_log: Option<PathBuf>,

    /// Treat unofficial 6502 opcodes as real instructions instead of
    /// disambiguating them to CodeAsData
    #[arg(long)]
    unofficial_opcodes: bool,

    /// Keep trailing zero-filled bytes instead of trimming them
    #[arg(long)]
    zero_bytes: bool,

    /// Emit each byte's raw hex alongside its rendered line
    #[arg(long)]
    hex_comments: bool,

    /// Emit each line's ROM offset as a comment
    #[arg(long)]
    offset_comments: bool,

    /// Only emit banks that contain at least one instruction
    #[arg(long)]
    code_only: bool,

    /// Write the disassembly here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Profile {
    Mos6502,
    Chip8,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{} {message}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    if cli.assembler != "ca65" {
        return Err(format!("unsupported assembler dialect: {}", cli.assembler));
    }

    let (profile, prg, chr, constants): (Box<dyn CpuProfile>, Vec<u8>, Vec<u8>, ConstantsResolver) = match cli.profile {
        Profile::Mos6502 => {
            let rom = Rom::load_ines_file(&cli.rom).map_err(|error| error.to_string())?;
            (Box::new(Mos6502::new(cli.unofficial_opcodes)), rom.program_rom, rom.character_rom, ConstantsResolver::nes())
        }
        Profile::Chip8 => {
            let rom = Rom::load_chip8_file(&cli.rom).map_err(|error| error.to_string())?;
            (Box::new(Chip8::default()), rom.program_rom, Vec::new(), ConstantsResolver::empty())
        }
    };

    let cdl = match &cli.code_data_log {
        Some(path) => Some(CodeDataLog::load(path, prg.len()).map_err(|error| error.to_string())?),
        None => None,
    };

    let options = AssemblyOptions {
        zero_bytes: cli.zero_bytes,
        hex_comments: cli.hex_comments,
        offset_comments: cli.offset_comments,
        code_only: cli.code_only,
    };

    let program = dis_core::process(profile.as_ref(), &prg, &chr, cdl.as_ref(), &constants, cli.unofficial_opcodes, &options)
        .map_err(|error| error.to_string())?;

    debug!(
        banks = program.banks.len(),
        prg_checksum = format!("{:08x}", program.checksums.prg),
        "analysis complete"
    );

    let text = emit_ca65(&program);

    match &cli.output {
        Some(path) => fs::write(path, text).map_err(|error| format!("writing {}: {error}", path.display())),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}
