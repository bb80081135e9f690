//! Command-line driver: wires the code generator to a raw byte sink or the
//! ELF object writer.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use rexasm::{elf, CodeGen};

#[derive(Debug, Parser)]
#[command(
    name = "rexasm",
    version,
    about = "Assembles x86-64 source into an ELF64 object or raw machine code"
)]
struct Args {
    /// Assembly source file to assemble
    input: PathBuf,

    /// Output file (defaults to <INPUT>.bin)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Emit raw machine code only (no object file)
    #[arg(long)]
    binary: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let output = args.output.clone().unwrap_or_else(|| {
        let mut name = args.input.clone().into_os_string();
        name.push(".bin");
        PathBuf::from(name)
    });

    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read '{}'", args.input.display()))?;
    let sink = File::create(&output)
        .with_context(|| format!("failed to create '{}'", output.display()))?;

    if args.binary {
        assemble_binary(&source, sink)?;
    } else {
        assemble_object(&source, &args.input.to_string_lossy(), sink)?;
    }

    println!(
        "'{}' was assembled to '{}'",
        args.input.display(),
        output.display()
    );
    Ok(())
}

/// Raw mode: stream instruction bytes to the output in source order.
fn assemble_binary(source: &str, sink: File) -> Result<()> {
    let mut sink = BufWriter::new(sink);
    let mut codegen = CodeGen::new(source);
    while let Some((bytes, _)) = codegen.next()? {
        sink.write_all(&bytes)?;
    }
    sink.flush()?;
    Ok(())
}

/// ELF mode: partition instruction bytes by section, then emit one
/// executable section per name and one global symbol per label.
fn assemble_object(source: &str, filename: &str, sink: File) -> Result<()> {
    let mut codegen = CodeGen::new(source);

    // Per-section buffers, in order of first appearance.
    let mut sections: Vec<(String, Vec<u8>)> = Vec::new();
    while let Some((bytes, section)) = codegen.next()? {
        match sections.iter_mut().find(|(name, _)| *name == section) {
            Some((_, buf)) => buf.extend_from_slice(&bytes),
            None => sections.push((section, bytes)),
        }
    }

    let mut writer = elf::Writer::new(
        filename,
        elf::Header {
            endian: elf::ELFDATA2LSB,
            abi: elf::ELFOSABI_NONE,
            machine: elf::EM_X86_64,
            flags: 0,
        },
        BufWriter::new(sink),
    );

    for (name, code) in sections {
        writer.write_section(elf::Section {
            name,
            sh_type: elf::SHT_PROGBITS,
            flags: elf::SHF_EXECINSTR | elf::SHF_ALLOC,
            addralign: 16,
            code,
            ..elf::Section::default()
        });
    }

    for (name, info) in codegen.labels() {
        writer.write_symbol(elf::Symbol {
            name: name.clone(),
            sym_type: elf::STT_NOTYPE,
            bind: elf::STB_GLOBAL,
            shndx: writer
                .section_index(&info.section)
                .unwrap_or(elf::SHN_UNDEF),
            value: info.offset,
        });
    }

    writer.flush()?;
    Ok(())
}
