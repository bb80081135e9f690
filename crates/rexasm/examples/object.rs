//! Write a relocatable ELF64 object — the same wiring the CLI uses.
//!
//! Run with: `cargo run --example object` and inspect the result with
//! `readelf -a demo.o`.

use std::fs::File;

use rexasm::elf::{self, Header, Section, Symbol, Writer};
use rexasm::CodeGen;

fn main() -> std::io::Result<()> {
    let source = r"
main:
    mov rax, 60
    mov rdi, 0
section .data
table:
    mov ebx, 1
";

    let mut cg = CodeGen::new(source);
    let mut sections: Vec<(String, Vec<u8>)> = Vec::new();
    while let Some((bytes, section)) = cg.next().expect("assembly failed") {
        match sections.iter_mut().find(|(name, _)| *name == section) {
            Some((_, buf)) => buf.extend_from_slice(&bytes),
            None => sections.push((section, bytes)),
        }
    }

    let mut writer = Writer::new(
        "demo.S",
        Header {
            endian: elf::ELFDATA2LSB,
            abi: elf::ELFOSABI_NONE,
            machine: elf::EM_X86_64,
            flags: 0,
        },
        File::create("demo.o")?,
    );

    for (name, code) in sections {
        writer.write_section(Section {
            name,
            sh_type: elf::SHT_PROGBITS,
            flags: elf::SHF_EXECINSTR | elf::SHF_ALLOC,
            addralign: 16,
            code,
            ..Section::default()
        });
    }

    for (name, info) in cg.labels() {
        writer.write_symbol(Symbol {
            name: name.clone(),
            sym_type: elf::STT_NOTYPE,
            bind: elf::STB_GLOBAL,
            shndx: writer.section_index(&info.section).unwrap(),
            value: info.offset,
        });
    }

    writer.flush()?;
    println!("wrote demo.o");
    Ok(())
}
