//! Round-trip tests: parse the writer's output with the `object` crate and
//! check that sections and symbols survive intact.

use object::{Object, ObjectSection, ObjectSymbol, SectionFlags};
use rexasm::elf::{self, Header, Section, Symbol, Writer};
use rexasm::CodeGen;

fn x86_header() -> Header {
    Header {
        endian: elf::ELFDATA2LSB,
        abi: elf::ELFOSABI_NONE,
        machine: elf::EM_X86_64,
        flags: 0,
    }
}

fn progbits(name: &str, flags: u64, addralign: u64, code: Vec<u8>) -> Section {
    Section {
        name: name.into(),
        sh_type: elf::SHT_PROGBITS,
        flags,
        addralign,
        code,
        ..Section::default()
    }
}

#[test]
fn empty_object_parses() {
    let mut out = Vec::new();
    Writer::new("test.S", x86_header(), &mut out).flush().unwrap();

    let file = object::File::parse(&out[..]).unwrap();
    assert_eq!(file.format(), object::BinaryFormat::Elf);
    assert!(file.is_little_endian());
    assert!(file.is_64());
}

#[test]
fn single_text_section_round_trips() {
    let code = vec![0x48, 0xC7, 0xC0, 0xFF, 0xFF, 0x00, 0x00];
    let mut out = Vec::new();
    let mut writer = Writer::new("test.S", x86_header(), &mut out);
    writer.write_section(progbits(
        ".text",
        elf::SHF_EXECINSTR | elf::SHF_ALLOC,
        16,
        code.clone(),
    ));
    writer.flush().unwrap();

    let file = object::File::parse(&out[..]).unwrap();
    let text = file.section_by_name(".text").expect("no .text section");
    match text.flags() {
        SectionFlags::Elf { sh_flags } => {
            assert_eq!(sh_flags, elf::SHF_EXECINSTR | elf::SHF_ALLOC);
        }
        other => panic!("unexpected section flags: {:?}", other),
    }
    assert_eq!(text.align(), 16);
    assert_eq!(text.data().unwrap(), &code[..]);
}

#[test]
fn multiple_sections_round_trip() {
    let mut out = Vec::new();
    let mut writer = Writer::new("test.S", x86_header(), &mut out);
    writer.write_section(progbits(
        ".text",
        elf::SHF_EXECINSTR | elf::SHF_ALLOC,
        16,
        vec![0x48, 0xC7, 0xC0, 0xFF, 0xFF, 0x00, 0x00],
    ));
    writer.write_section(progbits(".rodata", elf::SHF_ALLOC, 4, vec![0xFF]));
    writer.write_section(progbits(
        ".data",
        elf::SHF_WRITE | elf::SHF_ALLOC,
        4,
        vec![0xAA],
    ));
    writer.flush().unwrap();

    let file = object::File::parse(&out[..]).unwrap();
    assert_eq!(
        file.section_by_name(".rodata").unwrap().data().unwrap(),
        &[0xFF]
    );
    assert_eq!(
        file.section_by_name(".data").unwrap().data().unwrap(),
        &[0xAA]
    );
    match file.section_by_name(".data").unwrap().flags() {
        SectionFlags::Elf { sh_flags } => {
            assert_eq!(sh_flags, elf::SHF_WRITE | elf::SHF_ALLOC);
        }
        other => panic!("unexpected section flags: {:?}", other),
    }
}

#[test]
fn symbols_round_trip_with_section_and_value() {
    let mut out = Vec::new();
    let mut writer = Writer::new("test.S", x86_header(), &mut out);
    writer.write_section(progbits(
        ".text",
        elf::SHF_EXECINSTR | elf::SHF_ALLOC,
        16,
        vec![0x90; 8],
    ));
    writer.write_symbol(Symbol {
        name: "start".into(),
        sym_type: elf::STT_NOTYPE,
        bind: elf::STB_GLOBAL,
        shndx: 1,
        value: 0,
    });
    writer.write_symbol(Symbol {
        name: "middle".into(),
        sym_type: elf::STT_NOTYPE,
        bind: elf::STB_GLOBAL,
        shndx: 1,
        value: 4,
    });
    writer.flush().unwrap();

    let file = object::File::parse(&out[..]).unwrap();

    let start = file
        .symbols()
        .find(|sym| sym.name() == Ok("start"))
        .expect("no 'start' symbol");
    assert_eq!(start.address(), 0);
    assert!(start.is_global());

    let middle = file
        .symbols()
        .find(|sym| sym.name() == Ok("middle"))
        .expect("no 'middle' symbol");
    assert_eq!(middle.address(), 4);
    let section_index = middle.section_index().expect("symbol has no section");
    let section = file.section_by_index(section_index).unwrap();
    assert_eq!(section.name(), Ok(".text"));
}

#[test]
fn file_symbol_is_recorded() {
    let mut out = Vec::new();
    Writer::new("prog.S", x86_header(), &mut out)
        .flush()
        .unwrap();

    let file = object::File::parse(&out[..]).unwrap();
    assert!(
        file.symbols().any(|sym| sym.name() == Ok("prog.S")),
        "missing STT_FILE symbol"
    );
}

#[test]
fn locals_precede_globals() {
    let mut out = Vec::new();
    let mut writer = Writer::new("test.S", x86_header(), &mut out);
    writer.write_section(progbits(
        ".text",
        elf::SHF_EXECINSTR | elf::SHF_ALLOC,
        16,
        vec![0x90],
    ));
    // Interleave: global first, then rely on the flush sort.
    writer.write_symbol(Symbol {
        name: "g1".into(),
        sym_type: elf::STT_NOTYPE,
        bind: elf::STB_GLOBAL,
        shndx: 1,
        value: 0,
    });
    writer.write_section(progbits(".data", elf::SHF_WRITE | elf::SHF_ALLOC, 4, vec![0]));
    writer.write_symbol(Symbol {
        name: "g2".into(),
        sym_type: elf::STT_NOTYPE,
        bind: elf::STB_GLOBAL,
        shndx: 2,
        value: 0,
    });
    writer.flush().unwrap();

    // Read the raw .symtab header: sh_info must equal the number of
    // leading local symbols.
    let shnum = u16::from_le_bytes([out[60], out[61]]) as usize;
    let mut checked = false;
    for i in 1..shnum {
        let hdr = 64 + i * 64;
        let sh_type = u32::from_le_bytes(out[hdr + 4..hdr + 8].try_into().unwrap());
        if sh_type != elf::SHT_SYMTAB {
            continue;
        }
        let sh_info = u32::from_le_bytes(out[hdr + 44..hdr + 48].try_into().unwrap());
        let sh_offset =
            u64::from_le_bytes(out[hdr + 24..hdr + 32].try_into().unwrap()) as usize;
        let sh_size = u64::from_le_bytes(out[hdr + 32..hdr + 40].try_into().unwrap()) as usize;
        let count = sh_size / elf::SYMBOL_SIZE as usize;

        // Null + file + two section symbols are local; the two globals
        // come last.
        assert_eq!(sh_info, 4);
        assert_eq!(count, 6);

        for (index, entry) in out[sh_offset..sh_offset + sh_size]
            .chunks(elf::SYMBOL_SIZE as usize)
            .enumerate()
        {
            let bind = entry[4] >> 4;
            if (index as u32) < sh_info {
                assert_eq!(bind, elf::STB_LOCAL, "symbol {}", index);
            } else {
                assert_eq!(bind, elf::STB_GLOBAL, "symbol {}", index);
            }
        }
        checked = true;
    }
    assert!(checked, "no .symtab section found");
}

/// Full pipeline: assemble a program, drive the writer the way the CLI
/// does, and look every label up by name in the parsed object.
#[test]
fn assembled_labels_match_object_symbols() {
    let src = "\
main:
mov rax, 60
section .data
greeting:
mov ebx, 2
add ebx, 200
trailer:
section .text
mov edi, 0
";
    let mut cg = CodeGen::new(src);
    let mut sections: Vec<(String, Vec<u8>)> = Vec::new();
    while let Some((bytes, section)) = cg.next().unwrap() {
        match sections.iter_mut().find(|(name, _)| *name == section) {
            Some((_, buf)) => buf.extend_from_slice(&bytes),
            None => sections.push((section, bytes)),
        }
    }

    let mut out = Vec::new();
    let mut writer = Writer::new("roundtrip.S", x86_header(), &mut out);
    for (name, code) in sections {
        writer.write_section(progbits(
            &name,
            elf::SHF_EXECINSTR | elf::SHF_ALLOC,
            16,
            code,
        ));
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
    writer.flush().unwrap();

    let file = object::File::parse(&out[..]).unwrap();
    for (name, info) in cg.labels() {
        let sym = file
            .symbols()
            .find(|sym| sym.name() == Ok(name.as_str()))
            .unwrap_or_else(|| panic!("label '{}' missing from object", name));
        assert_eq!(sym.address(), info.offset, "label '{}'", name);
        let section = file.section_by_index(sym.section_index().unwrap()).unwrap();
        assert_eq!(section.name(), Ok(info.section.as_str()), "label '{}'", name);
    }
}
