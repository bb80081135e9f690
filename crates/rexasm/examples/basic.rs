//! Basic assembly example — the one-shot API and the pull-based pipeline.
//!
//! Run with: `cargo run --example basic`

use rexasm::CodeGen;

fn main() {
    // --- One-shot assembly ---
    println!("1. One-shot assembly (mov ecx, 591; add rcx, rax):");
    let bytes = rexasm::assemble("mov ecx, 591\nadd rcx, rax").unwrap();
    print_hex("   ", &bytes);

    // --- Pulling chunks by hand ---
    println!("\n2. Pull-based pipeline with sections and labels:");
    let source = r"
entry:
    mov rax, 60
    mov rdi, 0
section .data
payload:
    mov ebx, 1
    add ebx, 200
";
    let mut cg = CodeGen::new(source);
    while let Some((bytes, section)) = cg.next().unwrap() {
        print!("   {:8}", section);
        print_hex(" ", &bytes);
    }

    println!("\n   Labels:");
    for (name, info) in cg.labels() {
        println!("   {}: {} + {:#X}", name, info.section, info.offset);
    }
}

fn print_hex(indent: &str, bytes: &[u8]) {
    print!("{}", indent);
    for byte in bytes {
        print!("{:02X} ", byte);
    }
    println!();
}
