use std::fmt::Display;

use super::reg::Reg;

/// A single MIPS/SPIM instruction. Kept small and flat, the way the
/// x86-64 instruction set this generator's idiom is borrowed from models
/// its own ISA: one variant per mnemonic, `Display` renders the line.
#[derive(Debug, Clone)]
pub enum Instruction {
    Comment(String),
    Label(String),
    La(Reg, String),
    Li(Reg, i32),
    Move(Reg, Reg),
    Lw(Reg, i32, Reg),
    Sw(Reg, i32, Reg),
    Add(Reg, Reg, Reg),
    Sub(Reg, Reg, Reg),
    Mul(Reg, Reg, Reg),
    Div(Reg, Reg, Reg),
    Not(Reg, Reg),
    Addiu(Reg, Reg, i32),
    Beq(Reg, Reg, String),
    Bne(Reg, Reg, String),
    J(String),
    Jal(String),
    Jalr(Reg),
    Jr(Reg),
    /// Escape hatch for the handful of lines (section headers, `.word`
    /// directives, raw data) that don't fit the mnemonic variants above.
    Raw(String),
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let line = match self {
            Instruction::Comment(text) => format!("\t# {text}"),
            Instruction::Label(name) => format!("{name}:"),
            Instruction::La(dst, label) => format!("\tla\t{dst}, {label}"),
            Instruction::Li(dst, value) => format!("\tli\t{dst}, {value}"),
            Instruction::Move(dst, src) => format!("\tmove\t{dst}, {src}"),
            Instruction::Lw(dst, offset, base) => format!("\tlw\t{dst}, {offset}({base})"),
            Instruction::Sw(src, offset, base) => format!("\tsw\t{src}, {offset}({base})"),
            Instruction::Add(dst, lhs, rhs) => format!("\tadd\t{dst}, {lhs}, {rhs}"),
            Instruction::Sub(dst, lhs, rhs) => format!("\tsub\t{dst}, {lhs}, {rhs}"),
            Instruction::Mul(dst, lhs, rhs) => format!("\tmul\t{dst}, {lhs}, {rhs}"),
            Instruction::Div(dst, lhs, rhs) => format!("\tdiv\t{dst}, {lhs}, {rhs}"),
            Instruction::Not(dst, src) => format!("\tnot\t{dst}, {src}"),
            Instruction::Addiu(dst, src, imm) => format!("\taddiu\t{dst}, {src}, {imm}"),
            Instruction::Beq(lhs, rhs, label) => format!("\tbeq\t{lhs}, {rhs}, {label}"),
            Instruction::Bne(lhs, rhs, label) => format!("\tbne\t{lhs}, {rhs}, {label}"),
            Instruction::J(label) => format!("\tj\t{label}"),
            Instruction::Jal(label) => format!("\tjal\t{label}"),
            Instruction::Jalr(reg) => format!("\tjalr\t{reg}"),
            Instruction::Jr(reg) => format!("\tjr\t{reg}"),
            Instruction::Raw(text) => text.clone(),
        };
        f.write_str(&line)
    }
}
