use std::fmt::Display;

/// MIPS/SPIM general-purpose registers used by the emitted code. Only the
/// subset the generator actually touches is modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    Zero,
    A0,
    A1,
    T0,
    T1,
    T2,
    T3,
    T4,
    S0,
    V0,
    Fp,
    Sp,
    Ra,
}

impl Display for Reg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Reg::Zero => "$zero",
            Reg::A0 => "$a0",
            Reg::A1 => "$a1",
            Reg::T0 => "$t0",
            Reg::T1 => "$t1",
            Reg::T2 => "$t2",
            Reg::T3 => "$t3",
            Reg::T4 => "$t4",
            Reg::S0 => "$s0",
            Reg::V0 => "$v0",
            Reg::Fp => "$fp",
            Reg::Sp => "$sp",
            Reg::Ra => "$ra",
        })
    }
}
