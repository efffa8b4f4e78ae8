//! The instruction-set families we build golden tests for. Each one owns a
//! separate table unit; nothing is shared between them.
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, clap::ValueEnum)]
pub enum Arch {
    /// Power ISA 3.1 (power10), big endian objdump output
    #[value(name = "ppc64")]
    Ppc64,
    /// z/Architecture (z16)
    #[value(name = "s390x")]
    S390x,
}

const PPC64_UNIT: &str = include_str!("../tables/ppc64.tbl");
const S390X_UNIT: &str = include_str!("../tables/s390x.tbl");

impl Arch {
    pub const ALL: [Arch; 2] = [Arch::Ppc64, Arch::S390x];

    pub fn name(&self) -> &'static str {
        match self {
            Arch::Ppc64 => "ppc64",
            Arch::S390x => "s390x",
        }
    }
    /// The table unit compiled into the binary.
    pub fn builtin_unit(&self) -> &'static str {
        match self {
            Arch::Ppc64 => PPC64_UNIT,
            Arch::S390x => S390X_UNIT,
        }
    }
    pub fn from_name(name: &str) -> Option<Arch> { Arch::ALL.into_iter().find(|a| a.name() == name) }
    /// Prefixed (two word) instructions only exist on ppc64.
    pub fn has_prefixed_forms(&self) -> bool { matches!(self, Arch::Ppc64) }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{}", self.name()) }
}
