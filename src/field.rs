//! Field values. Every operand slot named in the instruction-format catalog
//! resolves to exactly one declared value per architecture. The values are not
//! arbitrary: register operands get small distinct numbers so aliasing bugs
//! show up in a diff, pair bases are even, bit ranges stay away from 0 and the
//! maximum, and prefixed immediates have halves that can't be confused.
use super::*;
use std::ops::Range;

/// What kind of operand slot a field is. The role decides which extra
/// constraints apply to its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Reg,
    RegPair,
    Imm,
    Disp,
    Bits,
    Mask,
    Shift,
    Cond,
    Level,
    PrefixImm,
}
impl Role {
    pub fn from_keyword(kw: &str) -> Option<Role> {
        Some(match kw {
            "reg" => Role::Reg,
            "reg-pair" => Role::RegPair,
            "imm" => Role::Imm,
            "disp" => Role::Disp,
            "bits" => Role::Bits,
            "mask" => Role::Mask,
            "shift" => Role::Shift,
            "cond" => Role::Cond,
            "level" => Role::Level,
            "prefix-imm" => Role::PrefixImm,
            _ => return None,
        })
    }
    pub fn keyword(&self) -> &'static str {
        match self {
            Role::Reg => "reg",
            Role::RegPair => "reg-pair",
            Role::Imm => "imm",
            Role::Disp => "disp",
            Role::Bits => "bits",
            Role::Mask => "mask",
            Role::Shift => "shift",
            Role::Cond => "cond",
            Role::Level => "level",
            Role::PrefixImm => "prefix-imm",
        }
    }
    pub fn is_register(&self) -> bool { matches!(self, Role::Reg | Role::RegPair) }
    /// number of consecutive registers named by a register operand
    pub fn span(&self) -> i64 {
        match self {
            Role::RegPair => 2,
            _ => 1,
        }
    }
}

/// Bit-width domain of a field, written `u5` or `s16` in a table unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Domain {
    pub bits: u8,
    pub signed: bool,
}
impl Domain {
    pub fn parse(s: &str) -> Option<Domain> {
        let (sign, width) = s.split_at(1);
        let signed = match sign {
            "u" => false,
            "s" => true,
            _ => return None,
        };
        let bits = width.parse::<u8>().ok()?;
        if bits == 0 || bits > 64 {
            return None;
        }
        Some(Domain { bits, signed })
    }
    pub fn min(&self) -> i128 { if self.signed { -(1i128 << (self.bits - 1)) } else { 0 } }
    pub fn max(&self) -> i128 {
        if self.signed {
            (1i128 << (self.bits - 1)) - 1
        } else {
            (1i128 << self.bits) - 1
        }
    }
    pub fn contains(&self, v: i64) -> bool { (self.min()..=self.max()).contains(&(v as i128)) }
}
impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", if self.signed { 's' } else { 'u' }, self.bits)
    }
}

/// Why a value was picked. Documentation only, never consulted when resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Rationale {
    #[default]
    Representative,
    Boundary,
    Disambiguating,
}
impl Rationale {
    pub fn from_keyword(kw: &str) -> Option<Rationale> {
        match kw {
            "representative" => Some(Rationale::Representative),
            "boundary" => Some(Rationale::Boundary),
            "disambiguating" => Some(Rationale::Disambiguating),
            _ => None,
        }
    }
    pub fn keyword(&self) -> &'static str {
        match self {
            Rationale::Representative => "representative",
            Rationale::Boundary => "boundary",
            Rationale::Disambiguating => "disambiguating",
        }
    }
}

/// Register file a register operand indexes. Operands in different banks
/// can never alias each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, PartialOrd, Ord)]
pub enum Bank {
    #[default]
    Gpr,
    Fpr,
    Vr,
    Vsr,
    Acc,
    Ar,
    Cr,
}
impl Bank {
    pub fn from_keyword(kw: &str) -> Option<Bank> {
        match kw {
            "gpr" => Some(Bank::Gpr),
            "fpr" => Some(Bank::Fpr),
            "vr" => Some(Bank::Vr),
            "vsr" => Some(Bank::Vsr),
            "acc" => Some(Bank::Acc),
            "ar" => Some(Bank::Ar),
            "cr" => Some(Bank::Cr),
            _ => None,
        }
    }
    pub fn keyword(&self) -> &'static str {
        match self {
            Bank::Gpr => "gpr",
            Bank::Fpr => "fpr",
            Bank::Vr => "vr",
            Bank::Vsr => "vsr",
            Bank::Acc => "acc",
            Bank::Ar => "ar",
            Bank::Cr => "cr",
        }
    }
}

/// A resolved field value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Single(i64),
    /// (prefix word half, suffix word half) of a prefixed immediate
    Halves(i64, i64),
}
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldValue::Single(v) => write!(f, "{}", v),
            FieldValue::Halves(hi, lo) => write!(f, "{:#x}:{:#06x}", hi, lo),
        }
    }
}

/// Width of the suffix-word half of a prefixed immediate.
pub const SUFFIX_HALF_BITS: u8 = 16;

/// One `field` declaration from a table unit.
#[derive(Clone, Debug)]
pub struct FieldDecl {
    pub name: String,
    pub value: i64,
    /// the value exactly as written; this is what ends up in assembly source
    pub literal: String,
    pub role: Role,
    pub domain: Domain,
    pub rationale: Rationale,
    pub bank: Bank,
    /// fields this one is documented to share registers with
    pub shares: Vec<String>,
    /// deliberately outside the usual constraints
    pub edge: bool,
    pub note: Option<String>,
    pub line: usize,
}

impl FieldDecl {
    pub fn resolved(&self) -> FieldValue {
        match self.role {
            Role::PrefixImm => {
                let hi_bits = self.domain.bits.saturating_sub(SUFFIX_HALF_BITS);
                let lo = self.value & 0xffff;
                let hi = (self.value >> SUFFIX_HALF_BITS) & ((1i64 << hi_bits) - 1);
                FieldValue::Halves(hi, lo)
            }
            _ => FieldValue::Single(self.value),
        }
    }
    /// Registers covered by a register operand; empty for everything else.
    pub fn registers(&self) -> Range<i64> {
        if self.role.is_register() {
            self.value..self.value.saturating_add(self.role.span())
        } else {
            0..0
        }
    }
    pub fn documents_sharing_with(&self, other: &str) -> bool { self.shares.iter().any(|s| s == other) }

    /// Check the value against its role and domain.
    pub fn validate(&self, arch: Arch) -> Result<(), Error> {
        let bad = |why: String| {
            table_err!(
                ErrorKind::InvalidValue,
                arch,
                "line {}: field {} = {} {}",
                self.line,
                self.name,
                self.literal,
                why
            )
        };
        if self.edge {
            // edge values must say why they break the rules
            return match self.note {
                Some(ref n) if !n.trim().is_empty() => Ok(()),
                _ => Err(bad("is marked edge but has no rationale".to_string())),
            };
        }
        if !self.domain.contains(self.value) {
            return Err(bad(format!(
                "is outside {} [{}, {}]",
                self.domain,
                self.domain.min(),
                self.domain.max()
            )));
        }
        match self.role {
            Role::Reg | Role::RegPair if self.domain.signed => {
                Err(bad("is a register but has a signed domain".to_string()))
            }
            Role::RegPair if self.value % 2 != 0 => {
                Err(bad("is the base of a register pair and must be even".to_string()))
            }
            Role::RegPair if self.value as i128 + 1 > self.domain.max() => {
                Err(bad("leaves no room for the second register of the pair".to_string()))
            }
            Role::Bits | Role::Shift if self.value == 0 || self.value as i128 == self.domain.max() => Err(bad(
                format!("must lie strictly inside (0, {})", self.domain.max()),
            )),
            Role::PrefixImm if self.domain.bits <= SUFFIX_HALF_BITS => Err(bad(format!(
                "needs a domain wider than {} bits to split across two words",
                SUFFIX_HALF_BITS
            ))),
            Role::PrefixImm => match self.resolved() {
                FieldValue::Halves(hi, lo) if hi == lo => Err(bad(format!(
                    "has identical halves ({:#x}); a swapped word would go unnoticed",
                    hi
                ))),
                _ => Ok(()),
            },
            _ => Ok(()),
        }
    }
}

impl fmt::Display for FieldDecl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:12} = {:20} {:10} {:4} {}",
            self.name,
            self.literal,
            self.role.keyword(),
            self.domain,
            self.rationale.keyword()
        )?;
        if self.role.is_register() && self.bank != Bank::Gpr {
            write!(f, " bank={}", self.bank.keyword())?;
        }
        if !self.shares.is_empty() {
            write!(f, " shares={}", self.shares.join(","))?;
        }
        if self.edge {
            write!(f, " edge")?;
        }
        Ok(())
    }
}

/// Field Value Table of one architecture. Declaration order is kept so that
/// listings are stable from run to run.
#[derive(Debug)]
pub struct FieldTable {
    arch: Arch,
    decls: Vec<FieldDecl>,
    index: HashMap<String, usize>,
}

impl FieldTable {
    /// Builds the table, rejecting duplicate names and invalid values.
    pub fn build(arch: Arch, decls: Vec<FieldDecl>) -> Result<FieldTable, Error> {
        let mut index = HashMap::new();
        for (i, d) in decls.iter().enumerate() {
            if let Some(&first) = index.get(&d.name) {
                let first: &FieldDecl = &decls[first];
                return Err(table_err!(
                    ErrorKind::DuplicateField,
                    arch,
                    "field {} declared on line {} and again on line {}",
                    d.name,
                    first.line,
                    d.line
                ));
            }
            d.validate(arch)?;
            index.insert(d.name.clone(), i);
        }
        Ok(FieldTable { arch, decls, index })
    }
    pub fn get(&self, name: &str) -> Option<&FieldDecl> { self.index.get(name).map(|&i| &self.decls[i]) }
    pub fn resolve(&self, name: &str) -> Result<FieldValue, Error> {
        self.get(name).map(FieldDecl::resolved).ok_or_else(|| {
            table_err!(
                ErrorKind::UndefinedField,
                self.arch,
                "field {} is not defined for {}",
                name,
                self.arch
            )
        })
    }
    pub fn iter(&self) -> impl Iterator<Item = &FieldDecl> { self.decls.iter() }
    pub fn len(&self) -> usize { self.decls.len() }
    pub fn is_empty(&self) -> bool { self.decls.is_empty() }
    /// every field whose single value (or either prefixed half) equals `v`
    pub fn find_value(&self, v: i64) -> Vec<&FieldDecl> {
        self.decls
            .iter()
            .filter(|d| {
                d.value == v
                    || match d.resolved() {
                        FieldValue::Halves(hi, lo) => hi == v || lo == v,
                        FieldValue::Single(_) => false,
                    }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(name: &str, value: i64, role: Role, domain: &str) -> FieldDecl {
        FieldDecl {
            name: name.to_string(),
            value,
            literal: value.to_string(),
            role,
            domain: Domain::parse(domain).unwrap(),
            rationale: Rationale::default(),
            bank: Bank::default(),
            shares: vec![],
            edge: false,
            note: None,
            line: 1,
        }
    }

    #[test]
    fn domains() {
        let u5 = Domain::parse("u5").unwrap();
        assert_eq!((u5.min(), u5.max()), (0, 31));
        assert!(u5.contains(31) && !u5.contains(32) && !u5.contains(-1));
        let s34 = Domain::parse("s34").unwrap();
        assert!(s34.contains(-8589869049));
        assert!(!s34.contains(1 << 33));
        let u64d = Domain::parse("u64").unwrap();
        assert!(u64d.contains(i64::MAX));
        assert!(Domain::parse("x5").is_none());
        assert!(Domain::parse("u0").is_none());
        assert!(Domain::parse("s65").is_none());
    }

    #[test]
    fn prefixed_halves_are_distinct() {
        // 0xFFFFFFFE00010007 read as two's complement, 34-bit signed immediate
        let mut si = decl("SIpfx", 0xFFFF_FFFE_0001_0007u64 as i64, Role::PrefixImm, "s34");
        si.literal = "0xFFFFFFFE00010007".to_string();
        assert_eq!(si.resolved(), FieldValue::Halves(0x20001, 0x0007));
        assert!(si.validate(Arch::Ppc64).is_ok());

        let imm32 = decl("IMM32", 0x1234567, Role::PrefixImm, "u32");
        assert_eq!(imm32.resolved(), FieldValue::Halves(0x0123, 0x4567));

        let same = decl("P", 0x0005_0005, Role::PrefixImm, "u32");
        let e = same.validate(Arch::Ppc64).unwrap_err();
        assert_eq!(e.kind, ErrorKind::InvalidValue);
    }

    #[test]
    fn role_constraints() {
        assert!(decl("RTp", 8, Role::RegPair, "u5").validate(Arch::Ppc64).is_ok());
        assert!(decl("RTp", 7, Role::RegPair, "u5").validate(Arch::Ppc64).is_err());
        assert!(decl("RTp", 31, Role::RegPair, "u5").validate(Arch::Ppc64).is_err());
        assert!(decl("RA", 32, Role::Reg, "u5").validate(Arch::Ppc64).is_err());
        assert!(decl("MB", 0, Role::Bits, "u5").validate(Arch::Ppc64).is_err());
        assert!(decl("MB", 31, Role::Bits, "u5").validate(Arch::Ppc64).is_err());
        assert!(decl("SH", 7, Role::Shift, "u5").validate(Arch::Ppc64).is_ok());
        assert!(decl("offset", -128, Role::Disp, "s10").validate(Arch::Ppc64).is_ok());

        let mut w = decl("W", 2, Role::Imm, "u1");
        assert!(w.validate(Arch::Ppc64).is_err());
        w.edge = true;
        assert!(w.validate(Arch::Ppc64).is_err(), "edge needs a rationale");
        w.note = Some("out of range on purpose".to_string());
        assert!(w.validate(Arch::Ppc64).is_ok());
    }

    #[test]
    fn duplicate_and_undefined() {
        let decls = vec![decl("RA", 1, Role::Reg, "u5"), decl("RA", 2, Role::Reg, "u5")];
        let e = FieldTable::build(Arch::Ppc64, decls).unwrap_err();
        assert_eq!(e.kind, ErrorKind::DuplicateField);
        assert!(e.msg.contains("RA"));

        let t = FieldTable::build(Arch::S390x, vec![decl("R1", 8, Role::RegPair, "u4")]).unwrap();
        assert_eq!(t.resolve("R1").unwrap(), FieldValue::Single(8));
        let e = t.resolve("R9").unwrap_err();
        assert_eq!(e.kind, ErrorKind::UndefinedField);
        assert_eq!(e.arch, Some(Arch::S390x));
        assert!(e.msg.contains("R9") && e.msg.contains("s390x"));
    }

    #[test]
    fn edge_register_at_the_top_of_i64() {
        let mut r = decl("RZ", i64::MAX, Role::RegPair, "u5");
        r.edge = true;
        r.note = Some("never assembled".to_string());
        assert!(r.validate(Arch::Ppc64).is_ok());
        assert_eq!(r.registers(), i64::MAX..i64::MAX);
        assert_eq!(decl("RTp", 8, Role::RegPair, "u5").registers(), 8..10);
        assert!(decl("D", 0x80, Role::Disp, "s16").registers().is_empty());
    }

    #[test]
    fn find_by_value() {
        let t = FieldTable::build(
            Arch::Ppc64,
            vec![
                decl("RA", 1, Role::Reg, "u5"),
                decl("CY", 1, Role::Imm, "u2"),
                decl("IMM32", 0x1234567, Role::PrefixImm, "u32"),
            ],
        )
        .unwrap();
        let names: Vec<_> = t.find_value(1).iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["RA", "CY"]);
        assert_eq!(t.find_value(0x4567).len(), 1);
    }
}
