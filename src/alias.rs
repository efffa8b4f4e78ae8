//! Mnemonic overrides.
//!
//! The reference objdump always prints the most specific extended mnemonic it
//! knows for an encoding, and some of those are mnemonics our disassembler
//! deliberately doesn't support. An override swaps the mnemonic that gets
//! assembled for one whose decoded text we do expect (`label`), or borrows an
//! unrelated mnemonic purely because its operand layout produces a useful bit
//! pattern (`donor`). The kind is documentation; both resolve the same way.
//!
//! The table is hand maintained and append-only in practice, so declaring the
//! same source twice is allowed: the later declaration wins.
use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverrideKind {
    Label,
    Donor,
}
impl OverrideKind {
    pub fn from_keyword(kw: &str) -> Option<OverrideKind> {
        match kw {
            "label" => Some(OverrideKind::Label),
            "donor" => Some(OverrideKind::Donor),
            _ => None,
        }
    }
    pub fn keyword(&self) -> &'static str {
        match self {
            OverrideKind::Label => "label",
            OverrideKind::Donor => "donor",
        }
    }
}

/// One `alias` declaration from a table unit.
#[derive(Clone, Debug)]
pub struct MnemonicAlias {
    pub source: String,
    pub target: String,
    pub kind: OverrideKind,
    pub note: Option<String>,
    pub line: usize,
}
impl fmt::Display for MnemonicAlias {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:12} -> {:12} {}", self.source, self.target, self.kind.keyword())
    }
}

#[derive(Debug)]
pub struct OverrideTable {
    entries: Vec<MnemonicAlias>,
    index: HashMap<String, usize>,
}

impl OverrideTable {
    /// Builds the table with last-declaration-wins semantics. Redeclarations
    /// are returned as `Redeclared` notices so someone can confirm they are
    /// intended; they are never an error.
    pub fn build(arch: Arch, decls: Vec<MnemonicAlias>) -> (OverrideTable, Vec<Error>) {
        let mut entries: Vec<MnemonicAlias> = Vec::with_capacity(decls.len());
        let mut index = HashMap::new();
        let mut notices = Vec::new();
        for a in decls {
            match index.get(&a.source) {
                Some(&i) => {
                    let prev: &MnemonicAlias = &entries[i];
                    notices.push(table_err!(
                        ErrorKind::Redeclared,
                        arch,
                        "override {} redeclared on line {} (first on line {}, {} -> {}); using {}",
                        a.source,
                        a.line,
                        prev.line,
                        prev.source,
                        prev.target,
                        a.target
                    ));
                    entries[i] = a;
                }
                None => {
                    index.insert(a.source.clone(), entries.len());
                    entries.push(a);
                }
            }
        }
        (OverrideTable { entries, index }, notices)
    }
    pub fn get(&self, source: &str) -> Option<&MnemonicAlias> { self.index.get(source).map(|&i| &self.entries[i]) }
    /// The mnemonic to use in place of `source`; `source` itself when there is no override.
    pub fn resolve<'a>(&'a self, source: &'a str) -> &'a str {
        self.get(source).map_or(source, |a| a.target.as_str())
    }
    pub fn iter(&self) -> impl Iterator<Item = &MnemonicAlias> { self.entries.iter() }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}
