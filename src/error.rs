use crate::arch::Arch;
use std::{convert::From, fmt};

/// Simple custom Error for the golden table project
#[derive(Clone)]
pub struct Error {
    pub kind: ErrorKind,
    pub arch: Option<Arch>,
    pub msg: String,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    /// the catalog names a field the table does not declare
    UndefinedField,
    /// a field is declared twice in one architecture
    DuplicateField,
    /// an override whose source mnemonic no catalog form uses (warning)
    DeadOverride,
    /// field values collide with an untested extended mnemonic; only ever seen
    /// as a golden diff mismatch downstream, never raised here
    AmbiguousEncoding,
    /// a declared value violates its role or domain
    InvalidValue,
    /// two register operands of one form share a register (warning)
    OperandAlias,
    /// an override source declared more than once (notice)
    Redeclared,
    /// malformed table unit
    Syntax,
    /// malformed instruction-format catalog
    Catalog,
    /// underlying io error
    IO,
    /// catch-all for other errors
    General,
}

impl ErrorKind {
    /// Fatal kinds block generation; the others are only reported.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ErrorKind::DeadOverride | ErrorKind::OperandAlias | ErrorKind::Redeclared
        )
    }
}

impl Error {
    pub fn new(kind: ErrorKind, arch: Option<Arch>, message: &str) -> Error {
        Error {
            kind,
            arch,
            msg: String::from(message),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self { Error::new(ErrorKind::IO, None, e.to_string().as_str()) }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {:?}: {}", red!("golden::Error"), self.kind, self.msg)
    }
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.arch {
            Some(arch) => write!(f, "[{}] {}", arch, self.msg),
            None => write!(f, "{}", self.msg),
        }
    }
}
impl std::error::Error for Error {}
