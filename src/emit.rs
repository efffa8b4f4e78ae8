//! Turns catalog forms into assembly source the reference toolchain can
//! assemble. Every identifier in a form is replaced the way a C preprocessor
//! would replace a macro: the mnemonic through the override table and each
//! operand field with its declared literal.
use super::catalog::{Catalog, Form};
use super::table::ArchitectureTable;
use super::*;

use lazy_static::lazy_static;
use regex::Regex;
use std::io::Write;

lazy_static! {
    static ref RE_IDENT: Regex = Regex::new(r"\b[[:alpha:]_][[:alnum:]_]*").unwrap();
}

pub struct Emitter<'a> {
    table: &'a ArchitectureTable,
}

impl<'a> Emitter<'a> {
    pub fn new(table: &'a ArchitectureTable) -> Emitter<'a> { Emitter { table } }

    /// One line of assembly for `form`, without indentation.
    pub fn render(&self, form: &Form) -> Result<String, Error> {
        let mut out = String::with_capacity(form.template.len() + 16);
        let mut last = 0;
        for (i, m) in RE_IDENT.find_iter(&form.template).enumerate() {
            out.push_str(&form.template[last..m.start()]);
            if i == 0 {
                // a trailing '.' isn't part of the identifier, so it survives the swap
                out.push_str(self.table.resolve_mnemonic(m.as_str()));
            } else {
                let decl = self.table.fields.get(m.as_str()).ok_or_else(|| {
                    table_err!(
                        ErrorKind::UndefinedField,
                        self.table.arch,
                        "field {} used by \"{}\" (catalog line {}) is not defined for {}",
                        m.as_str(),
                        form.template,
                        form.line,
                        self.table.arch
                    )
                })?;
                out.push_str(&decl.literal);
            }
            last = m.end();
        }
        out.push_str(&form.template[last..]);
        Ok(out)
    }

    /// Write a complete assembly file for the catalog. Returns the number of
    /// instruction lines written.
    pub fn emit<W: Write>(&self, catalog: &Catalog, out: &mut W) -> Result<usize, Error> {
        writeln!(out, ".text")?;
        let mut n = 0;
        for form in &catalog.forms {
            writeln!(out, "\t{}", self.render(form)?)?;
            n += 1;
        }
        Ok(n)
    }
}
