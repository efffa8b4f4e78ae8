//! An architecture table pairs one field value table with one mnemonic
//! override table. Tables are built once, never mutated, and every
//! architecture gets its own instance, so a field name can never resolve
//! through some other architecture's declarations.
use super::alias::OverrideTable;
use super::catalog::Catalog;
use super::field::{FieldTable, FieldValue};
use super::unit::{parse_unit, Decl};
use super::*;

use lazy_static::lazy_static;
use std::collections::BTreeSet;

#[derive(Debug)]
pub struct ArchitectureTable {
    pub arch: Arch,
    pub fields: FieldTable,
    pub overrides: OverrideTable,
    /// non-fatal findings from loading (redeclarations, dead overrides, aliasing)
    diagnostics: Vec<Error>,
}

impl ArchitectureTable {
    /// Load a table from unit text. When a catalog is given the table is also
    /// checked against it; see [`ArchitectureTable::check_catalog`].
    pub fn load(arch: Arch, unit: &str, catalog: Option<&Catalog>) -> Result<ArchitectureTable, Error> {
        let mut field_decls = Vec::new();
        let mut alias_decls = Vec::new();
        for d in parse_unit(arch, unit)? {
            match d {
                Decl::Field(f) => field_decls.push(f),
                Decl::Alias(a) => alias_decls.push(a),
            }
        }
        let fields = FieldTable::build(arch, field_decls)?;
        let (overrides, diagnostics) = OverrideTable::build(arch, alias_decls);
        let mut table = ArchitectureTable {
            arch,
            fields,
            overrides,
            diagnostics,
        };
        if let Some(catalog) = catalog {
            let mut more = table.check_catalog(catalog)?;
            table.diagnostics.append(&mut more);
        }
        Ok(table)
    }
    pub fn load_from_file(arch: Arch, path: &str, catalog: Option<&Catalog>) -> Result<ArchitectureTable, Error> {
        let unit = std::fs::read_to_string(path)?;
        verbose_println!("Loading {} table from {}", arch, path);
        ArchitectureTable::load(arch, &unit, catalog)
    }
    pub fn resolve_field(&self, name: &str) -> Result<FieldValue, Error> { self.fields.resolve(name) }
    pub fn resolve_mnemonic<'a>(&'a self, name: &'a str) -> &'a str { self.overrides.resolve(name) }
    pub fn diagnostics(&self) -> &[Error] { &self.diagnostics }

    /// Cross-check the table with a catalog for the same architecture.
    ///
    /// A field the catalog uses but the table lacks is fatal. The returned
    /// warnings cover overrides no form uses and register operands of one
    /// form that land on the same register without a `shares=` note.
    pub fn check_catalog(&self, catalog: &Catalog) -> Result<Vec<Error>, Error> {
        if catalog.arch != self.arch {
            return Err(table_err!(
                ErrorKind::General,
                self.arch,
                "catalog is for {}, table is for {}",
                catalog.arch,
                self.arch
            ));
        }
        let mut warnings = Vec::new();
        let mut reported = BTreeSet::new();
        for form in &catalog.forms {
            let mut regs = Vec::new();
            for op in &form.operands {
                let decl = self.fields.get(op).ok_or_else(|| {
                    table_err!(
                        ErrorKind::UndefinedField,
                        self.arch,
                        "field {} used by \"{}\" (catalog line {}) is not defined for {}",
                        op,
                        form.template,
                        form.line,
                        self.arch
                    )
                })?;
                if decl.role.is_register() {
                    regs.push(decl);
                }
            }
            for (i, a) in regs.iter().enumerate() {
                for b in &regs[i + 1..] {
                    if a.name == b.name || a.bank != b.bank {
                        continue;
                    }
                    let (ra, rb) = (a.registers(), b.registers());
                    if ra.start >= rb.end || rb.start >= ra.end {
                        continue;
                    }
                    if a.documents_sharing_with(&b.name) || b.documents_sharing_with(&a.name) {
                        continue;
                    }
                    let key = if a.name < b.name {
                        (a.name.clone(), b.name.clone())
                    } else {
                        (b.name.clone(), a.name.clone())
                    };
                    if reported.insert(key) {
                        warnings.push(table_err!(
                            ErrorKind::OperandAlias,
                            self.arch,
                            "{} = {} and {} = {} overlap in \"{}\" (catalog line {})",
                            a.name,
                            a.literal,
                            b.name,
                            b.literal,
                            form.template,
                            form.line
                        ));
                    }
                }
            }
        }
        let used = catalog.mnemonics();
        for alias in self.overrides.iter() {
            if !used.contains(alias.source.as_str()) {
                warnings.push(table_err!(
                    ErrorKind::DeadOverride,
                    self.arch,
                    "override {} -> {} (line {}) is not used by any catalog form",
                    alias.source,
                    alias.target,
                    alias.line
                ));
            }
        }
        Ok(warnings)
    }
}

lazy_static! {
    static ref BUILTIN: Vec<(Arch, Result<ArchitectureTable, Error>)> = Arch::ALL
        .into_iter()
        .map(|arch| (arch, ArchitectureTable::load(arch, arch.builtin_unit(), None)))
        .collect();
}

/// The process-wide table compiled into the binary for `arch`. Built on first
/// use and shared read-only afterwards.
pub fn builtin(arch: Arch) -> Result<&'static ArchitectureTable, Error> {
    match BUILTIN.iter().find(|(a, _)| *a == arch) {
        Some((_, Ok(table))) => Ok(table),
        Some((_, Err(e))) => Err(e.clone()),
        None => Err(general_err!(format!("no built-in table for {}", arch))),
    }
}
