//! # Operand tables for ppc64 and s390x disassembler golden tests
//!
//! The golden tests compare our disassembler with objdump on one instance
//! of every instruction form in the architecture's catalog. This program
//! owns the part of that pipeline that needs judgement: which value each
//! operand field gets, and which mnemonics must be assembled as something
//! else because objdump would print an extended mnemonic we don't support.
//!
//! ## Getting Started
//! Check the built-in ppc64 table against the catalog and write the
//! assembly source:
//! ```text
//! cargo run -- ppc64 --catalog pp64.csv --emit --output asm.S
//! ```
//! ...then assemble and disassemble it with the reference toolchain:
//! ```text
//! powerpc64le-linux-gnu-gcc -c asm.S -mcpu=power10 -mbig
//! powerpc64le-linux-gnu-objdump -d asm.o
//! ```
//! ## Options
//! Help for command line options is available using -h or --help.
#[macro_use]
mod macros;
mod alias;
mod arch;
mod catalog;
mod config;
mod emit;
mod error;
mod field;
mod table;
mod unit;
use crate::catalog::Catalog;
use crate::emit::Emitter;
use crate::table::ArchitectureTable;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::result::Result;
pub(crate) use {crate::arch::Arch, crate::error::*};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    config::init();
    if let Err(e) = process(&config::ARGS, &mut std::io::stdout().lock()) {
        println!("{}", e);
        return Err(Box::new(e));
    }
    Ok(())
}

/// Print findings. Returns an error if any of them should block generation
/// under the current policy.
fn report(diags: &[Error], strict: bool) -> Result<(), Error> {
    for d in diags {
        match d.kind {
            ErrorKind::Redeclared => notice!("{}", d),
            _ => warn!("{}", d),
        }
    }
    let blocking = diags
        .iter()
        .find(|d| d.kind.is_fatal() || (strict && d.kind == ErrorKind::DeadOverride));
    match blocking {
        Some(d) if !d.kind.is_fatal() => Err(Error::new(d.kind, d.arch, &format!("--strict: {}", d.msg))),
        Some(d) => Err(d.clone()),
        None => Ok(()),
    }
}

/// process drives the top level functionality (load, check, resolve, emit) of the app.
/// Query answers and listings go to `out`; emitted assembly goes to its own file.
fn process<W: Write>(args: &config::Args, out: &mut W) -> Result<(), Error> {
    let arch = args.arch;
    let catalog = match &args.catalog {
        Some(path) => Some(Catalog::read_from_file(arch, path)?),
        None => None,
    };
    let owned;
    let table: &ArchitectureTable = match &args.table {
        Some(path) => {
            owned = ArchitectureTable::load_from_file(arch, path, catalog.as_ref())?;
            report(owned.diagnostics(), args.strict)?;
            &owned
        }
        None => {
            let t = table::builtin(arch)?;
            report(t.diagnostics(), args.strict)?;
            if let Some(catalog) = catalog.as_ref() {
                report(&t.check_catalog(catalog)?, args.strict)?;
            }
            t
        }
    };
    verbose_println!(
        "{} table: {} fields, {} overrides",
        arch,
        table.fields.len(),
        table.overrides.len()
    );
    if let Some(catalog) = catalog.as_ref() {
        info!(
            "{} catalog forms check out against the {} table",
            catalog.forms.len(),
            arch
        );
    }
    for name in &args.field {
        writeln!(out, "{} = {}", name, table.resolve_field(name)?)?;
    }
    for name in &args.mnemonic {
        writeln!(out, "{} -> {}", name, table.resolve_mnemonic(name))?;
    }
    if let Some(v) = args.find {
        let hits = table.fields.find_value(v);
        if hits.is_empty() {
            info!("no {} field resolves to {} ({:#x})", arch, v, v);
        }
        for d in hits {
            writeln!(out, "{}", d)?;
        }
    }
    if args.list {
        list(table, out)?;
    }
    if args.emit {
        let catalog = catalog
            .as_ref()
            .ok_or_else(|| general_err!("--emit needs a catalog (--catalog <FILE>)"))?;
        let path = args.output.clone().unwrap_or_else(|| format!("{}.S", arch));
        let mut file = BufWriter::new(File::create(&path)?);
        let n = Emitter::new(table).emit(catalog, &mut file)?;
        file.flush()?;
        info!("Wrote {} instructions to {}", n, path);
    }
    Ok(())
}

/// Dump a table in declaration order.
fn list<W: Write>(table: &ArchitectureTable, out: &mut W) -> Result<(), Error> {
    writeln!(out, "# {} fields", table.arch)?;
    for d in table.fields.iter() {
        match &d.note {
            Some(note) => writeln!(out, "{}  # {}", d, note)?,
            None => writeln!(out, "{}", d)?,
        }
    }
    writeln!(out, "# {} overrides", table.arch)?;
    for a in table.overrides.iter() {
        match &a.note {
            Some(note) => writeln!(out, "{}  # {}", a, note)?,
            None => writeln!(out, "{}", a)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldValue, Role};
    use clap::Parser;
    use std::fs;
    use std::io;

    /// Run the app on a command line and capture what it prints as answers.
    fn run(argv: &[&str]) -> Result<String, Error> {
        let args = config::Args::parse_from(argv);
        let mut buf = Vec::new();
        process(&args, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).to_string())
    }

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("golden-{}-{}", std::process::id(), name))
            .to_string_lossy()
            .to_string()
    }

    fn sorted_entries(dir: &str, ext: &str) -> Result<Vec<std::path::PathBuf>, Error> {
        let mut entries = fs::read_dir(dir)?
            .map(|res| res.map(|e| e.path()))
            .collect::<Result<Vec<_>, io::Error>>()?;
        entries.retain(|e| e.is_file() && e.extension().map_or(false, |x| x.eq_ignore_ascii_case(ext)));
        entries.sort();
        Ok(entries)
    }

    #[test]
    fn builtin_tables_load_cleanly() -> Result<(), Error> {
        for arch in Arch::ALL {
            let t = table::builtin(arch)?;
            assert!(!t.fields.is_empty());
            // only notices allowed, nothing fatal
            assert!(t.diagnostics().iter().all(|d| !d.kind.is_fatal()));
            for d in t.fields.iter() {
                // deterministic: same answer every time
                assert_eq!(t.resolve_field(&d.name)?, t.resolve_field(&d.name)?);
                if d.role.is_register() {
                    assert!(d.domain.contains(d.value), "{} {}", arch, d);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn ppc64_values() -> Result<(), Error> {
        let t = table::builtin(Arch::Ppc64)?;
        let gprs: Vec<_> = ["RA", "RB", "RS", "RT"]
            .iter()
            .map(|n| t.resolve_field(n))
            .collect::<Result<_, _>>()?;
        assert_eq!(
            gprs,
            vec![
                FieldValue::Single(1),
                FieldValue::Single(2),
                FieldValue::Single(3),
                FieldValue::Single(4)
            ]
        );
        // hash store/check only take one displacement
        assert_eq!(t.resolve_field("offset")?, FieldValue::Single(-128));
        match t.resolve_field("SIpfx")? {
            FieldValue::Halves(hi, lo) => assert_ne!(hi, lo),
            v => panic!("SIpfx should resolve to halves, got {:?}", v),
        }
        for d in t.fields.iter().filter(|d| d.role == Role::RegPair) {
            assert_eq!(d.value % 2, 0, "{}", d);
        }
        Ok(())
    }

    #[test]
    fn ppc64_overrides() -> Result<(), Error> {
        let t = table::builtin(Arch::Ppc64)?;
        assert_eq!(t.resolve_mnemonic("sync"), "xsrsp");
        assert_eq!(t.resolve_mnemonic("isel"), "rldicl");
        assert_eq!(t.resolve_mnemonic("rfebb"), "sc");
        assert_eq!(t.resolve_mnemonic("addi"), "addi");
        // sync is declared twice; surfaced for a human, not an error
        let redeclared: Vec<_> = t
            .diagnostics()
            .iter()
            .filter(|d| d.kind == ErrorKind::Redeclared)
            .collect();
        assert_eq!(redeclared.len(), 1);
        assert!(redeclared[0].msg.contains("sync"));
        assert!(table::builtin(Arch::S390x)?.overrides.is_empty());
        Ok(())
    }

    #[test]
    fn sample_catalogs() -> Result<(), Error> {
        // every catalog in test/catalog must check out against the built-in
        // table and emit exactly the expected assembly next to it
        const TEST_PATH: &str = "test/catalog";
        for csv in sorted_entries(TEST_PATH, "csv")? {
            let name = csv.file_stem().unwrap().to_string_lossy().to_string();
            let arch = Arch::from_name(name.split('_').next().unwrap())
                .ok_or_else(|| general_err!(format!("no arch prefix on {}", name)))?;
            let cat = Catalog::read_from_file(arch, csv.to_str().unwrap())?;
            let t = table::builtin(arch)?;
            let warnings = t.check_catalog(&cat)?;
            let unexpected: Vec<_> = warnings.iter().filter(|w| w.kind != ErrorKind::DeadOverride).collect();
            assert!(unexpected.is_empty(), "{}: {:?}", name, unexpected);
            let mut buf = Vec::new();
            Emitter::new(t).emit(&cat, &mut buf)?;
            let expected = fs::read_to_string(csv.with_extension("S"))?;
            assert_eq!(String::from_utf8_lossy(&buf), expected, "{}", name);
        }
        Ok(())
    }

    #[test]
    fn broken_tables() -> Result<(), Error> {
        // each unit in test/tables starts with "# expect: <ErrorKind>" and must
        // fail to load with exactly that kind
        const TEST_PATH: &str = "test/tables";
        let mut seen = 0;
        for pb in sorted_entries(TEST_PATH, "tbl")? {
            let src = fs::read_to_string(&pb)?;
            let expect = src
                .lines()
                .next()
                .and_then(|l| l.strip_prefix("# expect: "))
                .map(str::trim)
                .unwrap_or("")
                .to_string();
            let outcome = match ArchitectureTable::load_from_file(Arch::Ppc64, pb.to_str().unwrap(), None) {
                Err(e) if format!("{:?}", e.kind) == expect => None,
                Err(e) => Some(format!("{:?}", e)),
                Ok(_) => Some("Ok()".to_string()),
            };
            if let Some(msg) = outcome {
                panic!("Expected {} when loading {} but got {}", expect, pb.display(), msg)
            }
            seen += 1;
        }
        assert!(seen > 0);
        Ok(())
    }

    #[test]
    fn strict_escalates_dead_overrides() -> Result<(), Error> {
        let cat = Catalog::parse(Arch::Ppc64, "\"Add\",\"add RT,RA,RB\",\"\",\"\"\n")?;
        let warnings = table::builtin(Arch::Ppc64)?.check_catalog(&cat)?;
        assert!(warnings.iter().any(|w| w.kind == ErrorKind::DeadOverride));
        assert!(report(&warnings, false).is_ok());
        let e = report(&warnings, true).unwrap_err();
        assert_eq!(e.kind, ErrorKind::DeadOverride);
        Ok(())
    }

    #[test]
    fn listing() -> Result<(), Error> {
        let mut buf = Vec::new();
        list(table::builtin(Arch::S390x)?, &mut buf)?;
        let text = String::from_utf8_lossy(&buf);
        assert!(text.starts_with("# s390x fields\n"));
        assert!(text.lines().any(|l| l.starts_with("RI4") && l.contains("-168")));
        assert!(text.contains("shares=R2,B2"));
        Ok(())
    }

    #[test]
    fn field_and_mnemonic_queries() -> Result<(), Error> {
        let out = run(&["golden", "ppc64", "-f", "RA", "-f", "SIpfx", "-m", "sync", "-m", "addi"])?;
        assert_eq!(
            out.lines().collect::<Vec<_>>(),
            vec!["RA = 1", "SIpfx = 0x20001:0x0007", "sync -> xsrsp", "addi -> addi"]
        );
        let e = run(&["golden", "s390x", "--field", "RA"]).unwrap_err();
        assert_eq!(e.kind, ErrorKind::UndefinedField);
        assert_eq!(e.arch, Some(Arch::S390x));
        Ok(())
    }

    #[test]
    fn find_negative_value() -> Result<(), Error> {
        let out = run(&["golden", "ppc64", "--find", "-128"])?;
        let hits: Vec<_> = out.lines().collect();
        assert_eq!(hits.len(), 1, "{}", out);
        assert!(hits[0].starts_with("offset"));
        Ok(())
    }

    #[test]
    fn list_shows_override_rationale() -> Result<(), Error> {
        let out = run(&["golden", "ppc64", "--list"])?;
        let isel = out.lines().find(|l| l.starts_with("isel")).unwrap();
        assert!(isel.contains("rldicl") && isel.contains("donor"));
        assert!(isel.contains("# The isel BC bit"), "{}", isel);
        Ok(())
    }

    #[test]
    fn emit_needs_a_catalog() {
        let e = run(&["golden", "ppc64", "--emit"]).unwrap_err();
        assert_eq!(e.kind, ErrorKind::General);
        assert!(e.msg.contains("--catalog"));
    }

    #[test]
    fn emit_to_output_file() -> Result<(), Error> {
        let path = temp_path("ppc64_sample.S");
        run(&[
            "golden",
            "ppc64",
            "--catalog",
            "test/catalog/ppc64_sample.csv",
            "--emit",
            "--output",
            path.as_str(),
        ])?;
        let written = fs::read_to_string(&path)?;
        fs::remove_file(&path)?;
        assert_eq!(written, fs::read_to_string("test/catalog/ppc64_sample.S")?);
        Ok(())
    }

    #[test]
    fn strict_flag_blocks_dead_overrides() -> Result<(), Error> {
        let path = temp_path("add_only.csv");
        fs::write(&path, "\"Add\",\"add RT,RA,RB\",\"31@0|\",\"\"\n")?;
        let lenient = run(&["golden", "ppc64", "--catalog", path.as_str(), "-f", "RT"]);
        let strict = run(&["golden", "ppc64", "--catalog", path.as_str(), "--strict", "-f", "RT"]);
        fs::remove_file(&path)?;
        assert_eq!(lenient?, "RT = 4\n");
        assert_eq!(strict.unwrap_err().kind, ErrorKind::DeadOverride);
        Ok(())
    }
}
