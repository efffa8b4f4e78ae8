//! Reader for the instruction-format catalog (`pp64.csv`, `s390x.csv`).
//!
//! Each record is `"description","mnemonic forms","encoding","tags"`. The
//! mnemonic column may hold several `|` separated forms, each optionally
//! followed by the field conditions that select it, e.g.
//! `add RT,RA,RB (OE=0 Rc=0)|add. RT,RA,RB (OE=0 Rc=1)`. We only care about
//! the assembly text of each form: its mnemonic and the field names it uses.
use super::*;

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;

lazy_static! {
    // category and co-requisite notices, and opcode notes like (0x7C000214)
    static ref RE_CATEGORY: Regex =
        Regex::new(r"(\s*\[Category:[^\]]*\]\s*)|(\s*\[Co-requisite[^\]]*\]\s*)|(\s*\(\s*0[Xx][0-9A-Fa-f_]{9}\s*\)\s*)")
            .unwrap();
    // a form followed by an optional "(AA=1 LK=0)" condition list
    static ref RE_FORM: Regex = Regex::new(r"^(.*?)\s?(\((\s*[[:alpha:]]+=[0-9a-f]+\s*)+\))?$").unwrap();
    // each identifier in a form; the first one is the mnemonic (which may carry a '.')
    static ref RE_OPERAND: Regex = Regex::new(r"\b[[:alpha:]_][[:alnum:]_]*\.?").unwrap();
}

/// One assembly form from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    /// catalog line the form came from
    pub line: usize,
    /// the description column
    pub text: String,
    /// mnemonic as written, including a trailing '.' record form
    pub mnemonic: String,
    /// field identifiers in operand order
    pub operands: Vec<String>,
    /// assembly text with field identifiers still symbolic
    pub template: String,
}
impl Form {
    /// The mnemonic without its record-form '.', which is how overrides are keyed.
    pub fn base_mnemonic(&self) -> &str { self.mnemonic.trim_end_matches('.') }
}
impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{}", self.template) }
}

#[derive(Debug)]
pub struct Catalog {
    pub arch: Arch,
    pub forms: Vec<Form>,
}

impl Catalog {
    pub fn read_from_file(arch: Arch, path: &str) -> Result<Catalog, Error> {
        let src = fs::read_to_string(path)?;
        let cat = Catalog::parse(arch, &src)?;
        verbose_println!("Parsed {} instruction forms from {}.", cat.forms.len(), path);
        Ok(cat)
    }

    pub fn parse(arch: Arch, src: &str) -> Result<Catalog, Error> {
        let mut forms = Vec::new();
        for (i, line) in src.lines().enumerate() {
            let line_num = i + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let record = split_record(line).map_err(|e| catalog_err_line!(line_num, e))?;
            if record.len() < 4 {
                return Err(catalog_err_line!(
                    line_num,
                    format!("need at least four columns, found {}", record.len())
                ));
            }
            let mnemonics = RE_CATEGORY.replace_all(&record[1], "");
            for form in mnemonics.split('|') {
                let form = form.trim();
                if form.is_empty() {
                    continue;
                }
                let caps = RE_FORM
                    .captures(form)
                    .ok_or_else(|| catalog_err_line!(line_num, format!("can't parse form \"{}\"", form)))?;
                let mut template = caps[1].trim().to_string();
                if arch.has_prefixed_forms() {
                    template = rename_prefixed(&template);
                }
                let mut idents = RE_OPERAND.find_iter(&template).map(|m| m.as_str().to_string());
                let mnemonic = idents
                    .next()
                    .ok_or_else(|| catalog_err_line!(line_num, format!("no mnemonic in \"{}\"", form)))?;
                let operands = idents.collect();
                forms.push(Form {
                    line: line_num,
                    text: record[0].clone(),
                    mnemonic,
                    operands,
                    template,
                });
            }
        }
        if forms.is_empty() {
            return Err(Error::new(ErrorKind::Catalog, Some(arch), "empty catalog"));
        }
        Ok(Catalog { arch, forms })
    }

    /// Base mnemonics of every form, sorted.
    pub fn mnemonics(&self) -> BTreeSet<&str> { self.forms.iter().map(Form::base_mnemonic).collect() }
}

/// Prefixed loads/stores and paddi constrain D(RA) and R together (R=1 needs
/// RA=0), so they get their own field names.
fn rename_prefixed(template: &str) -> String {
    if template.starts_with('p') && template.ends_with('R') {
        template
            .replacen("D(RA),R", "Dpfx(RApfx),Rpfx", 1)
            .replacen("RA,SI,R", "RApfx,SIpfx,Rpfx", 1)
    } else {
        template.to_string()
    }
}

/// Split one CSV record. Quoted fields may contain commas; `""` inside quotes
/// is a literal quote.
fn split_record(line: &str) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut cur = String::new();
    let mut chars = line.chars().peekable();
    let mut quoted = false;
    let mut was_quoted = false;
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    cur.push('"');
                } else {
                    quoted = false;
                }
            }
            '"' if cur.is_empty() && !was_quoted => {
                quoted = true;
                was_quoted = true;
            }
            '"' => return Err(format!("stray quote in field {}", fields.len() + 1)),
            ',' if !quoted => {
                fields.push(std::mem::take(&mut cur));
                was_quoted = false;
            }
            _ if was_quoted && !quoted => {
                if !c.is_whitespace() {
                    return Err(format!("text after closing quote in field {}", fields.len() + 1));
                }
            }
            _ => cur.push(c),
        }
    }
    if quoted {
        return Err("unterminated quote".to_string());
    }
    fields.push(cur);
    Ok(fields)
}
