//! Table units are the human-edited configuration, one per architecture.
//! Each non-blank line is either a comment, a field declaration or an
//! override declaration:
//! ```text
//! # comment; a block of comments documents the declarations below it
//! field RA = 1 reg u5 representative          # trailing rationale
//! field RSp = 6 reg-pair u5 bank=gpr
//! field offset = -128 disp s10 boundary edge  # reason is required with edge
//! alias isel -> rldicl donor
//! ```
//! A comment block applies to every declaration after it up to the next blank
//! line, unless the declaration has its own trailing comment.
use super::alias::{MnemonicAlias, OverrideKind};
use super::field::{Bank, Domain, FieldDecl, Rationale, Role};
use super::*;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_BLANK: Regex = Regex::new(r"^\s*$").unwrap();
    static ref RE_COMMENT: Regex = Regex::new(r"^\s*#\s?(.*)$").unwrap();
    static ref RE_FIELD: Regex = Regex::new(
        r"^\s*field\s+([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(-?(?:0[xX][0-9A-Fa-f_]+|[0-9_]+))\s+([a-z-]+)\s+([us][0-9]+)((?:\s+[^\s#]+)*)\s*(?:#\s*(.*))?$"
    )
    .unwrap();
    static ref RE_ALIAS: Regex = Regex::new(
        r"^\s*alias\s+([A-Za-z_][A-Za-z0-9_.]*)\s*->\s*([A-Za-z_][A-Za-z0-9_.]*)\s+([a-z]+)\s*(?:#\s*(.*))?$"
    )
    .unwrap();
}

/// A parsed declaration, in unit order.
#[derive(Debug)]
pub enum Decl {
    Field(FieldDecl),
    Alias(MnemonicAlias),
}

/// Parse a numeric literal. Hex literals are read as 64-bit two's complement
/// so `0xFFFFFFFE00010007` is the negative number it encodes.
pub fn parse_literal(lit: &str) -> Option<i64> {
    let (neg, body) = match lit.strip_prefix('-') {
        Some(b) => (true, b),
        None => (false, lit),
    };
    let body = body.replace('_', "");
    let v = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok()? as i64,
        None => body.parse::<i64>().ok()?,
    };
    if neg {
        v.checked_neg()
    } else {
        Some(v)
    }
}

fn field_from_captures(arch: Arch, line_num: usize, caps: &regex::Captures, block: &Option<String>) -> Result<FieldDecl, Error> {
    let name = caps[1].to_string();
    let literal = caps[2].to_string();
    let value = parse_literal(&literal)
        .ok_or_else(|| syntax_err_line!(arch, line_num, format!("bad value {} for field {}", literal, name)))?;
    let role = Role::from_keyword(&caps[3])
        .ok_or_else(|| syntax_err_line!(arch, line_num, format!("unknown role {}", &caps[3])))?;
    let domain = Domain::parse(&caps[4])
        .ok_or_else(|| syntax_err_line!(arch, line_num, format!("bad domain {}", &caps[4])))?;
    let mut decl = FieldDecl {
        name,
        value,
        literal,
        role,
        domain,
        rationale: Rationale::default(),
        bank: Bank::default(),
        shares: Vec::new(),
        edge: false,
        note: caps.get(6).map(|m| m.as_str().trim().to_string()).or_else(|| block.clone()),
        line: line_num,
    };
    for attr in caps.get(5).map_or("", |m| m.as_str()).split_whitespace() {
        if let Some(r) = Rationale::from_keyword(attr) {
            decl.rationale = r;
        } else if attr == "edge" {
            decl.edge = true;
        } else if let Some(b) = attr.strip_prefix("bank=") {
            if !role.is_register() {
                return Err(syntax_err_line!(arch, line_num, format!("bank= on non-register field {}", decl.name)));
            }
            decl.bank =
                Bank::from_keyword(b).ok_or_else(|| syntax_err_line!(arch, line_num, format!("unknown bank {}", b)))?;
        } else if let Some(s) = attr.strip_prefix("shares=") {
            decl.shares.extend(s.split(',').filter(|n| !n.is_empty()).map(String::from));
        } else {
            return Err(syntax_err_line!(arch, line_num, format!("unknown attribute {}", attr)));
        }
    }
    Ok(decl)
}

/// Parse a whole unit. Stops at the first malformed line.
pub fn parse_unit(arch: Arch, src: &str) -> Result<Vec<Decl>, Error> {
    let mut decls = Vec::new();
    // the comment block currently in effect
    let mut block: Option<String> = None;
    let mut block_open = false;
    for (i, line) in src.lines().enumerate() {
        let line_num = i + 1;
        if RE_BLANK.is_match(line) {
            block = None;
            block_open = false;
        } else if let Some(c) = RE_COMMENT.captures(line) {
            let text = c[1].trim();
            if !block_open {
                // a comment after declarations starts a new block
                block = None;
                block_open = true;
            }
            if !text.is_empty() {
                block = Some(match block.take() {
                    Some(b) => format!("{} {}", b, text),
                    None => text.to_string(),
                });
            }
        } else if let Some(caps) = RE_FIELD.captures(line) {
            block_open = false;
            decls.push(Decl::Field(field_from_captures(arch, line_num, &caps, &block)?));
        } else if let Some(caps) = RE_ALIAS.captures(line) {
            block_open = false;
            let kind = OverrideKind::from_keyword(&caps[3])
                .ok_or_else(|| syntax_err_line!(arch, line_num, format!("unknown override kind {}", &caps[3])))?;
            decls.push(Decl::Alias(MnemonicAlias {
                source: caps[1].to_string(),
                target: caps[2].to_string(),
                kind,
                note: caps.get(4).map(|m| m.as_str().trim().to_string()).or_else(|| block.clone()),
                line: line_num,
            }));
        } else {
            return Err(syntax_err_line!(arch, line_num, format!("can't parse \"{}\"", line.trim())));
        }
    }
    Ok(decls)
}
