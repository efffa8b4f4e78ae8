use crate::arch::Arch;
use clap::Parser;
use clap_num::maybe_hex;
use lazy_static::lazy_static;

#[derive(Parser, Debug)]
#[command(author,version,about,long_about=None)]
pub struct Args {
    /// Architecture whose tables to load
    #[arg(value_enum)]
    pub arch: Arch,

    /// Instruction-format catalog (.csv) to check the tables against
    #[arg(short, long)]
    pub catalog: Option<String>,

    /// Load this table unit instead of the built-in one
    #[arg(short, long)]
    pub table: Option<String>,

    /// Write resolved assembly source for every catalog form (requires --catalog)
    #[arg(short, long)]
    pub emit: bool,

    /// File to write emitted assembly to (default <ARCH>.S)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Resolve a field name and print its value (may be repeated)
    #[arg(short, long)]
    pub field: Vec<String>,

    /// Resolve a mnemonic through the override table (may be repeated)
    #[arg(short, long)]
    pub mnemonic: Vec<String>,

    /// List every field whose value equals VALUE (hex ok with '0x')
    #[arg(long,value_parser=signed_maybe_hex, allow_negative_numbers = true)]
    pub find: Option<i64>,

    /// Dump the loaded table
    #[arg(short, long)]
    pub list: bool,

    /// Treat dead override warnings as fatal
    #[arg(short, long)]
    pub strict: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

lazy_static! {
    pub static ref ARGS: Args = if cfg!(test) {
        // manually set parameters for running tests
        Args::parse_from(["test", "ppc64"])
    } else {
        Args::parse()
    };
}

pub fn init() { lazy_static::initialize(&ARGS); }

/// `maybe_hex` with an optional leading '-'. Hex wider than 63 bits reads as
/// two's complement, the same way table literals do.
fn signed_maybe_hex(s: &str) -> Result<i64, String> {
    match s.strip_prefix('-') {
        Some(mag) => {
            let v = maybe_hex::<u64>(mag)?;
            i64::try_from(v).map(|v| -v).map_err(|_| format!("{} is out of range", s))
        }
        None => maybe_hex::<u64>(s).map(|v| v as i64),
    }
}
