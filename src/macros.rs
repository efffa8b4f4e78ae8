#![allow(unused_macros)]
macro_rules! verbose_println {
    ($($p:expr),+) => {
        if (crate::config::ARGS.verbose) {
            println!($($p),+);
        }
    }
}
macro_rules! info {
    ($($p:expr),+) => {
        println!(concat!(blue!("INFO"),": {}"),format_args!($($p),+))
    }
}

macro_rules! warn {
    ($($p:expr),+) => {
        println!(concat!(red!("WARNING"),": {}"),format_args!($($p),+))
    }
}
macro_rules! notice {
    ($($p:expr),+) => {
        println!(concat!(yellow!("NOTICE"),": {}"),format_args!($($p),+))
    }
}
macro_rules! general_err {
    ($msg:expr) => {
        Error::new(crate::ErrorKind::General, None, format!("{}", $msg).as_str())
    };
}
macro_rules! table_err {
    ($kind:expr, $arch:expr, $($msg:expr),*) => {
        Error::new($kind, Some($arch), format!($($msg),*).as_str())
    };
}
macro_rules! syntax_err_line {
    ($arch:expr, $line:expr, $msg:expr) => {
        Error::new(
            crate::ErrorKind::Syntax,
            Some($arch),
            format!("{}, line {}: {}", red!("Syntax Error"), $line, $msg).as_str(),
        )
    };
}
macro_rules! catalog_err_line {
    ($line:expr, $msg:expr) => {
        Error::new(
            crate::ErrorKind::Catalog,
            None,
            format!("{}, line {}: {}", red!("Catalog Error"), $line, $msg).as_str(),
        )
    };
}
macro_rules! color {
    ($color: literal, $msg: expr) => {
        concat!("\x1b[", $color, "m", $msg, "\x1b[0m")
    };
}
macro_rules! red {
    ($msg:expr) => {
        color!(91, $msg)
    };
}
macro_rules! yellow {
    ($msg:expr) => {
        color!(93, $msg)
    };
}
macro_rules! blue {
    ($msg:expr) => {
        color!(94, $msg)
    };
}
