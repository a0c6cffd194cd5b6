//! Printing diagnostics to stderr.
//!
//! `warn!` always prints; `trace!` only prints if the `HTMPL_TRACE`
//! env var is set to `true` (checked once, on first use).

use lazy_static::lazy_static;

use crate::env::get_env_bool;

lazy_static!{
    pub static ref TRACE: bool = get_env_bool("HTMPL_TRACE").unwrap_or_else(|e| {
        eprintln!("W: {e}, tracing stays off");
        false
    });
}

#[macro_export]
macro_rules! warn {
    ($formatstr:expr $(,$arg:expr)*) => { {
        use std::io::Write;
        let mut outp = std::io::BufWriter::new(std::io::stderr().lock());
        let _ = write!(&mut outp, "W: ");
        let _ = write!(&mut outp, $formatstr $(,$arg)*);
        let _ = writeln!(&mut outp, " at {:?} line {}", file!(), line!());
        let _ = outp.flush();
    } }
}

#[macro_export]
macro_rules! trace {
    ($formatstr:expr $(,$arg:expr)*) => { {
        if *$crate::warn::TRACE {
            use std::io::Write;
            let mut outp = std::io::BufWriter::new(std::io::stderr().lock());
            let _ = write!(&mut outp, "T: ");
            let _ = write!(&mut outp, $formatstr $(,$arg)*);
            let _ = writeln!(&mut outp, " at {:?} line {}", file!(), line!());
            let _ = outp.flush();
        }
    } }
}
