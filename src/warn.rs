//! Diagnostics on stderr.
//!
//! `warn!` always prints; `trace!` only prints while `DO_TRACE` is
//! set (via `set_trace`, which the `tkrender` binary calls for
//! `--trace` or `TKRENDER_TRACE=1`).

use std::sync::atomic::{AtomicBool, Ordering};

pub static DO_TRACE: AtomicBool = AtomicBool::new(false);

pub fn set_trace(on: bool) {
    DO_TRACE.store(on, Ordering::SeqCst);
}

pub fn trace_enabled() -> bool {
    DO_TRACE.load(Ordering::SeqCst)
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
        if $crate::warn::trace_enabled() {
            use std::io::Write;
            let mut outp = std::io::BufWriter::new(std::io::stderr().lock());
            let _ = write!(&mut outp, "T: ");
            let _ = write!(&mut outp, $formatstr $(,$arg)*);
            let _ = writeln!(&mut outp, " at {:?} line {}", file!(), line!());
            let _ = outp.flush();
        }
    } }
}
