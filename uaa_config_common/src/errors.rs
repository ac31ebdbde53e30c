//! Reporting fatal errors from the generator binaries.
//!
//! A generator either writes its file or exits non-zero after printing one
//! `ERROR:` line followed by a `caused by:` line for each layer of context.

use std::{backtrace::BacktraceStatus, fmt};

use anyhow::Error;

/// Extension methods for turning an [`Error`] into a printable report.
pub trait ErrorReportExt {
    /// The error chain, followed by a backtrace if one was captured.
    fn report(&self) -> ErrorReport<'_>;

    /// Just the error chain.
    fn report_without_backtrace(&self) -> ErrorReport<'_>;
}

impl ErrorReportExt for Error {
    fn report(&self) -> ErrorReport<'_> {
        ErrorReport {
            err: self,
            with_backtrace: true,
        }
    }

    fn report_without_backtrace(&self) -> ErrorReport<'_> {
        ErrorReport {
            err: self,
            with_backtrace: false,
        }
    }
}

/// A `Display`able report for an [`Error`].
pub struct ErrorReport<'a> {
    err: &'a Error,
    with_backtrace: bool,
}

impl fmt::Display for ErrorReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut chain = self.err.chain();
        if let Some(top) = chain.next() {
            writeln!(f, "ERROR: {}", top)?;
        }
        for cause in chain {
            writeln!(f, "  caused by: {}", cause)?;
        }

        // Only present when `RUST_BACKTRACE` or `RUST_LIB_BACKTRACE` is set.
        let backtrace = self.err.backtrace();
        if self.with_backtrace && backtrace.status() == BacktraceStatus::Captured {
            write!(f, "{}", backtrace)?;
        }
        Ok(())
    }
}

/// Define `fn main()` in terms of a fallible `fn $run() -> Result<()>`. On
/// failure, the error report goes to standard error and we exit with status 1.
#[macro_export]
macro_rules! quick_main {
    ($run:ident) => {
        fn main() {
            if let Err(err) = $run() {
                use ::std::io::Write;
                use $crate::errors::ErrorReportExt;
                let stderr = ::std::io::stderr();
                write!(&mut stderr.lock(), "{}", err.report())
                    .expect("could not write error report to stderr");
                ::std::process::exit(1);
            }
        }
    };
}

#[test]
fn report_lists_every_cause() {
    use anyhow::Context as _;

    let err = Err::<(), _>(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        "no such file",
    ))
    .context("could not read /run/secrets/var-uaa-ca/certificate")
    .context("could not build uaa.yml")
    .unwrap_err();

    assert_eq!(
        err.report_without_backtrace().to_string(),
        "ERROR: could not build uaa.yml\n  \
         caused by: could not read /run/secrets/var-uaa-ca/certificate\n  \
         caused by: no such file\n",
    );
}

#[test]
fn report_of_bare_error_has_one_line() {
    let err = anyhow::format_err!("could not find a non-loopback IPv4 address");
    assert_eq!(
        err.report_without_backtrace().to_string(),
        "ERROR: could not find a non-loopback IPv4 address\n",
    );
}
