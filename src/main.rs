//! # `pkgsmith`
//!
//! `pkgsmith` renders Debian packaging templates from a layered target
//! configuration and automates the release of a project: version bump,
//! commit, tag, push, and the update of a downstream repository that pins
//! the released version.
//!
//! ## Usage
//!
//! ```sh
//! pkgsmith version -V setup.py
//! pkgsmith config -t packaging/targets/debian -s ARCH=amd64
//! pkgsmith build -t packaging/targets/ubuntu --build-package
//! pkgsmith create-tag -V setup.py -U
//! pkgsmith sync -V setup.py -u ../deploy --reference-file versions.env
//! ```
//!
//! See `pkgsmith --help` for every option.

use clap::Parser as _;
use pkgsmith::cli::Args;
use pkgsmith::error::PackagerError;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let args = Args::parse();

    // Keep stdout machine-readable for inspection commands
    let log_level = if args.is_read_only() {
        "error"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    match pkgsmith::run(args) {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            error!("{:#}", err);
            std::process::exit(
                err.downcast_ref::<PackagerError>()
                    .map_or(1, PackagerError::exit_code),
            );
        }
    }
}
