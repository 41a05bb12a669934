//! displaycfg: query and arrange the displays attached to this machine.
//!
//! # Usage
//!
//! ```text
//! displaycfg --query                               # list displays
//! displaycfg --modes 69733382                      # list one display's modes
//! displaycfg -C 2 -R 2 -S 1920 1080                # 2×2 wall of 1920×1080 cells
//! displaycfg -D 1,0,0,1920,1080 -D 2,1920,0,1920,1080 --save-layout
//! displaycfg --from-config                         # re-apply the saved layout
//! ```
//!
//! # Exit codes
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | success, including nothing to do                     |
//! | 1    | malformed input or a failed apply                    |
//! | 2    | unexpected failure (including unsupported platforms) |
//! | -1   | `--modes` named a display that is not connected      |
//!
//! # Startup sequence
//!
//! ```text
//! main()
//!  └─ Cli::try_parse()          -- --help / --version exit 0, bad flags exit 1
//!  └─ load config.toml          -- missing file means defaults
//!  └─ init_logging()            -- RUST_LOG > config level > --verbose
//!  └─ cli::run()                -- one command against the native adapters
//! ```
//!
//! A panic anywhere below `main` is caught and reported as exit code 2
//! without a backtrace.

use std::io::{self, Write};
use std::panic;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::error;

use displaycfg::cli::{report_failure, run, Cli};
use displaycfg::error::{EXIT_FAILURE, EXIT_SUCCESS, EXIT_UNEXPECTED};
use displaycfg::infrastructure::config::{load_config, resolve_config_path, AppConfig};
use displaycfg::infrastructure::logging::init_logging;
use displaycfg::infrastructure::platform::{NativeApplier, NativeCatalog};

fn main() {
    panic::set_hook(Box::new(|info| error!("unexpected failure: {info}")));
    let code = panic::catch_unwind(real_main).unwrap_or_else(|_| {
        eprintln!("An unexpected error occurred.");
        EXIT_UNEXPECTED
    });
    std::process::exit(code);
}

fn real_main() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { EXIT_FAILURE } else { EXIT_SUCCESS };
        }
    };

    let (mut config, config_path) = match load_settings(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{e:#}");
            return EXIT_FAILURE;
        }
    };
    init_logging(&config.logging.level, cli.verbose);

    let catalog = NativeCatalog::new();
    let mut applier = NativeApplier::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let code = match run(&cli, &mut config, &config_path, &catalog, &mut applier, &mut out) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            report_failure(&e, &mut out, &mut io::stderr());
            e.exit_code()
        }
    };
    let _ = out.flush();
    code
}

/// Locates and reads the config file.
fn load_settings(cli: &Cli) -> anyhow::Result<(AppConfig, PathBuf)> {
    let path = resolve_config_path(cli.config.as_deref())
        .context("could not locate the configuration file; pass --config <PATH>")?;
    let config = load_config(&path)
        .with_context(|| format!("could not load configuration from {}", path.display()))?;
    Ok((config, path))
}
