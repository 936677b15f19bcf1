//! `teco`: the command-line driver for the core interpreter.
//!
//! Logging is configured once (`tracing-appender` non-blocking file
//! writer, `EnvFilter::from_default_env()`), a panic hook is installed
//! through a `std::sync::Once` guard, and the terminal is entered/left
//! through an RAII guard. There is no render loop and no async event
//! sources (spec §5's concurrency Non-goal): CTRL/C is wired through the
//! `ctrlc` crate straight onto the `Interp`'s `AtomicBool` flag, sampled
//! synchronously by the interpreter between commands (spec §4.6).

use std::path::PathBuf;
use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use teco_buffer::VecBuffer;
use teco_interp::{Interp, Limits};
use teco_keymap::{Engine, Terminal};
use teco_term::{CrosstermTerminal, TerminalGuard};
use teco_types::{EmptyErrorCatalog, ErrorCatalog, QRegId, Radix};

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "teco", version, about = "TECO command interpreter")]
struct Args {
    /// Optional script file to execute non-interactively; without it,
    /// `teco` reads command lines from the terminal until EOF/quit.
    script: Option<PathBuf>,

    /// Configuration file path (overrides discovery of `teco.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = std::path::Path::new(".");
        let log_path = log_dir.join("teco.log");
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, "teco.log");
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        match tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
        {
            Ok(()) => self.log_guard = Some(guard),
            Err(_) => {
                // A global subscriber is already installed (e.g. under a test
                // harness); drop the guard so its writer thread shuts down.
            }
        }
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

fn main() -> Result<()> {
    let mut startup = AppStartup::new();
    startup.configure_logging()?;
    AppStartup::install_panic_hook();
    info!(target: "runtime", "startup");

    let args = Args::parse();
    let config = teco_config::load_from(args.config.clone())?;
    let limits = Limits {
        mqx: config.mqx,
        mmx: config.mmx,
    };

    if let Some(script) = args.script {
        return run_script(&script, limits, config.radix, config.trace);
    }
    run_repl(limits, config.radix, config.trace)
}

/// A `Terminal` that writes straight to stdout and never reads input,
/// used for non-interactive script execution (no raw mode, no echo of
/// keystrokes that were never typed).
#[derive(Default)]
struct StdoutTerminal;

impl Terminal for StdoutTerminal {
    fn getc(&mut self, _wait: bool) -> Option<u8> {
        None
    }

    fn echo(&mut self, _c: u8) {}

    fn print(&mut self, s: &str) {
        print!("{s}");
        let _ = std::io::Write::flush(&mut std::io::stdout());
    }

    fn read_cmd(&mut self) -> teco_types::TecoResult<String> {
        Ok(String::new())
    }
}

fn run_script(path: &PathBuf, limits: Limits, radix: Radix, trace: bool) -> Result<()> {
    let source = std::fs::read_to_string(path)?;
    let mut interp = Interp::with_buffer_and_terminal(
        Box::new(VecBuffer::new()),
        Box::new(StdoutTerminal),
        limits,
    );
    interp.set_radix(radix);
    interp.set_trace_mode(trace);
    if let Err(err) = interp.execute_str(&source) {
        eprintln!("{err}");
        std::process::exit(1);
    }
    Ok(())
}

/// Interactive loop: read one command line at a time from the terminal,
/// execute it, and report any trapped error (spec §7: `?XXX  summary`).
/// A second CTRL/C at the top level exits the process (spec §4.6/§11);
/// that policy decision lives here, not in the core, since the core only
/// exposes the pending-flag/trap mechanism. After every line, the terminal's
/// `?`/`/` state is refreshed from `last_error`/`ErrorCatalog` and any `*q`
/// request the terminal queued is applied to the Q-register bank — the
/// catalog wording itself is an external collaborator's concern (spec §1),
/// so an empty catalog is wired in here rather than invented.
fn run_repl(limits: Limits, radix: Radix, trace: bool) -> Result<()> {
    let guard = TerminalGuard::enter()?;
    let crossterm_terminal = CrosstermTerminal::new();
    let immediate_state = crossterm_terminal.immediate_state();
    let mut interp = Interp::with_buffer_and_terminal(
        Box::new(VecBuffer::new()),
        Box::new(crossterm_terminal),
        limits,
    );
    interp.set_radix(radix);
    interp.set_trace_mode(trace);
    let catalog = EmptyErrorCatalog;

    let ctrl_c_flag = interp.ctrl_c_flag();
    let consecutive_interrupts = std::sync::Arc::new(AtomicUsize::new(0));
    {
        let hits = std::sync::Arc::clone(&consecutive_interrupts);
        ctrlc::set_handler(move || {
            ctrl_c_flag.store(true, Ordering::SeqCst);
            let n = hits.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= 2 {
                std::process::exit(0);
            }
        })?;
    }

    loop {
        let line = match interp.terminal().read_cmd() {
            Ok(line) => line,
            Err(_) => {
                warn!(target: "interp.error", "read aborted");
                continue;
            }
        };
        if let Some((reg, text)) = immediate_state.lock().unwrap().star_store.take() {
            if let Ok(id) = QRegId::global(reg.to_ascii_uppercase()) {
                Engine::qregs(&mut interp).set_text(id, text);
            }
        }
        if line.is_empty() {
            break;
        }
        consecutive_interrupts.store(0, Ordering::SeqCst);
        if let Err(err) = interp.execute_str(&line) {
            let msg = format!("{err}\n");
            interp.terminal().print(&msg);
        }
        let mut st = immediate_state.lock().unwrap();
        st.error_summary = interp.last_error().map(ToString::to_string);
        st.error_detail = interp
            .last_error()
            .and_then(|e| catalog.detail(e.code()))
            .map(str::to_string);
    }
    drop(guard);
    Ok(())
}
