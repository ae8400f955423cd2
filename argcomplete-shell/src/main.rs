//! Entry point for the `argcomplete` binary: a completion responder bundled
//! with a sample grammar.
//!
//! When the shell-wrapper environment contract is present (`_ARGCOMPLETE`
//! set), this program answers the completion request and exits without
//! ever parsing its own `argv` as a normal CLI invocation; otherwise it runs
//! as an ordinary program, parsing [`ResponderArgs`] and printing a short
//! message. This mirrors the source project's convention of calling
//! `argcomplete.autocomplete(parser)` at the very top of a script's `main`,
//! before the script's own argument parsing runs.

use clap::Parser;

use argcomplete_shell::args::ResponderArgs;
use argcomplete_shell::{config, demo, env, events, io, respond, Formatter};

fn main() -> std::process::ExitCode {
    if env::is_completion_request() {
        return run_responder();
    }

    let args = ResponderArgs::parse();
    let _trace_config = events::TraceEventConfig::init(&args.enabled_debug_events, std::io::stderr);

    println!(
        "{} {} -- try completing `prog --sh<TAB>` once this binary is wired up via argcomplete-shellcode.",
        argcomplete_shell::PRODUCT_NAME,
        argcomplete_shell::PRODUCT_VERSION
    );
    std::process::ExitCode::SUCCESS
}

fn run_responder() -> std::process::ExitCode {
    let formatter = Formatter::default();

    let responder_env = match env::read() {
        Ok(env) => env,
        Err(kind) => {
            eprintln!("{}", formatter.format(&kind.into()));
            return std::process::ExitCode::FAILURE;
        }
    };

    let mut debug_fd = io::open_debug();
    if responder_env.debug {
        io::write_debug(
            debug_fd.as_mut(),
            &format!(
                "comp_line={:?} comp_point={}",
                responder_env.comp_line, responder_env.comp_point
            ),
        );
    }

    let config = config::load_default().config;
    let grammar = demo::grammar();
    let blob = respond::respond(&responder_env, &grammar, &config);

    let output = match io::open_output() {
        Ok(file) => file,
        Err(e) => {
            eprintln!("fatal: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    if let Err(e) = io::write_output(output, &blob, responder_env.use_tempfiles) {
        eprintln!("fatal: {e}");
        return std::process::ExitCode::FAILURE;
    }

    std::process::ExitCode::SUCCESS
}
