//! Command-line argument types for the `argcomplete` and
//! `argcomplete-shellcode` binaries.

use clap::{builder::styling, Parser};

use crate::{events, productinfo};

const HEADING_UI_OPTIONS: &str = "User interface options";

const SHELLCODE_USAGE: &str = color_print::cstr!(
    "<bold>argcomplete-shellcode</bold> <italics>[OPTIONS]</italics> <italics>EXECUTABLE</italics>..."
);

/// Parsed command-line arguments for the `argcomplete` binary.
///
/// When the shell-wrapper environment contract (`_ARGCOMPLETE`) is present,
/// these arguments are never parsed at all: the responder takes over before
/// `clap` ever sees `argv`. They only govern a normal, non-completion
/// invocation of the bundled demo program.
#[derive(Clone, Parser)]
#[clap(name = productinfo::PRODUCT_NAME,
       version = productinfo::PRODUCT_VERSION,
       about = "A sample completion-aware program, and its own completion responder",
       styles = help_styles())]
pub struct ResponderArgs {
    /// Enable debug logging for classes of tracing events.
    #[clap(long = "debug", value_name = "EVENT", help_heading = HEADING_UI_OPTIONS)]
    pub enabled_debug_events: Vec<events::TraceEvent>,
}

/// Parsed command-line arguments for the `argcomplete-shellcode` binary.
#[derive(Clone, Parser)]
#[clap(name = "argcomplete-shellcode",
       version = productinfo::PRODUCT_VERSION,
       about = "Emits shell init snippets, or checks a script for the completion marker",
       override_usage = SHELLCODE_USAGE,
       styles = help_styles())]
pub struct ShellcodeArgs {
    /// Executables to register completion for.
    #[clap(value_name = "EXECUTABLE", required_unless_present = "check_script")]
    pub executables: Vec<String>,

    /// Shell dialect to emit a snippet for.
    #[clap(long, value_enum, default_value = "bash")]
    pub shell: ShellArg,

    /// Name of the binary invoked to answer completion requests (defaults to
    /// `argcomplete`).
    #[clap(long)]
    pub completer: Option<String>,

    /// Emit a single `complete -D`-style default-completion binding instead
    /// of one binding per executable (Bash only).
    #[clap(long)]
    pub use_default_shell_completion: bool,

    /// Instead of emitting shellcode, check whether the named script opts
    /// into completion via the marker string, and exit 0/1 accordingly.
    #[clap(long, value_name = "PATH", conflicts_with_all = ["shell", "completer", "use_default_shell_completion"])]
    pub check_script: Option<std::path::PathBuf>,
}

/// Mirrors [`argcomplete_core::quote::ShellDialect`] as a `clap::ValueEnum`,
/// since the latter lives in a crate with no `clap` dependency of its own.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ShellArg {
    /// GNU Bash.
    Bash,
    /// Zsh.
    Zsh,
    /// Fish.
    Fish,
    /// Tcsh.
    Tcsh,
}

impl From<ShellArg> for argcomplete_core::quote::ShellDialect {
    fn from(value: ShellArg) -> Self {
        match value {
            ShellArg::Bash => Self::Bash,
            ShellArg::Zsh => Self::Zsh,
            ShellArg::Fish => Self::Fish,
            ShellArg::Tcsh => Self::Tcsh,
        }
    }
}

/// Returns clap styling to be used for command-line help.
#[doc(hidden)]
fn help_styles() -> clap::builder::Styles {
    styling::Styles::styled()
        .header(
            styling::AnsiColor::Yellow.on_default()
                | styling::Effects::BOLD
                | styling::Effects::UNDERLINE,
        )
        .usage(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .literal(styling::AnsiColor::Magenta.on_default() | styling::Effects::BOLD)
        .placeholder(styling::AnsiColor::Cyan.on_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn responder_args_parse_with_no_flags() {
        let args = ResponderArgs::try_parse_from(["argcomplete"]).unwrap();
        assert!(args.enabled_debug_events.is_empty());
    }

    #[test]
    fn shellcode_args_require_executable_or_check_script() {
        assert!(ShellcodeArgs::try_parse_from(["argcomplete-shellcode"]).is_err());
        assert!(ShellcodeArgs::try_parse_from(["argcomplete-shellcode", "myprog"]).is_ok());
    }

    #[test]
    fn shellcode_args_accept_check_script_without_executables() {
        let args = ShellcodeArgs::try_parse_from([
            "argcomplete-shellcode",
            "--check-script",
            "myprog",
        ])
        .unwrap();
        assert!(args.executables.is_empty());
        assert!(args.check_script.is_some());
    }

    #[test]
    fn shell_arg_converts_to_shell_dialect() {
        let dialect: argcomplete_core::quote::ShellDialect = ShellArg::Zsh.into();
        assert_eq!(dialect, argcomplete_core::quote::ShellDialect::Zsh);
    }
}
