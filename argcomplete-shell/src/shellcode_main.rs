//! Entry point for the `argcomplete-shellcode` binary: emits shell init
//! snippets, or checks a script for the completion marker, for shells that
//! can't embed a Rust program's responder directly.

use clap::Parser;

use argcomplete_shell::args::ShellcodeArgs;
use argcomplete_shell::shellcode::{self, ShellcodeOptions};
use argcomplete_shell::marker;

fn main() -> std::process::ExitCode {
    let args = ShellcodeArgs::parse();

    if let Some(path) = &args.check_script {
        return if marker::script_opts_in(path) {
            std::process::ExitCode::SUCCESS
        } else {
            std::process::ExitCode::FAILURE
        };
    }

    let options = ShellcodeOptions {
        executables: args.executables,
        shell: args.shell.into(),
        completer: args.completer,
        use_default_shell_completion: args.use_default_shell_completion,
    };

    print!("{}", shellcode::emit(&options));
    std::process::ExitCode::SUCCESS
}
