//! Emits shell-specific init snippets that wire a completion-aware
//! executable into Bash/Zsh/Fish/Tcsh's completion machinery.
//!
//! Out of the completion engine's core per spec, but still part of the
//! shipped product: every dialect's snippet exports the env vars the
//! responder (§ `respond`) expects and then invokes the named executable
//! with `_ARGCOMPLETE` set, capturing its stdout-free, fd-8-only reply.

pub use argcomplete_core::quote::ShellDialect;

/// The name of the binary (or a wrapper function) invoked by the emitted
/// shellcode to answer a completion request.
const DEFAULT_COMPLETER: &str = "argcomplete";

/// Settings controlling one shellcode emission.
#[derive(Clone, Debug)]
pub struct ShellcodeOptions {
    /// The executables to register completion for.
    pub executables: Vec<String>,
    /// The dialect to emit a snippet for.
    pub shell: ShellDialect,
    /// The binary invoked to answer completion requests; defaults to
    /// `argcomplete`.
    pub completer: Option<String>,
    /// Use a `complete -D` (Bash) / default-command fallback registration
    /// instead of one binding per executable.
    pub use_default_shell_completion: bool,
}

/// Emits the shell init snippet described by `options`.
#[must_use]
pub fn emit(options: &ShellcodeOptions) -> String {
    let completer = options.completer.as_deref().unwrap_or(DEFAULT_COMPLETER);
    match options.shell {
        ShellDialect::Bash => emit_bash(options, completer),
        ShellDialect::Zsh => emit_zsh(options, completer),
        ShellDialect::Fish => emit_fish(options, completer),
        ShellDialect::Tcsh => emit_tcsh(options, completer),
    }
}

fn responder_invocation(completer: &str) -> String {
    format!(
        "_ARGCOMPLETE=1 _ARGCOMPLETE_SHELL=bash _ARGCOMPLETE_COMP_WORDBREAKS=\"$COMP_WORDBREAKS\" \
         COMP_LINE=\"$COMP_LINE\" COMP_POINT=\"$COMP_POINT\" {completer} 8>&1 9>&2 1>/dev/null"
    )
}

fn emit_bash(options: &ShellcodeOptions, completer: &str) -> String {
    let func_name = format!("_{completer}_completion");
    let invocation = responder_invocation(completer);
    let bindings = if options.use_default_shell_completion {
        format!("complete -o nospace -o default -F {func_name} -D")
    } else {
        options
            .executables
            .iter()
            .map(|exe| format!("complete -o nospace -o default -F {func_name} {exe}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "# Bash completion, generated by argcomplete-shellcode.\n\
         {func_name}() {{\n\
         \u{20}local IFS=$'\\013'\n\
         \u{20}local COMPREPLY\n\
         \u{20}COMPREPLY=( $({invocation}) )\n\
         \u{20}if [[ $? != 0 ]]; then\n\
         \u{20}\u{20}unset COMPREPLY\n\
         \u{20}fi\n\
         }}\n\
         {bindings}\n"
    )
}

fn emit_zsh(options: &ShellcodeOptions, completer: &str) -> String {
    let func_name = format!("_{completer}_completion");
    let invocation = format!(
        "_ARGCOMPLETE=1 _ARGCOMPLETE_SHELL=zsh _ARGCOMPLETE_COMP_WORDBREAKS=\"$COMP_WORDBREAKS\" \
         _ARGCOMPLETE_DFS=$'\\013' COMP_LINE=\"$BUFFER\" COMP_POINT=\"$((CURSOR+1))\" \
         {completer} 8>&1 9>&2 1>/dev/null"
    );
    let compdefs = options
        .executables
        .iter()
        .map(|exe| format!("compdef {func_name} {exe}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "#compdef {execs}\n\
         # Zsh completion, generated by argcomplete-shellcode.\n\
         {func_name}() {{\n\
         \u{20}local completions\n\
         \u{20}IFS=$'\\013' completions=($({invocation}))\n\
         \u{20}_describe 'values' completions\n\
         }}\n\
         {compdefs}\n",
        execs = options.executables.join(" ")
    )
}

fn emit_fish(options: &ShellcodeOptions, completer: &str) -> String {
    let invocation = format!(
        "_ARGCOMPLETE=1 _ARGCOMPLETE_SHELL=fish _ARGCOMPLETE_DFS=\\t \
         COMP_LINE=(commandline -cp) COMP_POINT=(commandline -C) {completer} 8>&1 9>&2 1>/dev/null"
    );
    options
        .executables
        .iter()
        .map(|exe| format!("complete -c {exe} -f -a '({invocation})'"))
        .collect::<Vec<_>>()
        .join("\n")
        + "\n"
}

fn emit_tcsh(options: &ShellcodeOptions, completer: &str) -> String {
    options
        .executables
        .iter()
        .map(|exe| {
            format!(
                "complete {exe} 'p@*@`set COMP_LINE=\"$COMMAND_LINE\"; set COMP_POINT=${{#COMMAND_LINE}}; \
                 _ARGCOMPLETE=1 _ARGCOMPLETE_SHELL=tcsh {completer}`@'"
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
        + "\n"
}
