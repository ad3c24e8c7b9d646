//! POSIX shell quoting for the command line handed to the remote shell.
use stackhook_core::{RemoteScript, RemoteStep};

/// Quote `arg` so a POSIX shell reads it back as exactly one word.
///
/// Words made only of characters with no shell meaning are left as-is.
pub fn quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"_-./=:@%+,".contains(&b));
    if plain {
        return arg.to_string();
    }

    let mut out = String::with_capacity(arg.len() + 2);
    out.push('\'');
    for c in arg.chars() {
        if c == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(c);
        }
    }
    out.push('\'');
    out
}

/// Shell variable holding a piped step's output before it reaches the sink.
const CAPTURE_VAR: &str = "stackhook_out";

/// A piped step is captured first and fed to the sink only if it exited 0,
/// so neither side's failure is masked by the pipeline status.
fn render_step(step: &RemoteStep) -> String {
    let mut words = Vec::with_capacity(step.args.len() + 1);
    words.push(quote(&step.program));
    words.extend(step.args.iter().map(|a| quote(a)));
    let command = words.join(" ");

    match &step.pipe_into {
        Some(sink) => format!(
            "{CAPTURE_VAR}=$({command}) && printf '%s\\n' \"${CAPTURE_VAR}\" | {}",
            quote(sink)
        ),
        None => command,
    }
}

/// Render `script` as `cd <cwd> && step && step ...`.
pub fn render_script(script: &RemoteScript) -> String {
    std::iter::once(format!("cd {}", quote(&script.cwd)))
        .chain(script.steps.iter().map(render_step))
        .collect::<Vec<_>>()
        .join(" && ")
}
