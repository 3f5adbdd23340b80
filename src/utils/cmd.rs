use std::process::Command;

/// Render a command as a single shell-like line, for logs and error messages.
pub fn command_line(cmd: &Command) -> String {
    let prog = cmd.get_program().to_string_lossy();
    let args = cmd
        .get_args()
        .map(|a| a.to_string_lossy())
        .collect::<Vec<_>>();
    if args.is_empty() {
        prog.into_owned()
    } else {
        format!("{} {}", prog, args.join(" "))
    }
}

/// Cut a long command line down to `max` characters for logging.
pub fn truncate(line: &str, max: usize) -> String {
    if line.chars().count() <= max {
        line.to_owned()
    } else {
        let head = line.chars().take(max).collect::<String>();
        format!("{head}...")
    }
}
