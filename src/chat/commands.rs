//! Command parsing for the interactive loop.
//!
//! Lines starting with `:` are commands; everything else is a chat
//! message.  Parsing is a closed set of tagged commands with checked
//! arity, so the dispatcher never slices argument strings by index.

/// One parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `:clear` — clear the screen.
    Clear,
    /// `:models` — list the supported models.
    Models,
    /// `:instructions` — show the standing instructions.
    Instructions,
    /// `:set model <m>` — switch the session's model.
    SetModel(String),
    /// `:set instructions <text>` — replace the standing instructions.
    SetInstructions(String),
    /// `:set history <on/off>` — toggle multi-turn context.
    SetHistory(String),
    /// `:set default <option> <value>` — persist a new default.
    SetDefault { option: String, value: String },
    /// `:sessions` — list saved sessions.
    Sessions,
    /// `:load <name>` — resume a saved session.
    Load(String),
    /// `:attach <path>` — stage a file for the next message.
    Attach(String),
    /// `:remove` — drop staged attachments.
    Remove,
    /// `:reset` — save prompt, then start over from defaults.
    Reset,
    /// `:exit` / `:q` — save prompt, then leave.
    Quit,
    /// `:help` — print usage.
    Help,
    /// Anything else after the sigil; carries the offending line.
    Invalid(String),
}

/// Parses a line of input; `None` means it is a chat message (or blank).
pub fn parse_command(input: &str) -> Option<Command> {
    let trimmed = input.trim();
    let rest = trimmed.strip_prefix(':')?;
    let (cmd, args) = match rest.split_once(char::is_whitespace) {
        Some((cmd, args)) => (cmd, args.trim()),
        None => (rest, ""),
    };
    let command = match (cmd, args) {
        ("clear", "") => Command::Clear,
        ("models", "") => Command::Models,
        ("instructions", "") => Command::Instructions,
        ("set", _) => parse_set(args),
        ("sessions", "") => Command::Sessions,
        ("load", name) if !name.is_empty() => Command::Load(name.to_string()),
        ("attach", path) if !path.is_empty() => Command::Attach(path.to_string()),
        ("remove", "") => Command::Remove,
        ("reset", "") => Command::Reset,
        ("exit", "") | ("q", "") => Command::Quit,
        ("help", "") => Command::Help,
        _ => Command::Invalid(trimmed.to_string()),
    };
    Some(command)
}

fn parse_set(args: &str) -> Command {
    let (option, value) = match args.split_once(char::is_whitespace) {
        Some((option, value)) => (option, value.trim()),
        None => (args, ""),
    };
    if value.is_empty() {
        return Command::Invalid(format!(":set {args}"));
    }
    match option {
        "model" => Command::SetModel(value.to_string()),
        "instructions" => Command::SetInstructions(value.to_string()),
        "history" => Command::SetHistory(value.to_string()),
        "default" => match value.split_once(char::is_whitespace) {
            Some((option, value)) if !value.trim().is_empty() => Command::SetDefault {
                option: option.to_string(),
                value: value.trim().to_string(),
            },
            _ => Command::Invalid(format!(":set default {value}")),
        },
        _ => Command::Invalid(format!(":set {args}")),
    }
}

/// Usage text printed for `:help` and unrecognized commands.
pub fn help_text() -> &'static str {
    "Available commands:
  :models                        List supported models
  :instructions                  Show the standing instructions
  :set model <model>             Switch model for this session
  :set instructions <text>       Replace the standing instructions
  :set history <on/off>          Toggle multi-turn context
  :set default <option> <value>  Persist a default (model/instruction/history)
  :sessions                      List saved sessions
  :load <name>                   Resume a saved session
  :attach <path>                 Stage a file for the next message
  :remove                        Drop staged attachments
  :clear                         Clear the screen
  :reset                         Start over from defaults
  :exit, :q                      Leave (with save prompt)
  :help                          Show this help

Anything else is sent to the model as a chat message."
}
