//! Interactive terminal chat client for the OpenAI chat-completion API.
//!
//! This binary provides a streaming REPL with persisted defaults and
//! named, resumable sessions.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with the configured default model
//! gpterm
//!
//! # Override the model for this run (the saved default is untouched)
//! gpterm --model gpt-4o
//!
//! # Disable colors (useful for piping output)
//! gpterm --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, commands start with `:` — see `:help`.  Anything
//! else is sent to the model as a chat message.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use gpterm::chat::{
    ChatArgs, ChatSession, Command, Config, ConfigStore, SessionStore, SetOption, TopicNamer,
    help_text, normalize_history, parse_command,
};
use gpterm::render::{ANSI_BOLD_GREEN, ANSI_MAGENTA, ANSI_RESET};
use gpterm::{KnownModel, Model, OpenAi, PlainTextRenderer, Renderer};

/// Per-user locations for the config document and the sessions
/// directory, derived from the platform's conventions.
fn user_paths() -> Result<(PathBuf, PathBuf), Box<dyn std::error::Error>> {
    let dirs = directories::ProjectDirs::from("", "", "gpterm")
        .ok_or("could not determine a home directory for this user")?;
    let config_path = dirs.config_dir().join("config.json");
    let sessions_dir = dirs.data_dir().join("sessions");
    Ok((config_path, sessions_dir))
}

/// Loads the config, recovering from a corrupt document by reseeding
/// it from the bundled template.
fn load_config(store: &ConfigStore, renderer: &mut dyn Renderer) -> gpterm::Result<Config> {
    match store.load() {
        Ok(config) => Ok(config),
        Err(err) if err.is_config_corrupt() => {
            renderer.print_error(&format!("{err}"));
            renderer.print_info("Restoring default configuration from the bundled template.");
            store.reseed()
        }
        Err(err) => Err(err),
    }
}

fn print_models() {
    println!("Supported models:");
    for model in KnownModel::ALL {
        println!("  {}", model.as_str());
    }
}

fn print_sessions(store: &SessionStore, renderer: &mut dyn Renderer) {
    match store.list() {
        Ok(names) if names.is_empty() => println!("No saved sessions."),
        Ok(names) => {
            for name in names {
                println!("{name}");
            }
        }
        Err(err) => renderer.print_error(&format!("Failed to list sessions: {err}")),
    }
}

/// Exactly "Y" confirms; anything else (including EOF) declines.
fn confirm(rl: &mut DefaultEditor, question: &str) -> bool {
    matches!(rl.readline(&format!("{question} (Y/N) ")), Ok(line) if line.trim() == "Y")
}

/// Offers to save the current transcript under a model-generated name.
///
/// Saving is best-effort: naming falls back to a timestamped
/// `no-topic` name, and an I/O failure is reported without aborting
/// whatever prompted the save.
async fn maybe_save(
    rl: &mut DefaultEditor,
    client: &OpenAi,
    session: &ChatSession,
    store: &mut SessionStore,
    renderer: &mut dyn Renderer,
) {
    if session.transcript().len() <= 1 {
        return;
    }
    if !confirm(rl, "Save this session?") {
        return;
    }
    let namer = TopicNamer::new(client);
    let outcome = namer.generate(session.transcript(), session.model()).await;
    if let Some(warning) = outcome.warning {
        renderer.print_info(&format!("Could not name the session: {warning}"));
    }
    match store.save(session.transcript(), &outcome.name) {
        Ok(path) => renderer.print_info(&format!("Session saved to {}", path.display())),
        Err(err) => renderer.print_error(&format!("Failed to save session: {err}")),
    }
}

fn prompt(session: &ChatSession, use_color: bool) -> String {
    let mut status = String::new();
    if !session.history() {
        status.push_str(" [history off]");
    }
    if !session.attached_files().is_empty() {
        status.push_str(&format!(" [{}]", session.attached_files().join(", ")));
    }
    if use_color {
        format!(
            "{ANSI_BOLD_GREEN}gpterm:{}{ANSI_RESET}{status} {ANSI_MAGENTA}>{ANSI_RESET} ",
            session.model()
        )
    } else {
        format!("gpterm:{}{status} > ", session.model())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("gpterm [OPTIONS]");
    let use_color = !args.no_color;
    let mut renderer = PlainTextRenderer::with_color(use_color);

    let (config_path, sessions_dir) = user_paths()?;
    let config_store = ConfigStore::new(config_path);
    let mut config = load_config(&config_store, &mut renderer)?;

    // A startup override applies to this run only.
    if let Some(name) = args.model {
        match name.parse::<KnownModel>() {
            Ok(model) => config.model = Model::Known(model),
            Err(()) => {
                renderer.print_error(&format!(
                    "'{name}' is not a supported model; using {}",
                    config.model
                ));
                print_models();
            }
        }
    }

    let client = OpenAi::new(None)?;
    let mut store = SessionStore::new(sessions_dir);
    let mut session = ChatSession::new(config);
    let mut rl = DefaultEditor::new()?;

    // Flag for interrupt handling during streaming
    let interrupted = Arc::new(AtomicBool::new(false));
    let mut renderer = PlainTextRenderer::with_color(use_color).with_interrupt(interrupted.clone());

    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    println!("gpterm (model: {})", session.model());
    println!("Type :help for commands, :exit to leave\n");

    loop {
        // Reset interrupt flag before each input
        interrupted.store(false, Ordering::Relaxed);

        let readline = rl.readline(&prompt(&session, use_color));

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        Command::Quit => {
                            maybe_save(&mut rl, &client, &session, &mut store, &mut renderer).await;
                            println!("Goodbye!");
                            break;
                        }
                        Command::Clear => {
                            print!("\x1b[2J\x1b[H");
                        }
                        Command::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        Command::Models => {
                            print_models();
                        }
                        Command::Instructions => {
                            println!("{}", session.instructions());
                        }
                        Command::SetModel(name) => match name.parse::<KnownModel>() {
                            Ok(model) => {
                                session.set_model(Model::Known(model));
                                renderer.print_info(&format!("Model changed to: {name}"));
                            }
                            Err(()) => {
                                renderer
                                    .print_error(&format!("'{name}' is not a supported model"));
                                print_models();
                            }
                        },
                        Command::SetInstructions(text) => {
                            session.set_instructions(text);
                            renderer.print_info("Instructions updated for this session.");
                        }
                        Command::SetHistory(value) => match normalize_history(&value) {
                            Ok(history) => {
                                session.set_history(history);
                                renderer.print_info(if history {
                                    "History on: the full conversation is sent each turn."
                                } else {
                                    "History off: each message is an independent exchange."
                                });
                            }
                            Err(err) => renderer.print_error(&format!("{err}")),
                        },
                        Command::SetDefault { option, value } => {
                            match option.parse::<SetOption>() {
                                Ok(option) => {
                                    if confirm(
                                        &mut rl,
                                        "Changing a default resets the current session. Proceed?",
                                    ) {
                                        match config_store.set_default(option, &value) {
                                            Ok(config) => {
                                                store.clear_active();
                                                session.reset(config);
                                                renderer.print_info(
                                                    "Default updated; session restarted.",
                                                );
                                            }
                                            Err(err) => renderer.print_error(&format!("{err}")),
                                        }
                                    } else {
                                        renderer.print_info("Defaults not changed.");
                                    }
                                }
                                Err(err) => renderer.print_error(&format!("{err}")),
                            }
                        }
                        Command::Sessions => {
                            print_sessions(&store, &mut renderer);
                        }
                        Command::Load(name) => match store.load(&name) {
                            Ok(transcript) => {
                                session.replace_transcript(transcript);
                                renderer.print_info(&format!("Resumed session {name}"));
                            }
                            Err(err) if err.is_session_not_found() => {
                                renderer.print_error(&format!("{err}"));
                                print_sessions(&store, &mut renderer);
                            }
                            Err(err) => {
                                renderer.print_error(&format!("Failed to load session: {err}"));
                            }
                        },
                        Command::Attach(path) => match gpterm::ingest::read_attachment(Path::new(&path)) {
                            Ok(attachment) => {
                                renderer.print_info(&format!(
                                    "Attached {} ({} bytes); it rides with your next message.",
                                    attachment.filename,
                                    attachment.content.len()
                                ));
                                session.attach(attachment);
                            }
                            Err(err) => renderer.print_error(&format!("{err}")),
                        },
                        Command::Remove => {
                            session.clear_attachments();
                            renderer.print_info("Pending attachments removed.");
                        }
                        Command::Reset => {
                            maybe_save(&mut rl, &client, &session, &mut store, &mut renderer).await;
                            // The fresh transcript no longer corresponds
                            // to any saved file.
                            store.clear_active();
                            match load_config(&config_store, &mut renderer) {
                                Ok(config) => {
                                    session.reset(config);
                                    renderer.print_info("Session reset to the saved defaults.");
                                    for line in help_text().lines() {
                                        println!("    {}", line);
                                    }
                                }
                                Err(err) => {
                                    renderer.print_error(&format!("Failed to reload config: {err}"));
                                }
                            }
                        }
                        Command::Invalid(message) => {
                            renderer.print_error(&format!("Unrecognized command: {message}"));
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                    }
                    continue;
                }

                // Regular message - send to the API
                if let Err(e) = session.send(&client, &mut renderer, line).await {
                    renderer.print_error(&e.to_string());
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                maybe_save(&mut rl, &client, &session, &mut store, &mut renderer).await;
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {err}"));
                break;
            }
        }
    }

    Ok(())
}
