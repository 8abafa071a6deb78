//! Configuration for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg`, the persisted
//! default-config document, and the `ConfigStore` that seeds, loads,
//! and rewrites it.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use arrrg_derive::CommandLine;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{KnownModel, Message, Model, Role};

/// The bundled config document copied into place on first run.
const CONFIG_TEMPLATE: &str = include_str!("config_template.json");

/// Command-line arguments for the gpterm binary.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model override for this run; the persisted default is untouched.
    #[arrrg(optional, "Model to use for this run (default: from config)", "MODEL")]
    pub model: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// The persisted default-config document.
///
/// `messages` is the seed developer message a fresh transcript starts
/// from; `instructions` mirrors its content for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// The default model.
    pub model: Model,

    /// The standing instructions, mirrored into the seed message.
    pub instructions: String,

    /// The seed developer message for a fresh transcript.
    pub messages: Message,

    /// Whether chat turns accumulate into a transcript by default.
    pub history: bool,
}

/// An option accepted by `set default`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SetOption {
    /// The default model.
    Model,

    /// The standing instructions (and seed message).
    Instruction,

    /// The history toggle.
    History,
}

impl FromStr for SetOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "model" => Ok(SetOption::Model),
            "instruction" => Ok(SetOption::Instruction),
            "history" => Ok(SetOption::History),
            _ => Err(Error::invalid_argument(
                "invalid default option, defaults not changed",
                Some(s.to_string()),
            )),
        }
    }
}

/// Normalize a history toggle value.
///
/// Exactly `on`/`ON`/`1` enable and `off`/`OFF`/`0` disable; anything
/// else (mixed case included) is rejected and state stays unchanged.
pub fn normalize_history(value: &str) -> Result<bool> {
    match value {
        "on" | "ON" | "1" => Ok(true),
        "off" | "OFF" | "0" => Ok(false),
        _ => Err(Error::invalid_argument(
            "invalid argument for 'history' (on/off)",
            Some(value.to_string()),
        )),
    }
}

/// Loads and persists the default-config document at a fixed path.
///
/// The path is injected so tests can point the store at a temp dir.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Creates a store for the config document at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The path of the persisted document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the config, seeding it from the bundled template when the
    /// file does not exist yet.
    ///
    /// # Errors
    ///
    /// `ConfigCorrupt` when required keys are missing or mistyped; the
    /// caller may recover with [`ConfigStore::reseed`].
    pub fn load(&self) -> Result<Config> {
        if !self.path.is_file() {
            self.write_template()?;
        }
        let raw = fs::read_to_string(&self.path)
            .map_err(|err| Error::io(format!("failed to read {}", self.path.display()), err))?;
        serde_json::from_str(&raw)
            .map_err(|err| Error::config_corrupt(format!("{}: {err}", self.path.display())))
    }

    /// Overwrites the document with the bundled template and reloads.
    ///
    /// Recovery path for a corrupt config.
    pub fn reseed(&self) -> Result<Config> {
        self.write_template()?;
        self.load()
    }

    /// Validates and applies one default, persisting the full document.
    ///
    /// Read-modify-write with no locking; acceptable because usage is
    /// single-process, single-user.  On a validation failure nothing is
    /// written and the persisted document is untouched.
    pub fn set_default(&self, option: SetOption, value: &str) -> Result<Config> {
        let mut config = self.load()?;
        match option {
            SetOption::Model => {
                let model = value
                    .parse::<KnownModel>()
                    .map_err(|()| Error::invalid_model(value))?;
                config.model = Model::Known(model);
            }
            SetOption::Instruction => {
                config.instructions = value.to_string();
                config.messages = Message::new(Role::Developer, value);
            }
            SetOption::History => {
                config.history = normalize_history(value)?;
            }
        }
        self.persist(&config)?;
        Ok(config)
    }

    /// Persists the full document with an atomic write-replace.
    pub fn persist(&self, config: &Config) -> Result<()> {
        let body = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, body.as_bytes())
    }

    fn write_template(&self) -> Result<()> {
        write_atomic(&self.path, CONFIG_TEMPLATE.as_bytes())
    }
}

/// Write a whole document via a temp file in the same directory plus a
/// rename, so a crash mid-write cannot leave a truncated file behind.
pub(crate) fn write_atomic(path: &Path, body: &[u8]) -> Result<()> {
    let dir = path.parent().ok_or_else(|| {
        Error::invalid_argument("path has no parent directory", Some(path.display().to_string()))
    })?;
    fs::create_dir_all(dir)
        .map_err(|err| Error::io(format!("failed to create {}", dir.display()), err))?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, body)
        .map_err(|err| Error::io(format!("failed to write {}", tmp.display()), err))?;
    fs::rename(&tmp, path)
        .map_err(|err| Error::io(format!("failed to replace {}", path.display()), err))
}
