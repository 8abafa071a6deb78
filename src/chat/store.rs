//! Durable session storage.
//!
//! Sessions are JSON arrays of messages in a per-user directory; the
//! filename doubles as the session identifier and display name.  The
//! store tracks which on-disk file the in-memory transcript was loaded
//! from so that saving again supersedes that file instead of leaving a
//! duplicate lineage behind.

use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde_json::from_reader;

use crate::chat::config::write_atomic;
use crate::error::{Error, Result};
use crate::observability::{SESSION_LOADS, SESSION_SAVES};
use crate::types::Message;

/// Persists named transcripts under a sessions directory.
///
/// The directory is injected so tests can point the store at a temp dir.
#[derive(Debug)]
pub struct SessionStore {
    dir: PathBuf,
    active: Option<PathBuf>,
}

impl SessionStore {
    /// Creates a store over the given sessions directory.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir, active: None }
    }

    /// The sessions directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The on-disk file the in-memory transcript was loaded from, if any.
    pub fn active(&self) -> Option<&Path> {
        self.active.as_deref()
    }

    /// Detaches the loaded-from file.
    ///
    /// Called when the in-memory transcript is discarded without
    /// saving; a later save must not supersede the old file, which now
    /// holds an unrelated conversation from this store's perspective.
    pub fn clear_active(&mut self) {
        self.active = None;
    }

    /// Lists saved session names, sorted.
    ///
    /// Creates the directory when absent; an empty directory is an empty
    /// list, never an error.
    pub fn list(&self) -> Result<Vec<String>> {
        fs::create_dir_all(&self.dir)
            .map_err(|err| Error::io(format!("failed to create {}", self.dir.display()), err))?;
        let entries = fs::read_dir(&self.dir)
            .map_err(|err| Error::io(format!("failed to read {}", self.dir.display()), err))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|err| Error::io(format!("failed to read {}", self.dir.display()), err))?;
            if entry.path().is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Writes the transcript to `sessions_dir/name`.
    ///
    /// When the transcript originated from a prior [`SessionStore::load`],
    /// the prior file is deleted after the new one is written and the
    /// active pointer is cleared, so exactly one file represents the
    /// lineage.  In-memory state is untouched on failure.
    pub fn save(&mut self, transcript: &[Message], name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        let path = self.dir.join(name);
        let body = serde_json::to_string_pretty(transcript)?;
        write_atomic(&path, body.as_bytes())?;
        if let Some(prev) = &self.active {
            if *prev != path {
                fs::remove_file(prev).map_err(|err| {
                    Error::io(format!("failed to remove {}", prev.display()), err)
                })?;
            }
        }
        self.active = None;
        SESSION_SAVES.click();
        Ok(path)
    }

    /// Loads the named session, replacing nothing in memory itself but
    /// setting the active pointer so a later save supersedes this file.
    pub fn load(&mut self, name: &str) -> Result<Vec<Message>> {
        validate_name(name)?;
        let path = self.dir.join(name);
        if !path.is_file() {
            return Err(Error::session_not_found(name));
        }
        let file = File::open(&path)
            .map_err(|err| Error::io(format!("failed to open {}", path.display()), err))?;
        let reader = BufReader::new(file);
        let transcript: Vec<Message> = from_reader(reader).map_err(|err| {
            Error::serialization(
                format!("failed to parse session {name}: {err}"),
                Some(Box::new(err)),
            )
        })?;
        self.active = Some(path);
        SESSION_LOADS.click();
        Ok(transcript)
    }
}

/// The filename is the session identity; it must not escape the
/// sessions directory.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(Error::invalid_argument(
            "session names may not contain path separators",
            Some(name.to_string()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn transcript() -> Vec<Message> {
        vec![
            Message::developer("You are a helpful assistant."),
            Message::user("hello"),
            Message::assistant("hi there"),
        ]
    }

    #[test]
    fn list_is_empty_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("sessions"));
        assert_eq!(store.list().unwrap(), Vec::<String>::new());
        assert!(dir.path().join("sessions").is_dir());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::new(dir.path().to_path_buf());

        store.save(&transcript(), "2025-01-01_12-00-00_greeting").unwrap();
        let loaded = store.load("2025-01-01_12-00-00_greeting").unwrap();
        assert_eq!(loaded, transcript());
        assert_eq!(loaded[0].role, Role::Developer);
    }

    #[test]
    fn resave_after_load_supersedes_old_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::new(dir.path().to_path_buf());

        store.save(&transcript(), "old_name").unwrap();
        let mut loaded = store.load("old_name").unwrap();
        assert_eq!(store.active().unwrap().file_name().unwrap(), "old_name");

        loaded.push(Message::user("more"));
        store.save(&loaded, "new_name").unwrap();

        assert_eq!(store.list().unwrap(), vec!["new_name".to_string()]);
        assert!(store.active().is_none());
    }

    #[test]
    fn resave_under_same_name_keeps_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::new(dir.path().to_path_buf());

        store.save(&transcript(), "same").unwrap();
        let loaded = store.load("same").unwrap();
        store.save(&loaded, "same").unwrap();

        assert_eq!(store.list().unwrap(), vec!["same".to_string()]);
    }

    #[test]
    fn save_without_prior_load_keeps_existing_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::new(dir.path().to_path_buf());

        store.save(&transcript(), "first").unwrap();
        store.save(&transcript(), "second").unwrap();
        assert_eq!(
            store.list().unwrap(),
            vec!["first".to_string(), "second".to_string()]
        );
    }

    #[test]
    fn clear_active_detaches_the_loaded_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::new(dir.path().to_path_buf());

        store.save(&transcript(), "session_a").unwrap();
        store.load("session_a").unwrap();

        // The transcript is discarded without saving; a fresh
        // conversation saved later must not supersede session_a.
        store.clear_active();
        assert!(store.active().is_none());

        let fresh = vec![Message::user("new topic"), Message::assistant("sure")];
        store.save(&fresh, "session_b").unwrap();
        assert_eq!(
            store.list().unwrap(),
            vec!["session_a".to_string(), "session_b".to_string()]
        );
    }

    #[test]
    fn failed_removal_keeps_the_pointer() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::new(dir.path().to_path_buf());

        store.save(&transcript(), "old").unwrap();
        store.load("old").unwrap();

        // Make removing the prior file fail by replacing it with a
        // directory of the same name.
        fs::remove_file(dir.path().join("old")).unwrap();
        fs::create_dir(dir.path().join("old")).unwrap();

        assert!(store.save(&transcript(), "new").is_err());
        assert_eq!(store.active().unwrap().file_name().unwrap(), "old");
    }

    #[test]
    fn load_missing_session_is_session_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::new(dir.path().to_path_buf());
        let err = store.load("absent").unwrap_err();
        assert!(err.is_session_not_found());
        assert!(store.active().is_none());
    }

    #[test]
    fn names_with_separators_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::new(dir.path().to_path_buf());
        assert!(store.save(&transcript(), "../escape").is_err());
        assert!(store.load("a/b").is_err());
        assert!(store.save(&transcript(), "").is_err());
    }
}
