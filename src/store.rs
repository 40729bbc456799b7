use crate::session::SessionUser;
use std::{
    fs,
    path::{Path, PathBuf},
};

const CONFIG_DIR_VAR: &str = "AVTOSHKOLA_CONFIG_DIR";
const CREDENTIAL_FILE: &str = "credential";
const USER_FILE: &str = "user.json";

/// Durable storage for the session credential and the cached user record.
///
/// Two keys, persisted as files under an application config directory so
/// they survive a full process restart. Absence of a value is a normal,
/// representable state; IO problems are logged and degrade to absence
/// rather than surfacing to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Open a store rooted at `$AVTOSHKOLA_CONFIG_DIR`, falling back to
    /// `$HOME/.config/avtoshkola`.
    pub fn open_default() -> SessionStore {
        SessionStore::open(default_dir())
    }

    pub fn open<P: Into<PathBuf>>(dir: P) -> SessionStore {
        SessionStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path { &self.dir }

    /// The persisted bearer token, if any.
    pub fn credential(&self) -> Option<String> {
        let raw = read_if_present(&self.dir.join(CREDENTIAL_FILE))?;
        let token = raw.trim();

        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    pub fn set_credential(&self, token: Option<&str>) {
        match token {
            Some(token) => self.write(CREDENTIAL_FILE, token),
            None => self.remove(CREDENTIAL_FILE),
        }
    }

    /// The cached user record, if one is stored and still parseable.
    ///
    /// There is no versioning of this record; one that no longer matches the
    /// current shape is treated as absent.
    pub fn user(&self) -> Option<SessionUser> {
        let raw = read_if_present(&self.dir.join(USER_FILE))?;

        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                log::warn!("Discarding an unreadable cached user record: {}", err);
                None
            }
        }
    }

    pub fn set_user(&self, user: Option<&SessionUser>) {
        match user.and_then(|user| {
            serde_json::to_string_pretty(user)
                .map_err(|err| log::warn!("Unable to serialize the user record: {}", err))
                .ok()
        }) {
            Some(serialized) => self.write(USER_FILE, &serialized),
            None => self.remove(USER_FILE),
        }
    }

    /// Drop both keys.
    pub fn clear(&self) {
        self.remove(CREDENTIAL_FILE);
        self.remove(USER_FILE);
    }

    fn write(&self, file: &str, contents: &str) {
        if let Err(err) = fs::create_dir_all(&self.dir) {
            log::warn!("Unable to create {}: {}", self.dir.display(), err);
            return;
        }

        let path = self.dir.join(file);
        if let Err(err) = fs::write(&path, contents) {
            log::warn!("Unable to persist {}: {}", path.display(), err);
        }
    }

    fn remove(&self, file: &str) {
        let path = self.dir.join(file);

        match fs::remove_file(&path) {
            Ok(_) => {},
            Err(ref err) if err.kind() == std::io::ErrorKind::NotFound => {},
            Err(err) => log::warn!("Unable to remove {}: {}", path.display(), err),
        }
    }
}

fn read_if_present(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(contents) => Some(contents),
        Err(ref err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => {
            log::warn!("Unable to read {}: {}", path.display(), err);
            None
        }
    }
}

fn default_dir() -> PathBuf {
    if let Ok(custom) = std::env::var(CONFIG_DIR_VAR) {
        return PathBuf::from(custom);
    }

    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".config").join("avtoshkola"),
        Err(_) => {
            log::warn!("HOME is not set, storing the session next to the binary");
            PathBuf::from(".avtoshkola")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Id;

    fn some_user() -> SessionUser {
        SessionUser {
            id: Id::from(1),
            username: String::from("admin"),
            email: Some(String::from("admin@avtoshkola.ru")),
            role: None,
            created_at: None,
        }
    }

    #[test]
    fn credential_survives_a_restart() {
        let dir = temp_dir::TempDir::new().unwrap();

        let store = SessionStore::open(dir.path());
        store.set_credential(Some("super-secret-token"));

        // a fresh handle stands in for a restarted process
        let reopened = SessionStore::open(dir.path());
        assert_eq!(reopened.credential().as_deref(), Some("super-secret-token"));
    }

    #[test]
    fn missing_values_read_as_none() {
        let dir = temp_dir::TempDir::new().unwrap();
        let store = SessionStore::open(dir.path());

        assert_eq!(store.credential(), None);
        assert_eq!(store.user(), None);
    }

    #[test]
    fn clear_removes_both_keys() {
        let dir = temp_dir::TempDir::new().unwrap();
        let store = SessionStore::open(dir.path());
        store.set_credential(Some("t"));
        store.set_user(Some(&some_user()));

        store.clear();

        assert_eq!(store.credential(), None);
        assert_eq!(store.user(), None);
    }

    #[test]
    fn user_record_round_trips() {
        let dir = temp_dir::TempDir::new().unwrap();
        let store = SessionStore::open(dir.path());

        store.set_user(Some(&some_user()));

        assert_eq!(store.user(), Some(some_user()));
    }

    #[test]
    fn garbage_user_record_reads_as_none() {
        let dir = temp_dir::TempDir::new().unwrap();
        let store = SessionStore::open(dir.path());
        std::fs::create_dir_all(dir.path()).unwrap();
        std::fs::write(dir.path().join(USER_FILE), "{not json").unwrap();

        assert_eq!(store.user(), None);
    }
}
