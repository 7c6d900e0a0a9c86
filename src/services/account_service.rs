use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use log::{debug, error, info, warn};
use rand::RngCore;
use sha2::Sha256;
use crate::errors::WikiError;
use crate::types::LoginOutcome;
use crate::utils::is_valid_title;

const DIGEST_SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;

/// Flat-file account storage: one `<username>.data` per account holding a
/// salted password digest.
#[derive(Clone)]
pub struct AccountService {
    users_dir: PathBuf,
    rounds: u32,
}

impl AccountService {
    pub fn new(users_dir: PathBuf, rounds: u32) -> Self {
        debug!("Creating AccountService with users directory: {:?}", users_dir);
        Self { users_dir, rounds: rounds.max(1) }
    }

    /// Create the users directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<(), WikiError> {
        fs::create_dir_all(&self.users_dir).map_err(|e| {
            error!("Failed to create users directory {:?}: {}", self.users_dir, e);
            WikiError::Io(e)
        })
    }

    fn path_for(&self, username: &str) -> Result<PathBuf, WikiError> {
        if !is_valid_title(username) {
            return Err(WikiError::InvalidInput(
                "usernames may only contain letters, digits, '_' and '-'".to_string(),
            ));
        }
        Ok(self.users_dir.join(format!("{}.data", username)))
    }

    pub fn has_account(&self, username: &str) -> Result<bool, WikiError> {
        let path = self.path_for(username)?;
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => {
                error!("Failed to stat account {:?}: {}", path, e);
                Err(WikiError::Io(e))
            }
        }
    }

    /// Persist a new account. Fails if the username is already taken.
    pub fn create_account(&self, username: &str, password: &str) -> Result<(), WikiError> {
        if self.publish_record(username, password)? {
            Ok(())
        } else {
            Err(WikiError::InvalidInput(format!("account '{}' already exists", username)))
        }
    }

    /// Write the record to a hidden temp file and hard-link it into place.
    /// Returns `false` when another record already holds the name; an
    /// existing account is never replaced and readers never see a partial one.
    fn publish_record(&self, username: &str, password: &str) -> Result<bool, WikiError> {
        let path = self.path_for(username)?;
        let record = self.digest_record(password);
        let tmp_path = self
            .users_dir
            .join(format!(".{}.{:016x}.tmp", username, rand::rng().next_u64()));

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
            .map_err(|e| {
                error!("Failed to create account temp file {:?}: {}", tmp_path, e);
                WikiError::Io(e)
            })?;
        let linked = file
            .write_all(record.as_bytes())
            .and_then(|_| file.sync_all())
            .and_then(|_| fs::hard_link(&tmp_path, &path));
        drop(file);
        let _ = fs::remove_file(&tmp_path);

        match linked {
            Ok(()) => {
                info!("Created account '{}'", username);
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                warn!("Account '{}' already exists", username);
                Ok(false)
            }
            Err(e) => {
                error!("Failed to create account file {:?}: {}", path, e);
                Err(WikiError::Io(e))
            }
        }
    }

    /// Check `password` against the stored digest for `username`.
    pub fn verify(&self, username: &str, password: &str) -> Result<bool, WikiError> {
        let path = self.path_for(username)?;
        let stored = match fs::read_to_string(&path) {
            Ok(stored) => stored,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(WikiError::NotFound),
            Err(e) => {
                error!("Failed to read account {:?}: {}", path, e);
                return Err(WikiError::Io(e));
            }
        };

        let Some((rounds, salt, expected)) = parse_record(stored.trim()) else {
            error!("Account record for '{}' is malformed", username);
            return Err(WikiError::Io(std::io::Error::new(
                ErrorKind::InvalidData,
                format!("malformed account record for '{}'", username),
            )));
        };

        let actual = derive(password, &salt, rounds);
        Ok(constant_time_eq(&actual, &expected))
    }

    /// Log in, registering the username on first use.
    pub fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, WikiError> {
        if !self.has_account(username)? {
            if self.publish_record(username, password)? {
                return Ok(LoginOutcome::Registered);
            }
            debug!("Account '{}' was registered concurrently, verifying instead", username);
        }
        if self.verify(username, password)? {
            info!("User '{}' authenticated", username);
            Ok(LoginOutcome::Authenticated)
        } else {
            warn!("Failed login for '{}'", username);
            Err(WikiError::InvalidCredentials)
        }
    }

    fn digest_record(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_LEN];
        rand::rng().fill_bytes(&mut salt);
        let digest = derive(password, &salt, self.rounds);
        format!(
            "{}${}${}${}",
            DIGEST_SCHEME,
            self.rounds,
            hex::encode(salt),
            hex::encode(digest)
        )
    }
}

fn derive(password: &str, salt: &[u8], rounds: u32) -> [u8; DIGEST_LEN] {
    let mut out = [0u8; DIGEST_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, rounds, &mut out);
    out
}

fn parse_record(record: &str) -> Option<(u32, Vec<u8>, Vec<u8>)> {
    let mut parts = record.split('$');
    if parts.next()? != DIGEST_SCHEME {
        return None;
    }
    let rounds = parts.next()?.parse::<u32>().ok().filter(|r| *r > 0)?;
    let salt = hex::decode(parts.next()?).ok()?;
    let digest = hex::decode(parts.next()?).ok()?;
    if parts.next().is_some() || digest.len() != DIGEST_LEN {
        return None;
    }
    Some((rounds, salt, digest))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
