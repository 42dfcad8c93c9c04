use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ac_core::crypt::password::{self, PasswordError};
use ac_core::fs::commit::{self, CommitError};
use ac_core::store::parser::{self, RecordError};
use ac_core::store::StoreKind;
use ac_core::subst::{self, SubstError};
use thiserror::Error;
use tracing::{debug, info};

use crate::paths::StorePaths;

/// The one account that is never a valid target.
pub const ROOT_NAME: &str = "root";

const SHADOW_MODE: u32 = 0o600;
const PASSWD_MODE: u32 = 0o644;
const GROUP_MODE: u32 = 0o644;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("account {name:?} not found in the {kind} store")]
    AccountNotFound { name: String, kind: StoreKind },
    #[error("account {name:?} appears {found} times in the {kind} store")]
    DuplicateAccount {
        name: String,
        kind: StoreKind,
        found: usize,
    },
    #[error("refusing to operate on the root account")]
    ForbiddenAccount,
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Substitution(#[from] SubstError),
    #[error("failed to move home directory {from:?} to {to:?}: {source}")]
    HomeMigration {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    #[error(transparent)]
    Commit(#[from] CommitError),
}

/// Runs full read-decide-write passes over the account store.
///
/// Each pass materializes a whole store file into records, rewrites the
/// affected ones, and commits by whole-file replace. Nothing is written
/// until every decision for that operation has succeeded, so a failed
/// pass leaves the store's prior bytes on disk.
pub struct AccountEngine {
    paths: StorePaths,
}

impl AccountEngine {
    pub fn new(paths: StorePaths) -> Self {
        Self { paths }
    }

    fn read_store(&self, path: &Path) -> Result<String, EngineError> {
        fs::read_to_string(path).map_err(|e| EngineError::Read {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Rewrite the shadow hash of `username` to a fresh SHA-512-crypt of
    /// `plaintext`, leaving every other record untouched. Returns the
    /// hash that was written.
    pub fn change_password(
        &self,
        username: &str,
        plaintext: &str,
    ) -> Result<String, EngineError> {
        if username == ROOT_NAME {
            return Err(EngineError::ForbiddenAccount);
        }

        let raw = self.read_store(&self.paths.shadow)?;
        let mut records = parser::parse_shadow(&raw)?;

        let hash = password::hash_password(plaintext)?;
        let mut matches = 0;
        for record in &mut records {
            if record.name == username {
                record.hash = hash.clone();
                matches += 1;
            }
        }
        require_unique(username, StoreKind::Shadow, matches)?;

        commit::replace_file(
            &self.paths.shadow,
            &parser::serialize_shadow(&records),
            SHADOW_MODE,
        )?;
        info!(account = username, "changed password hash in shadow store");
        Ok(hash)
    }

    /// Rename `old` to `new` across the shadow, passwd and group stores
    /// and move the home directory.
    ///
    /// The home directory moves after all three rebuilt record sets are
    /// ready and before any file is committed, so a failed move leaves
    /// every store untouched. The stores are then committed as three
    /// independent whole-file replacements in fixed order: shadow, group,
    /// passwd.
    pub fn rename_user(&self, old: &str, new: &str) -> Result<(), EngineError> {
        if old == ROOT_NAME || new == ROOT_NAME {
            return Err(EngineError::ForbiddenAccount);
        }

        let shadow_raw = self.read_store(&self.paths.shadow)?;
        let passwd_raw = self.read_store(&self.paths.passwd)?;
        let group_raw = self.read_store(&self.paths.group)?;

        let mut shadow = parser::parse_shadow(&shadow_raw)?;
        let mut passwd = parser::parse_passwd(&passwd_raw)?;
        let mut groups = parser::parse_group(&group_raw)?;

        // Shadow pass: username field only, everything else verbatim.
        let mut matches = 0;
        for record in &mut shadow {
            if record.name == old {
                record.name = new.to_string();
                matches += 1;
            }
        }
        require_unique(old, StoreKind::Shadow, matches)?;

        // Passwd pass: capture the home directory before rewriting it.
        let mut homes: Option<(PathBuf, PathBuf)> = None;
        matches = 0;
        for record in &mut passwd {
            if record.name == old {
                let new_home = subst::replace_all(&record.home, old, new)?;
                homes = Some((PathBuf::from(&record.home), PathBuf::from(&new_home)));
                record.home = new_home;
                record.name = new.to_string();
                matches += 1;
            }
        }
        require_unique(old, StoreKind::Passwd, matches)?;
        let (old_home, new_home) = homes.ok_or_else(|| EngineError::AccountNotFound {
            name: old.to_string(),
            kind: StoreKind::Passwd,
        })?;

        // Group pass: select groups by exact token membership, then
        // substitute across the raw member list.
        for record in &mut groups {
            if record.member_names().any(|member| member == old) {
                record.members = subst::replace_all(&record.members, old, new)?;
            }
        }

        if old_home != new_home {
            debug!(from = ?old_home, to = ?new_home, "moving home directory");
            fs::rename(&old_home, &new_home).map_err(|e| EngineError::HomeMigration {
                from: old_home.clone(),
                to: new_home.clone(),
                source: e,
            })?;
        }

        commit::replace_file(
            &self.paths.shadow,
            &parser::serialize_shadow(&shadow),
            SHADOW_MODE,
        )?;
        commit::replace_file(
            &self.paths.group,
            &parser::serialize_group(&groups),
            GROUP_MODE,
        )?;
        commit::replace_file(
            &self.paths.passwd,
            &parser::serialize_passwd(&passwd),
            PASSWD_MODE,
        )?;

        info!(
            from = old,
            to = new,
            "renamed account across shadow, group and passwd stores"
        );
        Ok(())
    }
}

fn require_unique(name: &str, kind: StoreKind, matches: usize) -> Result<(), EngineError> {
    match matches {
        0 => Err(EngineError::AccountNotFound {
            name: name.to_string(),
            kind,
        }),
        1 => Ok(()),
        found => Err(EngineError::DuplicateAccount {
            name: name.to_string(),
            kind,
            found,
        }),
    }
}
