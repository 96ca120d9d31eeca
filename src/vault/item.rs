//! Vault items and settings as they exist inside a decrypted vault.
//!
//! Field names serialize in camelCase so the plaintext JSON matches the
//! vault schema shared with other clients.  Every struct here rejects
//! unknown fields: an unexpected shape is a schema error, never silently
//! coerced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Default sync interval in milliseconds (5 minutes).
pub const DEFAULT_SYNC_INTERVAL_MS: u64 = 300_000;

/// Default git branch used by the sync collaborator.
pub const DEFAULT_GIT_BRANCH: &str = "main";

/// A single credential record.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VaultItem {
    /// Opaque unique identifier.  Never changes once assigned.
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    pub password: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Free-form labels, order preserved.
    #[serde(default)]
    pub tags: Vec<String>,

    #[zeroize(skip)]
    pub created_at: DateTime<Utc>,

    #[zeroize(skip)]
    pub updated_at: DateTime<Utc>,

    #[zeroize(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for VaultItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultItem")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("url", &self.url)
            .field("notes", &self.notes.as_ref().map(|_| "<redacted>"))
            .field("tags", &self.tags)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("last_used", &self.last_used)
            .finish()
    }
}

impl VaultItem {
    /// Build a brand-new item from caller-supplied fields.
    pub(crate) fn create(id: String, fields: NewItem, now: DateTime<Utc>) -> Self {
        let NewItem {
            name,
            username,
            password,
            url,
            notes,
            tags,
        } = fields;

        Self {
            id,
            name,
            username,
            password,
            url,
            notes,
            tags,
            created_at: now,
            updated_at: now,
            last_used: None,
        }
    }

    /// Merge `update` over this item.
    ///
    /// `id` and `created_at` are preserved; `updated_at` never moves
    /// backwards even if the wall clock does.  Replaced secret strings are
    /// zeroized before being dropped.
    pub(crate) fn apply(&mut self, update: ItemUpdate, now: DateTime<Utc>) {
        let ItemUpdate {
            name,
            username,
            password,
            url,
            notes,
            tags,
            last_used,
        } = update;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(username) = username {
            replace_wiping(&mut self.username, Some(username));
        }
        if let Some(mut password) = password {
            std::mem::swap(&mut self.password, &mut password);
            password.zeroize();
        }
        if let Some(url) = url {
            self.url = Some(url);
        }
        if let Some(notes) = notes {
            replace_wiping(&mut self.notes, Some(notes));
        }
        if let Some(tags) = tags {
            self.tags = tags;
        }
        if let Some(last_used) = last_used {
            self.last_used = Some(last_used);
        }

        self.updated_at = self.updated_at.max(now);
    }

    /// Case-insensitive substring match against name, username, url,
    /// notes, and each tag.  `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        let hit = |s: &str| s.to_lowercase().contains(needle);

        hit(&self.name)
            || self.username.as_deref().is_some_and(hit)
            || self.url.as_deref().is_some_and(hit)
            || self.notes.as_deref().is_some_and(hit)
            || self.tags.iter().any(|t| hit(t))
    }
}

fn replace_wiping(slot: &mut Option<String>, value: Option<String>) {
    let mut old = std::mem::replace(slot, value);
    old.zeroize();
}

/// Caller-supplied fields for a new item.  The engine assigns the id and
/// timestamps.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
    pub password: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewItem {
    /// Shorthand for the two required fields.
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

impl std::fmt::Debug for NewItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewItem")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("url", &self.url)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

/// Partial update for an existing item.  `None` leaves a field unchanged.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ItemUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub last_used: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for ItemUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemUpdate")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("url", &self.url)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

/// Sync-related configuration stored inside the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VaultSettings {
    #[serde(default)]
    pub sync_enabled: bool,

    #[serde(default)]
    pub auto_sync: bool,

    /// Milliseconds between automatic syncs.
    #[serde(default = "default_sync_interval")]
    pub sync_interval: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_remote: Option<String>,

    #[serde(default = "default_git_branch")]
    pub git_branch: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_sync_interval() -> u64 {
    DEFAULT_SYNC_INTERVAL_MS
}

fn default_git_branch() -> String {
    DEFAULT_GIT_BRANCH.to_string()
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            sync_enabled: false,
            auto_sync: false,
            sync_interval: default_sync_interval(),
            git_remote: None,
            git_branch: default_git_branch(),
        }
    }
}

/// Partial settings update.  `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub sync_enabled: Option<bool>,
    #[serde(default)]
    pub auto_sync: Option<bool>,
    #[serde(default)]
    pub sync_interval: Option<u64>,
    #[serde(default)]
    pub git_remote: Option<String>,
    #[serde(default)]
    pub git_branch: Option<String>,
}

impl VaultSettings {
    pub(crate) fn apply(&mut self, update: SettingsUpdate) {
        if let Some(v) = update.sync_enabled {
            self.sync_enabled = v;
        }
        if let Some(v) = update.auto_sync {
            self.auto_sync = v;
        }
        if let Some(v) = update.sync_interval {
            self.sync_interval = v;
        }
        if let Some(v) = update.git_remote {
            self.git_remote = Some(v);
        }
        if let Some(v) = update.git_branch {
            self.git_branch = v;
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(now: DateTime<Utc>) -> VaultItem {
        VaultItem::create(
            "id-1".into(),
            NewItem::new("GitHub", "ghPassword123")
                .username("john.doe")
                .url("https://github.com")
                .notes("Personal account")
                .tags(["dev", "Personal"]),
            now,
        )
    }

    #[test]
    fn create_sets_both_timestamps() {
        let now = Utc::now();
        let item = sample(now);
        assert_eq!(item.created_at, now);
        assert_eq!(item.updated_at, now);
        assert!(item.last_used.is_none());
    }

    #[test]
    fn apply_preserves_id_and_created_at() {
        let t0 = Utc::now();
        let mut item = sample(t0);
        let later = t0 + Duration::seconds(5);

        item.apply(
            ItemUpdate {
                name: Some("GitHub Work".into()),
                ..ItemUpdate::default()
            },
            later,
        );

        assert_eq!(item.id, "id-1");
        assert_eq!(item.created_at, t0);
        assert_eq!(item.updated_at, later);
        assert_eq!(item.name, "GitHub Work");
        assert_eq!(item.password, "ghPassword123");
    }

    #[test]
    fn updated_at_never_moves_backwards() {
        let t0 = Utc::now();
        let mut item = sample(t0);
        item.apply(ItemUpdate::default(), t0 - Duration::hours(1));
        assert_eq!(item.updated_at, t0);
    }

    #[test]
    fn matches_every_searchable_field() {
        let item = sample(Utc::now());
        assert!(item.matches("github"));
        assert!(item.matches("john"));
        assert!(item.matches("https://"));
        assert!(item.matches("personal account"));
        assert!(item.matches("dev"));
        assert!(!item.matches("gitlab"));
    }

    #[test]
    fn matches_does_not_look_at_password() {
        let item = sample(Utc::now());
        assert!(!item.matches("ghpassword"));
    }

    #[test]
    fn debug_redacts_password() {
        let item = sample(Utc::now());
        let rendered = format!("{item:?}");
        assert!(!rendered.contains("ghPassword123"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn settings_defaults() {
        let s = VaultSettings::default();
        assert!(!s.sync_enabled);
        assert!(!s.auto_sync);
        assert_eq!(s.sync_interval, 300_000);
        assert_eq!(s.git_branch, "main");
        assert!(s.git_remote.is_none());
    }

    #[test]
    fn settings_missing_fields_take_defaults() {
        let s: VaultSettings = serde_json::from_str(r#"{"syncEnabled":true}"#).unwrap();
        assert!(s.sync_enabled);
        assert_eq!(s.sync_interval, 300_000);
        assert_eq!(s.git_branch, "main");
    }

    #[test]
    fn settings_apply_partial() {
        let mut s = VaultSettings::default();
        s.apply(SettingsUpdate {
            auto_sync: Some(true),
            git_remote: Some("git@example.com:me/vault.git".into()),
            ..SettingsUpdate::default()
        });
        assert!(s.auto_sync);
        assert!(!s.sync_enabled);
        assert_eq!(s.git_remote.as_deref(), Some("git@example.com:me/vault.git"));
        assert_eq!(s.git_branch, "main");
    }

    #[test]
    fn item_json_uses_camel_case() {
        let item = sample(Utc::now());
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("lastUsed").is_none());
    }
}
