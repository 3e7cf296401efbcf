//! User registry: who has talked to the bot, who is registered, who blocked it
//!
//! Every state-changing call writes the whole registry through its
//! [`SnapshotStore`] before returning. A failed write is logged and the
//! in-memory state stays authoritative until the next successful write.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Days, NaiveDate};

use crate::core::error::AppResult;
use crate::core::types::{Lang, UserId};
use crate::storage::snapshot::{Snapshot, SnapshotStore, StoredDocument};

/// Answer label for the user's name
pub const NAME_LABEL: &str = "name";
/// Answer label for the user's phone
pub const PHONE_LABEL: &str = "phone";

/// In-memory registry backed by a JSON snapshot
#[derive(Debug)]
pub struct UserRegistry {
    users: HashSet<UserId>,
    blocked: HashSet<UserId>,
    daily: HashMap<NaiveDate, HashSet<UserId>>,
    registrations: HashMap<UserId, BTreeMap<String, String>>,
    documents: HashMap<UserId, Vec<StoredDocument>>,
    languages: HashMap<UserId, Lang>,
    /// Days of daily activity to keep; 0 keeps everything
    daily_retention_days: u32,
    store: SnapshotStore,
}

impl UserRegistry {
    /// Empty registry writing to `store`
    pub fn new(store: SnapshotStore, daily_retention_days: u32) -> Self {
        Self::from_snapshot(Snapshot::default(), store, daily_retention_days)
    }

    /// Rebuilds the registry from a loaded snapshot
    pub fn from_snapshot(snapshot: Snapshot, store: SnapshotStore, daily_retention_days: u32) -> Self {
        Self {
            users: snapshot.users.into_iter().collect(),
            blocked: snapshot.blocked_users.into_iter().collect(),
            daily: snapshot
                .daily_users
                .into_iter()
                .map(|(day, ids)| (day, ids.into_iter().collect()))
                .collect(),
            registrations: snapshot.registered_users.into_iter().collect(),
            documents: snapshot.user_documents.into_iter().collect(),
            languages: snapshot.user_languages.into_iter().collect(),
            daily_retention_days,
            store,
        }
    }

    /// Loads the snapshot from `store` and builds a registry around it
    pub fn open(store: SnapshotStore, daily_retention_days: u32) -> AppResult<Self> {
        let snapshot = store.load()?;
        Ok(Self::from_snapshot(snapshot, store, daily_retention_days))
    }

    /// Current state in persistent form
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            users: self.users.iter().copied().collect(),
            blocked_users: self.blocked.iter().copied().collect(),
            daily_users: self
                .daily
                .iter()
                .map(|(day, ids)| (*day, ids.iter().copied().collect()))
                .collect(),
            registered_users: self
                .registrations
                .iter()
                .map(|(id, answers)| (*id, answers.clone()))
                .collect(),
            user_documents: self.documents.iter().map(|(id, docs)| (*id, docs.clone())).collect(),
            user_languages: self.languages.iter().map(|(id, lang)| (*id, *lang)).collect(),
        }
    }

    fn flush(&self) {
        if let Err(e) = self.store.save(&self.snapshot()) {
            log::error!("Failed to save registry snapshot: {}", e);
        }
    }

    /// Marks a user as known and active on `today`.
    ///
    /// Daily buckets older than the retention window are dropped.
    pub fn record_contact(&mut self, user: UserId, today: NaiveDate) {
        let is_new_user = self.users.insert(user);
        let is_new_today = self.daily.entry(today).or_default().insert(user);
        let pruned = self.prune_daily(today);

        if is_new_user {
            log::info!("New user {}", user);
        }
        if is_new_user || is_new_today || pruned {
            self.flush();
        }
    }

    fn prune_daily(&mut self, today: NaiveDate) -> bool {
        if self.daily_retention_days == 0 {
            return false;
        }
        let Some(cutoff) = today.checked_sub_days(Days::new(u64::from(self.daily_retention_days))) else {
            return false;
        };
        let before = self.daily.len();
        self.daily.retain(|day, _| *day > cutoff);
        self.daily.len() != before
    }

    /// Adds a user to the blocked set. Idempotent.
    pub fn block(&mut self, user: UserId) {
        if self.blocked.insert(user) {
            log::warn!("User {} is now marked as blocked", user);
            self.flush();
        }
    }

    pub fn is_blocked(&self, user: UserId) -> bool {
        self.blocked.contains(&user)
    }

    /// Stores a verified registration (label -> answer), replacing any previous one
    pub fn commit_registration(&mut self, user: UserId, answers: BTreeMap<String, String>) {
        self.registrations.insert(user, answers);
        log::info!("User {} registered", user);
        self.flush();
    }

    pub fn is_registered(&self, user: UserId) -> bool {
        self.registrations.contains_key(&user)
    }

    pub fn registration(&self, user: UserId) -> Option<&BTreeMap<String, String>> {
        self.registrations.get(&user)
    }

    /// Stores the confirmed document set, replacing any previous one
    pub fn commit_documents(&mut self, user: UserId, documents: Vec<StoredDocument>) {
        log::info!("User {} submitted {} documents", user, documents.len());
        self.documents.insert(user, documents);
        self.flush();
    }

    pub fn documents(&self, user: UserId) -> Option<&[StoredDocument]> {
        self.documents.get(&user).map(Vec::as_slice)
    }

    /// Chosen language, or the default when none was chosen
    pub fn language(&self, user: UserId) -> Lang {
        self.languages.get(&user).copied().unwrap_or_default()
    }

    pub fn set_language(&mut self, user: UserId, lang: Lang) {
        if self.languages.insert(user, lang) != Some(lang) {
            self.flush();
        }
    }

    pub fn total_users(&self) -> usize {
        self.users.len()
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.len()
    }

    /// Distinct users seen on `date`
    pub fn active_count(&self, date: NaiveDate) -> usize {
        self.daily.get(&date).map_or(0, HashSet::len)
    }

    /// Known users who are not blocked, in a stable order
    pub fn broadcast_candidates(&self) -> Vec<UserId> {
        let mut candidates: Vec<UserId> = self.users.difference(&self.blocked).copied().collect();
        candidates.sort();
        candidates
    }
}
