//! In-memory adapter for every persistence port.
//!
//! [`MemoryStore`] keeps users, relationship rows, list entries, watch
//! history and notifications behind one `std::sync::Mutex`. The lock is
//! never held across an await, and each port call either applies completely
//! or not at all. It backs the server when no database URL is configured and
//! drives the HTTP integration tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    AnimeListRepository, AnimeListRepositoryError, NotificationRepository,
    NotificationRepositoryError, PairCommit, RelationshipRepository, RelationshipRepositoryError,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    AnimeListEntry, Email, NewNotification, Notification, NotificationChange, PairState,
    Relationships, TitleId, User, UserId, WatchEvent,
};

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    /// Both directions of every friendship.
    friendships: BTreeSet<(UserId, UserId)>,
    /// Pending requests as `(from, to)`.
    requests: BTreeSet<(UserId, UserId)>,
    entries: HashMap<UserId, BTreeMap<TitleId, AnimeListEntry>>,
    history: HashMap<UserId, Vec<WatchEvent>>,
    notifications: Vec<Notification>,
}

impl State {
    fn relationships(&self, user: &UserId) -> Relationships {
        let outgoing = |rows: &BTreeSet<(UserId, UserId)>| -> Vec<UserId> {
            rows.iter()
                .filter(|(from, _)| from == user)
                .map(|(_, to)| to.clone())
                .collect()
        };
        let received = self
            .requests
            .iter()
            .filter(|(_, to)| to == user)
            .map(|(from, _)| from.clone())
            .collect::<Vec<_>>();
        Relationships::from_parts(
            user.clone(),
            outgoing(&self.friendships),
            outgoing(&self.requests),
            received,
        )
    }

    fn apply_pair(&mut self, change: &PairCommit) {
        let (a, b) = (&change.first, &change.second);
        for (x, y) in [(a, b), (b, a)] {
            let row = (x.clone(), y.clone());
            self.friendships.remove(&row);
            self.requests.remove(&row);
        }
        match &change.state {
            PairState::Unrelated => {}
            PairState::Friends => {
                self.friendships.insert((a.clone(), b.clone()));
                self.friendships.insert((b.clone(), a.clone()));
            }
            PairState::Pending { from, to } => {
                self.requests.insert((from.clone(), to.clone()));
            }
        }
        match &change.notification {
            Some(NotificationChange::Create(new)) => self.insert_notification(new),
            Some(NotificationChange::Resolve {
                recipient,
                actor,
                resolution,
            }) => {
                for record in self
                    .notifications
                    .iter_mut()
                    .filter(|n| n.is_pending_request(recipient, actor))
                {
                    record.resolution = *resolution;
                }
            }
            None => {}
        }
    }

    fn insert_notification(&mut self, new: &NewNotification) {
        self.notifications.push(new.clone().into_notification());
    }
}

/// Thread-safe in-memory implementation of the persistence ports.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_relationship_commits: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent relationship commit fail without writing.
    ///
    /// Used to exercise the rollback path from integration tests.
    pub fn fail_relationship_commits(&self, fail: bool) {
        self.fail_relationship_commits.store(fail, Ordering::SeqCst);
    }

    fn lock<E>(&self, poisoned: impl FnOnce(&'static str) -> E) -> Result<MutexGuard<'_, State>, E> {
        self.state
            .lock()
            .map_err(|_| poisoned("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.lock(UserPersistenceError::query)?;
        if state.users.values().any(|u| u.email() == user.email()) {
            return Err(UserPersistenceError::duplicate_email(user.email().as_ref()));
        }
        state.users.insert(user.id().clone(), user.clone());
        Ok(())
    }

    async fn update_profile(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.lock(UserPersistenceError::query)?;
        let stored = state
            .users
            .get_mut(user.id())
            .ok_or_else(|| UserPersistenceError::query("record not found"))?;
        stored.profile = user.profile.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock(UserPersistenceError::query)?;
        Ok(state.users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock(UserPersistenceError::query)?;
        Ok(state.users.values().find(|u| u.email() == email).cloned())
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        let state = self.lock(UserPersistenceError::query)?;
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl RelationshipRepository for MemoryStore {
    async fn load(
        &self,
        user: &UserId,
    ) -> Result<Option<Relationships>, RelationshipRepositoryError> {
        let state = self.lock(RelationshipRepositoryError::query)?;
        if !state.users.contains_key(user) {
            return Ok(None);
        }
        Ok(Some(state.relationships(user)))
    }

    async fn commit(&self, change: &PairCommit) -> Result<(), RelationshipRepositoryError> {
        let mut state = self.lock(RelationshipRepositoryError::query)?;
        if self.fail_relationship_commits.load(Ordering::SeqCst) {
            return Err(RelationshipRepositoryError::query("commit rejected"));
        }
        for user in [&change.first, &change.second] {
            if !state.users.contains_key(user) {
                return Err(RelationshipRepositoryError::query("record not found"));
            }
        }
        let current = state.relationships(&change.first).state_towards(&change.second);
        if current != change.expected {
            return Err(RelationshipRepositoryError::stale_state(format!(
                "expected {:?}, found {current:?}",
                change.expected
            )));
        }
        state.apply_pair(change);
        Ok(())
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn list_for(
        &self,
        recipient: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let state = self.lock(NotificationRepositoryError::query)?;
        let mut records: Vec<_> = state
            .notifications
            .iter()
            .filter(|n| n.recipient == *recipient)
            .cloned()
            .collect();
        records.sort_by_key(|n| n.created_at);
        Ok(records)
    }

    async fn mark_all_read(&self, recipient: &UserId) -> Result<usize, NotificationRepositoryError> {
        let mut state = self.lock(NotificationRepositoryError::query)?;
        let mut changed = 0;
        for record in state
            .notifications
            .iter_mut()
            .filter(|n| n.recipient == *recipient && !n.read)
        {
            record.read = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn unread_count(&self, recipient: &UserId) -> Result<usize, NotificationRepositoryError> {
        let state = self.lock(NotificationRepositoryError::query)?;
        Ok(state
            .notifications
            .iter()
            .filter(|n| n.recipient == *recipient && !n.read)
            .count())
    }
}

#[async_trait]
impl AnimeListRepository for MemoryStore {
    async fn entries(&self, user: &UserId) -> Result<Vec<AnimeListEntry>, AnimeListRepositoryError> {
        let state = self.lock(AnimeListRepositoryError::query)?;
        Ok(state
            .entries
            .get(user)
            .map(|list| list.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn find_entry(
        &self,
        user: &UserId,
        title_id: &TitleId,
    ) -> Result<Option<AnimeListEntry>, AnimeListRepositoryError> {
        let state = self.lock(AnimeListRepositoryError::query)?;
        Ok(state
            .entries
            .get(user)
            .and_then(|list| list.get(title_id))
            .cloned())
    }

    async fn save_entry(
        &self,
        user: &UserId,
        entry: &AnimeListEntry,
    ) -> Result<(), AnimeListRepositoryError> {
        let mut state = self.lock(AnimeListRepositoryError::query)?;
        state
            .entries
            .entry(user.clone())
            .or_default()
            .insert(entry.title_id.clone(), entry.clone());
        Ok(())
    }

    async fn delete_entry(
        &self,
        user: &UserId,
        title_id: &TitleId,
    ) -> Result<bool, AnimeListRepositoryError> {
        let mut state = self.lock(AnimeListRepositoryError::query)?;
        Ok(state
            .entries
            .get_mut(user)
            .is_some_and(|list| list.remove(title_id).is_some()))
    }

    async fn record_watch(
        &self,
        user: &UserId,
        event: &WatchEvent,
    ) -> Result<(), AnimeListRepositoryError> {
        let mut state = self.lock(AnimeListRepositoryError::query)?;
        if let Some(entry) = state
            .entries
            .get_mut(user)
            .and_then(|list| list.get_mut(&event.title_id))
        {
            entry.last_watched_at = Some(event.watched_at);
        }
        state
            .history
            .entry(user.clone())
            .or_default()
            .push(event.clone());
        Ok(())
    }

    async fn recent_history(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<WatchEvent>, AnimeListRepositoryError> {
        let state = self.lock(AnimeListRepositoryError::query)?;
        let mut events = state.history.get(user).cloned().unwrap_or_default();
        // Newest insert first among equal timestamps.
        events.reverse();
        events.sort_by(|a, b| b.watched_at.cmp(&a.watched_at));
        events.truncate(limit);
        Ok(events)
    }

    async fn history_since(
        &self,
        user: &UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<WatchEvent>, AnimeListRepositoryError> {
        let state = self.lock(AnimeListRepositoryError::query)?;
        Ok(state
            .history
            .get(user)
            .map(|events| {
                events
                    .iter()
                    .filter(|e| e.watched_at >= since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
