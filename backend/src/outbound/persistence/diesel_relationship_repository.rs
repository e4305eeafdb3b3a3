//! PostgreSQL-backed `RelationshipRepository`.
//!
//! A pair commit locks both `users` rows in id order, checks that the pair
//! still holds the expected [`PairState`], deletes every friendship and
//! request row between the two users, writes the rows for the new state and
//! applies the notification change, all inside one transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{PairCommit, RelationshipRepository, RelationshipRepositoryError};
use crate::domain::{
    NotificationChange, NotificationKind, PairState, Relationships, Resolution, UserId,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewNotificationRow;
use super::pool::{DbPool, PoolError};
use super::schema::{friend_requests, friendships, notifications, users};

/// Diesel implementation of [`RelationshipRepository`].
#[derive(Clone)]
pub struct DieselRelationshipRepository {
    pool: DbPool,
}

impl DieselRelationshipRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> RelationshipRepositoryError {
    map_pool_error(error, RelationshipRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> RelationshipRepositoryError {
    map_diesel_error(
        error,
        RelationshipRepositoryError::query,
        RelationshipRepositoryError::connection,
    )
}

/// Failure inside the commit transaction.
enum CommitError {
    Diesel(diesel::result::Error),
    Stale { expected: PairState, found: PairState },
    MissingUser,
}

impl From<diesel::result::Error> for CommitError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

/// `SELECT ... FOR UPDATE` on both users, lower id first, so concurrent
/// commits on the same pair serialise instead of deadlocking.
async fn lock_pair(conn: &mut AsyncPgConnection, a: Uuid, b: Uuid) -> Result<(), CommitError> {
    let locked: Vec<Uuid> = users::table
        .filter(users::id.eq_any([a, b]))
        .order_by(users::id.asc())
        .select(users::id)
        .for_update()
        .load(conn)
        .await?;
    if locked.len() == 2 {
        Ok(())
    } else {
        Err(CommitError::MissingUser)
    }
}

async fn request_exists(
    conn: &mut AsyncPgConnection,
    from: Uuid,
    to: Uuid,
) -> Result<bool, diesel::result::Error> {
    diesel::select(diesel::dsl::exists(
        friend_requests::table
            .filter(friend_requests::from_user_id.eq(from))
            .filter(friend_requests::to_user_id.eq(to)),
    ))
    .get_result(conn)
    .await
}

async fn current_state(
    conn: &mut AsyncPgConnection,
    a: Uuid,
    b: Uuid,
) -> Result<PairState, diesel::result::Error> {
    let friends: bool = diesel::select(diesel::dsl::exists(
        friendships::table
            .filter(friendships::user_id.eq(a))
            .filter(friendships::friend_id.eq(b)),
    ))
    .get_result(conn)
    .await?;
    if friends {
        return Ok(PairState::Friends);
    }
    let (first, second) = (UserId::from_uuid(a), UserId::from_uuid(b));
    if request_exists(conn, a, b).await? {
        return Ok(PairState::Pending {
            from: first,
            to: second,
        });
    }
    if request_exists(conn, b, a).await? {
        return Ok(PairState::Pending {
            from: second,
            to: first,
        });
    }
    Ok(PairState::Unrelated)
}

async fn clear_pair(
    conn: &mut AsyncPgConnection,
    a: Uuid,
    b: Uuid,
) -> Result<(), diesel::result::Error> {
    diesel::delete(
        friendships::table.filter(
            (friendships::user_id.eq(a).and(friendships::friend_id.eq(b)))
                .or(friendships::user_id.eq(b).and(friendships::friend_id.eq(a))),
        ),
    )
    .execute(conn)
    .await?;
    diesel::delete(
        friend_requests::table.filter(
            (friend_requests::from_user_id
                .eq(a)
                .and(friend_requests::to_user_id.eq(b)))
            .or(friend_requests::from_user_id
                .eq(b)
                .and(friend_requests::to_user_id.eq(a))),
        ),
    )
    .execute(conn)
    .await?;
    Ok(())
}

async fn write_state(
    conn: &mut AsyncPgConnection,
    a: Uuid,
    b: Uuid,
    state: &PairState,
) -> Result<(), diesel::result::Error> {
    match state {
        PairState::Unrelated => {}
        PairState::Friends => {
            diesel::insert_into(friendships::table)
                .values(&vec![
                    (friendships::user_id.eq(a), friendships::friend_id.eq(b)),
                    (friendships::user_id.eq(b), friendships::friend_id.eq(a)),
                ])
                .execute(conn)
                .await?;
        }
        PairState::Pending { from, to } => {
            diesel::insert_into(friend_requests::table)
                .values((
                    friend_requests::from_user_id.eq(*from.as_uuid()),
                    friend_requests::to_user_id.eq(*to.as_uuid()),
                ))
                .execute(conn)
                .await?;
        }
    }
    Ok(())
}

async fn apply_notification(
    conn: &mut AsyncPgConnection,
    change: &NotificationChange,
) -> Result<(), diesel::result::Error> {
    match change {
        NotificationChange::Create(new) => {
            diesel::insert_into(notifications::table)
                .values(&NewNotificationRow::from_new(new))
                .execute(conn)
                .await?;
        }
        NotificationChange::Resolve {
            recipient,
            actor,
            resolution,
        } => {
            diesel::update(
                notifications::table
                    .filter(notifications::recipient_id.eq(*recipient.as_uuid()))
                    .filter(notifications::actor_id.eq(*actor.as_uuid()))
                    .filter(notifications::kind.eq(NotificationKind::FriendRequest.as_str()))
                    .filter(notifications::resolution.eq(Resolution::Pending.as_str())),
            )
            .set(notifications::resolution.eq(resolution.as_str()))
            .execute(conn)
            .await?;
        }
    }
    Ok(())
}

#[async_trait]
impl RelationshipRepository for DieselRelationshipRepository {
    async fn load(
        &self,
        user: &UserId,
    ) -> Result<Option<Relationships>, RelationshipRepositoryError> {
        let id = *user.as_uuid();
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        // One transaction so the three sets come from the same snapshot.
        let loaded = conn
            .transaction(|conn| {
                async move {
                    let exists = users::table
                        .find(id)
                        .select(users::id)
                        .first::<Uuid>(conn)
                        .await
                        .optional()?
                        .is_some();
                    if !exists {
                        return Ok(None);
                    }
                    let friends: Vec<Uuid> = friendships::table
                        .filter(friendships::user_id.eq(id))
                        .select(friendships::friend_id)
                        .load(conn)
                        .await?;
                    let sent: Vec<Uuid> = friend_requests::table
                        .filter(friend_requests::from_user_id.eq(id))
                        .select(friend_requests::to_user_id)
                        .load(conn)
                        .await?;
                    let received: Vec<Uuid> = friend_requests::table
                        .filter(friend_requests::to_user_id.eq(id))
                        .select(friend_requests::from_user_id)
                        .load(conn)
                        .await?;
                    Ok(Some((friends, sent, received)))
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;

        Ok(loaded.map(|(friends, sent, received)| {
            Relationships::from_parts(
                user.clone(),
                friends.into_iter().map(UserId::from_uuid),
                sent.into_iter().map(UserId::from_uuid),
                received.into_iter().map(UserId::from_uuid),
            )
        }))
    }

    async fn commit(&self, change: &PairCommit) -> Result<(), RelationshipRepositoryError> {
        let a = *change.first.as_uuid();
        let b = *change.second.as_uuid();
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        conn.transaction::<_, CommitError, _>(|conn| {
            async move {
                lock_pair(conn, a, b).await?;
                let found = current_state(conn, a, b).await?;
                if found != change.expected {
                    return Err(CommitError::Stale {
                        expected: change.expected.clone(),
                        found,
                    });
                }
                clear_pair(conn, a, b).await?;
                write_state(conn, a, b, &change.state).await?;
                if let Some(notification) = &change.notification {
                    apply_notification(conn, notification).await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|error| match error {
            CommitError::Diesel(error) => diesel_error(error),
            CommitError::Stale { expected, found } => RelationshipRepositoryError::stale_state(
                format!("expected {expected:?}, found {found:?}"),
            ),
            CommitError::MissingUser => RelationshipRepositoryError::query("record not found"),
        })
    }
}
