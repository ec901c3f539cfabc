use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use common::SubscriptionRead;
use model::entities::{recipe, subscription, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ServiceError, is_unique_violation};
use crate::recipes::minified;
use crate::toggle::{Membership, Toggle, apply};
use crate::users::to_read;

const ALREADY_SUBSCRIBED: &str = "You are already subscribed to this user.";
const NOT_SUBSCRIBED: &str = "You are not subscribed to this user.";
const SELF_SUBSCRIPTION: &str = "You cannot subscribe to yourself.";

/// Parses the `recipes_limit` query value. Anything that is not a
/// non-negative integer means "no limit".
pub fn parse_recipes_limit(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
}

/// Ids among `author_ids` that `viewer` follows. Anonymous viewers follow nobody.
pub(crate) async fn subscribed_author_ids<C: ConnectionTrait>(
    conn: &C,
    viewer: Option<i32>,
    author_ids: &[i32],
) -> Result<HashSet<i32>> {
    let Some(viewer_id) = viewer else {
        return Ok(HashSet::new());
    };
    if author_ids.is_empty() {
        return Ok(HashSet::new());
    }

    let rows = subscription::Entity::find()
        .filter(subscription::Column::SubscriberId.eq(viewer_id))
        .filter(subscription::Column::AuthorId.is_in(author_ids.iter().copied()))
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(|s| s.author_id).collect())
}

/// Builds the subscription view of `authors`, attaching each author's
/// recipes newest first, truncated to `recipes_limit`.
async fn assemble<C: ConnectionTrait>(
    conn: &C,
    authors: Vec<user::Model>,
    recipes_limit: Option<u64>,
) -> Result<Vec<SubscriptionRead>> {
    let author_ids: Vec<i32> = authors.iter().map(|a| a.id).collect();
    let mut by_author: BTreeMap<i32, Vec<recipe::Model>> = BTreeMap::new();
    if !author_ids.is_empty() {
        let recipes = recipe::Entity::find()
            .filter(recipe::Column::AuthorId.is_in(author_ids))
            .order_by_desc(recipe::Column::PubDate)
            .order_by_desc(recipe::Column::Id)
            .all(conn)
            .await?;
        for r in recipes {
            by_author.entry(r.author_id).or_default().push(r);
        }
    }

    Ok(authors
        .into_iter()
        .map(|author| {
            let recipes = by_author.remove(&author.id).unwrap_or_default();
            let recipes_count = recipes.len() as u64;
            let shown = match recipes_limit {
                Some(limit) => usize::try_from(limit).unwrap_or(usize::MAX),
                None => usize::MAX,
            };
            let user = to_read(author, true);
            SubscriptionRead {
                email: user.email,
                id: user.id,
                username: user.username,
                first_name: user.first_name,
                last_name: user.last_name,
                is_subscribed: user.is_subscribed,
                avatar: user.avatar,
                recipes: recipes.into_iter().take(shown).map(minified).collect(),
                recipes_count,
            }
        })
        .collect())
}

/// Makes `subscriber_id` follow `author_id`.
#[instrument(skip(db))]
pub async fn subscribe(
    db: &DatabaseConnection,
    subscriber_id: i32,
    author_id: i32,
    recipes_limit: Option<u64>,
) -> Result<SubscriptionRead> {
    let txn = db.begin().await?;
    let author = user::Entity::find_by_id(author_id)
        .one(&txn)
        .await?
        .ok_or_else(|| {
            warn!("User with ID {} not found", author_id);
            ServiceError::NotFound(format!("User with ID {} not found", author_id))
        })?;

    if subscriber_id == author_id {
        debug!("User {} attempted to subscribe to themselves", subscriber_id);
        return Err(ServiceError::Conflict(SELF_SUBSCRIPTION.to_string()));
    }

    let current: Membership = subscription::Entity::find_by_id((subscriber_id, author_id))
        .one(&txn)
        .await?
        .is_some()
        .into();
    apply(current, Toggle::Add).map_err(|_| ServiceError::Conflict(ALREADY_SUBSCRIBED.to_string()))?;

    let inserted = subscription::ActiveModel {
        subscriber_id: Set(subscriber_id),
        author_id: Set(author_id),
        created_at: Set(Utc::now()),
    }
    .insert(&txn)
    .await;
    match inserted {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => {
            return Err(ServiceError::Conflict(ALREADY_SUBSCRIBED.to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    let mut view = assemble(&txn, vec![author], recipes_limit).await?;
    txn.commit().await?;

    info!("User {} subscribed to {}", subscriber_id, author_id);
    view.pop()
        .ok_or_else(|| ServiceError::NotFound(format!("User with ID {} not found", author_id)))
}

#[instrument(skip(db))]
pub async fn unsubscribe(db: &DatabaseConnection, subscriber_id: i32, author_id: i32) -> Result<()> {
    let txn = db.begin().await?;
    if user::Entity::find_by_id(author_id).one(&txn).await?.is_none() {
        warn!("User with ID {} not found", author_id);
        return Err(ServiceError::NotFound(format!(
            "User with ID {} not found",
            author_id
        )));
    }

    let current: Membership = subscription::Entity::find_by_id((subscriber_id, author_id))
        .one(&txn)
        .await?
        .is_some()
        .into();
    apply(current, Toggle::Remove).map_err(|_| ServiceError::NotFound(NOT_SUBSCRIBED.to_string()))?;

    subscription::Entity::delete_by_id((subscriber_id, author_id))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    info!("User {} unsubscribed from {}", subscriber_id, author_id);
    Ok(())
}

/// Authors followed by `subscriber_id`, ordered by id.
#[instrument(skip(db))]
pub async fn list(
    db: &DatabaseConnection,
    subscriber_id: i32,
    recipes_limit: Option<u64>,
) -> Result<Vec<SubscriptionRead>> {
    let author_ids: Vec<i32> = subscription::Entity::find()
        .filter(subscription::Column::SubscriberId.eq(subscriber_id))
        .all(db)
        .await?
        .into_iter()
        .map(|s| s.author_id)
        .collect();
    debug!("User {} follows {} authors", subscriber_id, author_ids.len());
    if author_ids.is_empty() {
        return Ok(Vec::new());
    }

    let authors = user::Entity::find()
        .filter(user::Column::Id.is_in(author_ids))
        .order_by_asc(user::Column::Id)
        .all(db)
        .await?;
    assemble(db, authors, recipes_limit).await
}
