use common::{AvatarRead, AvatarWrite, UserRead, UserWrite};
use model::entities::{auth_token, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::error::{FieldErrors, Result, ServiceError, is_unique_violation};
use crate::subscriptions::subscribed_author_ids;

pub fn to_read(model: user::Model, is_subscribed: bool) -> UserRead {
    UserRead {
        email: model.email,
        id: model.id,
        username: model.username,
        first_name: model.first_name,
        last_name: model.last_name,
        is_subscribed,
        avatar: model.avatar,
    }
}

pub(crate) async fn find_user(db: &DatabaseConnection, user_id: i32) -> Result<user::Model> {
    user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            warn!("User with ID {} not found", user_id);
            ServiceError::NotFound(format!("User with ID {} not found", user_id))
        })
}

/// Resolves an API token to its user. Unknown keys yield `None`.
#[instrument(skip_all)]
pub async fn find_by_token(db: &DatabaseConnection, key: &str) -> Result<Option<user::Model>> {
    let found = auth_token::Entity::find_by_id(key.to_string())
        .find_also_related(user::Entity)
        .one(db)
        .await?;
    Ok(found.and_then(|(_, user)| user))
}

/// Registers a user. Duplicate email or username is reported per field.
#[instrument(skip(db, write), fields(username = %write.username))]
pub async fn create(db: &DatabaseConnection, write: UserWrite) -> Result<UserRead> {
    write.validate()?;

    let mut duplicates = FieldErrors::new();
    let email_taken = user::Entity::find()
        .filter(user::Column::Email.eq(write.email.as_str()))
        .count(db)
        .await?
        > 0;
    if email_taken {
        duplicates.insert(
            "email".to_string(),
            vec!["A user with this email already exists.".to_string()],
        );
    }
    let username_taken = user::Entity::find()
        .filter(user::Column::Username.eq(write.username.as_str()))
        .count(db)
        .await?
        > 0;
    if username_taken {
        duplicates.insert(
            "username".to_string(),
            vec!["A user with this username already exists.".to_string()],
        );
    }
    if !duplicates.is_empty() {
        debug!("Rejecting registration with duplicate fields: {:?}", duplicates.keys());
        return Err(ServiceError::Validation(duplicates));
    }

    let inserted = user::ActiveModel {
        email: Set(write.email),
        username: Set(write.username),
        first_name: Set(write.first_name),
        last_name: Set(write.last_name),
        avatar: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await;

    match inserted {
        Ok(model) => {
            info!("Registered user {} with ID {}", model.username, model.id);
            Ok(to_read(model, false))
        }
        Err(e) if is_unique_violation(&e) => Err(ServiceError::field(
            "username",
            "A user with this email or username already exists.",
        )),
        Err(e) => Err(e.into()),
    }
}

/// All users ordered by id, with subscription flags relative to `viewer_id`.
#[instrument(skip(db))]
pub async fn list(db: &DatabaseConnection, viewer_id: i32) -> Result<Vec<UserRead>> {
    let users = user::Entity::find()
        .order_by_asc(user::Column::Id)
        .all(db)
        .await?;
    let ids: Vec<i32> = users.iter().map(|u| u.id).collect();
    let subscribed = subscribed_author_ids(db, Some(viewer_id), &ids).await?;

    Ok(users
        .into_iter()
        .map(|u| {
            let flag = subscribed.contains(&u.id);
            to_read(u, flag)
        })
        .collect())
}

#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, viewer_id: Option<i32>, user_id: i32) -> Result<UserRead> {
    let model = find_user(db, user_id).await?;
    let subscribed = subscribed_author_ids(db, viewer_id, &[model.id]).await?;
    let flag = subscribed.contains(&model.id);
    Ok(to_read(model, flag))
}

#[instrument(skip(db, write))]
pub async fn set_avatar(db: &DatabaseConnection, user_id: i32, write: AvatarWrite) -> Result<AvatarRead> {
    write.validate()?;
    let mut active = find_user(db, user_id).await?.into_active_model();
    active.avatar = Set(Some(write.avatar));
    let updated = active.update(db).await?;
    debug!("Avatar updated for user {}", user_id);
    Ok(AvatarRead {
        avatar: updated.avatar,
    })
}

#[instrument(skip(db))]
pub async fn clear_avatar(db: &DatabaseConnection, user_id: i32) -> Result<()> {
    let mut active = find_user(db, user_id).await?.into_active_model();
    active.avatar = Set(None);
    active.update(db).await?;
    debug!("Avatar cleared for user {}", user_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{new_user, setup_db};
    use chrono::Utc;
    use model::entities::subscription;

    fn write(email: &str, username: &str) -> UserWrite {
        UserWrite {
            email: email.to_string(),
            username: username.to_string(),
            first_name: "Ann".to_string(),
            last_name: "Cook".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates_per_field() {
        let db = setup_db().await;
        create(&db, write("ann@example.com", "ann")).await.unwrap();

        match create(&db, write("ann@example.com", "ann")).await {
            Err(ServiceError::Validation(fields)) => {
                assert!(fields.contains_key("email"));
                assert!(fields.contains_key("username"));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }

        match create(&db, write("other@example.com", "ann")).await {
            Err(ServiceError::Validation(fields)) => {
                assert!(!fields.contains_key("email"));
                assert!(fields.contains_key("username"));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_reports_subscription_for_viewer_only() {
        let db = setup_db().await;
        let ann = new_user(&db, "ann").await.unwrap();
        let bob = new_user(&db, "bob").await.unwrap();
        subscription::ActiveModel {
            subscriber_id: Set(ann.id),
            author_id: Set(bob.id),
            created_at: Set(Utc::now()),
        }
        .insert(&db)
        .await
        .unwrap();

        assert!(get(&db, Some(ann.id), bob.id).await.unwrap().is_subscribed);
        assert!(!get(&db, None, bob.id).await.unwrap().is_subscribed);
        assert!(!get(&db, Some(bob.id), ann.id).await.unwrap().is_subscribed);

        let listed = list(&db, ann.id).await.unwrap();
        let flags: Vec<(i32, bool)> = listed.iter().map(|u| (u.id, u.is_subscribed)).collect();
        assert_eq!(flags, vec![(ann.id, false), (bob.id, true)]);
    }

    #[tokio::test]
    async fn test_avatar_set_and_clear() {
        let db = setup_db().await;
        let ann = new_user(&db, "ann").await.unwrap();

        let read = set_avatar(
            &db,
            ann.id,
            AvatarWrite {
                avatar: "data:image/png;base64,AAAA".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(read.avatar.as_deref(), Some("data:image/png;base64,AAAA"));

        clear_avatar(&db, ann.id).await.unwrap();
        assert_eq!(get(&db, None, ann.id).await.unwrap().avatar, None);
    }

    #[tokio::test]
    async fn test_find_by_token() {
        let db = setup_db().await;
        let ann = new_user(&db, "ann").await.unwrap();
        auth_token::ActiveModel {
            key: Set("secret".to_string()),
            user_id: Set(ann.id),
            created: Set(Utc::now()),
        }
        .insert(&db)
        .await
        .unwrap();

        let found = find_by_token(&db, "secret").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(ann.id));
        assert!(find_by_token(&db, "unknown").await.unwrap().is_none());
    }
}
