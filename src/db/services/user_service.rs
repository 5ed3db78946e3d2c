use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set};

use crate::db::entities::{prelude::*, user};

// --- User Service Functions ---

/// Creates a new user. A taken username surfaces as the storage layer's
/// unique-constraint error.
pub async fn create_user<C: ConnectionTrait>(
    conn: &C,
    username: &str,
    password_hash: &str,
) -> Result<user::Model, DbErr> {
    let now = Utc::now();
    let new_user = user::ActiveModel {
        username: Set(username.to_owned()),
        password_hash: Set(password_hash.to_owned()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    new_user.insert(conn).await
}

pub async fn get_user_by_id<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<Option<user::Model>, DbErr> {
    User::find_by_id(user_id).one(conn).await
}

pub async fn get_user_by_username<C: ConnectionTrait>(
    conn: &C,
    username: &str,
) -> Result<Option<user::Model>, DbErr> {
    User::find()
        .filter(user::Column::Username.eq(username))
        .one(conn)
        .await
}
