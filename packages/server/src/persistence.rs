//! Typed data access for songs and files.
//!
//! Every function takes any [`ConnectionTrait`] so handlers can pass the pooled
//! connection from [`AppState`](crate::state::AppState) or an open transaction.

use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, QueryOrder, Set};

use crate::entity::{file, song};

pub async fn create_song<C: ConnectionTrait>(
    db: &C,
    id: i32,
    file_id: i32,
) -> Result<song::Model, DbErr> {
    song::ActiveModel {
        id: Set(id),
        file_id: Set(file_id),
    }
    .insert(db)
    .await
}

pub async fn find_song<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<song::Model>, DbErr> {
    song::Entity::find_by_id(id).one(db).await
}

/// All songs, ordered by id.
pub async fn list_songs<C: ConnectionTrait>(db: &C) -> Result<Vec<song::Model>, DbErr> {
    song::Entity::find()
        .order_by_asc(song::Column::Id)
        .all(db)
        .await
}

pub async fn create_file<C: ConnectionTrait>(
    db: &C,
    filename: &str,
) -> Result<file::Model, DbErr> {
    file::ActiveModel {
        filename: Set(filename.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn find_file<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<file::Model>, DbErr> {
    file::Entity::find_by_id(id).one(db).await
}

/// All files, ordered by id. Positional resolution indexes into this order.
pub async fn list_files<C: ConnectionTrait>(db: &C) -> Result<Vec<file::Model>, DbErr> {
    file::Entity::find()
        .order_by_asc(file::Column::Id)
        .all(db)
        .await
}
