//! SeaORM entities.

use sea_orm::EntityTrait;

pub mod author;
pub mod post;
pub mod user;

/// Entities listed in insertion order.
pub trait Chronological: EntityTrait {
    fn created_at() -> Self::Column;
}

impl Chronological for user::Entity {
    fn created_at() -> Self::Column {
        user::Column::CreatedAt
    }
}

impl Chronological for author::Entity {
    fn created_at() -> Self::Column {
        author::Column::CreatedAt
    }
}

impl Chronological for post::Entity {
    fn created_at() -> Self::Column {
        post::Column::CreatedAt
    }
}
