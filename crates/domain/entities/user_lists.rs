use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::{user_list_items, user_lists};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = user_lists)]
pub struct UserListEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub category: Option<String>,
    pub progress: i32,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = user_lists)]
pub struct InsertUserListEntity {
    pub user_id: Uuid,
    pub title: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, AsChangeset)]
#[diesel(table_name = user_lists)]
pub struct UpdateUserListEntity {
    pub title: Option<String>,
    pub category: Option<String>,
    pub is_archived: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = user_list_items)]
pub struct UserListItemEntity {
    pub id: Uuid,
    pub list_id: Uuid,
    pub content: String,
    pub is_completed: bool,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = user_list_items)]
pub struct InsertUserListItemEntity {
    pub list_id: Uuid,
    pub content: String,
    pub position: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, AsChangeset)]
#[diesel(table_name = user_list_items)]
pub struct UpdateUserListItemEntity {
    pub content: Option<String>,
    pub is_completed: Option<bool>,
    pub position: Option<i32>,
}
