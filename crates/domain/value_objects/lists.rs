use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::user_lists::{UserListEntity, UserListItemEntity};

/// Percentage of completed items, rounded half away from zero. An empty list
/// has no progress.
pub fn compute_progress(completed: i64, total: i64) -> i32 {
    if total <= 0 {
        return 0;
    }
    let completed = completed.clamp(0, total);
    ((completed as f64 / total as f64) * 100.0).round() as i32
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListModel {
    pub title: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListModel {
    pub title: Option<String>,
    pub category: Option<String>,
    pub is_archived: Option<bool>,
}

impl UpdateListModel {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.category.is_none() && self.is_archived.is_none()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListItemModel {
    pub content: String,
    pub position: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListItemModel {
    pub content: Option<String>,
    pub is_completed: Option<bool>,
    pub position: Option<i32>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListItemDto {
    pub id: Uuid,
    pub content: String,
    pub is_completed: bool,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

impl From<UserListItemEntity> for ListItemDto {
    fn from(value: UserListItemEntity) -> Self {
        Self {
            id: value.id,
            content: value.content,
            is_completed: value.is_completed,
            position: value.position,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListDto {
    pub id: Uuid,
    pub title: String,
    pub category: Option<String>,
    pub progress: i32,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ListItemDto>>,
}

impl ListDto {
    pub fn with_items(list: UserListEntity, items: Vec<UserListItemEntity>) -> Self {
        let mut dto = Self::from(list);
        dto.items = Some(items.into_iter().map(ListItemDto::from).collect());
        dto
    }
}

impl From<UserListEntity> for ListDto {
    fn from(value: UserListEntity) -> Self {
        Self {
            id: value.id,
            title: value.title,
            category: value.category,
            progress: value.progress,
            is_archived: value.is_archived,
            created_at: value.created_at,
            updated_at: value.updated_at,
            items: None,
        }
    }
}

/// Result of an item mutation: the touched item (absent on delete) and the
/// list progress recomputed in the same transaction.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListItemMutationDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<ListItemDto>,
    pub progress: i32,
}
