use std::sync::Arc;

use axum::http::StatusCode;
use crates::domain::{
    entities::user_lists::{
        InsertUserListEntity, InsertUserListItemEntity, UpdateUserListEntity,
        UpdateUserListItemEntity,
    },
    repositories::lists::ListRepository,
    value_objects::{
        clock::Clock,
        lists::{
            CreateListItemModel, CreateListModel, ListDto, ListItemDto, ListItemMutationDto,
            UpdateListItemModel, UpdateListModel,
        },
    },
};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::axum_http::error_responses::ApiError;

#[derive(Debug, Error)]
pub enum ListError {
    #[error("{0}")]
    Validation(String),
    #[error("List not found")]
    ListNotFound,
    #[error("List item not found")]
    ItemNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError for ListError {
    fn status_code(&self) -> StatusCode {
        match self {
            ListError::Validation(_) => StatusCode::BAD_REQUEST,
            ListError::ListNotFound | ListError::ItemNotFound => StatusCode::NOT_FOUND,
            ListError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ListError::Validation(_) => "VALIDATION_ERROR",
            ListError::ListNotFound => "LIST_NOT_FOUND",
            ListError::ItemNotFound => "ITEM_NOT_FOUND",
            ListError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ListError>;

fn non_empty(value: &str, field: &str) -> UseCaseResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ListError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn internal(operation: &str, user_id: Uuid, err: anyhow::Error) -> ListError {
    error!(operation, %user_id, db_error = ?err, "lists: repository call failed");
    ListError::Internal(err)
}

pub struct ListUseCase<L>
where
    L: ListRepository + Send + Sync + 'static,
{
    list_repo: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<L> ListUseCase<L>
where
    L: ListRepository + Send + Sync + 'static,
{
    pub fn new(list_repo: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self { list_repo, clock }
    }

    pub async fn list(&self, user_id: Uuid, include_archived: bool) -> UseCaseResult<Vec<ListDto>> {
        let lists = self
            .list_repo
            .list_for_user(user_id, include_archived)
            .await
            .map_err(|err| internal("list", user_id, err))?;

        Ok(lists.into_iter().map(ListDto::from).collect())
    }

    pub async fn get(&self, user_id: Uuid, list_id: Uuid) -> UseCaseResult<ListDto> {
        let (list, items) = self
            .list_repo
            .find_with_items(user_id, list_id)
            .await
            .map_err(|err| internal("get", user_id, err))?
            .ok_or(ListError::ListNotFound)?;

        Ok(ListDto::with_items(list, items))
    }

    pub async fn create(&self, user_id: Uuid, model: CreateListModel) -> UseCaseResult<ListDto> {
        let title = non_empty(&model.title, "title")?;
        let category = model
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let list = self
            .list_repo
            .create_list(InsertUserListEntity {
                user_id,
                title,
                category,
            })
            .await
            .map_err(|err| internal("create", user_id, err))?;

        info!(%user_id, list_id = %list.id, "lists: list created");
        Ok(ListDto::from(list))
    }

    /// Title, category and archive flag; archiving is just `isArchived: true`.
    pub async fn update(
        &self,
        user_id: Uuid,
        list_id: Uuid,
        model: UpdateListModel,
    ) -> UseCaseResult<ListDto> {
        if model.is_empty() {
            return Err(ListError::Validation("nothing to update".to_string()));
        }

        let changes = UpdateUserListEntity {
            title: model.title.as_deref().map(|t| non_empty(t, "title")).transpose()?,
            category: model
                .category
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            is_archived: model.is_archived,
            updated_at: Some(self.clock.now()),
        };

        let list = self
            .list_repo
            .update_list(user_id, list_id, changes)
            .await
            .map_err(|err| internal("update", user_id, err))?
            .ok_or(ListError::ListNotFound)?;

        Ok(ListDto::from(list))
    }

    pub async fn delete(&self, user_id: Uuid, list_id: Uuid) -> UseCaseResult<()> {
        let deleted = self
            .list_repo
            .delete_list(user_id, list_id)
            .await
            .map_err(|err| internal("delete", user_id, err))?;

        if !deleted {
            return Err(ListError::ListNotFound);
        }
        info!(%user_id, %list_id, "lists: list deleted");
        Ok(())
    }

    pub async fn add_item(
        &self,
        user_id: Uuid,
        list_id: Uuid,
        model: CreateListItemModel,
    ) -> UseCaseResult<ListItemMutationDto> {
        let content = non_empty(&model.content, "content")?;

        let (item, progress) = self
            .list_repo
            .add_item(
                user_id,
                InsertUserListItemEntity {
                    list_id,
                    content,
                    position: model.position.unwrap_or(0),
                },
            )
            .await
            .map_err(|err| internal("add_item", user_id, err))?
            .ok_or(ListError::ListNotFound)?;

        Ok(ListItemMutationDto {
            item: Some(ListItemDto::from(item)),
            progress,
        })
    }

    pub async fn update_item(
        &self,
        user_id: Uuid,
        list_id: Uuid,
        item_id: Uuid,
        model: UpdateListItemModel,
    ) -> UseCaseResult<ListItemMutationDto> {
        let changes = UpdateUserListItemEntity {
            content: model
                .content
                .as_deref()
                .map(|c| non_empty(c, "content"))
                .transpose()?,
            is_completed: model.is_completed,
            position: model.position,
        };
        if changes == UpdateUserListItemEntity::default() {
            return Err(ListError::Validation("nothing to update".to_string()));
        }

        let (item, progress) = self
            .list_repo
            .update_item(user_id, list_id, item_id, changes)
            .await
            .map_err(|err| internal("update_item", user_id, err))?
            .ok_or(ListError::ItemNotFound)?;

        Ok(ListItemMutationDto {
            item: Some(ListItemDto::from(item)),
            progress,
        })
    }

    pub async fn delete_item(
        &self,
        user_id: Uuid,
        list_id: Uuid,
        item_id: Uuid,
    ) -> UseCaseResult<ListItemMutationDto> {
        let progress = self
            .list_repo
            .delete_item(user_id, list_id, item_id)
            .await
            .map_err(|err| internal("delete_item", user_id, err))?
            .ok_or(ListError::ItemNotFound)?;

        Ok(ListItemMutationDto {
            item: None,
            progress,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crates::domain::{
        entities::user_lists::UserListItemEntity, repositories::lists::MockListRepository,
        value_objects::clock::FixedClock,
    };
    use mockall::predicate::eq;

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 2, 10, 18, 30, 0).unwrap(),
        ))
    }

    fn item(list_id: Uuid, is_completed: bool) -> UserListItemEntity {
        UserListItemEntity {
            id: Uuid::new_v4(),
            list_id,
            content: "Register with a GP".to_string(),
            is_completed,
            position: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn completing_an_item_returns_new_progress() {
        let user_id = Uuid::new_v4();
        let list_id = Uuid::new_v4();
        let done = item(list_id, true);
        let item_id = done.id;

        let mut repo = MockListRepository::new();
        repo.expect_update_item()
            .withf(move |u, l, i, changes| {
                *u == user_id && *l == list_id && *i == item_id && changes.is_completed == Some(true)
            })
            .times(1)
            .returning(move |_, _, _, _| Ok(Some((done.clone(), 67))));

        let usecase = ListUseCase::new(Arc::new(repo), clock());
        let result = usecase
            .update_item(
                user_id,
                list_id,
                item_id,
                UpdateListItemModel {
                    is_completed: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(result.progress, 67);
        assert!(result.item.unwrap().is_completed);
    }

    #[tokio::test]
    async fn foreign_list_reads_as_not_found() {
        let mut repo = MockListRepository::new();
        repo.expect_add_item().returning(|_, _| Ok(None));

        let usecase = ListUseCase::new(Arc::new(repo), clock());
        let err = usecase
            .add_item(
                Uuid::new_v4(),
                Uuid::new_v4(),
                CreateListItemModel {
                    content: "Open a bank account".to_string(),
                    position: None,
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), "LIST_NOT_FOUND");
    }

    #[tokio::test]
    async fn empty_updates_are_rejected() {
        let mut repo = MockListRepository::new();
        repo.expect_update_list().never();
        repo.expect_update_item().never();

        let usecase = ListUseCase::new(Arc::new(repo), clock());

        let err = usecase
            .update(Uuid::new_v4(), Uuid::new_v4(), UpdateListModel::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = usecase
            .update_item(
                Uuid::new_v4(),
                Uuid::new_v4(),
                Uuid::new_v4(),
                UpdateListItemModel::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn archive_stamps_updated_at_from_clock() {
        let user_id = Uuid::new_v4();
        let list_id = Uuid::new_v4();
        let clock = clock();
        let now = clock.now();

        let mut repo = MockListRepository::new();
        repo.expect_update_list()
            .with(
                eq(user_id),
                eq(list_id),
                eq(UpdateUserListEntity {
                    title: None,
                    category: None,
                    is_archived: Some(true),
                    updated_at: Some(now),
                }),
            )
            .times(1)
            .returning(|_, _, _| Ok(None));

        let usecase = ListUseCase::new(Arc::new(repo), clock);
        let err = usecase
            .update(
                user_id,
                list_id,
                UpdateListModel {
                    is_archived: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), "LIST_NOT_FOUND");
    }

    #[tokio::test]
    async fn blank_category_on_update_leaves_category_alone() {
        let user_id = Uuid::new_v4();
        let list_id = Uuid::new_v4();

        let mut repo = MockListRepository::new();
        repo.expect_update_list()
            .withf(|_, _, changes| {
                changes.category.is_none() && changes.title.as_deref() == Some("Moving house")
            })
            .times(1)
            .returning(|_, _, _| Ok(None));

        let usecase = ListUseCase::new(Arc::new(repo), clock());
        let err = usecase
            .update(
                user_id,
                list_id,
                UpdateListModel {
                    title: Some("Moving house".to_string()),
                    category: Some("   ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), "LIST_NOT_FOUND");
    }

    #[tokio::test]
    async fn deleting_last_item_reports_zero_progress() {
        let mut repo = MockListRepository::new();
        repo.expect_delete_item().returning(|_, _, _| Ok(Some(0)));

        let usecase = ListUseCase::new(Arc::new(repo), clock());
        let result = usecase
            .delete_item(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(result.item, None);
        assert_eq!(result.progress, 0);
    }
}
