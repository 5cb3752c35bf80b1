use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{user_list_items, user_lists},
    },
};
use domain::{
    entities::user_lists::{
        InsertUserListEntity, InsertUserListItemEntity, UpdateUserListEntity,
        UpdateUserListItemEntity, UserListEntity, UserListItemEntity,
    },
    repositories::lists::ListRepository,
    value_objects::lists::compute_progress,
};

pub struct ListPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ListPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn owns_list(
    tx: &mut PgConnection,
    user_id: Uuid,
    list_id: Uuid,
) -> Result<bool, diesel::result::Error> {
    diesel::select(diesel::dsl::exists(
        user_lists::table
            .filter(user_lists::id.eq(list_id))
            .filter(user_lists::user_id.eq(user_id)),
    ))
    .get_result::<bool>(tx)
}

/// Recomputes and stores the list's progress from its current items.
fn refresh_progress(tx: &mut PgConnection, list_id: Uuid) -> Result<i32, diesel::result::Error> {
    let total = user_list_items::table
        .filter(user_list_items::list_id.eq(list_id))
        .count()
        .get_result::<i64>(tx)?;

    let completed = user_list_items::table
        .filter(user_list_items::list_id.eq(list_id))
        .filter(user_list_items::is_completed.eq(true))
        .count()
        .get_result::<i64>(tx)?;

    let progress = compute_progress(completed, total);

    update(user_lists::table.find(list_id))
        .set((
            user_lists::progress.eq(progress),
            user_lists::updated_at.eq(Utc::now()),
        ))
        .execute(tx)?;

    Ok(progress)
}

#[async_trait]
impl ListRepository for ListPostgres {
    async fn list_for_user(
        &self,
        user_id: Uuid,
        include_archived: bool,
    ) -> Result<Vec<UserListEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = user_lists::table
            .filter(user_lists::user_id.eq(user_id))
            .select(UserListEntity::as_select())
            .into_boxed();

        if !include_archived {
            query = query.filter(user_lists::is_archived.eq(false));
        }

        let results = query
            .order(user_lists::updated_at.desc())
            .load::<UserListEntity>(&mut conn)?;

        Ok(results)
    }

    async fn find_with_items(
        &self,
        user_id: Uuid,
        list_id: Uuid,
    ) -> Result<Option<(UserListEntity, Vec<UserListItemEntity>)>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let Some(list) = user_lists::table
            .filter(user_lists::id.eq(list_id))
            .filter(user_lists::user_id.eq(user_id))
            .select(UserListEntity::as_select())
            .first::<UserListEntity>(&mut conn)
            .optional()?
        else {
            return Ok(None);
        };

        let items = user_list_items::table
            .filter(user_list_items::list_id.eq(list_id))
            .order((user_list_items::position.asc(), user_list_items::created_at.asc()))
            .select(UserListItemEntity::as_select())
            .load::<UserListItemEntity>(&mut conn)?;

        Ok(Some((list, items)))
    }

    async fn create_list(&self, list: InsertUserListEntity) -> Result<UserListEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(user_lists::table)
            .values(&list)
            .returning(UserListEntity::as_returning())
            .get_result::<UserListEntity>(&mut conn)?;

        Ok(result)
    }

    async fn update_list(
        &self,
        user_id: Uuid,
        list_id: Uuid,
        changes: UpdateUserListEntity,
    ) -> Result<Option<UserListEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(
            user_lists::table
                .filter(user_lists::id.eq(list_id))
                .filter(user_lists::user_id.eq(user_id)),
        )
        .set(&changes)
        .returning(UserListEntity::as_returning())
        .get_result::<UserListEntity>(&mut conn)
        .optional()?;

        Ok(result)
    }

    async fn delete_list(&self, user_id: Uuid, list_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = conn.transaction::<bool, diesel::result::Error, _>(|tx| {
            if !owns_list(tx, user_id, list_id)? {
                return Ok(false);
            }

            delete(user_list_items::table.filter(user_list_items::list_id.eq(list_id)))
                .execute(tx)?;
            delete(user_lists::table.find(list_id)).execute(tx)?;

            Ok(true)
        })?;

        Ok(deleted)
    }

    async fn add_item(
        &self,
        user_id: Uuid,
        item: InsertUserListItemEntity,
    ) -> Result<Option<(UserListItemEntity, i32)>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conn.transaction::<Option<(UserListItemEntity, i32)>, diesel::result::Error, _>(
            |tx| {
                if !owns_list(tx, user_id, item.list_id)? {
                    return Ok(None);
                }

                let created = insert_into(user_list_items::table)
                    .values(&item)
                    .returning(UserListItemEntity::as_returning())
                    .get_result::<UserListItemEntity>(tx)?;

                let progress = refresh_progress(tx, item.list_id)?;

                Ok(Some((created, progress)))
            },
        )?;

        Ok(result)
    }

    async fn update_item(
        &self,
        user_id: Uuid,
        list_id: Uuid,
        item_id: Uuid,
        changes: UpdateUserListItemEntity,
    ) -> Result<Option<(UserListItemEntity, i32)>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conn.transaction::<Option<(UserListItemEntity, i32)>, diesel::result::Error, _>(
            |tx| {
                if !owns_list(tx, user_id, list_id)? {
                    return Ok(None);
                }

                let Some(updated) = update(
                    user_list_items::table
                        .filter(user_list_items::id.eq(item_id))
                        .filter(user_list_items::list_id.eq(list_id)),
                )
                .set(&changes)
                .returning(UserListItemEntity::as_returning())
                .get_result::<UserListItemEntity>(tx)
                .optional()?
                else {
                    return Ok(None);
                };

                let progress = refresh_progress(tx, list_id)?;

                Ok(Some((updated, progress)))
            },
        )?;

        Ok(result)
    }

    async fn delete_item(
        &self,
        user_id: Uuid,
        list_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<i32>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conn.transaction::<Option<i32>, diesel::result::Error, _>(|tx| {
            if !owns_list(tx, user_id, list_id)? {
                return Ok(None);
            }

            let deleted = delete(
                user_list_items::table
                    .filter(user_list_items::id.eq(item_id))
                    .filter(user_list_items::list_id.eq(list_id)),
            )
            .execute(tx)?;

            if deleted == 0 {
                return Ok(None);
            }

            Ok(Some(refresh_progress(tx, list_id)?))
        })?;

        Ok(result)
    }
}
