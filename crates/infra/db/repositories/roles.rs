use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, dsl::exists, prelude::*, select};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{repositories::roles::RoleRepository, value_objects::enums::app_roles::AppRole},
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::user_roles},
};

pub struct RolePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl RolePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl RoleRepository for RolePostgres {
    async fn has_role(&self, user_id: Uuid, role: AppRole) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let granted = select(exists(
            user_roles::table
                .filter(user_roles::user_id.eq(user_id))
                .filter(user_roles::role.eq(role.to_string())),
        ))
        .get_result::<bool>(&mut conn)?;

        Ok(granted)
    }
}
