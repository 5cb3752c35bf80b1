use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::owner_bans;

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = owner_bans)]
pub struct InsertOwnerBanEntity {
    pub user_id: Uuid,
    pub banned_by: Uuid,
    pub reason: Option<String>,
}
