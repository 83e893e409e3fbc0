use chrono::NaiveDateTime;
use diesel::prelude::*;

/// One keyed JSON blob of per-user local state.
#[derive(Queryable, Insertable, Selectable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::app_state)]
#[diesel(primary_key(state_key))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AppStateDB {
    pub state_key: String,
    pub state_value: String,
    pub updated_at: NaiveDateTime,
}
