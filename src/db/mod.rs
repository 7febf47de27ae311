pub mod collections;
pub mod media;
pub mod series;
pub mod subscriptions;
pub mod tags;
pub mod users;

use diesel::mysql::MysqlConnection;
use diesel::sql_types::{BigInt, Unsigned};
use diesel::{QueryResult, RunQueryDsl, define_sql_function};

define_sql_function! {
  fn last_insert_id() -> Unsigned<BigInt>;
}

/// ID generated by the most recent insert on this connection. Only valid
/// inside the same transaction or interact closure as the insert itself.
pub(crate) fn generated_id(c: &mut MysqlConnection) -> QueryResult<i32> {
  diesel::select(last_insert_id())
    .get_result::<u64>(c)
    .map(|id| id as i32)
}
