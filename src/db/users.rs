use crate::DbConn;
use crate::access::Identity;
use crate::errors::ApiResult;
use crate::models::{NewUser, User};
use crate::schema::user;
use diesel::BoolExpressionMethods;
use diesel::ExpressionMethods;
use diesel::OptionalExtension;
use diesel::QueryDsl;
use diesel::RunQueryDsl;
use diesel::Table;

/// Checks that neither the username nor the email is taken yet.
pub async fn is_user_unique(conn: &DbConn, new_user: NewUser) -> ApiResult<bool> {
  let existing: Option<i32> = conn
    .interact(move |c| {
      user::table
        .select(user::id)
        .filter(user::username.eq(new_user.username).or(user::email.eq(new_user.email)))
        .first::<i32>(c)
        .optional()
    })
    .await??;

  Ok(existing.is_none())
}

/// Inserts an already-hashed registration payload and returns the new ID.
pub async fn insert_user(conn: &DbConn, new_user: NewUser) -> ApiResult<i32> {
  let id = conn
    .interact(move |c| {
      diesel::insert_into(user::table).values(new_user).execute(c)?;
      super::generated_id(c)
    })
    .await??;

  Ok(id)
}

pub async fn select_user(conn: &DbConn, user_id: i32) -> ApiResult<User> {
  let found = conn
    .interact(move |c| {
      user::table
        .select(user::table::all_columns())
        .filter(user::id.eq(user_id))
        .first::<User>(c)
    })
    .await??;

  Ok(found)
}

/// Resolves a token's user ID to the caller capability the guards work
/// with. `None` when the account no longer exists.
pub async fn get_identity(conn: &DbConn, user_id: i32) -> ApiResult<Option<Identity>> {
  let row: Option<(i32, bool)> = conn
    .interact(move |c| {
      user::table
        .select((user::id, user::is_staff))
        .filter(user::id.eq(user_id))
        .first::<(i32, bool)>(c)
        .optional()
    })
    .await??;

  Ok(row.map(|(user_id, is_staff)| Identity { user_id, is_staff }))
}

pub async fn user_exists(conn: &DbConn, user_id: i32) -> ApiResult<bool> {
  let row: Option<i32> = conn
    .interact(move |c| {
      user::table
        .select(user::id)
        .filter(user::id.eq(user_id))
        .first::<i32>(c)
        .optional()
    })
    .await??;

  Ok(row.is_some())
}

pub async fn check_user_login_username(conn: &DbConn, username: String, hashed_password: String) -> ApiResult<Option<i32>> {
  let found = conn
    .interact(move |c| {
      user::table
        .select(user::id)
        .filter(user::username.eq(username).and(user::password.eq(hashed_password)))
        .first::<i32>(c)
        .optional()
    })
    .await??;

  Ok(found)
}

pub async fn check_user_login_email(conn: &DbConn, email: String, hashed_password: String) -> ApiResult<Option<i32>> {
  let found = conn
    .interact(move |c| {
      user::table
        .select(user::id)
        .filter(user::email.eq(email).and(user::password.eq(hashed_password)))
        .first::<i32>(c)
        .optional()
    })
    .await??;

  Ok(found)
}
