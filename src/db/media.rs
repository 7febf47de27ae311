use crate::DbConn;
use crate::errors::ApiResult;
use crate::models::SinglePhoto;
use crate::schema::photo;
use diesel::ExpressionMethods;
use diesel::OptionalExtension;
use diesel::QueryDsl;
use diesel::RunQueryDsl;
use diesel::Table;

/// Looks a raw storage path up as a photo. The media guard tries this
/// first, then falls back to collection covers.
pub async fn select_photo_by_path(conn: &DbConn, file_path: String) -> ApiResult<Option<SinglePhoto>> {
  let found = conn
    .interact(move |c| {
      photo::table
        .select(photo::table::all_columns())
        .filter(photo::file_path.eq(file_path))
        .first::<SinglePhoto>(c)
        .optional()
    })
    .await??;

  Ok(found)
}
