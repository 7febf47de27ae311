use crate::DbConn;
use crate::errors::ApiResult;
use crate::models::NewSubscription;
use crate::schema::subscription;
use diesel::BoolExpressionMethods;
use diesel::ExpressionMethods;
use diesel::QueryDsl;
use diesel::RunQueryDsl;
use serde::Serialize;

#[derive(Serialize, Clone, Copy)]
pub struct SubscriptionCounts {
  pub subscribers: i64,
  pub subscribed_to: i64,
}

/// Adds the directed edge subscriber -> target. Re-subscribing is a no-op;
/// the unique key on the edge makes the insert idempotent under race.
pub async fn subscribe(conn: &DbConn, subscriber_id: i32, target_id: i32) -> ApiResult<()> {
  let edge = NewSubscription { subscriber_id, target_id };

  conn
    .interact(move |c| {
      diesel::insert_or_ignore_into(subscription::table)
        .values(edge)
        .execute(c)
    })
    .await??;

  Ok(())
}

/// Removes the edge if present; removing a nonexistent edge is a no-op.
pub async fn unsubscribe(conn: &DbConn, subscriber_id: i32, target_id: i32) -> ApiResult<()> {
  conn
    .interact(move |c| {
      diesel::delete(
        subscription::table.filter(
          subscription::subscriber_id
            .eq(subscriber_id)
            .and(subscription::target_id.eq(target_id)),
        ),
      )
      .execute(c)
    })
    .await??;

  Ok(())
}

/// Incoming and outgoing edge counts for one user.
pub async fn counts(conn: &DbConn, user_id: i32) -> ApiResult<SubscriptionCounts> {
  let (subscribers, subscribed_to) = conn
    .interact(move |c| {
      let subscribers = subscription::table
        .filter(subscription::target_id.eq(user_id))
        .count()
        .get_result::<i64>(c)?;

      let subscribed_to = subscription::table
        .filter(subscription::subscriber_id.eq(user_id))
        .count()
        .get_result::<i64>(c)?;

      Ok::<_, diesel::result::Error>((subscribers, subscribed_to))
    })
    .await??;

  Ok(SubscriptionCounts { subscribers, subscribed_to })
}
