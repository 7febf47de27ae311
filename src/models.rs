use crate::schema::{collection, collection_series, photo, series, series_tag, subscription, user};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Deserialize;

#[derive(Identifiable, Queryable, Clone)]
#[diesel(table_name = user)]
pub struct User {
  pub id: i32,
  pub username: String,
  pub email: String,
  pub password: String,
  pub is_staff: bool,
  pub profile_pic: Option<String>,
  pub description: String,
  pub location: String,
  pub created_at: NaiveDateTime,
}

#[derive(Insertable, Deserialize, Clone)]
#[diesel(table_name = user)]
pub struct NewUser {
  pub username: String,
  pub email: String,
  pub password: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub location: String,
}

impl NewUser {
  /// Checks that the registration payload is well formed: the username is
  /// limited to word characters and `@/./+/-`, the email must parse.
  pub fn check(&self) -> bool {
    !self.username.is_empty()
      && self.username.chars().count() <= 150
      && lazy_regex::regex_is_match!(r"^[\w.@+-]+$", &self.username)
      && email_address::EmailAddress::is_valid(&self.email)
      && !self.password.is_empty()
      && self.description.chars().count() <= 150
      && self.location.chars().count() <= 50
  }

  /// Replaces the plain-text password with its hash before insertion.
  pub fn hash_password(mut self) -> Self {
    self.password = crate::auth::hash_password(&self.password);
    self
  }
}

#[derive(Insertable, Clone, Copy)]
#[diesel(table_name = subscription)]
pub struct NewSubscription {
  pub subscriber_id: i32,
  pub target_id: i32,
}

#[derive(Identifiable, Queryable, Associations, Clone)]
#[diesel(table_name = series)]
#[diesel(belongs_to(User, foreign_key = owner_id))]
pub struct PhotoSeries {
  pub id: i32,
  pub owner_id: i32,
  pub name: String,
  pub description: String,
  pub price_cents: i64,
  pub created_at: NaiveDateTime,
}

#[derive(Insertable, Clone)]
#[diesel(table_name = series)]
pub struct NewPhotoSeries {
  pub owner_id: i32,
  pub name: String,
  pub description: String,
  pub price_cents: i64,
}

#[derive(Insertable, Clone, Copy)]
#[diesel(table_name = series_tag)]
pub struct NewSeriesTag {
  pub series_id: i32,
  pub tag_id: i32,
}

#[derive(Identifiable, Queryable, Associations, Clone)]
#[diesel(table_name = collection)]
#[diesel(belongs_to(User, foreign_key = owner_id))]
pub struct Collection {
  pub id: i32,
  pub owner_id: i32,
  pub name: String,
  pub description: String,
  pub cover: String,
  pub is_secret: bool,
  pub created_at: NaiveDateTime,
}

#[derive(Insertable, Clone)]
#[diesel(table_name = collection)]
pub struct NewCollection {
  pub owner_id: i32,
  pub name: String,
  pub description: String,
  pub cover: String,
  pub is_secret: bool,
}

#[derive(Insertable, Clone, Copy)]
#[diesel(table_name = collection_series)]
pub struct NewCollectionSeries {
  pub collection_id: i32,
  pub series_id: i32,
}

#[derive(Identifiable, Queryable, Associations, Clone)]
#[diesel(table_name = photo)]
#[diesel(belongs_to(PhotoSeries, foreign_key = series_id))]
pub struct SinglePhoto {
  pub id: i32,
  pub series_id: i32,
  pub owner_id: i32,
  pub file_path: String,
  pub position: i32,
}

#[derive(Insertable, Clone)]
#[diesel(table_name = photo)]
pub struct NewSinglePhoto {
  pub series_id: i32,
  pub owner_id: i32,
  pub file_path: String,
  pub position: i32,
}

#[cfg(test)]
mod tests {
  use super::NewUser;

  fn payload(username: &str, email: &str) -> NewUser {
    NewUser {
      username: username.to_string(),
      email: email.to_string(),
      password: "hunter2hunter2".to_string(),
      description: String::new(),
      location: String::new(),
    }
  }

  #[test]
  fn accepts_django_style_usernames() {
    assert!(payload("ansel.adams+test@web", "ansel@example.com").check());
  }

  #[test]
  fn rejects_whitespace_in_username() {
    assert!(!payload("ansel adams", "ansel@example.com").check());
  }

  #[test]
  fn rejects_invalid_email() {
    assert!(!payload("ansel", "not-an-email").check());
  }

  #[test]
  fn rejects_empty_password() {
    let mut p = payload("ansel", "ansel@example.com");
    p.password = String::new();
    assert!(!p.check());
  }
}
