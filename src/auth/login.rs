use super::token::{Claims, ClaimsEncoded};
use crate::DbConn;
use crate::db::users::{check_user_login_email, check_user_login_username};
use crate::errors::ApiResult;
use crate::models::User;
use serde::{Deserialize, Serialize};

/// Used for receiving login data.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserLogin {
  username_or_email: String,
  password: String,
}

impl UserLogin {
  /// Checks whether the `username_or_email` field is an email or not.
  fn is_email(&self) -> bool {
    self.username_or_email.contains('@')
  }

  /// Checks the credentials.
  async fn check(&self, conn: &DbConn) -> ApiResult<Option<i32>> {
    if self.is_email() {
      check_user_login_email(conn, self.username_or_email.clone(), self.password.clone()).await
    } else {
      check_user_login_username(conn, self.username_or_email.clone(), self.password.clone()).await
    }
  }

  /// Tries to log the user in.
  pub async fn login(&self, conn: &DbConn) -> ApiResult<Option<Claims>> {
    let Some(user_id) = self.check(conn).await? else {
      return Ok(None);
    };

    Ok(Some(Claims::new(user_id)))
  }

  /// Encrypts the password.
  pub fn hash_password(mut self) -> Self {
    self.password = crate::auth::hash_password(&self.password);
    self
  }
}

/// Used for sending information about user.
#[derive(Serialize)]
pub struct UserInfo {
  username: String,
  email: String,
}

impl From<User> for UserInfo {
  fn from(user: User) -> UserInfo {
    UserInfo {
      username: user.username,
      email: user.email,
    }
  }
}

/// Response when logging in.
#[derive(Serialize)]
pub struct LoginResponse {
  user_info: UserInfo,
  bearer_token: String,
}

impl LoginResponse {
  pub fn new(claims_encoded: ClaimsEncoded, user_info: UserInfo) -> Self {
    Self {
      user_info,
      bearer_token: claims_encoded.encoded_claims(),
    }
  }
}
