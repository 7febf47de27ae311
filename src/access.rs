use serde::Serialize;

/// The authenticated caller, resolved by the auth middleware. Anonymous
/// viewers are represented as `None` wherever an `Option<&Identity>` is
/// taken; operations never read ambient request state.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Identity {
  pub user_id: i32,
  pub is_staff: bool,
}

fn viewer_is_staff(viewer: Option<&Identity>) -> bool {
  viewer.is_some_and(|v| v.is_staff)
}

fn viewer_owns(viewer: Option<&Identity>, owner_id: i32) -> bool {
  viewer.is_some_and(|v| v.user_id == owner_id)
}

/// Read access: the predicates are evaluated in order and any single one
/// grants access. Staff override first, then ownership, then public
/// visibility.
pub fn can_view(viewer: Option<&Identity>, owner_id: i32, secret: bool) -> bool {
  viewer_is_staff(viewer) || viewer_owns(viewer, owner_id) || !secret
}

/// Write access: mutations are reserved to the owner and staff; visibility
/// plays no part. Callers reach this only once authenticated.
pub fn can_modify(viewer: &Identity, owner_id: i32) -> bool {
  viewer.is_staff || viewer.user_id == owner_id
}

#[cfg(test)]
mod tests {
  use super::{Identity, can_modify, can_view};

  const STAFF: Identity = Identity { user_id: 1, is_staff: true };
  const OWNER: Identity = Identity { user_id: 2, is_staff: false };
  const STRANGER: Identity = Identity { user_id: 3, is_staff: false };

  #[test]
  fn staff_sees_everything() {
    assert!(can_view(Some(&STAFF), OWNER.user_id, true));
    assert!(can_view(Some(&STAFF), OWNER.user_id, false));
  }

  #[test]
  fn owner_sees_own_secret_content() {
    assert!(can_view(Some(&OWNER), OWNER.user_id, true));
  }

  #[test]
  fn stranger_sees_only_public_content() {
    assert!(can_view(Some(&STRANGER), OWNER.user_id, false));
    assert!(!can_view(Some(&STRANGER), OWNER.user_id, true));
  }

  #[test]
  fn anonymous_sees_only_public_content() {
    assert!(can_view(None, OWNER.user_id, false));
    assert!(!can_view(None, OWNER.user_id, true));
  }

  #[test]
  fn only_owner_and_staff_modify() {
    assert!(can_modify(&OWNER, OWNER.user_id));
    assert!(can_modify(&STAFF, OWNER.user_id));
    assert!(!can_modify(&STRANGER, OWNER.user_id));
  }
}
