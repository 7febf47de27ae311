pub mod login;
pub mod secret;
pub mod token;

use sha2::Digest;

/// Encrypts the password.
pub fn hash_password(password: &str) -> String {
  let mut hasher = sha2::Sha512::new();
  hasher.update(password);
  // {:X} means format as hexadecimal
  format!("{:X}", hasher.finalize())
}

#[cfg(test)]
mod tests {
  use super::hash_password;

  #[test]
  fn hashing_is_stable_and_not_identity() {
    let a = hash_password("hunter2");
    assert_eq!(a, hash_password("hunter2"));
    assert_ne!(a, "hunter2");
    assert_eq!(a.len(), 128);
  }
}
