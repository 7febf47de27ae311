use rand::{Rng, distr::Alphanumeric, rng};
use std::fs;

const SECRET_PATH: &str = "secret.key";

pub struct Secret {
  key: String,
}

impl Secret {
  /// Generates a new secret.
  fn generate() -> String {
    let mut rng = rng();

    let range = rng.random_range(256..512);

    String::from_utf8(
      rng
        .sample_iter(&Alphanumeric)
        .take(range)
        .collect::<Vec<_>>(),
    )
    .unwrap()
  }

  /// Reads content of the secret.key file.
  // TODO: check for write and read permissions
  pub fn read() -> Result<String, std::io::Error> {
    fs::read_to_string(SECRET_PATH)
  }

  /// Reads the signing secret, creating and persisting one on first boot.
  pub fn read_or_init() -> Result<String, std::io::Error> {
    match Secret::read() {
      Ok(key) => Ok(key),
      Err(_) => {
        let secret = Secret::new();
        let key = secret.key.clone();
        secret.write()?;
        Ok(key)
      }
    }
  }

  /// Writes a secret to the secret.key file.
  pub fn write(self) -> std::io::Result<()> {
    fs::write(SECRET_PATH, self.key)
  }

  /// Creates a new secret
  pub fn new() -> Secret {
    Secret {
      key: Secret::generate(),
    }
  }
}
