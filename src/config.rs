use anyhow::Context;
use directories::ProjectDirs;
use reqwest::Url;
use std::path::PathBuf;

/// Runtime configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub bind_addr: String,
  /// Directory uploaded blobs are written under.
  pub media_root: PathBuf,
  /// Base the media redirect points at (e.g. a CDN or an internal location
  /// the reverse proxy serves directly).
  pub media_base_url: Url,
  /// Identity provider the activation relay forwards to.
  pub identity_provider_url: Option<Url>,
}

impl Config {
  pub fn from_env() -> anyhow::Result<Config> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "localhost:3030".to_string());

    let media_root = match std::env::var("MEDIA_ROOT") {
      Ok(root) => PathBuf::from(root),
      Err(_) => default_media_root().context("no MEDIA_ROOT and no usable data directory")?,
    };

    let media_base_url = env_url("MEDIA_BASE_URL")
      .context("MEDIA_BASE_URL must be set to a valid URL")?;

    let identity_provider_url = env_url("IDENTITY_PROVIDER_URL");

    Ok(Config {
      database_url,
      bind_addr,
      media_root,
      media_base_url,
      identity_provider_url,
    })
  }
}

fn default_media_root() -> Option<PathBuf> {
  let dirs = ProjectDirs::from("", "", "velvia")?;
  Some(dirs.data_dir().join("media"))
}

fn env_url(var: &str) -> Option<Url> {
  let raw = std::env::var(var)
    .ok()
    .map(|s| s.trim().to_string())
    .filter(|s| !s.is_empty())?;

  normalise_url(&raw)
}

/// Collapses duplicate slashes and guarantees a trailing slash so joined
/// paths never lose their last segment.
fn normalise_url(raw: &str) -> Option<Url> {
  let Ok(mut url) = Url::parse(raw) else {
    return None;
  };

  let path = url
    .path()
    .split('/')
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join("/");

  let normalized_path = if path.is_empty() {
    '/'.to_string()
  } else {
    format!("/{}/", path)
  };

  url.set_path(&normalized_path);

  Some(url)
}

#[test]
fn localhost() {
  let url = normalise_url("http://localhost:8000").unwrap();
  assert_eq!(url.as_str(), "http://localhost:8000/");
}

#[test]
fn normalizes_extra_slashes() {
  let url = normalise_url("https://velvia.test.local///media////").unwrap();
  assert_eq!(url.as_str(), "https://velvia.test.local/media/");
}

#[test]
fn adds_trailing_slash() {
  let url = normalise_url("https://velvia.test.local/media").unwrap();
  assert_eq!(url.as_str(), "https://velvia.test.local/media/");
}

#[test]
fn accepts_root_path() {
  let url = normalise_url("https://velvia.test.local/").unwrap();
  assert_eq!(url.as_str(), "https://velvia.test.local/");
}

#[test]
fn rejects_invalid_url() {
  assert!(normalise_url("not a url").is_none());
}
