//! Placeholder avatars derived from a user's name.

use reqwest::Url;

use crate::error::{Context, Result};

pub const DEFAULT_AVATAR_SERVICE: &str = "https://ui-avatars.com/api/";

/// Builds deterministic placeholder avatar URIs against an avatar service.
#[derive(Clone, Debug)]
pub struct Avatars {
    base: Url,
}

impl Avatars {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    /// Parse `base` and build the generator.
    pub fn from_service(base: &str) -> Result<Self> {
        let url = Url::parse(base).with_ctx(|| format!("invalid avatar service url {base:?}"))?;
        Ok(Self::new(url))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Placeholder for `first last`. Same name in, same URI out.
    pub fn placeholder(&self, first_name: &str, last_name: &str) -> String {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("name", &format!("{first_name} {last_name}"))
            .append_pair("background", "random")
            .append_pair("color", "fff");
        url.into()
    }

    /// `avatar` when present and non-blank, otherwise the placeholder.
    pub fn resolve(&self, avatar: Option<String>, first_name: &str, last_name: &str) -> String {
        match avatar {
            Some(a) if !a.trim().is_empty() => a,
            _ => self.placeholder(first_name, last_name),
        }
    }
}
