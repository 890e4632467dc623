//! Remote user directory: the [`UserSource`] seam and its HTTP client.
//!
//! Only `GET /users?page={n}` is consumed. Writes never reach the remote
//! side; the store keeps them local.
//!
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use crate::error::{Context, Result, simple_error};
use crate::store::{Avatars, User, UserId};

pub const DEFAULT_BASE_URL: &str = "https://reqres.in/api";

/// Remote pages fetched, in order, to seed the store.
pub const INITIAL_PAGES: [u32; 2] = [1, 2];

/// A user record as served by the directory. `avatar` may be absent.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct RemoteUser {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl RemoteUser {
    pub fn into_user(self, avatars: &Avatars) -> User {
        let avatar = avatars.resolve(self.avatar, &self.first_name, &self.last_name);
        User {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            avatar,
        }
    }
}

/// Paged envelope. Page counters sent alongside `data` are ignored; the store
/// recomputes pagination from its own list.
#[derive(Debug, Deserialize)]
pub struct UsersPage {
    pub data: Vec<RemoteUser>,
}

/// Anything that can hand out one page of remote users.
#[async_trait]
pub trait UserSource: Send + Sync {
    async fn fetch_page(&self, page: u32) -> Result<Vec<RemoteUser>>;
}

/// Fetch [`INITIAL_PAGES`] in order and concatenate them. The first failure
/// aborts the whole load; no partial list is returned.
pub async fn load_initial(source: &dyn UserSource, avatars: &Avatars) -> Result<Vec<User>> {
    let mut users = Vec::new();
    for page in INITIAL_PAGES {
        let records = source.fetch_page(page).await?;
        tracing::debug!(page, count = records.len(), "fetched user page");
        users.extend(records.into_iter().map(|r| r.into_user(avatars)));
    }
    Ok(users)
}

/// reqwest-backed client for a reqres-style directory.
#[derive(Clone, Debug)]
pub struct ReqresClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl ReqresClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_ctx(|| format!("invalid base url {base_url:?}"))?;
        if base_url.cannot_be_a_base() {
            return Err(simple_error(format!("base url cannot carry a path: {base_url}")));
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("userdeck/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_ctx(|| "build http client".to_string())?;
        Ok(Self {
            http,
            base_url,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/users?page={page}`, keeping any path already on the base.
    pub fn users_url(&self, page: u32) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| simple_error(format!("base url cannot carry a path: {}", self.base_url)))?
            .pop_if_empty()
            .push("users");
        url.query_pairs_mut()
            .clear()
            .append_pair("page", &page.to_string());
        Ok(url)
    }
}

#[async_trait]
impl UserSource for ReqresClient {
    async fn fetch_page(&self, page: u32) -> Result<Vec<RemoteUser>> {
        let url = self.users_url(page)?;
        let mut req = self.http.get(url.clone());
        if let Some(key) = &self.api_key {
            req = req.header("x-api-key", key);
        }
        let response = req.send().await.with_ctx(|| format!("GET {url}"))?;
        let response = response
            .error_for_status()
            .with_ctx(|| format!("GET {url}"))?;
        let body: UsersPage = response
            .json()
            .await
            .with_ctx(|| format!("decode users page {page}"))?;
        Ok(body.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::avatar::DEFAULT_AVATAR_SERVICE;

    const PAGE_ONE: &str = r#"{
        "page": 1,
        "per_page": 6,
        "total": 12,
        "total_pages": 2,
        "data": [
            {"id": 1, "email": "george.bluth@reqres.in", "first_name": "George", "last_name": "Bluth", "avatar": "https://reqres.in/img/faces/1-image.jpg"},
            {"id": 2, "email": "janet.weaver@reqres.in", "first_name": "Janet", "last_name": "Weaver", "avatar": null},
            {"id": 3, "email": "emma.wong@reqres.in", "first_name": "Emma", "last_name": "Wong"}
        ],
        "support": {"url": "https://reqres.in/#support-heading", "text": "ignored"}
    }"#;

    #[test]
    fn decodes_page_and_ignores_envelope_fields() {
        let page: UsersPage = serde_json::from_str(PAGE_ONE).unwrap();
        assert_eq!(page.data.len(), 3);
        assert_eq!(page.data[0].first_name, "George");
        assert!(page.data[1].avatar.is_none());
        assert!(page.data[2].avatar.is_none());
    }

    #[test]
    fn missing_avatar_resolves_to_placeholder() {
        let avatars = Avatars::from_service(DEFAULT_AVATAR_SERVICE).unwrap();
        let page: UsersPage = serde_json::from_str(PAGE_ONE).unwrap();
        let users: Vec<User> = page.data.into_iter().map(|r| r.into_user(&avatars)).collect();
        assert_eq!(users[0].avatar, "https://reqres.in/img/faces/1-image.jpg");
        assert_eq!(users[1].avatar, avatars.placeholder("Janet", "Weaver"));
    }

    #[test]
    fn users_url_keeps_base_path() {
        let client = ReqresClient::new(DEFAULT_BASE_URL, None).unwrap();
        assert_eq!(
            client.users_url(2).unwrap().as_str(),
            "https://reqres.in/api/users?page=2"
        );

        let client = ReqresClient::new("http://localhost:8080/api/", None).unwrap();
        assert_eq!(
            client.users_url(1).unwrap().as_str(),
            "http://localhost:8080/api/users?page=1"
        );
    }

    #[test]
    fn rejects_bad_base_urls() {
        assert!(ReqresClient::new("reqres.in/api", None).is_err());
        assert!(ReqresClient::new("mailto:someone@example.com", None).is_err());
    }

    #[test]
    fn blank_api_key_is_dropped() {
        let client = ReqresClient::new(DEFAULT_BASE_URL, Some("   ".into())).unwrap();
        assert!(client.api_key.is_none());
    }
}
