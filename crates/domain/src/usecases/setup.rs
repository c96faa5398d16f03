//! Setup use case - turn a short-lived user token into publishing credentials
//!
//! Steps: exchange the user token for a long-lived one, list the pages the
//! user administers, pick one, and read the business account linked to it.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    model::{AppCredentials, ConnectedPage, LinkedAccount, SetupOutcome},
    ports::{GraphApi, GraphError},
};

#[derive(Deserialize)]
struct PagesResponse {
    #[serde(default)]
    data: Vec<PageEntry>,
}

#[derive(Deserialize)]
struct PageEntry {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    is_published: Option<bool>,
    #[serde(default)]
    tasks: Vec<String>,
}

impl From<PageEntry> for ConnectedPage {
    fn from(entry: PageEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            access_token: SecretString::new(entry.access_token.into()),
            is_published: entry.is_published,
            tasks: entry.tasks,
        }
    }
}

/// Onboarding flow over the Graph API
pub struct SetupFlow<G> {
    graph: G,
    api_version: String,
}

impl<G: GraphApi> SetupFlow<G> {
    pub fn new(graph: G, api_version: impl Into<String>) -> Self {
        Self {
            graph,
            api_version: api_version.into(),
        }
    }

    /// Exchange a short-lived user token for a long-lived one.
    ///
    /// Any failure keeps the original token; the exchange is attempted once.
    pub async fn exchange_token(
        &self,
        app: &AppCredentials,
        user_token: &SecretString,
    ) -> SecretString {
        let path = self.endpoint("oauth/access_token");
        let result = self
            .graph
            .get(
                &path,
                &[
                    ("grant_type", "fb_exchange_token"),
                    ("client_id", app.app_id.as_str()),
                    ("client_secret", app.app_secret.expose_secret()),
                    ("fb_exchange_token", user_token.expose_secret()),
                ],
            )
            .await;

        match result {
            Ok(body) => match body.get("access_token").and_then(Value::as_str) {
                Some(token) if !token.is_empty() => {
                    tracing::info!("Obtained long-lived user token");
                    SecretString::new(token.into())
                }
                _ => {
                    tracing::warn!("Token exchange response had no access_token, using original token");
                    SecretString::new(user_token.expose_secret().into())
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Token exchange failed, using original token");
                SecretString::new(user_token.expose_secret().into())
            }
        }
    }

    /// List the pages the user administers, with their page tokens
    pub async fn list_pages(
        &self,
        user_token: &SecretString,
    ) -> Result<Vec<ConnectedPage>, GraphError> {
        let path = self.endpoint("me/accounts");
        let body = self
            .graph
            .get(
                &path,
                &[
                    ("access_token", user_token.expose_secret()),
                    ("fields", "id,name,access_token,is_published,tasks"),
                ],
            )
            .await?;

        let pages: PagesResponse = serde_json::from_value(body)
            .map_err(|e| GraphError::UnexpectedResponse(e.to_string()))?;

        if pages.data.is_empty() {
            return Err(GraphError::NotFound(
                "No pages found. Make sure you administer a Facebook page and selected it when generating the user token".to_string(),
            ));
        }

        tracing::info!(count = pages.data.len(), "Found pages");
        Ok(pages.data.into_iter().map(ConnectedPage::from).collect())
    }

    /// Read the business account linked to a page
    pub async fn linked_account(&self, page: &ConnectedPage) -> Result<LinkedAccount, GraphError> {
        let path = self.endpoint(&page.id);
        let mut body = self
            .graph
            .get(
                &path,
                &[
                    ("access_token", page.access_token.expose_secret()),
                    ("fields", "instagram_business_account{id,username,name}"),
                ],
            )
            .await?;

        let account = body
            .get_mut("instagram_business_account")
            .map(Value::take)
            .filter(|v| !v.is_null())
            .ok_or_else(|| {
                GraphError::NotFound(format!(
                    "No Instagram Business Account connected to page '{}'",
                    page.name
                ))
            })?;

        serde_json::from_value(account).map_err(|e| GraphError::UnexpectedResponse(e.to_string()))
    }

    /// Run the whole flow.
    ///
    /// Without app credentials the token exchange is skipped and the user
    /// token is used as given.
    pub async fn run(
        &self,
        app: Option<&AppCredentials>,
        user_token: &SecretString,
        page_selector: Option<&str>,
    ) -> Result<SetupOutcome, GraphError> {
        let token = match app {
            Some(app) => self.exchange_token(app, user_token).await,
            None => {
                tracing::warn!("No app credentials configured, skipping long-lived token exchange");
                SecretString::new(user_token.expose_secret().into())
            }
        };

        let pages = self.list_pages(&token).await?;
        let page = select_page(pages, page_selector)?;
        tracing::info!(page_id = %page.id, page_name = %page.name, "Selected page");

        let account = self.linked_account(&page).await?;

        Ok(SetupOutcome {
            page_id: page.id,
            page_name: page.name,
            account,
            access_token: page.access_token,
        })
    }

    fn endpoint(&self, node: &str) -> String {
        format!("{}/{}", self.api_version, node)
    }
}

/// Pick a page by id or by 1-based position; anything else falls back to
/// the first page
pub fn select_page(
    pages: Vec<ConnectedPage>,
    selector: Option<&str>,
) -> Result<ConnectedPage, GraphError> {
    let index = selector
        .and_then(|sel| {
            pages.iter().position(|p| p.id == sel).or_else(|| {
                sel.parse::<usize>()
                    .ok()
                    .filter(|n| (1..=pages.len()).contains(n))
                    .map(|n| n - 1)
            })
        })
        .unwrap_or(0);

    pages
        .into_iter()
        .nth(index)
        .ok_or_else(|| GraphError::NotFound("No pages found".to_string()))
}
