//! Publishing use case - account resolution and the create/publish sequence

use secrecy::ExposeSecret;
use serde_json::Value;

use crate::{
    model::{
        AccountInfo, ClientConfig, ConfigKey, Message, PostContent, PublishedMedia, id_field,
    },
    policy,
    ports::{GraphApi, GraphError},
};

const ACCOUNT_INFO_FIELDS: &str =
    "id,username,name,biography,followers_count,follows_count,media_count,profile_picture_url";

/// Client for publishing to an Instagram business account
///
/// The business account id is resolved from the page id on first use and
/// cached on the instance. Operations take `&mut self` because of that cache,
/// so a client cannot be shared between concurrent callers.
pub struct InstagramClient<G> {
    graph: G,
    config: ClientConfig,
}

impl<G: GraphApi> InstagramClient<G> {
    pub fn new(graph: G) -> Self {
        Self::with_config(graph, ClientConfig::default())
    }

    pub fn with_config(graph: G, config: ClientConfig) -> Self {
        Self { graph, config }
    }

    pub fn set(&mut self, key: ConfigKey, value: impl Into<String>) -> &mut Self {
        self.config.set(key, value);
        self
    }

    /// Set an option by name; unknown names fail without touching the config
    pub fn set_named(
        &mut self,
        key: &str,
        value: impl Into<String>,
    ) -> Result<&mut Self, GraphError> {
        self.config.set_named(key, value)?;
        Ok(self)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Publish a single photo or a carousel
    pub async fn post(
        &mut self,
        content: impl Into<PostContent>,
    ) -> Result<PublishedMedia, GraphError> {
        if !self.config.has_account_source() || !self.config.has_access_token() {
            return Err(GraphError::Config(
                "Facebook Page ID or Instagram Account ID and Access Token are required"
                    .to_string(),
            ));
        }

        let content = content.into();
        policy::validate_post(&content)?;

        let account_id = self.account_id().await?;

        let response = match &content {
            PostContent::Single(message) => self.publish_single(&account_id, message).await?,
            PostContent::Carousel(messages) => {
                self.publish_carousel(&account_id, messages).await?
            }
        };

        let published = PublishedMedia::from_response(response)?;
        tracing::info!(media_id = %published.id, "Published media");
        Ok(published)
    }

    /// Look up profile information for the business account
    pub async fn me(&mut self) -> Result<AccountInfo, GraphError> {
        if !self.config.has_account_source() {
            return Err(GraphError::Config(
                "Instagram Account ID or Facebook Page ID is required".to_string(),
            ));
        }
        if !self.config.has_access_token() {
            return Err(GraphError::Config("Access Token is required".to_string()));
        }

        let account_id = self.account_id().await?;
        let path = self.endpoint(&account_id);

        let data = self
            .graph
            .get(
                &path,
                &[
                    ("access_token", self.config.access_token.expose_secret()),
                    ("fields", ACCOUNT_INFO_FIELDS),
                ],
            )
            .await?;

        Ok(AccountInfo { data })
    }

    /// Cached business account id, resolving it from the page on first use
    async fn account_id(&mut self) -> Result<String, GraphError> {
        if self.config.ig_account_id.is_empty() {
            let resolved = self.resolve_account_id().await?;
            tracing::debug!(account_id = %resolved, "Resolved business account id");
            self.config.ig_account_id = resolved;
        }
        Ok(self.config.ig_account_id.clone())
    }

    async fn resolve_account_id(&self) -> Result<String, GraphError> {
        let path = self.endpoint(&self.config.facebook_page_id);

        let result = self
            .graph
            .get(
                &path,
                &[
                    ("access_token", self.config.access_token.expose_secret()),
                    ("fields", "instagram_business_account"),
                ],
            )
            .await?;

        result
            .get("instagram_business_account")
            .and_then(id_field)
            .ok_or_else(|| {
                GraphError::NotFound(
                    "No Instagram Business Account found for this Facebook Page".to_string(),
                )
            })
    }

    async fn publish_single(
        &self,
        account_id: &str,
        message: &Message,
    ) -> Result<Value, GraphError> {
        let container_id = self
            .create_media_container(account_id, message.image(), message.content())
            .await?;
        self.publish_container(account_id, &container_id).await
    }

    async fn publish_carousel(
        &self,
        account_id: &str,
        messages: &[Message],
    ) -> Result<Value, GraphError> {
        let caption = policy::carousel_caption(messages);

        let mut children = Vec::with_capacity(messages.len());
        for message in messages {
            let container_id = self
                .create_media_container(account_id, message.image(), "")
                .await?;
            children.push(container_id);
        }

        if children.is_empty() {
            return Err(GraphError::MediaRequired(
                "No valid images found for carousel post".to_string(),
            ));
        }

        let children = children.join(",");
        let mut fields = vec![
            ("media_type", "CAROUSEL"),
            ("children", children.as_str()),
            ("access_token", self.config.access_token.expose_secret()),
        ];
        if let Some(caption) = caption {
            fields.push(("caption", caption));
        }

        tracing::debug!(children = %children, "Creating carousel container");

        let path = self.endpoint(&format!("{}/media", account_id));
        let response = self.graph.post_form(&path, &fields).await?;
        let carousel_id = id_field(&response).ok_or_else(|| {
            GraphError::UnexpectedResponse("Failed to create carousel container".to_string())
        })?;

        self.publish_container(account_id, &carousel_id).await
    }

    /// Create an unpublished media container and return its id
    async fn create_media_container(
        &self,
        account_id: &str,
        image: &str,
        caption: &str,
    ) -> Result<String, GraphError> {
        let image_url = policy::public_url(image)?;

        let mut fields = vec![
            ("image_url", image_url),
            ("access_token", self.config.access_token.expose_secret()),
        ];
        if !caption.is_empty() {
            fields.push(("caption", caption));
        }

        let path = self.endpoint(&format!("{}/media", account_id));
        let response = self.graph.post_form(&path, &fields).await?;

        let container_id = id_field(&response).ok_or_else(|| {
            GraphError::UnexpectedResponse("Failed to create media object".to_string())
        })?;
        tracing::debug!(container_id = %container_id, "Created media container");
        Ok(container_id)
    }

    async fn publish_container(
        &self,
        account_id: &str,
        container_id: &str,
    ) -> Result<Value, GraphError> {
        let path = self.endpoint(&format!("{}/media_publish", account_id));
        self.graph
            .post_form(
                &path,
                &[
                    ("creation_id", container_id),
                    ("access_token", self.config.access_token.expose_secret()),
                ],
            )
            .await
    }

    fn endpoint(&self, node: &str) -> String {
        format!("{}/{}", self.config.api_version, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        method: &'static str,
        path: String,
        params: Vec<(String, String)>,
    }

    impl Call {
        fn param(&self, key: &str) -> Option<&str> {
            self.params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        }
    }

    /// Graph fake replaying scripted responses in order
    struct FakeGraph {
        responses: Mutex<VecDeque<Result<Value, GraphError>>>,
        calls: Mutex<Vec<Call>>,
    }

    impl FakeGraph {
        fn new(responses: Vec<Result<Value, GraphError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(vec![]),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(
            &self,
            method: &'static str,
            path: &str,
            params: &[(&str, &str)],
        ) -> Result<Value, GraphError> {
            self.calls.lock().unwrap().push(Call {
                method,
                path: path.to_string(),
                params: params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            });
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GraphError::Transport("no scripted response".to_string())))
        }
    }

    #[async_trait]
    impl GraphApi for FakeGraph {
        async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, GraphError> {
            self.record("GET", path, query)
        }

        async fn post_form(
            &self,
            path: &str,
            fields: &[(&str, &str)],
        ) -> Result<Value, GraphError> {
            self.record("POST", path, fields)
        }
    }

    fn client_with_account(graph: &FakeGraph) -> InstagramClient<&FakeGraph> {
        let mut client = InstagramClient::new(graph);
        client
            .set(ConfigKey::IgAccountId, "1784")
            .set(ConfigKey::AccessToken, "token");
        client
    }

    fn ok(value: Value) -> Result<Value, GraphError> {
        Ok(value)
    }

    #[tokio::test]
    async fn test_single_post_creates_then_publishes() {
        let graph = FakeGraph::new(vec![
            ok(serde_json::json!({"id": "container1"})),
            ok(serde_json::json!({"id": "media1"})),
        ]);
        let mut client = client_with_account(&graph);

        let message = Message::new()
            .with_content("Hello")
            .with_image("https://example.com/lenna.jpg");
        let published = client.post(message).await.unwrap();

        assert_eq!(published.id, "media1");

        let calls = graph.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].path, "v18.0/1784/media");
        assert_eq!(
            calls[0].param("image_url"),
            Some("https://example.com/lenna.jpg")
        );
        assert_eq!(calls[0].param("caption"), Some("Hello"));
        assert_eq!(calls[1].path, "v18.0/1784/media_publish");
        assert_eq!(calls[1].param("creation_id"), Some("container1"));
        assert_eq!(calls[1].param("access_token"), Some("token"));
    }

    #[tokio::test]
    async fn test_single_post_without_caption_omits_field() {
        let graph = FakeGraph::new(vec![
            ok(serde_json::json!({"id": "c"})),
            ok(serde_json::json!({"id": "m"})),
        ]);
        let mut client = client_with_account(&graph);

        client
            .post(Message::new().with_image("http://example.com/a.jpg"))
            .await
            .unwrap();

        assert_eq!(graph.calls()[0].param("caption"), None);
    }

    #[tokio::test]
    async fn test_missing_credentials_is_config_error() {
        let graph = FakeGraph::new(vec![]);
        let mut client = InstagramClient::new(&graph);
        client.set(ConfigKey::FacebookPageId, "page");

        let err = client
            .post(Message::new().with_image("https://a"))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::Config(_)));

        let err = client.me().await.unwrap_err();
        assert!(matches!(err, GraphError::Config(_)));
        assert!(graph.calls().is_empty());
    }

    #[tokio::test]
    async fn test_nonexistent_local_path_fails_before_network() {
        let graph = FakeGraph::new(vec![]);
        let mut client = InstagramClient::new(&graph);
        client
            .set(ConfigKey::FacebookPageId, "page")
            .set(ConfigKey::AccessToken, "token");

        let err = client
            .post(Message::new().with_image("/no/such/photo.jpg"))
            .await
            .unwrap_err();

        assert!(matches!(err, GraphError::MediaRequired(_)));
        assert!(graph.calls().is_empty());
    }

    #[tokio::test]
    async fn test_existing_local_file_is_unsupported() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let graph = FakeGraph::new(vec![]);
        let mut client = client_with_account(&graph);

        let err = client
            .post(Message::new().with_image(file.path().to_string_lossy()))
            .await
            .unwrap_err();

        assert!(matches!(err, GraphError::UnsupportedLocalFile(_)));
        assert!(graph.calls().is_empty());
    }

    #[tokio::test]
    async fn test_carousel_uses_first_non_empty_caption() {
        let graph = FakeGraph::new(vec![
            ok(serde_json::json!({"id": "c1"})),
            ok(serde_json::json!({"id": "c2"})),
            ok(serde_json::json!({"id": "c3"})),
            ok(serde_json::json!({"id": "carousel"})),
            ok(serde_json::json!({"id": "published"})),
        ]);
        let mut client = client_with_account(&graph);

        let messages = vec![
            Message::new().with_image("https://example.com/1.jpg"),
            Message::new()
                .with_content("B")
                .with_image("https://example.com/2.jpg"),
            Message::new()
                .with_content("C")
                .with_image("https://example.com/3.jpg"),
        ];
        let published = client.post(messages).await.unwrap();
        assert_eq!(published.id, "published");

        let calls = graph.calls();
        assert_eq!(calls.len(), 5);
        // Children are created without captions
        for call in &calls[..3] {
            assert_eq!(call.param("caption"), None);
        }
        let carousel = &calls[3];
        assert_eq!(carousel.param("media_type"), Some("CAROUSEL"));
        assert_eq!(carousel.param("children"), Some("c1,c2,c3"));
        assert_eq!(carousel.param("caption"), Some("B"));
        assert_eq!(calls[4].param("creation_id"), Some("carousel"));
    }

    #[tokio::test]
    async fn test_carousel_without_captions_sends_none() {
        let graph = FakeGraph::new(vec![
            ok(serde_json::json!({"id": "c1"})),
            ok(serde_json::json!({"id": "c2"})),
            ok(serde_json::json!({"id": "carousel"})),
            ok(serde_json::json!({"id": "published"})),
        ]);
        let mut client = client_with_account(&graph);

        client
            .post(vec![
                Message::new().with_image("https://example.com/1.jpg"),
                Message::new().with_image("https://example.com/2.jpg"),
            ])
            .await
            .unwrap();

        assert_eq!(graph.calls()[2].param("caption"), None);
    }

    #[tokio::test]
    async fn test_empty_carousel_fails_before_network() {
        let graph = FakeGraph::new(vec![]);
        let mut client = InstagramClient::new(&graph);
        client
            .set(ConfigKey::FacebookPageId, "page")
            .set(ConfigKey::AccessToken, "token");

        let err = client.post(Vec::<Message>::new()).await.unwrap_err();

        assert!(matches!(err, GraphError::MediaRequired(_)));
        assert!(graph.calls().is_empty());
    }

    #[tokio::test]
    async fn test_carousel_aborts_on_remote_failure() {
        let graph = FakeGraph::new(vec![
            ok(serde_json::json!({"id": "c1"})),
            Err(GraphError::api(Some("Media download failed"))),
        ]);
        let mut client = client_with_account(&graph);

        let err = client
            .post(vec![
                Message::new().with_image("https://example.com/1.jpg"),
                Message::new().with_image("https://example.com/2.jpg"),
                Message::new().with_image("https://example.com/3.jpg"),
            ])
            .await
            .unwrap_err();

        assert_eq!(err.remote_message(), Some("Media download failed"));
        assert_eq!(graph.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_container_without_id_fails() {
        let graph = FakeGraph::new(vec![ok(serde_json::json!({}))]);
        let mut client = client_with_account(&graph);

        let err = client
            .post(Message::new().with_image("https://example.com/1.jpg"))
            .await
            .unwrap_err();

        assert!(matches!(err, GraphError::UnexpectedResponse(_)));
        assert_eq!(graph.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_account_id_resolved_once_and_cached() {
        let graph = FakeGraph::new(vec![
            ok(serde_json::json!({"instagram_business_account": {"id": "1784"}, "id": "page"})),
            ok(serde_json::json!({"id": "c1"})),
            ok(serde_json::json!({"id": "m1"})),
            ok(serde_json::json!({"id": "c2"})),
            ok(serde_json::json!({"id": "m2"})),
        ]);
        let mut client = InstagramClient::new(&graph);
        client
            .set(ConfigKey::FacebookPageId, "page")
            .set(ConfigKey::AccessToken, "token");

        client
            .post(Message::new().with_image("https://example.com/1.jpg"))
            .await
            .unwrap();
        client
            .post(Message::new().with_image("https://example.com/2.jpg"))
            .await
            .unwrap();

        let calls = graph.calls();
        assert_eq!(calls.len(), 5);
        assert_eq!(calls[0].method, "GET");
        assert_eq!(calls[0].path, "v18.0/page");
        assert_eq!(
            calls[0].param("fields"),
            Some("instagram_business_account")
        );
        assert_eq!(calls[3].path, "v18.0/1784/media");
        assert_eq!(client.config().ig_account_id, "1784");
    }

    #[tokio::test]
    async fn test_page_without_business_account_is_not_found() {
        let graph = FakeGraph::new(vec![ok(serde_json::json!({"id": "page"}))]);
        let mut client = InstagramClient::new(&graph);
        client
            .set(ConfigKey::FacebookPageId, "page")
            .set(ConfigKey::AccessToken, "token");

        let err = client.me().await.unwrap_err();
        assert!(matches!(err, GraphError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_me_resolves_account_then_fetches_profile() {
        let graph = FakeGraph::new(vec![
            ok(serde_json::json!({"instagram_business_account": {"id": "1784"}})),
            ok(serde_json::json!({
                "id": "1784",
                "username": "lenna",
                "followers_count": 12,
                "media_count": 3
            })),
        ]);
        let mut client = InstagramClient::new(&graph);
        client
            .set(ConfigKey::FacebookPageId, "page")
            .set(ConfigKey::AccessToken, "token")
            .set(ConfigKey::ApiVersion, "v19.0");

        let info = client.me().await.unwrap();

        assert_eq!(info.data["id"], "1784");
        assert_eq!(info.text("username"), Some("lenna"));
        assert_eq!(info.count("followers_count"), Some(12));

        let calls = graph.calls();
        assert_eq!(calls[0].path, "v19.0/page");
        assert_eq!(calls[1].path, "v19.0/1784");
        assert_eq!(calls[1].param("fields"), Some(ACCOUNT_INFO_FIELDS));
    }

    #[tokio::test]
    async fn test_me_returns_remote_object_unchanged() {
        let remote = serde_json::json!({
            "id": 1784,
            "username": "lenna",
            "ig_id": 99,
            "website": "https://example.com"
        });
        let graph = FakeGraph::new(vec![ok(remote.clone())]);
        let mut client = client_with_account(&graph);

        let info = client.me().await.unwrap();

        assert_eq!(info.data, remote);
        assert_eq!(info.id().as_deref(), Some("1784"));
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            serde_json::json!({ "data": remote })
        );
    }

    #[tokio::test]
    async fn test_carousel_with_local_file_stops_before_publish() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let graph = FakeGraph::new(vec![ok(serde_json::json!({"id": "c1"}))]);
        let mut client = client_with_account(&graph);

        let err = client
            .post(vec![
                Message::new().with_image("https://example.com/1.jpg"),
                Message::new().with_image(file.path().to_string_lossy()),
                Message::new().with_image("https://example.com/3.jpg"),
            ])
            .await
            .unwrap_err();

        assert!(matches!(err, GraphError::UnsupportedLocalFile(_)));
        let calls = graph.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].path, "v18.0/1784/media");
        assert!(calls.iter().all(|c| !c.path.ends_with("media_publish")));
    }
}
