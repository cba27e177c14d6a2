//! Reqwest-based client for the Cloud Storage JSON API.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use stowage_core::ByteStream;
use tokio::io::AsyncReadExt;

use super::TRACING_TARGET;
use super::resource::{
    BucketResource, ErrorResponse, ListResponse, NewBucket, NewObject, ObjectResource,
    multipart_body,
};
use crate::GcsConfig;
use crate::client::{
    BucketAttrs, ClientError, ClientResult, ListPage, ListQuery, ObjectAttrs, ObjectWrite,
    StorageClient,
};
use crate::resolver::encode_segment;

/// Inner client that holds the HTTP client and configuration.
struct ReqwestClientInner {
    http: Client,
    config: GcsConfig,
}

/// [`StorageClient`] speaking the Cloud Storage JSON API over HTTP.
///
/// Requests carry the configured bearer token, if any; obtaining and
/// refreshing that token is left to the caller. Point
/// [`GcsConfig::endpoint`] at an emulator to test without credentials.
///
/// # Examples
///
/// ```rust,ignore
/// use stowage_gcs::GcsConfig;
/// use stowage_gcs::client::ReqwestClient;
///
/// let config = GcsConfig::new("my-project").with_access_token(token);
/// let client = ReqwestClient::new(config)?;
/// ```
#[derive(Clone)]
pub struct ReqwestClient {
    inner: Arc<ReqwestClientInner>,
}

impl std::fmt::Debug for ReqwestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ReqwestClient {
    /// Creates a client for the given configuration.
    pub fn new(config: GcsConfig) -> ClientResult<Self> {
        let user_agent = config.effective_user_agent();

        tracing::debug!(
            target: TRACING_TARGET,
            endpoint = %config.endpoint,
            user_agent = %user_agent,
            authenticated = config.access_token.is_some(),
            "Creating reqwest client"
        );

        let http = Client::builder().user_agent(user_agent).build()?;
        let inner = ReqwestClientInner { http, config };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &GcsConfig {
        &self.inner.config
    }

    fn bucket_url(&self, bucket: &str) -> String {
        format!(
            "{}/storage/v1/b/{}",
            self.inner.config.endpoint,
            encode_segment(bucket)
        )
    }

    fn object_url(&self, bucket: &str, name: &str) -> String {
        format!("{}/o/{}", self.bucket_url(bucket), encode_segment(name))
    }

    fn upload_url(&self, bucket: &str) -> String {
        format!(
            "{}/upload/storage/v1/b/{}/o",
            self.inner.config.endpoint,
            encode_segment(bucket)
        )
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let builder = self.inner.http.request(method, url);
        match &self.inner.config.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> ClientResult<Response> {
        let response = builder.send().await?;
        check_status(response).await
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let body = self.send(builder).await?.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ClientError::decode(e.to_string()))
    }
}

async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = ErrorResponse::message_of(&body);

    tracing::debug!(
        target: TRACING_TARGET,
        status = status.as_u16(),
        message = %message,
        "Request rejected"
    );

    Err(ClientError::from_status(status.as_u16(), message))
}

fn list_params(query: &ListQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(3);
    if let Some(prefix) = &query.prefix {
        params.push(("prefix", prefix.clone()));
    }
    if let Some(token) = &query.cursor {
        params.push(("pageToken", token.clone()));
    }
    if query.page_size > 0 {
        params.push(("maxResults", query.page_size.to_string()));
    }
    params
}

#[async_trait::async_trait]
impl StorageClient for ReqwestClient {
    async fn create_bucket(&self, project_id: &str, name: &str) -> ClientResult<BucketAttrs> {
        let url = format!("{}/storage/v1/b", self.inner.config.endpoint);
        let builder = self
            .request(Method::POST, url)
            .query(&[("project", project_id)])
            .json(&NewBucket { name });

        let resource: BucketResource = self.send_json(builder).await?;
        Ok(resource.into())
    }

    async fn delete_bucket(&self, name: &str) -> ClientResult<()> {
        self.send(self.request(Method::DELETE, self.bucket_url(name)))
            .await?;
        Ok(())
    }

    async fn bucket_attrs(&self, name: &str) -> ClientResult<BucketAttrs> {
        let resource: BucketResource = self
            .send_json(self.request(Method::GET, self.bucket_url(name)))
            .await?;
        Ok(resource.into())
    }

    async fn list_buckets(
        &self,
        project_id: &str,
        query: &ListQuery,
    ) -> ClientResult<ListPage<BucketAttrs>> {
        let url = format!("{}/storage/v1/b", self.inner.config.endpoint);
        let builder = self
            .request(Method::GET, url)
            .query(&[("project", project_id)])
            .query(&list_params(query));

        let response: ListResponse<BucketResource> = self.send_json(builder).await?;
        Ok(response.into_page())
    }

    async fn object_attrs(&self, bucket: &str, name: &str) -> ClientResult<ObjectAttrs> {
        let resource: ObjectResource = self
            .send_json(self.request(Method::GET, self.object_url(bucket, name)))
            .await?;
        ObjectAttrs::try_from(resource)
    }

    async fn list_objects(
        &self,
        bucket: &str,
        query: &ListQuery,
    ) -> ClientResult<ListPage<ObjectAttrs>> {
        let url = format!("{}/o", self.bucket_url(bucket));
        let builder = self
            .request(Method::GET, url)
            .query(&list_params(query));

        let response: ListResponse<ObjectResource> = self.send_json(builder).await?;
        response.try_into_page()
    }

    async fn delete_object(&self, bucket: &str, name: &str) -> ClientResult<()> {
        self.send(self.request(Method::DELETE, self.object_url(bucket, name)))
            .await?;
        Ok(())
    }

    async fn write_object(
        &self,
        bucket: &str,
        name: &str,
        write: ObjectWrite,
    ) -> ClientResult<()> {
        let mut data = Vec::with_capacity(write.prealloc());
        let ObjectWrite {
            mut content,
            metadata,
            content_type,
            ..
        } = write;
        content.read_to_end(&mut data).await?;

        let md5 = md5::compute(&data).0;
        let resource = NewObject {
            name,
            md5_hash: STANDARD.encode(md5),
            metadata: &metadata,
            content_type: content_type.as_deref(),
        };
        let resource =
            serde_json::to_vec(&resource).map_err(|e| ClientError::invalid_request(e.to_string()))?;
        let (boundary, body) = multipart_body(&resource, &data, &md5);

        tracing::debug!(
            target: TRACING_TARGET,
            bucket,
            object = name,
            size = data.len(),
            "Uploading object"
        );

        let builder = self
            .request(Method::POST, self.upload_url(bucket))
            .query(&[("uploadType", "multipart")])
            .header(CONTENT_TYPE, format!("multipart/related; boundary={boundary}"))
            .body(body);

        self.send(builder).await?;
        Ok(())
    }

    async fn read_object(&self, bucket: &str, name: &str) -> ClientResult<ByteStream> {
        let builder = self
            .request(Method::GET, self.object_url(bucket, name))
            .query(&[("alt", "media")]);
        let response = self.send(builder).await?;

        let stream = response
            .bytes_stream()
            .map_err(|e| stowage_core::Error::from(ClientError::from(e)));
        Ok(stream.boxed())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use mockito::{Matcher, Server};
    use serde_json::json;
    use stowage_core::Cursor;

    use super::*;

    fn client() -> ReqwestClient {
        let config = GcsConfig::new("acme")
            .with_endpoint("http://localhost:4443")
            .with_access_token("ya29.secret");
        ReqwestClient::new(config).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = client();
        assert_eq!(client.config().project_id, "acme");
    }

    #[test]
    fn test_debug_hides_token() {
        let debug = format!("{:?}", client());
        assert!(!debug.contains("ya29.secret"));
    }

    #[test]
    fn test_resource_urls() {
        let client = client();
        assert_eq!(
            client.object_url("b1", "dir/my file"),
            "http://localhost:4443/storage/v1/b/b1/o/dir%2Fmy%20file"
        );
        assert_eq!(
            client.upload_url("b1"),
            "http://localhost:4443/upload/storage/v1/b/b1/o"
        );
    }

    #[test]
    fn test_list_params() {
        assert!(list_params(&ListQuery::default()).is_empty());

        let query = ListQuery {
            prefix: Some("logs/".to_string()),
            cursor: Some("CgJiMQ==".to_string()),
            page_size: 50,
        };
        assert_eq!(
            list_params(&query),
            [
                ("prefix", "logs/".to_string()),
                ("pageToken", "CgJiMQ==".to_string()),
                ("maxResults", "50".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let config = GcsConfig::new("acme").with_endpoint("http://127.0.0.1:9");
        let client = ReqwestClient::new(config).unwrap();

        let err = client.bucket_attrs("b1").await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
    }

    fn client_for(server: &Server) -> ReqwestClient {
        let config = GcsConfig::new("acme")
            .with_endpoint(server.url())
            .with_access_token("ya29.secret");
        ReqwestClient::new(config).unwrap()
    }

    fn object_json(name: &str) -> serde_json::Value {
        json!({
            "bucket": "b1",
            "name": name,
            "size": "5",
            "md5Hash": "XUFAKrxLKna5cZ2REBfFkg==",
            "updated": "2024-01-01T00:00:00Z",
            "mediaLink": format!("https://storage.googleapis.com/download/storage/v1/b/b1/o/{name}?alt=media"),
        })
    }

    #[tokio::test]
    async fn test_create_bucket_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/storage/v1/b")
            .match_query(Matcher::UrlEncoded("project".into(), "acme".into()))
            .match_header("authorization", "Bearer ya29.secret")
            .match_body(Matcher::Json(json!({ "name": "b1" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({ "name": "b1", "timeCreated": "2024-01-01T00:00:00Z", "location": "US" })
                    .to_string(),
            )
            .create_async()
            .await;

        let attrs = client_for(&server).create_bucket("acme", "b1").await.unwrap();
        assert_eq!(attrs.name, "b1");
        assert_eq!(attrs.location.as_deref(), Some("US"));
        assert!(attrs.created.is_some());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_existing_bucket_is_conflict() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/storage/v1/b")
            .match_query(Matcher::Any)
            .with_status(409)
            .with_body(
                json!({ "error": { "code": 409, "message": "bucket already exists" } })
                    .to_string(),
            )
            .create_async()
            .await;

        let err = client_for(&server)
            .create_bucket("acme", "b1")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Conflict(ref m) if m == "bucket already exists"));
    }

    #[tokio::test]
    async fn test_list_buckets_by_project() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/storage/v1/b")
            .match_query(Matcher::UrlEncoded("project".into(), "acme".into()))
            .with_status(200)
            .with_body(json!({ "items": [{ "name": "b1" }, { "name": "b2" }] }).to_string())
            .create_async()
            .await;

        let page = client_for(&server)
            .list_buckets("acme", &ListQuery::default())
            .await
            .unwrap();
        let names: Vec<_> = page.items.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["b1", "b2"]);
        assert_eq!(page.next_cursor, None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_objects_follows_page_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/storage/v1/b/b1/o")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("prefix".into(), "f".into()),
                Matcher::UrlEncoded("maxResults".into(), "1".into()),
                Matcher::UrlEncoded("pageToken".into(), "tok2".into()),
            ]))
            .with_status(200)
            .with_body(json!({ "items": [object_json("f2")] }).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let page = client
            .list_objects("b1", &ListQuery::new("f", &Cursor::new("tok2"), 1))
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "f2");
        assert_eq!(page.items[0].size, 5);
        assert_eq!(page.next_cursor, None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_objects_returns_page_token() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/storage/v1/b/b1/o")
            .match_query(Matcher::UrlEncoded("maxResults".into(), "1".into()))
            .with_status(200)
            .with_body(json!({ "items": [object_json("f1")], "nextPageToken": "tok2" }).to_string())
            .create_async()
            .await;

        let page = client_for(&server)
            .list_objects("b1", &ListQuery::new("", &Cursor::start(), 1))
            .await
            .unwrap();

        assert_eq!(page.items[0].name, "f1");
        assert_eq!(page.next_cursor.as_deref(), Some("tok2"));
    }

    #[tokio::test]
    async fn test_object_attrs_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/storage/v1/b/b1/o/missing")
            .with_status(404)
            .with_body(
                json!({ "error": { "code": 404, "message": "No such object: b1/missing" } })
                    .to_string(),
            )
            .create_async()
            .await;

        let err = client_for(&server)
            .object_attrs("b1", "missing")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(err, ClientError::NotFound(ref m) if m == "No such object: b1/missing"));
    }

    #[tokio::test]
    async fn test_write_object_uploads_multipart() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/upload/storage/v1/b/b1/o")
            .match_query(Matcher::UrlEncoded("uploadType".into(), "multipart".into()))
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/related; boundary=stowage-".into()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#""md5Hash":"XUFAKrxLKna5cZ2REBfFkg==""#.into()),
                Matcher::Regex(r#""owner":"ops""#.into()),
                Matcher::Regex("hello".into()),
            ]))
            .with_status(200)
            .with_body(object_json("f1").to_string())
            .create_async()
            .await;

        let write = ObjectWrite::new(Box::pin(&b"hello"[..]))
            .with_size_hint(u64::MAX)
            .with_metadata(HashMap::from([("owner".to_string(), "ops".to_string())]));
        client_for(&server)
            .write_object("b1", "f1", write)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_read_object_streams_media() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/storage/v1/b/b1/o/f1")
            .match_query(Matcher::UrlEncoded("alt".into(), "media".into()))
            .with_status(200)
            .with_body("hello")
            .create_async()
            .await;

        let stream = client_for(&server).read_object("b1", "f1").await.unwrap();
        let chunks: Vec<_> = stream.try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"hello");
    }

    #[tokio::test]
    async fn test_read_missing_object_fails_before_streaming() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/storage/v1/b/b1/o/f1")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body("Not Found")
            .create_async()
            .await;

        let err = client_for(&server)
            .read_object("b1", "f1")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ClientError::NotFound(ref m) if m == "Not Found"));
    }
}
