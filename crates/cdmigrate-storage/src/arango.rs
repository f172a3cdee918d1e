//! ArangoDB over its HTTP API (blocking client, basic auth).

use crate::{CollectionKind, DocumentMeta, DocumentStore, StoreConfig, StoreError};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ArangoStore {
    client: Client,
    base: Url,
    database: String,
    username: String,
    password: String,
}

impl std::fmt::Debug for ArangoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArangoStore")
            .field("base", &self.base.as_str())
            .field("database", &self.database)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl ArangoStore {
    /// Build a client without touching the network.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut server = config.server.trim().to_string();
        if !server.ends_with('/') {
            server.push('/');
        }
        let base = Url::parse(&server).map_err(|e| StoreError::Endpoint {
            endpoint: config.server.clone(),
            message: e.to_string(),
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(StoreError::Endpoint {
                endpoint: config.server.clone(),
                message: format!("unsupported scheme `{}`", base.scheme()),
            });
        }
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base,
            database: config.database.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Build a client and check that the database is reachable.
    pub fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let store = Self::new(config)?;
        tracing::info!(server = %store.base, database = %store.database, "connecting to the database");
        let url = store.endpoint("_api/database/current")?;
        let resp = store.send(store.client.get(url))?;
        check(resp, || format!("choosing database `{}`", store.database))?;
        Ok(store)
    }

    /// `<server>/_db/<database>/<path>`
    pub fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        self.base
            .join(&format!("_db/{}/{}", self.database, path))
            .map_err(|e| StoreError::Endpoint {
                endpoint: self.base.to_string(),
                message: e.to_string(),
            })
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        Ok(request
            .basic_auth(&self.username, Some(&self.password))
            .send()?)
    }
}

fn check(resp: Response, context: impl FnOnce() -> String) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(StoreError::Http {
        context: context(),
        status: status.as_u16(),
        body,
    })
}

impl DocumentStore for ArangoStore {
    fn open_collection(
        &mut self,
        name: &str,
        kind: CollectionKind,
        truncate: bool,
    ) -> Result<(), StoreError> {
        let resp = self.send(
            self.client
                .get(self.endpoint(&format!("_api/collection/{name}"))?),
        )?;
        if resp.status() == StatusCode::NOT_FOUND {
            tracing::info!(collection = name, "creating collection");
            let body = json!({ "name": name, "type": kind.arango_type() });
            let resp = self.send(
                self.client
                    .post(self.endpoint("_api/collection")?)
                    .json(&body),
            )?;
            check(resp, || format!("creating collection `{name}`"))?;
        } else {
            check(resp, || format!("opening collection `{name}`"))?;
        }

        if truncate {
            let resp = self.send(
                self.client
                    .put(self.endpoint(&format!("_api/collection/{name}/truncate"))?),
            )?;
            check(resp, || format!("truncating `{name}`"))?;
            tracing::info!(collection = name, "truncated collection");
        }
        Ok(())
    }

    fn create_document(
        &mut self,
        collection: &str,
        doc: &Value,
    ) -> Result<DocumentMeta, StoreError> {
        let resp = self.send(
            self.client
                .post(self.endpoint(&format!("_api/document/{collection}"))?)
                .json(doc),
        )?;
        let resp = check(resp, || format!("creating document in `{collection}`"))?;
        let meta: DocumentMeta = resp.json()?;
        tracing::debug!(id = %meta.id, "created document");
        Ok(meta)
    }

    fn update_document(
        &mut self,
        collection: &str,
        key: &str,
        patch: &Value,
    ) -> Result<DocumentMeta, StoreError> {
        let resp = self.send(
            self.client
                .patch(self.endpoint(&format!("_api/document/{collection}/{key}"))?)
                .json(patch),
        )?;
        let resp = check(resp, || format!("updating `{collection}/{key}`"))?;
        let meta: DocumentMeta = resp.json()?;
        tracing::debug!(id = %meta.id, "updated document");
        Ok(meta)
    }
}
