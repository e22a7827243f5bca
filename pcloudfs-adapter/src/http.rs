//! pCloud HTTP API client.
//!
//! Every method is a request to `{endpoint}/{method}` with query
//! parameters and a bearer token. Responses are JSON objects whose
//! `result` field is `0` on success.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::{
    ApiResponse, Empty, FileLink, MetadataEnvelope, RemoteStorageClient, UploadCreated,
};
use crate::config::AdapterConfig;
use crate::error::{ClientError, ClientResult};

pub struct HttpClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl HttpClient {
    pub fn new(config: &AdapterConfig) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            access_token: config.access_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), method)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        query: &[(&str, String)],
    ) -> ClientResult<ApiResponse<T>> {
        let resp = self
            .client
            .get(self.method_url(method))
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = resp.json().await?;
        let response = ApiResponse::from_json(method, body)?;
        debug!(method, code = response.result, "pCloud call complete");
        Ok(response)
    }
}

fn path_query(path: &str) -> [(&'static str, String); 1] {
    [("path", path.to_string())]
}

#[async_trait]
impl RemoteStorageClient for HttpClient {
    async fn stat(&self, path: &str) -> ClientResult<ApiResponse<MetadataEnvelope>> {
        self.call("stat", &path_query(path)).await
    }

    async fn create_folder_if_absent(
        &self,
        path: &str,
    ) -> ClientResult<ApiResponse<MetadataEnvelope>> {
        self.call("createfolderifnotexists", &path_query(path)).await
    }

    async fn delete_file(&self, path: &str) -> ClientResult<ApiResponse<Empty>> {
        self.call("deletefile", &path_query(path)).await
    }

    async fn delete_folder(&self, path: &str) -> ClientResult<ApiResponse<Empty>> {
        self.call("deletefolder", &path_query(path)).await
    }

    async fn delete_folder_recursive(&self, path: &str) -> ClientResult<ApiResponse<Empty>> {
        self.call("deletefolderrecursive", &path_query(path)).await
    }

    async fn list_folder(
        &self,
        path: &str,
        recursive: bool,
    ) -> ClientResult<ApiResponse<MetadataEnvelope>> {
        let recursive = if recursive { "1" } else { "0" };
        self.call(
            "listfolder",
            &[("path", path.to_string()), ("recursive", recursive.to_string())],
        )
        .await
    }

    async fn get_download_link(&self, path: &str) -> ClientResult<ApiResponse<FileLink>> {
        self.call(
            "getfilelink",
            &[("path", path.to_string()), ("forcedownload", "1".to_string())],
        )
        .await
    }

    async fn download(&self, url: &str) -> ClientResult<Bytes> {
        // Download links are pre-signed; the bearer token is not sent.
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(ClientError::Download {
                status: resp.status().as_u16(),
            });
        }
        Ok(resp.bytes().await?)
    }

    async fn upload_create(&self) -> ClientResult<ApiResponse<UploadCreated>> {
        self.call("upload_create", &[]).await
    }

    async fn upload_write(
        &self,
        upload_id: u64,
        offset: u64,
        data: Bytes,
    ) -> ClientResult<ApiResponse<Empty>> {
        let len = data.len();
        let resp = self
            .client
            .put(self.method_url("upload_write"))
            .bearer_auth(&self.access_token)
            .query(&[
                ("uploadid", upload_id.to_string()),
                ("uploadoffset", offset.to_string()),
            ])
            .header("Content-Type", "application/octet-stream")
            .body(data)
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = resp.json().await?;
        let response = ApiResponse::from_json("upload_write", body)?;
        debug!(upload_id, offset, len, code = response.result, "pCloud chunk written");
        Ok(response)
    }

    async fn upload_save(
        &self,
        upload_id: u64,
        name: &str,
        folder_id: u64,
    ) -> ClientResult<ApiResponse<Empty>> {
        self.call(
            "upload_save",
            &[
                ("uploadid", upload_id.to_string()),
                ("name", name.to_string()),
                ("folderid", folder_id.to_string()),
            ],
        )
        .await
    }

    async fn rename_file(&self, path: &str, to_path: &str) -> ClientResult<ApiResponse<Empty>> {
        self.call(
            "renamefile",
            &[("path", path.to_string()), ("topath", to_path.to_string())],
        )
        .await
    }

    async fn copy_file(&self, path: &str, to_path: &str) -> ClientResult<ApiResponse<Empty>> {
        self.call(
            "copyfile",
            &[("path", path.to_string()), ("topath", to_path.to_string())],
        )
        .await
    }
}
