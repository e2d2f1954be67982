//! Token metadata upload.
//!
//! A token's memo points at a JSON metadata document on IPFS. The builder
//! uploads the logo, then the metadata referencing it, and returns the
//! `ipfs://<cid>` URI to pass as the creation memo.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::address::EntityId;
use crate::errors::{MemejobError, MemejobResult};

const DEFAULT_PINATA_API_URL: &str = "https://api.pinata.cloud";
const DEFAULT_PINATA_GATEWAY_URL: &str = "https://gateway.pinata.cloud";
const DEFAULT_INFURA_URL: &str = "https://ipfs.infura.io:5001";
const DEFAULT_CATEGORY: &str = "@memejob-fun/sdk";

/// A file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    /// MIME type, e.g. `image/png`.
    pub mime_type: String,
    pub name: Option<String>,
}

impl Blob {
    pub fn new(bytes: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
            name: None,
        }
    }

    fn into_part(self) -> MemejobResult<Part> {
        let name = self.name.unwrap_or_else(|| "file".to_string());
        Ok(Part::bytes(self.bytes)
            .file_name(name)
            .mime_str(self.mime_type.trim())?)
    }
}

/// Stores and serves content on IPFS.
#[async_trait]
pub trait PinningService: Send + Sync {
    /// Upload and pin `blob`. Returns its CID.
    async fn add(&self, blob: Blob) -> MemejobResult<String>;

    /// Fetch the content behind `cid`.
    async fn get(&self, cid: &str) -> MemejobResult<Vec<u8>>;

    /// Pin content that is already on the network. Returns the pinned CIDs.
    async fn pin(&self, cid: &str) -> MemejobResult<Vec<String>>;

    async fn unpin(&self, cid: &str) -> MemejobResult<()>;
}

/// Reject anything that cannot be a CID before it reaches a URL.
fn checked_cid(cid: &str) -> MemejobResult<&str> {
    let cid = cid.trim();
    if cid.is_empty() || !cid.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(MemejobError::InvalidInput(format!("invalid CID: {cid:?}")));
    }
    Ok(cid)
}

fn trimmed_url(url: impl Into<String>) -> String {
    url.into().trim_end_matches('/').to_string()
}

/// [`PinningService`] backed by the Pinata pinning API.
#[derive(Clone)]
pub struct PinataService {
    http: reqwest::Client,
    api_url: String,
    gateway_url: String,
    jwt: String,
}

impl std::fmt::Debug for PinataService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinataService")
            .field("api_url", &self.api_url)
            .field("gateway_url", &self.gateway_url)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct PinataAddResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PinataPinResponse {
    ipfs_hash: String,
}

impl PinataService {
    pub fn new(jwt: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: DEFAULT_PINATA_API_URL.to_string(),
            gateway_url: DEFAULT_PINATA_GATEWAY_URL.to_string(),
            jwt: jwt.into(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = trimmed_url(api_url);
        self
    }

    pub fn with_gateway_url(mut self, gateway_url: impl Into<String>) -> Self {
        self.gateway_url = trimmed_url(gateway_url);
        self
    }

    fn api(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }

    fn gateway(&self, cid: &str) -> String {
        format!("{}/ipfs/{cid}", self.gateway_url)
    }
}

#[async_trait]
impl PinningService for PinataService {
    async fn add(&self, blob: Blob) -> MemejobResult<String> {
        let response: PinataAddResponse = self
            .http
            .post(self.api("/pinning/pinFileToIPFS"))
            .bearer_auth(&self.jwt)
            .multipart(Form::new().part("file", blob.into_part()?))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::debug!(cid = %response.ipfs_hash, "Pinned file");
        Ok(response.ipfs_hash)
    }

    async fn get(&self, cid: &str) -> MemejobResult<Vec<u8>> {
        let bytes = self
            .http
            .get(self.gateway(checked_cid(cid)?))
            .bearer_auth(&self.jwt)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }

    async fn pin(&self, cid: &str) -> MemejobResult<Vec<String>> {
        let response: PinataPinResponse = self
            .http
            .post(self.api("/pinning/pinByHash"))
            .bearer_auth(&self.jwt)
            .json(&serde_json::json!({ "hashToPin": checked_cid(cid)? }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(vec![response.ipfs_hash])
    }

    async fn unpin(&self, cid: &str) -> MemejobResult<()> {
        self.http
            .delete(self.api(&format!("/pinning/unpin/{}", checked_cid(cid)?)))
            .bearer_auth(&self.jwt)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// [`PinningService`] backed by an IPFS HTTP API node such as Infura's,
/// authenticated with a project key and secret.
#[derive(Clone)]
pub struct InfuraService {
    http: reqwest::Client,
    base_url: String,
    project_key: String,
    project_secret: String,
}

impl std::fmt::Debug for InfuraService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfuraService")
            .field("base_url", &self.base_url)
            .field("project_key", &self.project_key)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct InfuraAddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

#[derive(Deserialize)]
struct InfuraPinResponse {
    #[serde(rename = "Pins", default)]
    pins: Vec<String>,
}

impl InfuraService {
    pub fn new(project_key: impl Into<String>, project_secret: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_INFURA_URL.to_string(),
            project_key: project_key.into(),
            project_secret: project_secret.into(),
        }
    }

    /// Point at another IPFS HTTP API node, e.g. `http://localhost:5001`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trimmed_url(base_url);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn command(&self, command: &str) -> String {
        format!("{}/api/v0/{command}", self.base_url)
    }

    async fn post(&self, command: &str, cid: &str) -> MemejobResult<reqwest::Response> {
        Ok(self
            .http
            .post(self.command(command))
            .query(&[("arg", checked_cid(cid)?)])
            .basic_auth(&self.project_key, Some(&self.project_secret))
            .send()
            .await?
            .error_for_status()?)
    }
}

#[async_trait]
impl PinningService for InfuraService {
    async fn add(&self, blob: Blob) -> MemejobResult<String> {
        let response: InfuraAddResponse = self
            .http
            .post(self.command("add"))
            .query(&[("pin", "true")])
            .basic_auth(&self.project_key, Some(&self.project_secret))
            .multipart(Form::new().part("file", blob.into_part()?))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::debug!(cid = %response.hash, "Added file");
        Ok(response.hash)
    }

    async fn get(&self, cid: &str) -> MemejobResult<Vec<u8>> {
        Ok(self.post("cat", cid).await?.bytes().await?.to_vec())
    }

    async fn pin(&self, cid: &str) -> MemejobResult<Vec<String>> {
        let response: InfuraPinResponse = self.post("pin/add", cid).await?.json().await?;
        Ok(response.pins)
    }

    async fn unpin(&self, cid: &str) -> MemejobResult<()> {
        self.post("pin/rm", cid).await?;
        Ok(())
    }
}

/// Inputs for [`MemoBuilder::upload`].
#[derive(Debug, Clone)]
pub struct UploadableTokenDetails {
    pub description: String,
    pub creator: EntityId,
    pub image: Blob,
    /// Free-form properties such as `twitter` or `website`.
    pub properties: BTreeMap<String, String>,
}

/// Metadata document stored on IPFS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    pub description: String,
    pub creator: String,
    pub light_logo: String,
    pub light_logotype: String,
    pub dark_logo: String,
    pub dark_logotype: String,
    pub properties: BTreeMap<String, String>,
}

/// Uploads token metadata and produces memo URIs.
#[derive(Clone)]
pub struct MemoBuilder {
    service: Arc<dyn PinningService>,
}

impl MemoBuilder {
    pub fn new(service: Arc<dyn PinningService>) -> Self {
        Self { service }
    }

    /// Upload the logo and metadata. Returns `ipfs://<cid>` of the metadata.
    pub async fn upload(&self, details: UploadableTokenDetails) -> MemejobResult<String> {
        let UploadableTokenDetails {
            description,
            creator,
            image,
            properties,
        } = details;

        let logotype = image.mime_type.trim().to_string();
        let image_path = format!("ipfs://{}", self.service.add(image).await?.trim());

        let mut all_properties = BTreeMap::from([(
            "category".to_string(),
            DEFAULT_CATEGORY.to_string(),
        )]);
        all_properties.extend(
            properties
                .into_iter()
                .map(|(key, value)| (key, value.trim().to_string())),
        );

        let metadata = TokenMetadata {
            description: description.trim().to_string(),
            creator: creator.to_string(),
            light_logo: image_path.clone(),
            light_logotype: logotype.clone(),
            dark_logo: image_path,
            dark_logotype: logotype,
            properties: all_properties,
        };

        let json = serde_json::to_vec(&metadata)
            .map_err(|e| MemejobError::Serialization(e.to_string()))?;
        let blob = Blob {
            bytes: json,
            mime_type: "application/json".to_string(),
            name: Some("metadata.json".to_string()),
        };

        let cid = self.service.add(blob).await?;
        Ok(format!("ipfs://{cid}"))
    }
}
