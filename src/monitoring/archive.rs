// monitoring/archive.rs
//
// Content-addressed storage of run output through an IPFS node's HTTP API.
// Each stored file's content id (CID) is appended to a JSON ledger keyed by
// the kind of data, and only ids found in the ledger can be fetched back.

use crate::config::ArchiveConfig;
use crate::error::{Error, Result};
use crate::monitoring::event_log::write_pretty_json;

use bytes::Bytes;
use log::{debug, info};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// What an archived file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveKind {
    /// Fleet snapshots.
    Traffic,
    /// Event logs of hazard deliveries.
    Accident,
}

impl ArchiveKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ArchiveKind::Traffic => "traffic",
            ArchiveKind::Accident => "accident",
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArchiveKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "traffic" => Ok(ArchiveKind::Traffic),
            "accident" => Ok(ArchiveKind::Accident),
            other => Err(Error::Archive(format!(
                "unknown data kind `{}`, expected `traffic` or `accident`",
                other
            ))),
        }
    }
}

/// Stored content ids per kind, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CidLedger {
    entries: BTreeMap<ArchiveKind, Vec<String>>,
}

impl CidLedger {
    /// A missing or blank ledger file is an empty ledger.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_pretty_json(path, self)
    }

    pub fn record(&mut self, kind: ArchiveKind, cid: &str) {
        self.entries.entry(kind).or_default().push(cid.to_string());
    }

    pub fn cids(&self, kind: ArchiveKind) -> &[String] {
        self.entries.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, kind: ArchiveKind, cid: &str) -> bool {
        self.cids(kind).iter().any(|stored| stored == cid)
    }
}

#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

/// Client for the `/api/v0/add` and `/api/v0/cat` endpoints of an IPFS node.
#[derive(Debug, Clone)]
pub struct IpfsArchive {
    client: reqwest::Client,
    api_url: String,
    ledger_path: PathBuf,
}

impl IpfsArchive {
    pub fn new(api_url: &str, ledger_path: PathBuf) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            ledger_path,
        }
    }

    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    /// Uploads `content` and returns the CID the node assigned to it.
    pub async fn add(&self, file_name: &str, content: Vec<u8>) -> Result<String> {
        let url = format!("{}/api/v0/add", self.api_url);
        let form = Form::new().part("file", Part::bytes(content).file_name(file_name.to_string()));
        let response = self.client.post(&url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_string());
            return Err(Error::Archive(format!("add returned {}: {}", status, body)));
        }
        let added: AddResponse = response.json().await?;
        Ok(added.hash)
    }

    /// Fetches the raw bytes stored under `cid`.
    pub async fn cat(&self, cid: &str) -> Result<Bytes> {
        let url = format!("{}/api/v0/cat", self.api_url);
        let response = self
            .client
            .post(&url)
            .query(&[("arg", cid)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_string());
            return Err(Error::Archive(format!("cat {} returned {}: {}", cid, status, body)));
        }
        Ok(response.bytes().await?)
    }

    /// Uploads a written JSON output file and records its CID under `kind`.
    pub async fn store_file(&self, kind: ArchiveKind, path: &Path) -> Result<String> {
        let content = tokio::fs::read(path).await?;
        if content.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::Archive(format!("{} is empty", path.display())));
        }
        serde_json::from_slice::<serde_json::Value>(&content)?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| kind.to_string());
        let cid = self.add(&file_name, content).await?;

        let mut ledger = CidLedger::load(&self.ledger_path)?;
        ledger.record(kind, &cid);
        ledger.save(&self.ledger_path)?;
        info!("Stored {} data from {} as {}", kind, path.display(), cid);
        Ok(cid)
    }

    /// Fetches archived JSON. The CID must have been recorded under `kind`.
    pub async fn retrieve(&self, kind: ArchiveKind, cid: &str) -> Result<serde_json::Value> {
        let ledger = CidLedger::load(&self.ledger_path)?;
        if !ledger.contains(kind, cid) {
            return Err(Error::UnknownCid {
                kind: kind.as_str(),
                cid: cid.to_string(),
            });
        }
        let content = self.cat(cid).await?;
        if content.is_empty() {
            return Err(Error::Archive(format!("no content stored under {}", cid)));
        }
        debug!("Retrieved {} bytes of {} data for {}", content.len(), kind, cid);
        Ok(serde_json::from_slice(&content)?)
    }
}

impl From<&ArchiveConfig> for IpfsArchive {
    fn from(config: &ArchiveConfig) -> Self {
        Self::new(&config.api_url, config.ledger.clone())
    }
}
