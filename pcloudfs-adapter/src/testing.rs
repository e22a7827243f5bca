//! In-memory stand-in for the pCloud API used by unit tests.
//!
//! Emulates the result codes the adapter depends on and records every
//! call in order.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::IgnoredAny;

use crate::client::{
    ApiResponse, Empty, FileLink, MetadataEnvelope, RemoteMetadata, RemoteStorageClient,
    UploadCreated,
};
use crate::error::{ClientError, ClientResult};
use crate::path;

const MODIFIED: &str = "Thu, 19 Sep 2013 07:31:46 +0000";
const DOWNLOAD_HOST: &str = "c1.pcloud.test";

pub const PARENT_MISSING: u32 = 2002;
pub const ALREADY_EXISTS: u32 = 2004;
pub const DIR_MISSING: u32 = 2005;
pub const DIR_NOT_EMPTY: u32 = 2006;
pub const FILE_MISSING: u32 = 2009;
pub const BAD_UPLOAD: u32 = 1900;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Stat(String),
    CreateFolder(String),
    DeleteFile(String),
    DeleteFolder(String),
    DeleteFolderRecursive(String),
    ListFolder(String, bool),
    GetLink(String),
    Download(String),
    UploadCreate,
    UploadWrite { upload_id: u64, offset: u64, len: usize },
    UploadSave { upload_id: u64, name: String, folder_id: u64 },
    Rename(String, String),
    Copy(String, String),
}

#[derive(Debug, Clone)]
struct Node {
    id: u64,
    is_folder: bool,
    content: Bytes,
    content_type: Option<String>,
}

struct State {
    nodes: BTreeMap<String, Node>,
    uploads: HashMap<u64, Vec<u8>>,
    links: HashMap<String, Bytes>,
    next_id: u64,
    calls: Vec<Call>,
    failures: HashMap<&'static str, (u32, String)>,
    fail_write_at: Option<u64>,
    omit_link_hosts: bool,
}

pub struct FakeClient {
    state: Mutex<State>,
}

fn guess_content_type(name: &str) -> Option<String> {
    match name.rsplit_once('.').map(|(_, ext)| ext) {
        Some("txt") => Some("text/plain".into()),
        Some("png") => Some("image/png".into()),
        Some(_) => Some("application/octet-stream".into()),
        None => None,
    }
}

impl FakeClient {
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            path::ROOT.to_string(),
            Node {
                id: 0,
                is_folder: true,
                content: Bytes::new(),
                content_type: None,
            },
        );
        Self {
            state: Mutex::new(State {
                nodes,
                uploads: HashMap::new(),
                links: HashMap::new(),
                next_id: 1,
                calls: Vec::new(),
                failures: HashMap::new(),
                fail_write_at: None,
                omit_link_hosts: false,
            }),
        }
    }

    /// Create a folder and its ancestors without recording calls.
    pub fn with_folder(self, folder: &str) -> Self {
        {
            let mut st = self.state.lock().unwrap();
            for level in path::ancestors_inclusive(folder) {
                if !st.nodes.contains_key(&level) {
                    let id = st.alloc_id();
                    st.nodes.insert(level, Node::folder(id));
                }
            }
        }
        self
    }

    /// Create a file (and its parent folders) without recording calls.
    pub fn with_file(self, file: &str, content: &[u8]) -> Self {
        let this = self.with_folder(&path::parent_of(file));
        {
            let mut st = this.state.lock().unwrap();
            let id = st.alloc_id();
            let name = path::base_name(file).unwrap_or_default();
            st.nodes.insert(
                path::normalize(file),
                Node {
                    id,
                    is_folder: false,
                    content: Bytes::copy_from_slice(content),
                    content_type: guess_content_type(&name),
                },
            );
        }
        this
    }

    /// Make every call to `method` fail with `code`.
    pub fn fail(&self, method: &'static str, code: u32, message: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(method, (code, message.to_string()));
    }

    /// Reject the chunk written at `offset`.
    pub fn fail_upload_write_at(&self, offset: u64) {
        self.state.lock().unwrap().fail_write_at = Some(offset);
    }

    pub fn omit_link_hosts(&self) {
        self.state.lock().unwrap().omit_link_hosts = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn exists(&self, p: &str) -> bool {
        self.state.lock().unwrap().nodes.contains_key(&path::normalize(p))
    }

    pub fn content(&self, p: &str) -> Option<Bytes> {
        self.state
            .lock()
            .unwrap()
            .nodes
            .get(&path::normalize(p))
            .filter(|n| !n.is_folder)
            .map(|n| n.content.clone())
    }

    pub fn folder_id(&self, p: &str) -> Option<u64> {
        self.state
            .lock()
            .unwrap()
            .nodes
            .get(&path::normalize(p))
            .filter(|n| n.is_folder)
            .map(|n| n.id)
    }

    pub fn pending_uploads(&self) -> usize {
        self.state.lock().unwrap().uploads.len()
    }

    fn begin(
        &self,
        call: Call,
        method: &'static str,
    ) -> Result<MutexGuard<'_, State>, (u32, String)> {
        let mut st = self.state.lock().unwrap();
        st.calls.push(call);
        if let Some(failure) = st.failures.get(method) {
            return Err(failure.clone());
        }
        Ok(st)
    }
}

impl Node {
    fn folder(id: u64) -> Self {
        Node {
            id,
            is_folder: true,
            content: Bytes::new(),
            content_type: None,
        }
    }
}

impl State {
    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn metadata(&self, p: &str, recursive: Option<bool>) -> RemoteMetadata {
        let node = &self.nodes[p];
        let name = path::base_name(p).unwrap_or_else(|| "/".to_string());
        let mut meta = RemoteMetadata {
            is_folder: node.is_folder,
            name: Some(name),
            path: Some(p.to_string()),
            modified: Some(MODIFIED.to_string()),
            ..Default::default()
        };
        if node.is_folder {
            meta.folder_id = Some(node.id);
            if let Some(deep) = recursive {
                let children = self
                    .children(p)
                    .into_iter()
                    .map(|child| self.metadata(&child, deep.then_some(true)))
                    .collect();
                meta.contents = Some(children);
            }
        } else {
            meta.file_id = Some(node.id);
            meta.size = Some(node.content.len() as u64);
            meta.content_type = node.content_type.clone();
        }
        meta
    }

    fn children(&self, p: &str) -> Vec<String> {
        self.nodes
            .keys()
            .filter(|k| k.as_str() != path::ROOT && path::parent_of(k) == p)
            .cloned()
            .collect()
    }

    fn is_folder(&self, p: &str) -> bool {
        self.nodes.get(p).map(|n| n.is_folder).unwrap_or(false)
    }

    fn place_file(&mut self, to: &str, source: &Node) -> Result<(), (u32, String)> {
        if !self.is_folder(&path::parent_of(to)) {
            return Err(parent_missing());
        }
        let id = self.alloc_id();
        self.nodes.insert(
            to.to_string(),
            Node {
                id,
                ..source.clone()
            },
        );
        Ok(())
    }
}

fn respond<T>(outcome: Result<T, (u32, String)>) -> ClientResult<ApiResponse<T>> {
    Ok(match outcome {
        Ok(payload) => ApiResponse::ok(payload),
        Err((code, message)) => ApiResponse::failed(code, message),
    })
}

fn parent_missing() -> (u32, String) {
    (PARENT_MISSING, "A component of parent directory does not exist.".into())
}

fn file_missing() -> (u32, String) {
    (FILE_MISSING, "File not found.".into())
}

fn dir_missing() -> (u32, String) {
    (DIR_MISSING, "Directory does not exist.".into())
}

#[async_trait]
impl RemoteStorageClient for FakeClient {
    async fn stat(&self, p: &str) -> ClientResult<ApiResponse<MetadataEnvelope>> {
        respond(self.begin(Call::Stat(p.into()), "stat").and_then(|st| {
            if !st.nodes.contains_key(p) {
                if !st.is_folder(&path::parent_of(p)) {
                    return Err(parent_missing());
                }
                return Err(file_missing());
            }
            Ok(MetadataEnvelope {
                metadata: st.metadata(p, None),
            })
        }))
    }

    async fn create_folder_if_absent(
        &self,
        p: &str,
    ) -> ClientResult<ApiResponse<MetadataEnvelope>> {
        respond(
            self.begin(Call::CreateFolder(p.into()), "createfolderifnotexists")
                .and_then(|mut st| {
                    let existing = st.nodes.get(p).map(|n| n.is_folder);
                    match existing {
                        Some(true) => {}
                        Some(false) => {
                            return Err((ALREADY_EXISTS, "File or folder alredy exists.".into()))
                        }
                        None => {
                            if !st.is_folder(&path::parent_of(p)) {
                                return Err(parent_missing());
                            }
                            let id = st.alloc_id();
                            st.nodes.insert(p.to_string(), Node::folder(id));
                        }
                    }
                    Ok(MetadataEnvelope {
                        metadata: st.metadata(p, None),
                    })
                }),
        )
    }

    async fn delete_file(&self, p: &str) -> ClientResult<ApiResponse<Empty>> {
        respond(self.begin(Call::DeleteFile(p.into()), "deletefile").and_then(|mut st| {
            if !st.nodes.get(p).map(|n| !n.is_folder).unwrap_or(false) {
                return Err(file_missing());
            }
            st.nodes.remove(p);
            Ok(IgnoredAny)
        }))
    }

    async fn delete_folder(&self, p: &str) -> ClientResult<ApiResponse<Empty>> {
        respond(self.begin(Call::DeleteFolder(p.into()), "deletefolder").and_then(|mut st| {
            if !st.is_folder(p) {
                return Err(dir_missing());
            }
            if !st.children(p).is_empty() {
                return Err((DIR_NOT_EMPTY, "Directory is not empty.".into()));
            }
            st.nodes.remove(p);
            Ok(IgnoredAny)
        }))
    }

    async fn delete_folder_recursive(&self, p: &str) -> ClientResult<ApiResponse<Empty>> {
        respond(
            self.begin(Call::DeleteFolderRecursive(p.into()), "deletefolderrecursive")
                .and_then(|mut st| {
                    if !st.is_folder(p) {
                        return Err(dir_missing());
                    }
                    let prefix = format!("{}/", p);
                    st.nodes.retain(|k, _| k.as_str() != p && !k.starts_with(&prefix));
                    Ok(IgnoredAny)
                }),
        )
    }

    async fn list_folder(
        &self,
        p: &str,
        recursive: bool,
    ) -> ClientResult<ApiResponse<MetadataEnvelope>> {
        respond(
            self.begin(Call::ListFolder(p.into(), recursive), "listfolder")
                .and_then(|st| {
                    if !st.is_folder(p) {
                        return Err(dir_missing());
                    }
                    Ok(MetadataEnvelope {
                        metadata: st.metadata(p, Some(recursive)),
                    })
                }),
        )
    }

    async fn get_download_link(&self, p: &str) -> ClientResult<ApiResponse<FileLink>> {
        respond(self.begin(Call::GetLink(p.into()), "getfilelink").and_then(|mut st| {
            let node = match st.nodes.get(p) {
                Some(n) if !n.is_folder => n.clone(),
                _ => return Err(file_missing()),
            };
            let link_path = format!("/dl/{}{}", node.id, p);
            if st.omit_link_hosts {
                return Ok(FileLink {
                    hosts: vec![],
                    path: link_path,
                });
            }
            st.links
                .insert(format!("https://{}{}", DOWNLOAD_HOST, link_path), node.content);
            Ok(FileLink {
                hosts: vec![DOWNLOAD_HOST.to_string()],
                path: link_path,
            })
        }))
    }

    async fn download(&self, url: &str) -> ClientResult<Bytes> {
        let mut st = self.state.lock().unwrap();
        st.calls.push(Call::Download(url.to_string()));
        st.links
            .get(url)
            .cloned()
            .ok_or(ClientError::Download { status: 404 })
    }

    async fn upload_create(&self) -> ClientResult<ApiResponse<UploadCreated>> {
        respond(self.begin(Call::UploadCreate, "upload_create").map(|mut st| {
            let id = st.alloc_id();
            st.uploads.insert(id, Vec::new());
            UploadCreated { upload_id: id }
        }))
    }

    async fn upload_write(
        &self,
        upload_id: u64,
        offset: u64,
        data: Bytes,
    ) -> ClientResult<ApiResponse<Empty>> {
        let call = Call::UploadWrite {
            upload_id,
            offset,
            len: data.len(),
        };
        respond(self.begin(call, "upload_write").and_then(|mut st| {
            if st.fail_write_at == Some(offset) {
                st.uploads.remove(&upload_id);
                return Err((BAD_UPLOAD, "Upload write failed.".into()));
            }
            let buf = st
                .uploads
                .get_mut(&upload_id)
                .ok_or((BAD_UPLOAD, "Invalid upload id.".to_string()))?;
            if buf.len() as u64 != offset {
                return Err((BAD_UPLOAD, "Offset does not match upload size.".into()));
            }
            buf.extend_from_slice(&data);
            Ok(IgnoredAny)
        }))
    }

    async fn upload_save(
        &self,
        upload_id: u64,
        name: &str,
        folder_id: u64,
    ) -> ClientResult<ApiResponse<Empty>> {
        let call = Call::UploadSave {
            upload_id,
            name: name.to_string(),
            folder_id,
        };
        respond(self.begin(call, "upload_save").and_then(|mut st| {
            let folder = st
                .nodes
                .iter()
                .find(|(_, n)| n.is_folder && n.id == folder_id)
                .map(|(k, _)| k.clone())
                .ok_or_else(dir_missing)?;
            let data = st
                .uploads
                .remove(&upload_id)
                .ok_or((BAD_UPLOAD, "Invalid upload id.".to_string()))?;
            let id = st.alloc_id();
            st.nodes.insert(
                path::join(&folder, name),
                Node {
                    id,
                    is_folder: false,
                    content: Bytes::from(data),
                    content_type: guess_content_type(name),
                },
            );
            Ok(IgnoredAny)
        }))
    }

    async fn rename_file(&self, p: &str, to_path: &str) -> ClientResult<ApiResponse<Empty>> {
        respond(
            self.begin(Call::Rename(p.into(), to_path.into()), "renamefile")
                .and_then(|mut st| {
                    let node = match st.nodes.get(p) {
                        Some(n) if !n.is_folder => n.clone(),
                        _ => return Err(file_missing()),
                    };
                    st.place_file(to_path, &node)?;
                    st.nodes.remove(p);
                    Ok(IgnoredAny)
                }),
        )
    }

    async fn copy_file(&self, p: &str, to_path: &str) -> ClientResult<ApiResponse<Empty>> {
        respond(
            self.begin(Call::Copy(p.into(), to_path.into()), "copyfile")
                .and_then(|mut st| {
                    let node = match st.nodes.get(p) {
                        Some(n) if !n.is_folder => n.clone(),
                        _ => return Err(file_missing()),
                    };
                    st.place_file(to_path, &node)?;
                    Ok(IgnoredAny)
                }),
        )
    }
}
