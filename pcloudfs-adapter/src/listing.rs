//! Pre-order flattening of a folder listing tree.

use pcloudfs_common::StorageAttributes;

use crate::client::RemoteMetadata;
use crate::path;

/// Depth-first walk over listing entries, yielding each folder before
/// its children. Children are only visited when `deep` is set and the
/// response actually included them.
pub struct Flatten {
    deep: bool,
    stack: Vec<(String, std::vec::IntoIter<RemoteMetadata>)>,
}

impl Flatten {
    pub fn new(root: &str, entries: Vec<RemoteMetadata>, deep: bool) -> Self {
        Self {
            deep,
            stack: vec![(path::normalize(root), entries.into_iter())],
        }
    }
}

/// The remote path when present, otherwise `parent/name`.
fn entry_path(parent: &str, entry: &RemoteMetadata) -> String {
    match &entry.path {
        Some(p) if !p.is_empty() => path::normalize(p),
        _ => path::join(parent, entry.name.as_deref().unwrap_or_default()),
    }
}

impl Iterator for Flatten {
    type Item = StorageAttributes;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = match self.stack.last_mut() {
                None => return None,
                Some((parent, entries)) => entries
                    .next()
                    .map(|entry| (entry_path(parent.as_str(), &entry), entry)),
            };
            let Some((item_path, mut entry)) = next else {
                self.stack.pop();
                continue;
            };

            if !entry.is_folder {
                return Some(StorageAttributes::File(entry.to_file_attributes(item_path)));
            }

            let dir = entry.to_directory_attributes(item_path.clone());
            if self.deep {
                if let Some(children) = entry.contents.take() {
                    self.stack.push((item_path, children.into_iter()));
                }
            }
            return Some(StorageAttributes::Dir(dir));
        }
    }
}
