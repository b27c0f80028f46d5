//! # File Log Store
//!
//! One append-only log per namespace under the store directory
//! (`counts.log`, `mentions.log`, ...). Each `write_batch` appends one frame:
//!
//! ```text
//! [payload_len: u32 LE][crc32(payload): u32 LE][payload]
//! payload = [op_count: u32 LE] ([key_len: u32 LE][key][value_len: u32 LE][value])*
//! ```
//!
//! On open every log is replayed into an ordered map. Replay stops at the
//! first short or checksum-failing frame; a read-write open truncates that
//! tail so later appends start on a frame boundary.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{info, warn};

use super::lock::StoreLock;
use crate::domain::{KVStoreError, Namespace};
use crate::ports::{BatchOperation, OrderedKeyValueStore, ScanControl, ScanVisitor};

const FRAME_HEADER_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileLogOptions {
    pub read_only: bool,
    /// fsync each batch before acknowledging it.
    pub sync_writes: bool,
}

struct LogNamespace {
    path: PathBuf,
    map: BTreeMap<Vec<u8>, Vec<u8>>,
    /// Append handle; `None` for read-only opens.
    file: Option<File>,
    len: u64,
}

pub struct FileLogKVStore {
    dir: PathBuf,
    options: FileLogOptions,
    namespaces: Vec<RwLock<LogNamespace>>,
    _lock: Option<StoreLock>,
}

impl FileLogKVStore {
    pub fn open(dir: impl AsRef<Path>, options: FileLogOptions) -> Result<Self, KVStoreError> {
        let dir = dir.as_ref().to_path_buf();

        let lock = if options.read_only {
            if !dir.is_dir() {
                return Err(KVStoreError::NotFound(dir));
            }
            None
        } else {
            std::fs::create_dir_all(&dir)
                .map_err(|e| KVStoreError::io("create store directory", e))?;
            Some(StoreLock::acquire(&dir)?)
        };

        let mut namespaces = Vec::with_capacity(Namespace::ALL.len());
        for namespace in Namespace::ALL {
            let log = open_namespace(&dir, namespace, options.read_only)?;
            info!(
                "[fh-03] Replayed {} keys from {}",
                log.map.len(),
                log.path.display()
            );
            namespaces.push(RwLock::new(log));
        }

        Ok(Self {
            dir,
            options,
            namespaces,
            _lock: lock,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot(&self, namespace: Namespace) -> &RwLock<LogNamespace> {
        &self.namespaces[namespace.index()]
    }
}

fn log_path(dir: &Path, namespace: Namespace) -> PathBuf {
    dir.join(format!("{}.log", namespace.as_str()))
}

fn open_namespace(
    dir: &Path,
    namespace: Namespace,
    read_only: bool,
) -> Result<LogNamespace, KVStoreError> {
    let path = log_path(dir, namespace);

    let mut file = if read_only {
        if !path.is_file() {
            return Err(KVStoreError::NotFound(path));
        }
        OpenOptions::new()
            .read(true)
            .open(&path)
            .map_err(|e| KVStoreError::io("open log", e))?
    } else {
        OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|e| KVStoreError::io("open log", e))?
    };

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| KVStoreError::io("read log", e))?;

    let replay = replay_frames(&bytes);
    if replay.valid_len < bytes.len() {
        warn!(
            "[fh-03] Ignoring {} trailing bytes of {} after {} intact batches",
            bytes.len() - replay.valid_len,
            path.display(),
            replay.batches
        );
        if !read_only {
            file.set_len(replay.valid_len as u64)
                .map_err(|e| KVStoreError::io("truncate torn tail", e))?;
        }
    }

    Ok(LogNamespace {
        path,
        map: replay.map,
        file: if read_only { None } else { Some(file) },
        len: replay.valid_len as u64,
    })
}

struct Replay {
    map: BTreeMap<Vec<u8>, Vec<u8>>,
    valid_len: usize,
    batches: usize,
}

fn replay_frames(bytes: &[u8]) -> Replay {
    let mut replay = Replay {
        map: BTreeMap::new(),
        valid_len: 0,
        batches: 0,
    };

    let mut cursor = 0;
    while let Some((operations, frame_len)) = read_frame(&bytes[cursor..]) {
        for op in operations {
            replay.map.insert(op.key, op.value);
        }
        cursor += frame_len;
        replay.valid_len = cursor;
        replay.batches += 1;
    }

    replay
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let raw: [u8; 4] = bytes.get(at..at + 4)?.try_into().ok()?;
    Some(u32::from_le_bytes(raw))
}

/// Decode one frame from the start of `bytes`, returning its operations and
/// total length. `None` for a short, corrupt or malformed frame.
fn read_frame(bytes: &[u8]) -> Option<(Vec<BatchOperation>, usize)> {
    let payload_len = read_u32(bytes, 0)? as usize;
    let checksum = read_u32(bytes, 4)?;
    let payload = bytes.get(FRAME_HEADER_LEN..FRAME_HEADER_LEN + payload_len)?;
    if crc32fast::hash(payload) != checksum {
        return None;
    }

    let count = read_u32(payload, 0)? as usize;
    let mut operations = Vec::with_capacity(count.min(1024));
    let mut at = 4;
    for _ in 0..count {
        let key_len = read_u32(payload, at)? as usize;
        at += 4;
        let key = payload.get(at..at + key_len)?.to_vec();
        at += key_len;
        let value_len = read_u32(payload, at)? as usize;
        at += 4;
        let value = payload.get(at..at + value_len)?.to_vec();
        at += value_len;
        operations.push(BatchOperation { key, value });
    }
    if at != payload.len() {
        return None;
    }

    Some((operations, FRAME_HEADER_LEN + payload_len))
}

fn encode_frame(operations: &[BatchOperation]) -> Result<Vec<u8>, KVStoreError> {
    let too_large = || KVStoreError::Io {
        message: "batch exceeds 4 GiB frame limit".to_string(),
    };
    let len32 = |n: usize| u32::try_from(n).map_err(|_| too_large());

    let mut payload = Vec::new();
    payload.extend_from_slice(&len32(operations.len())?.to_le_bytes());
    for op in operations {
        payload.extend_from_slice(&len32(op.key.len())?.to_le_bytes());
        payload.extend_from_slice(&op.key);
        payload.extend_from_slice(&len32(op.value.len())?.to_le_bytes());
        payload.extend_from_slice(&op.value);
    }

    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
    frame.extend_from_slice(&len32(payload.len())?.to_le_bytes());
    frame.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

impl OrderedKeyValueStore for FileLogKVStore {
    fn write_batch(
        &self,
        namespace: Namespace,
        operations: Vec<BatchOperation>,
    ) -> Result<(), KVStoreError> {
        if self.options.read_only {
            return Err(KVStoreError::ReadOnly);
        }
        if operations.is_empty() {
            return Ok(());
        }
        let frame = encode_frame(&operations)?;

        let mut log = self.slot(namespace).write();
        let log = &mut *log;
        let Some(file) = log.file.as_mut() else {
            return Err(KVStoreError::ReadOnly);
        };

        let written = file.write_all(&frame).and_then(|()| {
            if self.options.sync_writes {
                file.sync_data()
            } else {
                Ok(())
            }
        });
        if let Err(e) = written {
            // Drop any partial frame so the next batch starts on a boundary.
            let _ = file.set_len(log.len);
            return Err(KVStoreError::io("append batch", e));
        }

        log.len += frame.len() as u64;
        for op in operations {
            log.map.insert(op.key, op.value);
        }
        Ok(())
    }

    fn scan_forward(
        &self,
        namespace: Namespace,
        from: &[u8],
        visitor: &mut ScanVisitor<'_>,
    ) -> Result<(), KVStoreError> {
        let log = self.slot(namespace).read();
        for (key, value) in log.map.range(from.to_vec()..) {
            if visitor(key, value) == ScanControl::Stop {
                break;
            }
        }
        Ok(())
    }

    fn scan_reverse(
        &self,
        namespace: Namespace,
        visitor: &mut ScanVisitor<'_>,
    ) -> Result<(), KVStoreError> {
        let log = self.slot(namespace).read();
        for (key, value) in log.map.iter().rev() {
            if visitor(key, value) == ScanControl::Stop {
                break;
            }
        }
        Ok(())
    }

    fn is_read_only(&self) -> bool {
        self.options.read_only
    }

    fn describe(&self) -> String {
        format!("file-log:{}", self.dir.display())
    }
}
