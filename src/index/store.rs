//! Byte-level index persistence
//!
//! Layout: magic, format version, dimension, row count, corpus
//! fingerprint, then one record per row (length-prefixed id followed by
//! the row's f32 values, little-endian). Writes go to a temp file that is
//! renamed over the canonical path, so a concurrent reader never observes
//! a partially written index.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{DocumentEmbedding, FlatIndex, IndexError};

const MAGIC: [u8; 4] = *b"RMIX";
const FORMAT_VERSION: u32 = 1;

/// Identity of a persisted index: where it lives and which corpus state
/// it was built from. `get_or_build` compares the fingerprint against the
/// live corpus instead of trusting the file blindly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexHandle {
    pub path: PathBuf,
    pub corpus_size: usize,
    pub corpus_fingerprint: [u8; 32],
}

/// File-backed store for a [`FlatIndex`].
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Serialize the index and atomically replace the canonical file.
    pub fn persist(
        &self,
        index: &FlatIndex,
        corpus_fingerprint: &[u8; 32],
    ) -> Result<IndexHandle, IndexError> {
        let dimension = index.dimension();
        let rows = index.len();

        let mut buffer = Vec::with_capacity(48 + rows * (8 + dimension * 4));
        buffer.extend_from_slice(&MAGIC);
        buffer.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        buffer.extend_from_slice(&(dimension as u32).to_le_bytes());
        buffer.extend_from_slice(&(rows as u32).to_le_bytes());
        buffer.extend_from_slice(corpus_fingerprint);

        let matrix = index.rows();
        for (row, id) in index.ids().iter().enumerate() {
            buffer.extend_from_slice(&(id.len() as u32).to_le_bytes());
            buffer.extend_from_slice(id.as_bytes());
            for value in matrix.row(row) {
                buffer.extend_from_slice(&value.to_le_bytes());
            }
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| IndexError::Io {
                    source: e,
                    context: format!("Failed to create index directory {:?}", parent),
                })?;
            }
        }

        let mut tmp_name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "index".into());
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        std::fs::write(&tmp_path, &buffer).map_err(|e| IndexError::Io {
            source: e,
            context: format!("Failed to write index temp file {:?}", tmp_path),
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| IndexError::Io {
            source: e,
            context: format!("Failed to replace index file {:?}", self.path),
        })?;

        info!(
            "Persisted index: {} rows x {}D at {:?}",
            rows, dimension, self.path
        );

        Ok(IndexHandle {
            path: self.path.clone(),
            corpus_size: rows,
            corpus_fingerprint: *corpus_fingerprint,
        })
    }

    /// Load the persisted index, verifying the format losslessly.
    pub fn load(&self) -> Result<(FlatIndex, IndexHandle), IndexError> {
        let bytes = std::fs::read(&self.path).map_err(|e| IndexError::Io {
            source: e,
            context: format!("Failed to read index file {:?}", self.path),
        })?;
        let mut reader = Reader {
            bytes: &bytes,
            offset: 0,
            path: &self.path,
        };

        if reader.take(4)? != MAGIC.as_slice() {
            return Err(reader.corrupt("bad magic"));
        }
        let version = reader.read_u32()?;
        if version != FORMAT_VERSION {
            return Err(reader.corrupt(format!("unsupported format version {version}")));
        }

        let dimension = reader.read_u32()? as usize;
        let rows = reader.read_u32()? as usize;
        if dimension == 0 {
            return Err(reader.corrupt("stored dimension is zero"));
        }
        if rows == 0 {
            return Err(reader.corrupt("stored index has no rows"));
        }

        let mut corpus_fingerprint = [0u8; 32];
        corpus_fingerprint.copy_from_slice(reader.take(32)?);

        let mut entries = Vec::with_capacity(rows);
        for _ in 0..rows {
            let id_len = reader.read_u32()? as usize;
            let id = std::str::from_utf8(reader.take(id_len)?)
                .map_err(|_| reader.corrupt("id is not valid UTF-8"))?
                .to_string();

            let mut vector = Vec::with_capacity(dimension);
            for chunk in reader.take(dimension * 4)?.chunks_exact(4) {
                vector.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
            }

            entries.push(DocumentEmbedding { id, vector });
        }

        if reader.offset != bytes.len() {
            return Err(reader.corrupt("trailing bytes after last row"));
        }

        let index = FlatIndex::new(entries, dimension)?;
        debug!(
            "Loaded index: {} rows x {}D from {:?}",
            index.len(),
            dimension,
            self.path
        );

        Ok((
            index,
            IndexHandle {
                path: self.path.clone(),
                corpus_size: rows,
                corpus_fingerprint,
            },
        ))
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
    path: &'a Path,
}

impl<'a> Reader<'a> {
    fn corrupt(&self, reason: impl Into<String>) -> IndexError {
        IndexError::CorruptIndex {
            path: self.path.to_path_buf(),
            reason: reason.into(),
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], IndexError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| self.corrupt("truncated"))?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn read_u32(&mut self) -> Result<u32, IndexError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(id: &str, vector: Vec<f32>) -> DocumentEmbedding {
        DocumentEmbedding {
            id: id.to_string(),
            vector,
        }
    }

    fn sample_index() -> FlatIndex {
        FlatIndex::new(
            vec![
                entry("a.txt", vec![1.0, 0.0, 0.25]),
                entry("b.txt", vec![0.0, -1.0, 0.5]),
            ],
            3,
        )
        .unwrap()
    }

    #[test]
    fn test_persist_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let store = IndexStore::new(temp.path().join("resumes.index"));
        let fingerprint = [7u8; 32];

        let persisted = store.persist(&sample_index(), &fingerprint).unwrap();
        assert_eq!(persisted.corpus_size, 2);

        let (index, handle) = store.load().unwrap();
        assert_eq!(handle, persisted);
        assert_eq!(index.len(), 2);
        assert_eq!(index.dimension(), 3);
        assert_eq!(index.ids(), &["a.txt".to_string(), "b.txt".to_string()]);

        // Scores survive byte-level roundtrip exactly
        let hits = index.top_k(&[1.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].id, "a.txt");
        assert_eq!(hits[0].score, 1.0);
        assert_eq!(hits[1].score, 0.0);
    }

    #[test]
    fn test_persist_replaces_previous_index() {
        let temp = TempDir::new().unwrap();
        let store = IndexStore::new(temp.path().join("resumes.index"));

        store.persist(&sample_index(), &[1u8; 32]).unwrap();
        let bigger = FlatIndex::new(
            vec![
                entry("a.txt", vec![1.0, 0.0]),
                entry("b.txt", vec![0.0, 1.0]),
                entry("c.txt", vec![0.5, 0.5]),
            ],
            2,
        )
        .unwrap();
        store.persist(&bigger, &[2u8; 32]).unwrap();

        let (index, handle) = store.load().unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.dimension(), 2);
        assert_eq!(handle.corpus_fingerprint, [2u8; 32]);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let store = IndexStore::new(temp.path().join("missing.index"));
        assert!(!store.exists());
        assert!(matches!(store.load(), Err(IndexError::Io { .. })));
    }

    #[test]
    fn test_load_garbage_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("resumes.index");
        std::fs::write(&path, b"definitely not an index").unwrap();

        let store = IndexStore::new(&path);
        assert!(matches!(
            store.load(),
            Err(IndexError::CorruptIndex { .. })
        ));
    }

    #[test]
    fn test_load_truncated_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("resumes.index");
        let store = IndexStore::new(&path);
        store.persist(&sample_index(), &[0u8; 32]).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 5]).unwrap();

        assert!(matches!(
            store.load(),
            Err(IndexError::CorruptIndex { .. })
        ));
    }

    #[test]
    fn test_load_trailing_bytes_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("resumes.index");
        let store = IndexStore::new(&path);
        store.persist(&sample_index(), &[0u8; 32]).unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        bytes.extend_from_slice(&[0xab, 0xcd]);
        std::fs::write(&path, &bytes).unwrap();

        assert!(matches!(
            store.load(),
            Err(IndexError::CorruptIndex { .. })
        ));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp = TempDir::new().unwrap();
        let store = IndexStore::new(temp.path().join("resumes.index"));
        store.persist(&sample_index(), &[0u8; 32]).unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|x| x == "tmp").unwrap_or(false))
            .collect();
        assert!(leftovers.is_empty());
    }
}
