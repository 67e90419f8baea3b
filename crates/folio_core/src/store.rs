//! The flat-file record store.
//!
//! One store instance owns one append-oriented data file of back-to-back
//! variable-length records plus a sibling count file holding a little-endian
//! u32 of currently valid records. An in-memory offset index mirrors the
//! physical layout.
//!
//! Invariants:
//!
//! - record byte ranges never overlap
//! - every on-disk mutation goes through the one code path that also
//!   updates the index
//! - file length always equals the sum of indexed record lengths
//! - a sequential scan from offset 0 yields exactly the header count of
//!   well-formed records before end-of-file
//!
//! Non-append mutation works by rewriting the file from the mutated
//! record's offset onward: the new bytes followed by the preserved
//! remainder, truncating on shrink. Index offsets of the shifted records
//! are adjusted by the size delta. There is no crash atomicity; a crash
//! mid-shift can corrupt the file (accepted non-goal, see DESIGN.md).

use crate::error::{CoreError, CoreResult};
use folio_codec::{CodecResult, RecordReader, RecordWriter};
use folio_storage::{FileBackend, StorageBackend};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::Path;
use tracing::{debug, info};

/// A value the record store can persist.
pub trait Record: Sized {
    /// True when the entity has a recognized older on-disk layout that
    /// [`Record::decode_legacy`] understands.
    const HAS_LEGACY: bool = false;

    /// The logical key identifying this record within its store.
    fn key(&self) -> &str;

    /// Writes the record in the current format.
    fn encode(&self, writer: &mut RecordWriter);

    /// Reads one record in the current format.
    fn decode(reader: &mut RecordReader<'_>) -> CodecResult<Self>;

    /// Reads one record in the recognized legacy layout.
    ///
    /// Only attempted when [`Record::HAS_LEGACY`] is true and a strict
    /// scan of the whole file failed; a successful legacy scan triggers a
    /// compaction that rewrites every record in the current format.
    fn decode_legacy(reader: &mut RecordReader<'_>) -> CodecResult<Self> {
        Self::decode(reader)
    }
}

/// Byte position and length of one record in the data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Offset of the record's first byte.
    pub offset: u64,
    /// Encoded length in bytes.
    pub len: u64,
}

struct Inner {
    data: Box<dyn StorageBackend>,
    count: Box<dyn StorageBackend>,
    index: HashMap<String, Slot>,
    /// Cached data-file length; equals the sum of indexed record lengths.
    tail: u64,
}

/// Durable, mutable, keyed storage of variable-length binary records.
///
/// A single exclusive lock serializes `load`, `append`, `update` and
/// `remove`; only one mutation is ever in flight against a store.
///
/// [`RecordStore::load`] must run before mutations: it is what populates
/// the offset index from the physical file.
pub struct RecordStore<R: Record> {
    inner: Mutex<Inner>,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Record> RecordStore<R> {
    /// Opens (or initializes) the store files `<name>.db` and
    /// `<name>.size` under `dir`.
    pub fn open(dir: &Path, name: &str) -> CoreResult<Self> {
        let data = FileBackend::open_with_create_dirs(&dir.join(format!("{name}.db")))?;
        let count = FileBackend::open(&dir.join(format!("{name}.size")))?;
        Self::with_backends(Box::new(data), Box::new(count))
    }

    /// Builds a store over arbitrary backends. Used by tests with
    /// [`folio_storage::InMemoryBackend`].
    pub fn with_backends(
        data: Box<dyn StorageBackend>,
        count: Box<dyn StorageBackend>,
    ) -> CoreResult<Self> {
        if count.size()? < 4 {
            if data.size()? != 0 {
                return Err(CoreError::corrupted(
                    "data file present but count header missing",
                ));
            }
            count.write_at(0, &0u32.to_le_bytes())?;
        }
        let tail = data.size()?;
        Ok(Self {
            inner: Mutex::new(Inner {
                data,
                count,
                index: HashMap::new(),
                tail,
            }),
            _marker: PhantomData,
        })
    }

    /// Scans the whole data file, rebuilding the offset index.
    ///
    /// Records failing `validator` are dropped. Any drop, and any
    /// legacy-layout rescan, triggers a full-file compaction that rewrites
    /// the survivors in the current format and rewrites the count header.
    /// A missing or empty backing file yields an empty store - not an
    /// error.
    pub fn load<F>(&self, validator: F) -> CoreResult<Vec<R>>
    where
        F: Fn(&R) -> bool,
    {
        let mut inner = self.inner.lock();

        let size = inner.data.size()?;
        if size == 0 {
            inner.index.clear();
            inner.tail = 0;
            write_count(&*inner.count, 0)?;
            return Ok(Vec::new());
        }

        let declared = read_count(&*inner.count)?;
        let image = inner.data.read_at(0, size as usize)?;

        let (scanned, migrated) = match scan(&image, declared, R::decode) {
            Ok(scanned) => (scanned, false),
            Err(strict_err) => {
                if !R::HAS_LEGACY {
                    return Err(strict_err);
                }
                match scan(&image, declared, R::decode_legacy) {
                    Ok(scanned) => {
                        info!(records = scanned.len(), "legacy store layout detected");
                        (scanned, true)
                    }
                    Err(_) => return Err(strict_err),
                }
            }
        };

        let mut survivors = Vec::with_capacity(scanned.len());
        let mut dropped = 0usize;
        for (record, slot) in scanned {
            if validator(&record) {
                survivors.push((record, slot));
            } else {
                debug!(key = record.key(), "dropping record failing validation");
                dropped += 1;
            }
        }

        if migrated || dropped > 0 {
            Self::compact(&mut inner, &mut survivors)?;
        } else {
            inner.index = survivors
                .iter()
                .map(|(record, slot)| (record.key().to_string(), *slot))
                .collect();
            inner.tail = size;
        }

        Ok(survivors.into_iter().map(|(record, _)| record).collect())
    }

    /// Rewrites the whole file from `survivors`, re-encoding each record
    /// in the current format.
    fn compact(inner: &mut Inner, survivors: &mut [(R, Slot)]) -> CoreResult<()> {
        inner.data.truncate(0)?;
        inner.index.clear();
        inner.tail = 0;

        for (record, slot) in survivors.iter_mut() {
            let mut writer = RecordWriter::new();
            record.encode(&mut writer);
            let bytes = writer.into_bytes();

            let offset = inner.data.append(&bytes)?;
            *slot = Slot {
                offset,
                len: bytes.len() as u64,
            };
            inner.index.insert(record.key().to_string(), *slot);
            inner.tail = offset + bytes.len() as u64;
        }

        write_count(&*inner.count, survivors.len() as u32)?;
        Ok(())
    }

    /// Appends a new record, returning its offset.
    ///
    /// # Errors
    ///
    /// [`CoreError::DuplicateKey`] if the key is already indexed.
    pub fn append(&self, record: &R) -> CoreResult<u64> {
        let mut inner = self.inner.lock();

        let key = record.key().to_string();
        if inner.index.contains_key(&key) {
            return Err(CoreError::DuplicateKey { key });
        }

        let mut writer = RecordWriter::new();
        record.encode(&mut writer);
        let bytes = writer.into_bytes();

        let offset = inner.data.append(&bytes)?;
        inner.tail = offset + bytes.len() as u64;

        let count = read_count(&*inner.count)?;
        write_count(&*inner.count, count + 1)?;

        inner.index.insert(
            key,
            Slot {
                offset,
                len: bytes.len() as u64,
            },
        );

        Ok(offset)
    }

    /// Rewrites an existing record in place.
    ///
    /// When the encoded length changes, every record physically after the
    /// key is shifted by the delta: the file is rewritten from the old
    /// offset as one contiguous block, and the shifted records' index
    /// offsets are adjusted to match.
    pub fn update(&self, record: &R) -> CoreResult<()> {
        let mut inner = self.inner.lock();

        let key = record.key();
        let slot = *inner
            .index
            .get(key)
            .ok_or_else(|| CoreError::not_found("record", key))?;

        let mut writer = RecordWriter::new();
        record.encode(&mut writer);
        let mut image = writer.into_bytes();
        let new_len = image.len() as u64;

        let old_end = slot.offset + slot.len;
        let remainder = inner.data.read_at(old_end, (inner.tail - old_end) as usize)?;
        image.extend_from_slice(&remainder);

        inner.data.write_at(slot.offset, &image)?;
        let new_tail = slot.offset + image.len() as u64;
        if new_tail < inner.tail {
            inner.data.truncate(new_tail)?;
        }
        inner.tail = new_tail;

        let delta = new_len as i64 - slot.len as i64;
        if delta != 0 {
            for shifted in inner.index.values_mut() {
                if shifted.offset > slot.offset {
                    shifted.offset = (shifted.offset as i64 + delta) as u64;
                }
            }
        }
        inner.index.insert(
            key.to_string(),
            Slot {
                offset: slot.offset,
                len: new_len,
            },
        );

        Ok(())
    }

    /// Removes a record, pulling every subsequent record left by its size
    /// and decrementing the count header.
    pub fn remove(&self, key: &str) -> CoreResult<()> {
        let mut inner = self.inner.lock();

        let slot = *inner
            .index
            .get(key)
            .ok_or_else(|| CoreError::not_found("record", key))?;

        let old_end = slot.offset + slot.len;
        let remainder = inner.data.read_at(old_end, (inner.tail - old_end) as usize)?;

        inner.data.write_at(slot.offset, &remainder)?;
        inner.data.truncate(inner.tail - slot.len)?;
        inner.tail -= slot.len;

        let count = read_count(&*inner.count)?;
        write_count(&*inner.count, count.saturating_sub(1))?;

        inner.index.remove(key);
        for shifted in inner.index.values_mut() {
            if shifted.offset > slot.offset {
                shifted.offset -= slot.len;
            }
        }

        Ok(())
    }

    /// Decodes the record currently stored under `key`.
    pub fn get(&self, key: &str) -> CoreResult<Option<R>> {
        let inner = self.inner.lock();

        let Some(slot) = inner.index.get(key) else {
            return Ok(None);
        };

        let bytes = inner.data.read_at(slot.offset, slot.len as usize)?;
        let mut reader = RecordReader::new(&bytes);
        Ok(Some(R::decode(&mut reader)?))
    }

    /// Whether `key` is currently indexed.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().index.contains_key(key)
    }

    /// Number of indexed records.
    pub fn len(&self) -> usize {
        self.inner.lock().index.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current data-file length in bytes.
    pub fn file_len(&self) -> CoreResult<u64> {
        Ok(self.inner.lock().data.size()?)
    }

    /// Sum of all indexed record lengths. Always equals
    /// [`RecordStore::file_len`] after a successful operation.
    pub fn indexed_bytes(&self) -> u64 {
        self.inner.lock().index.values().map(|slot| slot.len).sum()
    }

    /// The record count stored in the header file.
    pub fn count_header(&self) -> CoreResult<u32> {
        read_count(&*self.inner.lock().count)
    }

    /// The indexed slot for `key`, if any.
    pub fn slot(&self, key: &str) -> Option<Slot> {
        self.inner.lock().index.get(key).copied()
    }
}

/// Sequentially decodes exactly `declared` records, returning each with
/// its physical slot. Fails if decoding fails or the image has trailing
/// bytes.
fn scan<R, D>(image: &[u8], declared: u32, decode: D) -> CoreResult<Vec<(R, Slot)>>
where
    R: Record,
    D: Fn(&mut RecordReader<'_>) -> CodecResult<R>,
{
    let mut reader = RecordReader::new(image);
    let mut records = Vec::with_capacity(declared as usize);

    for _ in 0..declared {
        let offset = reader.position() as u64;
        let record = decode(&mut reader)?;
        let len = reader.position() as u64 - offset;
        records.push((record, Slot { offset, len }));
    }

    if !reader.is_empty() {
        return Err(CoreError::corrupted(format!(
            "{} trailing bytes after {declared} records",
            reader.remaining()
        )));
    }

    Ok(records)
}

fn read_count(backend: &dyn StorageBackend) -> CoreResult<u32> {
    let bytes = backend.read_at(0, 4)?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn write_count(backend: &dyn StorageBackend, count: u32) -> CoreResult<()> {
    backend.write_at(0, &count.to_le_bytes())?;
    Ok(())
}
