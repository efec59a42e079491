//! The engine's top-level API: `open`, `create`, `insert`, `read`, `delete`, `list`, `compact`.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::codec::{ImageCodec, JpegCodec};
use crate::dedup;
use crate::error::{Error, Result};
use crate::hash::{Hasher, Sha256Hasher};
use crate::index::Index;
use crate::io;
use crate::layout::{
    Header, Slot, Variant, MAX_IMG_ID, MAX_MAX_FILES, MAX_SMALL_RES, MAX_THUMB_RES, ORIG, SMALL,
    THUMB,
};
use crate::resize;

/// How a store is opened: read-only sessions never write to the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// No mutation permitted; `insert`/`delete`/materialize all fail or are skipped.
    ReadOnly,
    /// Full read/write access.
    ReadWrite,
}

/// Which shape [`Store::list`] renders its output in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    /// Multi-line, human-readable text.
    Human,
    /// A `{"Images": [...]}` JSON object.
    Json,
}

/// An open session on a single store file.
///
/// Owns the file handle and the in-memory [`Index`] for the lifetime of the session.
/// At most one `Store` should be open on a given path at a time; see the crate's
/// concurrency notes.
pub struct Store {
    file: std::fs::File,
    path: PathBuf,
    index: Index,
    codec: Box<dyn ImageCodec>,
    hasher: Box<dyn Hasher>,
    mode: OpenMode,
}

impl Store {
    /// Creates a new store file at `path` with a zeroed header and metadata array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MaxFiles`] if `max_files` is 0 or exceeds 100,000,
    /// [`Error::Resolutions`] if either resolution cap is out of range,
    /// [`Error::InvalidFilename`] if `path` has no valid string form, or
    /// [`Error::Io`] if the file cannot be created or written.
    pub fn create(
        path: impl AsRef<Path>,
        max_files: u32,
        res_thumb: (u16, u16),
        res_small: (u16, u16),
    ) -> Result<()> {
        let path = path.as_ref();
        if max_files == 0 || max_files > MAX_MAX_FILES {
            return Err(Error::MaxFiles(max_files));
        }
        if res_thumb.0 > MAX_THUMB_RES || res_thumb.1 > MAX_THUMB_RES {
            return Err(Error::Resolutions(format!(
                "thumbnail resolution {}x{} exceeds {MAX_THUMB_RES}x{MAX_THUMB_RES}",
                res_thumb.0, res_thumb.1
            )));
        }
        if res_small.0 > MAX_SMALL_RES || res_small.1 > MAX_SMALL_RES {
            return Err(Error::Resolutions(format!(
                "small resolution {}x{} exceeds {MAX_SMALL_RES}x{MAX_SMALL_RES}",
                res_small.0, res_small.1
            )));
        }
        if path.as_os_str().is_empty() {
            return Err(Error::InvalidFilename);
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| {
                error!(path = %path.display(), error = %e, "failed to create store");
                Error::Io(e)
            })?;

        let header = Header::new(max_files, res_thumb, res_small);
        io::write_header(&mut file, &header)?;
        let empty = Slot::empty();
        for idx in 0..max_files as usize {
            io::write_slot(&mut file, idx, &empty)?;
        }

        debug!(path = %path.display(), max_files, "store created");
        Ok(())
    }

    /// Opens an existing store file, loading its header and full metadata array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be opened or the header/slot records are
    /// short or malformed.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut options = OpenOptions::new();
        options.read(true).write(mode == OpenMode::ReadWrite);
        let mut file = options.open(&path).map_err(|e| {
            error!(path = %path.display(), error = %e, "failed to open store");
            Error::Io(e)
        })?;

        let header = io::read_header(&mut file)?;
        let slots = io::read_all_slots(&mut file, header.max_files)?;
        let index = Index::new(header, slots);

        debug!(path = %path.display(), ?mode, "store opened");
        Ok(Self {
            file,
            path,
            index,
            codec: Box::new(JpegCodec),
            hasher: Box::new(Sha256Hasher),
            mode,
        })
    }

    /// Swaps in a non-default image codec, e.g. a fake encoder for tests.
    #[must_use]
    pub fn with_codec(mut self, codec: Box<dyn ImageCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Swaps in a non-default content hasher.
    #[must_use]
    pub fn with_hasher(mut self, hasher: Box<dyn Hasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Releases the session. Equivalent to dropping the `Store`; provided so callers can
    /// name the lifecycle step explicitly, and safe to call after a failed `open` never
    /// produced a `Store` in the first place.
    pub fn close(self) {
        debug!(path = %self.path.display(), "store closed");
    }

    /// Inserts `bytes` under `img_id`, running the dedup scan and committing a new slot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidImgId`] if `img_id` is empty or exceeds 127 bytes,
    /// [`Error::FullImgStore`] if no empty slot remains, [`Error::DuplicateId`] if
    /// another valid slot already has `img_id`, [`Error::ImgLib`] if the codec cannot
    /// read the image's dimensions, or [`Error::Io`] on a disk failure.
    pub fn insert(&mut self, bytes: &[u8], img_id: &str) -> Result<()> {
        if self.mode == OpenMode::ReadOnly {
            return Err(Error::InvalidArgument(
                "store opened read-only".to_string(),
            ));
        }
        if img_id.is_empty() || img_id.len() > MAX_IMG_ID {
            return Err(Error::InvalidImgId(img_id.to_string()));
        }

        let idx = self.index.find_empty()?;
        let sha = self.hasher.hash(bytes);
        #[allow(clippy::cast_possible_truncation)]
        let size_orig = bytes.len() as u32;

        let mut candidate = Slot::empty();
        candidate.img_id = img_id.to_string();
        candidate.sha = sha;
        candidate.size[ORIG] = size_orig;
        self.index.slots[idx] = candidate;

        if let Err(e) = dedup::scan(&mut self.index, idx) {
            self.index.slots[idx] = Slot::empty();
            return Err(e);
        }

        if self.index.slots[idx].offset[ORIG] == 0 {
            let offset = io::append_payload(&mut self.file, bytes)?;
            let slot = &mut self.index.slots[idx];
            slot.offset[ORIG] = offset;
            slot.offset[THUMB] = 0;
            slot.offset[SMALL] = 0;
            slot.size[THUMB] = 0;
            slot.size[SMALL] = 0;
        }

        let (w, h) = self.codec.dimensions(bytes)?;
        self.index.slots[idx].orig_w = w;
        self.index.slots[idx].orig_h = h;
        self.index.slots[idx].is_valid = true;

        self.index.header.num_valid += 1;
        self.index.bump_version();
        io::write_header(&mut self.file, &self.index.header)?;
        io::write_slot(&mut self.file, idx, &self.index.slots[idx])?;

        debug!(img_id, idx, "image inserted");
        Ok(())
    }

    /// Reads `img_id`'s bytes at `variant`, materializing a derived variant on first
    /// access.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `img_id` has no valid slot, or propagates codec or
    /// I/O errors from resize materialization.
    pub fn read(&mut self, img_id: &str, variant: Variant) -> Result<Vec<u8>> {
        let idx = self.index.find_by_id(img_id)?;
        let vi = variant.index();
        if !matches!(variant, Variant::Orig) && self.index.slots[idx].offset[vi] == 0 {
            if let Err(e) =
                resize::materialize(&mut self.file, &mut self.index, self.codec.as_ref(), idx, variant)
            {
                warn!(img_id, ?variant, error = %e, "resize materialization failed");
                return Err(e);
            }
        }
        let offset = self.index.slots[idx].offset[vi];
        let size = self.index.slots[idx].size[vi];
        io::read_payload(&mut self.file, offset, size)
    }

    /// Logically invalidates `img_id`'s slot. Payload bytes are left in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `img_id` has no valid slot, or [`Error::Io`] on a
    /// disk failure.
    pub fn delete(&mut self, img_id: &str) -> Result<()> {
        if self.mode == OpenMode::ReadOnly {
            return Err(Error::InvalidArgument(
                "store opened read-only".to_string(),
            ));
        }
        let idx = self.index.find_by_id(img_id)?;
        self.index.slots[idx].is_valid = false;
        self.index.header.num_valid -= 1;
        self.index.bump_version();
        io::write_slot(&mut self.file, idx, &self.index.slots[idx])?;
        io::write_header(&mut self.file, &self.index.header)?;
        debug!(img_id, "image deleted");
        Ok(())
    }

    /// Renders the currently valid slots in `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if JSON serialization fails (never expected in
    /// practice, since the payload is plain strings).
    pub fn list(&self, mode: ListMode) -> Result<String> {
        match mode {
            ListMode::Human => {
                let header = &self.index.header;
                let mut out = format!(
                    "*****ImgStore header*****\nmagic name: {}\nversion: {}\nnumber of valid images: {} / {}\n",
                    header.magic_name, header.version, header.num_valid, header.max_files
                );
                for slot in self.index.slots.iter().filter(|s| s.is_valid) {
                    out.push_str(&format!(
                        "image id: {}\noriginal resolution: {}x{}\n",
                        slot.img_id, slot.orig_w, slot.orig_h
                    ));
                }
                Ok(out)
            }
            ListMode::Json => {
                let images: Vec<&str> = self
                    .index
                    .slots
                    .iter()
                    .filter(|s| s.is_valid)
                    .map(|s| s.img_id.as_str())
                    .collect();
                #[derive(serde::Serialize)]
                struct Listing<'a> {
                    #[serde(rename = "Images")]
                    images: Vec<&'a str>,
                }
                serde_json::to_string(&Listing { images })
                    .map_err(|e| Error::InvalidArgument(e.to_string()))
            }
        }
    }
}

/// Compacts the store at `src_path` by copying every valid slot, in allocation order,
/// into a fresh store at `scratch_path`, then atomically replacing `src_path` with it.
///
/// Re-runs dedup and resize materialization against the fresh store, so the resulting
/// file contains no payload bytes unreferenced by a valid slot.
///
/// # Errors
///
/// Propagates any [`Error`] from opening, creating, inserting into, or renaming either
/// store. On failure the scratch file, if created, is left on disk for the caller to
/// clean up.
pub fn compact(src_path: impl AsRef<Path>, scratch_path: impl AsRef<Path>) -> Result<()> {
    let src_path = src_path.as_ref();
    let scratch_path = scratch_path.as_ref();

    let mut src = Store::open(src_path, OpenMode::ReadOnly)?;
    let max_files = src.index.header.max_files;
    let res_thumb = (src.index.header.res_thumb_w, src.index.header.res_thumb_h);
    let res_small = (src.index.header.res_small_w, src.index.header.res_small_h);

    let before = fs::metadata(src_path)?.len();

    Store::create(scratch_path, max_files, res_thumb, res_small)?;
    let mut dst = Store::open(scratch_path, OpenMode::ReadWrite)?;

    for idx in 0..src.index.slots.len() {
        if !src.index.slots[idx].is_valid {
            continue;
        }
        let src_slot = src.index.slots[idx].clone();
        let orig_bytes = io::read_payload(&mut src.file, src_slot.offset[ORIG], src_slot.size[ORIG])?;
        dst.insert(&orig_bytes, &src_slot.img_id)?;
        let new_idx = dst.index.find_by_id(&src_slot.img_id)?;

        for variant in [Variant::Thumb, Variant::Small] {
            if src_slot.offset[variant.index()] != 0 {
                resize::materialize(&mut dst.file, &mut dst.index, dst.codec.as_ref(), new_idx, variant)?;
            }
        }
    }

    src.close();
    dst.close();

    fs::remove_file(src_path)?;
    fs::rename(scratch_path, src_path)?;

    let after = fs::metadata(src_path)?.len();
    info!(path = %src_path.display(), before, after, "compaction complete");
    Ok(())
}
