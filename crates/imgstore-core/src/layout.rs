//! Bit-exact on-disk record definitions.
//!
//! A store file is three contiguous regions: one [`Header`], `max_files` fixed-size
//! [`Slot`] records, and a payload heap of raw JPEG bytes. Every record here has a
//! stable little-endian byte layout so rebuilds never shift existing offsets.

use crate::error::{Error, Result};

/// Magic string written into every store created by this crate.
pub const MAGIC: &str = "EPFL ImgStore binary";

/// Maximum length of [`Header::magic_name`], excluding the NUL terminator.
pub const MAX_IMGST_NAME: usize = 31;
/// Maximum length of [`Slot::img_id`], excluding the NUL terminator.
pub const MAX_IMG_ID: usize = 127;
/// Upper bound on `max_files` accepted by [`crate::store::Store::create`].
pub const MAX_MAX_FILES: u32 = 100_000;
/// Upper bound (per axis) on the thumbnail resolution cap.
pub const MAX_THUMB_RES: u16 = 128;
/// Upper bound (per axis) on the small resolution cap.
pub const MAX_SMALL_RES: u16 = 512;

/// Index of the thumbnail variant within `size`/`offset` arrays.
pub const THUMB: usize = 0;
/// Index of the small variant within `size`/`offset` arrays.
pub const SMALL: usize = 1;
/// Index of the original variant within `size`/`offset` arrays.
pub const ORIG: usize = 2;
/// Number of resolution variants tracked per slot.
pub const NB_RES: usize = 3;

/// A resolution variant of a stored image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Thumbnail-sized derivative, capped by `res_thumb_w`/`res_thumb_h`.
    Thumb,
    /// Small-sized derivative, capped by `res_small_w`/`res_small_h`.
    Small,
    /// The original, untouched bytes.
    Orig,
}

impl Variant {
    /// Index of this variant into a slot's `size`/`offset` arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Thumb => THUMB,
            Self::Small => SMALL,
            Self::Orig => ORIG,
        }
    }

    /// Parses an external resolution token (see the format's resolution grammar).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Resolutions`] for any token other than `"original"`, `"orig"`,
    /// `"thumbnail"`, `"thumb"`, or `"small"`.
    pub fn from_token(token: &str) -> Result<Self> {
        match token {
            "original" | "orig" => Ok(Self::Orig),
            "thumbnail" | "thumb" => Ok(Self::Thumb),
            "small" => Ok(Self::Small),
            other => Err(Error::Resolutions(format!("unknown resolution '{other}'"))),
        }
    }

    /// Filename suffix used by read-out tooling: `_thumb`, `_small`, `_orig`.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Thumb => "_thumb",
            Self::Small => "_small",
            Self::Orig => "_orig",
        }
    }
}

/// In-memory mirror of the store's fixed header record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Format tag; always [`MAGIC`] for stores created by this crate.
    pub magic_name: String,
    /// Counter incremented on every committed mutation.
    pub version: u32,
    /// Number of currently valid slots.
    pub num_valid: u32,
    /// Capacity of the metadata array; immutable after creation.
    pub max_files: u32,
    /// Thumbnail bounding box width.
    pub res_thumb_w: u16,
    /// Thumbnail bounding box height.
    pub res_thumb_h: u16,
    /// Small bounding box width.
    pub res_small_w: u16,
    /// Small bounding box height.
    pub res_small_h: u16,
}

impl Header {
    /// Exact on-disk size of a header record, in bytes.
    pub const SIZE: usize = 64;

    /// Builds a fresh header for `create`, with `num_valid` and `version` at zero.
    #[must_use]
    pub fn new(max_files: u32, res_thumb: (u16, u16), res_small: (u16, u16)) -> Self {
        Self {
            magic_name: MAGIC.to_string(),
            version: 0,
            num_valid: 0,
            max_files,
            res_thumb_w: res_thumb.0,
            res_thumb_h: res_thumb.1,
            res_small_w: res_small.0,
            res_small_h: res_small.1,
        }
    }

    /// Returns the bounding box (w, h) for a resize-eligible variant.
    #[must_use]
    pub const fn resolution_for(&self, variant: Variant) -> (u16, u16) {
        match variant {
            Variant::Thumb => (self.res_thumb_w, self.res_thumb_h),
            Variant::Small => (self.res_small_w, self.res_small_h),
            Variant::Orig => (0, 0),
        }
    }

    /// Serializes this header to its exact little-endian on-disk representation.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        let name_bytes = self.magic_name.as_bytes();
        let name_len = name_bytes.len().min(MAX_IMGST_NAME);
        buf[..name_len].copy_from_slice(&name_bytes[..name_len]);
        // buf[MAX_IMGST_NAME] stays 0 as the NUL terminator; buf[name_len+1..32] stays 0 padding.
        buf[32..36].copy_from_slice(&self.version.to_le_bytes());
        buf[36..40].copy_from_slice(&self.num_valid.to_le_bytes());
        buf[40..44].copy_from_slice(&self.max_files.to_le_bytes());
        buf[44..46].copy_from_slice(&self.res_thumb_w.to_le_bytes());
        buf[46..48].copy_from_slice(&self.res_thumb_h.to_le_bytes());
        buf[48..50].copy_from_slice(&self.res_small_w.to_le_bytes());
        buf[50..52].copy_from_slice(&self.res_small_h.to_le_bytes());
        // buf[52..56] reserved u32, buf[56..64] reserved u64 — both zeroed.
        buf
    }

    /// Parses a header from its exact little-endian on-disk representation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `buf` is shorter than [`Self::SIZE`] or the
    /// magic name is not valid UTF-8.
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        if buf.len() < Self::SIZE {
            return Err(Error::InvalidArgument("header record truncated".into()));
        }
        let nul = buf[..MAX_IMGST_NAME + 1]
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(MAX_IMGST_NAME + 1);
        let magic_name = std::str::from_utf8(&buf[..nul])
            .map_err(|e| Error::InvalidArgument(format!("magic name not UTF-8: {e}")))?
            .to_string();
        Ok(Self {
            magic_name,
            version: u32::from_le_bytes(buf[32..36].try_into().unwrap()),
            num_valid: u32::from_le_bytes(buf[36..40].try_into().unwrap()),
            max_files: u32::from_le_bytes(buf[40..44].try_into().unwrap()),
            res_thumb_w: u16::from_le_bytes(buf[44..46].try_into().unwrap()),
            res_thumb_h: u16::from_le_bytes(buf[46..48].try_into().unwrap()),
            res_small_w: u16::from_le_bytes(buf[48..50].try_into().unwrap()),
            res_small_h: u16::from_le_bytes(buf[50..52].try_into().unwrap()),
        })
    }
}

/// In-memory mirror of one metadata slot, discriminated by `is_valid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// Printable image identifier, 1-127 bytes when valid.
    pub img_id: String,
    /// SHA-256 digest of the original bytes.
    pub sha: [u8; 32],
    /// Original width.
    pub orig_w: u32,
    /// Original height.
    pub orig_h: u32,
    /// Byte length of `[THUMB, SMALL, ORIG]`.
    pub size: [u32; NB_RES],
    /// Absolute file offset of `[THUMB, SMALL, ORIG]`; 0 means absent for THUMB/SMALL.
    pub offset: [u64; NB_RES],
    /// Whether this slot currently holds a valid image.
    pub is_valid: bool,
}

impl Slot {
    /// Exact on-disk size of a slot record, in bytes.
    pub const SIZE: usize = 208;

    /// An empty slot with all fields zeroed, as written by `create`.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            img_id: String::new(),
            sha: [0u8; 32],
            orig_w: 0,
            orig_h: 0,
            size: [0; NB_RES],
            offset: [0; NB_RES],
            is_valid: false,
        }
    }

    /// Serializes this slot to its exact little-endian on-disk representation.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        let id_bytes = self.img_id.as_bytes();
        let id_len = id_bytes.len().min(MAX_IMG_ID);
        buf[..id_len].copy_from_slice(&id_bytes[..id_len]);
        buf[128..160].copy_from_slice(&self.sha);
        buf[160..164].copy_from_slice(&self.orig_w.to_le_bytes());
        buf[164..168].copy_from_slice(&self.orig_h.to_le_bytes());
        buf[168..172].copy_from_slice(&self.size[THUMB].to_le_bytes());
        buf[172..176].copy_from_slice(&self.size[SMALL].to_le_bytes());
        buf[176..180].copy_from_slice(&self.size[ORIG].to_le_bytes());
        buf[180..188].copy_from_slice(&self.offset[THUMB].to_le_bytes());
        buf[188..196].copy_from_slice(&self.offset[SMALL].to_le_bytes());
        buf[196..204].copy_from_slice(&self.offset[ORIG].to_le_bytes());
        buf[204..206].copy_from_slice(&u16::from(self.is_valid).to_le_bytes());
        // buf[206..208] reserved, zeroed.
        buf
    }

    /// Parses a slot from its exact little-endian on-disk representation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `buf` is shorter than [`Self::SIZE`] or `img_id`
    /// is not valid UTF-8.
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        if buf.len() < Self::SIZE {
            return Err(Error::InvalidArgument("slot record truncated".into()));
        }
        let nul = buf[..MAX_IMG_ID + 1]
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(MAX_IMG_ID + 1);
        let img_id = std::str::from_utf8(&buf[..nul])
            .map_err(|e| Error::InvalidArgument(format!("img_id not UTF-8: {e}")))?
            .to_string();
        let mut sha = [0u8; 32];
        sha.copy_from_slice(&buf[128..160]);
        let is_valid = u16::from_le_bytes(buf[204..206].try_into().unwrap()) != 0;
        Ok(Self {
            img_id,
            sha,
            orig_w: u32::from_le_bytes(buf[160..164].try_into().unwrap()),
            orig_h: u32::from_le_bytes(buf[164..168].try_into().unwrap()),
            size: [
                u32::from_le_bytes(buf[168..172].try_into().unwrap()),
                u32::from_le_bytes(buf[172..176].try_into().unwrap()),
                u32::from_le_bytes(buf[176..180].try_into().unwrap()),
            ],
            offset: [
                u64::from_le_bytes(buf[180..188].try_into().unwrap()),
                u64::from_le_bytes(buf[188..196].try_into().unwrap()),
                u64::from_le_bytes(buf[196..204].try_into().unwrap()),
            ],
            is_valid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips() {
        let header = Header::new(3, (64, 64), (256, 256));
        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), Header::SIZE);
        let parsed = Header::from_bytes(&bytes).unwrap();
        assert_eq!(header, parsed);
    }

    #[test]
    fn slot_round_trips() {
        let mut slot = Slot::empty();
        slot.img_id = "a".to_string();
        slot.sha = [7u8; 32];
        slot.orig_w = 800;
        slot.orig_h = 600;
        slot.size[ORIG] = 1024;
        slot.offset[ORIG] = 64;
        slot.is_valid = true;

        let bytes = slot.to_bytes();
        assert_eq!(bytes.len(), Slot::SIZE);
        let parsed = Slot::from_bytes(&bytes).unwrap();
        assert_eq!(slot, parsed);
    }

    #[test]
    fn variant_token_parsing() {
        assert_eq!(Variant::from_token("orig").unwrap(), Variant::Orig);
        assert_eq!(Variant::from_token("original").unwrap(), Variant::Orig);
        assert_eq!(Variant::from_token("thumb").unwrap(), Variant::Thumb);
        assert_eq!(Variant::from_token("thumbnail").unwrap(), Variant::Thumb);
        assert_eq!(Variant::from_token("small").unwrap(), Variant::Small);
        assert!(Variant::from_token("huge").is_err());
    }

    #[test]
    fn variant_suffix() {
        assert_eq!(Variant::Thumb.suffix(), "_thumb");
        assert_eq!(Variant::Small.suffix(), "_small");
        assert_eq!(Variant::Orig.suffix(), "_orig");
    }
}
