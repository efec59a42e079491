//! # `imgstore-core`
//!
//! Single-file, content-addressed JPEG image store.
//!
//! A store file holds a fixed header, a preallocated array of metadata slots, and a
//! heap of raw JPEG bytes appended in write order. Content-identical images share
//! storage via SHA-256 deduplication; thumbnail and small derivatives are computed on
//! first read and cached in place.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use imgstore_core::{OpenMode, Store, Variant};
//!
//! Store::create("photos.bin", 1000, (128, 128), (512, 512))?;
//! let mut store = Store::open("photos.bin", OpenMode::ReadWrite)?;
//!
//! store.insert(&jpeg_bytes, "vacation-01")?;
//! let thumb = store.read("vacation-01", Variant::Thumb)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod dedup;
pub mod error;
pub mod hash;
pub mod index;
pub mod io;
pub mod layout;
pub mod resize;
pub mod store;

pub use codec::{ImageCodec, JpegCodec};
pub use error::{Error, Result};
pub use hash::{Hasher, Sha256Hasher};
pub use layout::{Header, Slot, Variant, MAGIC, MAX_IMG_ID, MAX_MAX_FILES};
pub use store::{compact, ListMode, OpenMode, Store};
