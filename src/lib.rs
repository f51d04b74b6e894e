//! # `debar`
//!
//! The `debar` crate reads and writes the Unix `ar` archive format as it is
//! used for the outer container of Debian `.deb` packages.
//!
//! An archive is an 8-byte magic signature followed by members laid out
//! back-to-back, each a fixed 60-byte ASCII header and the member's raw
//! bytes, padded to an even offset. There is no index; members are found by
//! sequential scan.
//!
//! The [`write::ArchiveWriter`] streams members into any [`std::io::Write`]
//! sink, and [`write::write_deb_archive`] packages a list of files into a
//! `.deb` container with the root ownership that `dpkg` requires. The
//! [`read::ArchiveReader`] decodes members one at a time from any
//! [`std::io::Read`] stream, seeking past unread member data when the
//! stream also implements [`std::io::Seek`].
//!
//! ## Example
//! ```
//! use std::io::Read;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut writer = debar::ArchiveWriter::new(Vec::new())?;
//! let spec = debar::MemberSpec::deb("debian-binary", 4, 0);
//! writer.append(&spec, &mut &b"2.0\n"[..])?;
//! let data = writer.into_inner()?;
//!
//! let mut reader = debar::ArchiveReader::new(&data[..])?;
//! while let Some(member) = reader.next_member()? {
//!     let mut data = Vec::new();
//!     reader.read_to_end(&mut data)?;
//!     assert_eq!(member.name(), b"debian-binary");
//!     assert_eq!(data, b"2.0\n");
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

#[macro_use]
mod pod;

pub mod archive;

#[cfg(feature = "read")]
pub mod read;
#[cfg(feature = "read")]
pub use crate::read::{ArchiveReader, Member};

#[cfg(feature = "write")]
pub mod write;
#[cfg(feature = "write")]
pub use crate::write::{write_deb_archive, ArchiveWriter, MemberFile, MemberSpec};
