//! Archive format definitions.
//!
//! These definitions are independent of read/write support, although we do
//! implement some traits useful for those.

use core::mem;

/// File identification bytes stored at the beginning of the file.
pub const MAGIC: [u8; 8] = *b"!<arch>\n";

/// The terminator for each archive member header.
pub const TERMINATOR: [u8; 2] = *b"`\n";

/// The size in bytes of an archive member header.
pub const HEADER_SIZE: usize = mem::size_of::<Header>();

/// A member header of all zero bytes.
///
/// Some archive writers emit two consecutive zero blocks after the last
/// member as an explicit end-of-archive marker. `.deb` containers end at
/// the end of the stream instead, so the writer in this crate never emits
/// these, but the reader recognizes them.
pub const ZERO_BLOCK: [u8; HEADER_SIZE] = [0; HEADER_SIZE];

/// The header at the start of an archive member.
///
/// All fields are ASCII, left justified, and padded with spaces to their
/// full width. Numeric fields are decimal, except for `mode` which is
/// octal.
///
/// Note that `gid` precedes `uid`, matching the container layout used for
/// `.deb` files rather than the classic System V column order.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct Header {
    /// The file name.
    pub name: [u8; 16],
    /// File modification timestamp in decimal.
    pub date: [u8; 12],
    /// Group ID in decimal.
    pub gid: [u8; 6],
    /// User ID in decimal.
    pub uid: [u8; 6],
    /// File mode in octal.
    pub mode: [u8; 8],
    /// File size in decimal.
    ///
    /// If the high bit of the first byte is set, the field instead holds a
    /// big-endian binary integer with that bit masked off.
    pub size: [u8; 10],
    /// Must be equal to `TERMINATOR`.
    pub terminator: [u8; 2],
}

unsafe_impl_pod!(Header);
