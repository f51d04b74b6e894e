//! Support for reading archive files.

use core::convert::TryFrom;
use std::io::{self, Read, Seek, SeekFrom};

use crate::archive;
use crate::pod;
use crate::read::{Error, ReadError, Result};

/// A streaming reader for archive members.
///
/// [`ArchiveReader::next_member`] advances past any unread data of the
/// current member (and its alignment padding) and parses the next member
/// header. The member's data is then read from the `ArchiveReader` itself
/// via its [`Read`] implementation, which stops at the member boundary.
///
/// The reader does not buffer member data and holds no state other than
/// the stream position, so it must not be shared between callers: the
/// advance and data reads move one cursor.
#[derive(Debug)]
pub struct ArchiveReader<R> {
    inner: R,
    skip: fn(&mut R, u64) -> io::Result<()>,
    remaining: u64,
    padding: bool,
    state: State,
}

#[derive(Debug)]
enum State {
    Active,
    Eof,
    Failed(Error),
}

impl<R: Read> ArchiveReader<R> {
    /// Create a reader over a sequential stream.
    ///
    /// Reads and validates the archive magic. Unread member data is
    /// skipped by reading and discarding it; use
    /// [`ArchiveReader::new_seekable`] to seek past it instead.
    pub fn new(inner: R) -> Result<Self> {
        Self::with_skip(inner, skip_by_read)
    }

    fn with_skip(mut inner: R, skip: fn(&mut R, u64) -> io::Result<()>) -> Result<Self> {
        let mut magic = [0; archive::MAGIC.len()];
        let read = read_full(&mut inner, &mut magic)?;
        if read != magic.len() || magic != archive::MAGIC {
            return Err(Error::Format("Unsupported archive identifier"));
        }
        Ok(ArchiveReader {
            inner,
            skip,
            remaining: 0,
            padding: false,
            state: State::Active,
        })
    }

    /// Advance to the next member and return its parsed header.
    ///
    /// Returns `Ok(None)` at the end of the archive, which is either the
    /// natural end of the stream at a member boundary or an explicit pair
    /// of all-zero header blocks. A zero block that is not followed by a
    /// second zero block is a format error.
    ///
    /// Terminal results are sticky: once `Ok(None)` or an error has been
    /// returned, every later call returns the same result without
    /// touching the stream again.
    pub fn next_member(&mut self) -> Result<Option<Member>> {
        match &self.state {
            State::Active => {}
            State::Eof => return Ok(None),
            State::Failed(error) => return Err(error.clone()),
        }
        match self.parse_next() {
            Ok(Some(member)) => Ok(Some(member)),
            Ok(None) => {
                self.state = State::Eof;
                Ok(None)
            }
            Err(error) => {
                self.state = State::Failed(error.clone());
                Err(error)
            }
        }
    }

    fn parse_next(&mut self) -> Result<Option<Member>> {
        let unread = self.remaining + u64::from(self.padding);
        if unread > 0 {
            (self.skip)(&mut self.inner, unread)?;
            self.remaining = 0;
            self.padding = false;
        }

        let mut block = [0; archive::HEADER_SIZE];
        let read = read_full(&mut self.inner, &mut block)?;
        if read == 0 {
            return Ok(None);
        }
        if read < block.len() {
            return Err(Error::Format("Invalid archive member header"));
        }

        if block == archive::ZERO_BLOCK {
            // The first half of an explicit end-of-archive marker.
            let read = read_full(&mut self.inner, &mut block)?;
            if read < block.len() || block != archive::ZERO_BLOCK {
                return Err(Error::Format("Invalid archive terminator"));
            }
            return Ok(None);
        }

        let member = Member::parse(&block)?;
        self.remaining = member.size();
        self.padding = (member.size() & 1) != 0;
        Ok(Some(member))
    }

    /// The number of unread data bytes in the current member.
    #[inline]
    pub fn data_remaining(&self) -> u64 {
        self.remaining
    }

    /// Return the underlying stream.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> ArchiveReader<R> {
    /// Create a reader over a seekable stream.
    ///
    /// Identical to [`ArchiveReader::new`], except that unread member data
    /// is skipped by seeking forward without reading it.
    pub fn new_seekable(inner: R) -> Result<Self> {
        Self::with_skip(inner, skip_by_seek)
    }
}

impl<R: Read> Read for ArchiveReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let limit = self.remaining.min(buf.len() as u64) as usize;
        let read = self.inner.read(&mut buf[..limit])?;
        if read == 0 {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        self.remaining -= read as u64;
        Ok(read)
    }
}

fn skip_by_read<R: Read>(reader: &mut R, amt: u64) -> io::Result<()> {
    let copied = io::copy(&mut reader.by_ref().take(amt), &mut io::sink())?;
    if copied != amt {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }
    Ok(())
}

fn skip_by_seek<R: Read + Seek>(reader: &mut R, amt: u64) -> io::Result<()> {
    let amt = i64::try_from(amt).map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?;
    reader.seek(SeekFrom::Current(amt))?;
    Ok(())
}

// Reads until `buf` is full or the stream ends, and returns the number of
// bytes read.
fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut read = 0;
    while read < buf.len() {
        match reader.read(&mut buf[read..]) {
            Ok(0) => break,
            Ok(n) => read += n,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        }
    }
    Ok(read)
}

/// A parsed archive member header.
///
/// All numeric fields are parsed eagerly when the member is returned by
/// [`ArchiveReader::next_member`]; a malformed field fails the whole
/// member.
#[derive(Debug, Clone, Copy)]
pub struct Member {
    header: archive::Header,
    date: u64,
    gid: u64,
    uid: u64,
    mode: u64,
    size: u64,
}

impl Member {
    fn parse(block: &[u8; archive::HEADER_SIZE]) -> Result<Self> {
        let (header, _) = pod::from_bytes::<archive::Header>(block)
            .read_error("Invalid archive member header")?;
        if header.terminator != archive::TERMINATOR {
            return Err(Error::Format("Invalid archive terminator"));
        }
        let date = parse_u64_digits(&header.date, 10).read_error("Invalid archive member date")?;
        let gid = parse_u64_digits(&header.gid, 10).read_error("Invalid archive member gid")?;
        let uid = parse_u64_digits(&header.uid, 10).read_error("Invalid archive member uid")?;
        let mode = parse_u64_digits(&header.mode, 8).read_error("Invalid archive member mode")?;
        let size = parse_size(&header.size).read_error("Invalid archive member size")?;
        Ok(Member {
            header: *header,
            date,
            gid,
            uid,
            mode,
            size,
        })
    }

    /// Return the raw header.
    #[inline]
    pub fn header(&self) -> &archive::Header {
        &self.header
    }

    /// Return the member name.
    ///
    /// The name is trimmed at the first `/` or space.
    pub fn name(&self) -> &[u8] {
        let name = &self.header.name;
        let name_len = memchr::memchr(b'/', name)
            .or_else(|| memchr::memchr(b' ', name))
            .unwrap_or(name.len());
        &name[..name_len]
    }

    /// Return the file modification timestamp.
    #[inline]
    pub fn date(&self) -> u64 {
        self.date
    }

    /// Return the group ID.
    #[inline]
    pub fn gid(&self) -> u64 {
        self.gid
    }

    /// Return the user ID.
    #[inline]
    pub fn uid(&self) -> u64 {
        self.uid
    }

    /// Return the file mode.
    #[inline]
    pub fn mode(&self) -> u64 {
        self.mode
    }

    /// Return the size in bytes of the member data.
    ///
    /// Alignment padding after the data is not included.
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }
}

// Ignores bytes starting from the first space.
fn parse_u64_digits(digits: &[u8], radix: u32) -> Option<u64> {
    if let [b' ', ..] = digits {
        return None;
    }
    let mut result: u64 = 0;
    for &c in digits {
        if c == b' ' {
            return Some(result);
        } else {
            let x = (c as char).to_digit(radix)?;
            result = result
                .checked_mul(u64::from(radix))?
                .checked_add(u64::from(x))?;
        }
    }
    Some(result)
}

// The size field is decimal digits, unless the high bit of the first byte
// is set, in which case the field holds a big-endian binary integer with
// that bit masked off. The binary form is recognized for interoperability
// but never produced by the writer.
fn parse_size(digits: &[u8]) -> Option<u64> {
    if digits.first()? & 0x80 != 0 {
        parse_binary_size(digits)
    } else {
        parse_u64_digits(digits, 10)
    }
}

fn parse_binary_size(digits: &[u8]) -> Option<u64> {
    let mut result: u64 = 0;
    for (i, &byte) in digits.iter().enumerate() {
        let byte = if i == 0 { byte & 0x7f } else { byte };
        result = result.checked_mul(256)?.checked_add(u64::from(byte))?;
    }
    Some(result)
}
