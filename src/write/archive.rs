//! Support for writing archive files.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::archive;
use crate::pod;
use crate::write::{Error, Result};

/// The file mode given to every member of a `.deb` container.
///
/// `dpkg` refuses container contents that are not owned by root, so
/// [`MemberSpec::deb`] also forces uid and gid to zero.
pub const DEB_MODE: u64 = 0o100_644;

/// A streaming archive writer.
///
/// Members appear in the archive in exactly the order they are appended.
/// No end-of-archive marker is written; the archive ends with its last
/// member.
#[derive(Debug)]
pub struct ArchiveWriter<W: Write> {
    inner: W,
}

impl<W: Write> ArchiveWriter<W> {
    /// Create a writer and emit the global magic header.
    pub fn new(mut inner: W) -> Result<Self> {
        inner.write_all(&archive::MAGIC)?;
        Ok(ArchiveWriter { inner })
    }

    /// Append one member.
    ///
    /// Writes the member header, copies exactly `member.size` bytes from
    /// `data`, and appends a single `\n` pad byte if the size is odd so
    /// that the next header starts on an even offset. The pad byte is not
    /// part of the member.
    ///
    /// Errors leave the archive truncated mid-member; the output must be
    /// discarded.
    pub fn append<R: Read>(&mut self, member: &MemberSpec, data: &mut R) -> Result<()> {
        let header = member.to_header()?;
        self.inner.write_all(pod::bytes_of(&header))?;
        let copied = io::copy(&mut data.by_ref().take(member.size), &mut self.inner)?;
        if copied != member.size {
            return Err(Error::SizeMismatch {
                expected: member.size,
                actual: copied,
            });
        }
        if member.size & 1 != 0 {
            self.inner.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// The metadata for one archive member to be written.
#[derive(Debug, Clone)]
pub struct MemberSpec {
    /// Member name; at most 16 bytes.
    pub name: String,
    /// File modification timestamp in seconds since the Unix epoch.
    pub date: u64,
    /// Group ID.
    pub gid: u64,
    /// User ID.
    pub uid: u64,
    /// File mode.
    pub mode: u64,
    /// Size in bytes of the member data.
    pub size: u64,
}

impl MemberSpec {
    /// Member metadata for a `.deb` container: owned by root with mode
    /// `100644`.
    pub fn deb(name: impl Into<String>, size: u64, date: u64) -> Self {
        MemberSpec {
            name: name.into(),
            date,
            gid: 0,
            uid: 0,
            mode: DEB_MODE,
            size,
        }
    }

    fn to_header(&self) -> Result<archive::Header> {
        let mut header = archive::Header {
            name: [b' '; 16],
            date: [b' '; 12],
            gid: [b' '; 6],
            uid: [b' '; 6],
            mode: [b' '; 8],
            size: [b' '; 10],
            terminator: archive::TERMINATOR,
        };
        if set_field(&mut header.name, self.name.as_bytes()).is_err() {
            return Err(Error::NameTooLong(self.name.clone()));
        }
        set_decimal(&mut header.date, self.date).map_err(|()| Error::FieldOverflow("date"))?;
        set_decimal(&mut header.gid, self.gid).map_err(|()| Error::FieldOverflow("gid"))?;
        set_decimal(&mut header.uid, self.uid).map_err(|()| Error::FieldOverflow("uid"))?;
        set_octal(&mut header.mode, self.mode).map_err(|()| Error::FieldOverflow("mode"))?;
        set_decimal(&mut header.size, self.size).map_err(|()| Error::FieldOverflow("size"))?;
        Ok(header)
    }
}

// Left justifies `value` in `field`, leaving the space padding in place.
fn set_field(field: &mut [u8], value: &[u8]) -> core::result::Result<(), ()> {
    if value.len() > field.len() {
        return Err(());
    }
    field[..value.len()].copy_from_slice(value);
    Ok(())
}

fn set_decimal(field: &mut [u8], value: u64) -> core::result::Result<(), ()> {
    set_field(field, value.to_string().as_bytes())
}

fn set_octal(field: &mut [u8], value: u64) -> core::result::Result<(), ()> {
    set_field(field, format!("{:o}", value).as_bytes())
}

/// A source file and the name it will have in the archive.
#[derive(Debug, Clone)]
pub struct MemberFile {
    /// Path of the source file.
    pub source: PathBuf,
    /// Member name within the archive; at most 16 bytes.
    pub name: String,
}

impl MemberFile {
    /// Pair a source path with a member name.
    pub fn new(source: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        MemberFile {
            source: source.into(),
            name: name.into(),
        }
    }
}

/// Write a `.deb` style archive containing the given files.
///
/// Creates (or truncates) `dest` and writes one member per entry of
/// `members`, in input order. `.deb` consumers expect `debian-binary`,
/// `control.tar.gz`, `data.tar.gz` in that sequence, so the order of
/// `members` matters. Every member is written with uid and gid `0` and
/// mode `100644`; its size and modification time come from the source
/// file's metadata.
///
/// Each source must be an existing regular file. The first error aborts
/// the write, and a partially written `dest` is not removed; the caller
/// must treat it as invalid.
pub fn write_deb_archive<P: AsRef<Path>>(dest: P, members: &[MemberFile]) -> Result<()> {
    let file = fs::File::create(dest)?;
    let mut writer = ArchiveWriter::new(io::BufWriter::new(file))?;
    for member in members {
        let mut source = fs::File::open(&member.source)?;
        let metadata = source.metadata()?;
        if !metadata.is_file() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", member.source.display()),
            )));
        }
        let date = metadata
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0);
        let spec = MemberSpec::deb(member.name.as_str(), metadata.len(), date);
        writer.append(&spec, &mut source)?;
    }
    writer.into_inner()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deb_header() {
        let spec = MemberSpec::deb("control.tar.gz", 444, 1234567890);
        let header = spec.to_header().unwrap();
        assert_eq!(
            pod::bytes_of(&header),
            &b"control.tar.gz  1234567890  0     0     100644  444       `\n"[..]
        );
    }

    #[test]
    fn name_too_long() {
        let spec = MemberSpec::deb("a-very-long-name.gz", 4, 0);
        assert!(matches!(spec.to_header(), Err(Error::NameTooLong(_))));

        // A 16 byte name fills the field exactly.
        let spec = MemberSpec::deb("exactly-16-bytes", 4, 0);
        let header = spec.to_header().unwrap();
        assert_eq!(&header.name, b"exactly-16-bytes");
    }

    #[test]
    fn field_overflow() {
        let mut spec = MemberSpec::deb("x", 4, 0);
        spec.date = 10_000_000_000_000; // 14 digits, field is 12 wide
        assert!(matches!(
            spec.to_header(),
            Err(Error::FieldOverflow("date"))
        ));
    }

    #[test]
    fn padding_and_alignment() {
        let mut writer = ArchiveWriter::new(Vec::new()).unwrap();
        writer
            .append(&MemberSpec::deb("odd", 5, 0), &mut &b"hello"[..])
            .unwrap();
        writer
            .append(&MemberSpec::deb("even", 4, 0), &mut &b"wxyz"[..])
            .unwrap();
        let data = writer.into_inner().unwrap();

        // magic + header + 5 data bytes + 1 pad byte.
        assert_eq!(&data[..8], b"!<arch>\n");
        assert_eq!(&data[68..73], b"hello");
        assert_eq!(data[73], b'\n');
        // The second header starts on an even offset, directly after the
        // pad byte.
        assert_eq!(&data[74..78], b"even");
        assert_eq!(&data[134..138], b"wxyz");
        // No pad byte after the even-sized member.
        assert_eq!(data.len(), 138);
    }

    #[test]
    fn size_mismatch() {
        let mut writer = ArchiveWriter::new(Vec::new()).unwrap();
        let result = writer.append(&MemberSpec::deb("short", 10, 0), &mut &b"abc"[..]);
        assert!(matches!(
            result,
            Err(Error::SizeMismatch {
                expected: 10,
                actual: 3
            })
        ));
    }

    #[test]
    fn deb_layout() {
        // The scenario from the packaging pipeline: `debian-binary` holds
        // the 4 byte version string, then the control and data tarballs
        // follow back to back.
        let mut writer = ArchiveWriter::new(Vec::new()).unwrap();
        writer
            .append(&MemberSpec::deb("debian-binary", 4, 0), &mut &b"2.0\n"[..])
            .unwrap();
        writer
            .append(
                &MemberSpec::deb("control.tar.gz", 6, 0),
                &mut &b"\x1f\x8b abc"[..],
            )
            .unwrap();
        let data = writer.into_inner().unwrap();

        assert_eq!(&data[..8], b"!<arch>\n");
        assert_eq!(
            &data[8..68],
            &b"debian-binary   0           0     0     100644  4         `\n"[..]
        );
        assert_eq!(&data[68..72], b"2.0\n");
        // Even size, so the next header follows with no gap.
        assert_eq!(
            &data[72..132],
            &b"control.tar.gz  0           0     0     100644  6         `\n"[..]
        );
        assert_eq!(&data[132..138], b"\x1f\x8b abc");
    }
}
