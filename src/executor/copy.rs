//! Atomic file copy implementation

use crate::types::MirraError;
use std::ffi::{OsStr, OsString};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

/// Read buffer for streaming copies
const COPY_BUFFER: usize = 128 * 1024;

/// Temporary names tried before giving up
const PART_ATTEMPTS: u32 = 64;

/// Copy `src` to `dest` using write-then-rename.
///
/// 1. Refuse to replace an existing `dest` unless `overwrite` is set; when it
///    is, clear a stale read-only bit on `dest` first
/// 2. Stream into a freshly created hidden `.part` sibling and sync it to disk
/// 3. Carry over the source mtime and permissions
/// 4. Rename over `dest`
///
/// The parent directory of `dest` must already exist. A failed copy leaves
/// no `.part` file behind.
///
/// # Returns
/// * `Ok(u64)` - Number of bytes copied
/// * `Err(MirraError)` - IO error or other failure
pub fn copy_file(src: &Path, dest: &Path, overwrite: bool) -> Result<u64, MirraError> {
    match fs::symlink_metadata(dest) {
        Ok(_) if !overwrite => {
            return Err(MirraError::Io(io::Error::new(
                ErrorKind::AlreadyExists,
                format!("{} already exists", dest.display()),
            )))
        }
        Ok(_) => clear_readonly(dest).map_err(|e| MirraError::from_io(dest, e))?,
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(MirraError::from_io(dest, e)),
    }

    let (part_path, part_file) = create_part(dest).map_err(|e| MirraError::from_io(dest, e))?;
    let result = write_part(src, part_file, &part_path)
        .and_then(|bytes| fs::rename(&part_path, dest).map(|_| bytes));

    result.map_err(|e| {
        let _ = fs::remove_file(&part_path);
        MirraError::from_io(dest, e)
    })
}

fn write_part(src: &Path, mut part_file: File, part_path: &Path) -> io::Result<u64> {
    let src_file = File::open(src)?;
    let src_metadata = src_file.metadata()?;
    let mut reader = BufReader::with_capacity(COPY_BUFFER, src_file);

    let total_bytes = io::copy(&mut reader, &mut part_file)?;
    part_file.sync_all()?;

    // Drop the handle before touching metadata or renaming (required on Windows)
    drop(part_file);

    // mtime first: a read-only file may refuse timestamp changes
    let mtime = filetime::FileTime::from_last_modification_time(&src_metadata);
    filetime::set_file_mtime(part_path, mtime)?;
    fs::set_permissions(part_path, src_metadata.permissions())?;

    Ok(total_bytes)
}

/// Create a fresh hidden `.part` sibling of `dest`.
///
/// Names already taken (possibly by mirrored files) are never opened; the
/// next numbered candidate is tried instead.
fn create_part(dest: &Path) -> io::Result<(PathBuf, File)> {
    let name = dest.file_name().ok_or_else(|| {
        io::Error::new(
            ErrorKind::InvalidInput,
            format!("destination has no file name: {}", dest.display()),
        )
    })?;

    for attempt in 0..PART_ATTEMPTS {
        let part_path = dest.with_file_name(part_name(name, attempt));
        match OpenOptions::new().write(true).create_new(true).open(&part_path) {
            Ok(file) => return Ok((part_path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free temporary name next to {}", dest.display()),
    ))
}

/// `.name.part`, then `.name.1.part`, `.name.2.part`, ...
fn part_name(name: &OsStr, attempt: u32) -> OsString {
    let mut part = OsString::from(".");
    part.push(name);
    if attempt > 0 {
        part.push(format!(".{}", attempt));
    }
    part.push(".part");
    part
}

/// Make `path` writable by its owner if it is read-only.
pub fn clear_readonly(path: &Path) -> io::Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    if !permissions.readonly() {
        return Ok(());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        permissions.set_mode(permissions.mode() | 0o200);
    }

    #[cfg(not(unix))]
    permissions.set_readonly(false);

    fs::set_permissions(path, permissions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_part_name_is_hidden_sibling() {
        assert_eq!(part_name(OsStr::new("report.pdf"), 0), OsString::from(".report.pdf.part"));
        assert_eq!(part_name(OsStr::new("report.pdf"), 3), OsString::from(".report.pdf.3.part"));
    }

    #[test]
    fn test_create_part_requires_file_name() {
        assert!(create_part(Path::new("/")).is_err());
    }

    #[test]
    fn test_create_part_skips_taken_names() {
        let tmp = TempDir::new().expect("create tempdir");
        let dest = tmp.path().join("x.txt");
        let taken = tmp.path().join(".x.txt.part");
        fs::write(&taken, b"mirrored file").expect("write taken name");

        let (part_path, _file) = create_part(&dest).expect("create part");

        assert_eq!(part_path, tmp.path().join(".x.txt.1.part"));
        assert_eq!(fs::read(&taken).expect("read taken"), b"mirrored file");
    }

    #[test]
    fn test_copy_leaves_same_named_part_file_intact() {
        let tmp = TempDir::new().expect("create tempdir");
        let src = tmp.path().join("src.txt");
        let dest = tmp.path().join("x.txt");
        let neighbour = tmp.path().join(".x.txt.part");
        fs::write(&src, b"payload").expect("write src");
        fs::write(&neighbour, b"neighbour").expect("write neighbour");

        copy_file(&src, &dest, false).expect("copy");

        assert_eq!(fs::read(&dest).expect("read dest"), b"payload");
        assert_eq!(fs::read(&neighbour).expect("read neighbour"), b"neighbour");
        assert!(!tmp.path().join(".x.txt.1.part").exists());
    }
}
