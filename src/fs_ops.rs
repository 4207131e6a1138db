//! Filesystem helpers shared by the artifact and config writers.

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use rand::TryRngCore;

const TEMP_ATTEMPTS: usize = 5;

/// Write `data` to `path` through a sibling temp file, fsync, then rename.
///
/// Readers of `path` observe either the previous contents or the new ones,
/// never a partial write. Parent directories are created as needed.
pub fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    std::fs::create_dir_all(&dir)?;

    let mut last_err = None;
    for _ in 0..TEMP_ATTEMPTS {
        let tmp_path = dir.join(format!("{}.tmp-{}", file_name.to_string_lossy(), temp_suffix()?));
        let mut file = match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
        {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                last_err = Some(err);
                continue;
            }
            Err(err) => return Err(err),
        };
        let written = file.write_all(data).and_then(|_| file.sync_all());
        drop(file);
        if let Err(err) = written.and_then(|_| replace_file(&tmp_path, path)) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(err);
        }
        sync_dir(&dir)?;
        return Ok(());
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::AlreadyExists, "no free temporary file name")
    }))
}

fn temp_suffix() -> io::Result<String> {
    let mut bytes = [0u8; 6];
    rand::rngs::OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|err| io::Error::other(format!("failed to generate temp suffix: {err}")))?;
    Ok(bytes.iter().map(|b| format!("{b:02x}")).collect())
}

fn replace_file(temp_path: &Path, path: &Path) -> io::Result<()> {
    match std::fs::rename(temp_path, path) {
        Ok(()) => Ok(()),
        Err(err) => {
            #[cfg(target_os = "windows")]
            if err.kind() == io::ErrorKind::AlreadyExists
                || err.kind() == io::ErrorKind::PermissionDenied
            {
                if let Err(inner) = std::fs::remove_file(path) {
                    if inner.kind() != io::ErrorKind::NotFound {
                        return Err(inner);
                    }
                }
                return std::fs::rename(temp_path, path);
            }
            Err(err)
        }
    }
}

fn sync_dir(dir: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        std::fs::File::open(dir)?.sync_all()?;
    }
    #[cfg(not(unix))]
    {
        let _ = dir;
    }
    Ok(())
}
