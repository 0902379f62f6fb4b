//! Output file naming with collision avoidance.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Upper bound on `" (n)"` attempts before giving up.
const MAX_COLLISIONS: u32 = 10_000;

/// Strip a previous export suffix, and anything after it, from a file stem.
pub fn clean_base_name<'a>(stem: &'a str, suffix: &str) -> &'a str {
    if suffix.is_empty() {
        return stem;
    }
    stem.split(suffix).next().unwrap_or(stem)
}

/// File name for attempt `n`: `{base}{suffix}{ext}` for 0, then
/// `{base}{suffix} ({n}){ext}`. `ext` includes its leading dot.
pub fn candidate_name(base: &str, suffix: &str, ext: &str, n: u32) -> String {
    if n == 0 {
        format!("{base}{suffix}{ext}")
    } else {
        format!("{base}{suffix} ({n}){ext}")
    }
}

/// An output file created empty to claim its name. Removed on drop unless
/// [`commit`](Self::commit) is called.
#[derive(Debug)]
pub struct ReservedOutput {
    path: PathBuf,
    committed: bool,
}

impl ReservedOutput {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the file and hand back its path.
    pub fn commit(mut self) -> PathBuf {
        self.committed = true;
        std::mem::take(&mut self.path)
    }
}

impl Drop for ReservedOutput {
    fn drop(&mut self) {
        if !self.committed {
            if let Err(e) = std::fs::remove_file(&self.path) {
                log::warn!("could not remove {}: {e}", self.path.display());
            }
        }
    }
}

/// Claim the first free output name for `source` in `dir`.
///
/// Each candidate is created with `create_new`, so two exports racing for the
/// same name cannot both win it.
pub fn reserve_output_path(dir: &Path, source: &Path, suffix: &str) -> Result<ReservedOutput> {
    let dir = absolute(dir)?;
    std::fs::create_dir_all(&dir).map_err(|e| Error::fs(&dir, e))?;

    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base = clean_base_name(&stem, suffix);
    let ext = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    for n in 0..=MAX_COLLISIONS {
        let path = dir.join(candidate_name(base, suffix, &ext, n));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => {
                return Ok(ReservedOutput {
                    path,
                    committed: false,
                })
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                log::debug!("{} exists, trying next name", path.display());
            }
            Err(e) => return Err(Error::fs(path, e)),
        }
    }
    Err(Error::fs(
        dir,
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free name for {base}{suffix} after {MAX_COLLISIONS} attempts"),
        ),
    ))
}

/// Resolve `dir` against the working directory.
pub(crate) fn absolute(dir: &Path) -> Result<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| Error::fs(dir, e))?;
    Ok(cwd.join(dir))
}
