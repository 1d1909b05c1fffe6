use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const MAX_ATTEMPTS: usize = 1000;

/// Writes `bytes` to a new file in `dir` named `name`, or `stem_N.ext` when
/// that name is taken. Never overwrites. Returns the name actually used.
pub fn save_unique(dir: &Path, name: &str, bytes: &[u8]) -> io::Result<(String, PathBuf)> {
    for attempt in 0..MAX_ATTEMPTS {
        let candidate = numbered(name, attempt);
        let path = dir.join(&candidate);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(bytes)?;
                return Ok((candidate, path));
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free file name for {} after {} attempts", name, MAX_ATTEMPTS),
    ))
}

fn numbered(name: &str, n: usize) -> String {
    if n == 0 {
        return name.to_owned();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}_{}.{}", stem, n, ext),
        _ => format!("{}_{}", name, n),
    }
}
