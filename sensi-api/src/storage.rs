//! Locked JSON file helpers shared by the preset store and the device cache.
//!
//! Reads take a shared advisory lock and writes an exclusive one, so a CLI
//! process and a running server can point at the same files.

use fs4::fs_std::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use sensi_common::{Error, Result, ResultExt};

/// Read a JSON array from `path`.
///
/// Returns `None` when the file does not exist. An empty or whitespace-only
/// file reads as an empty list.
pub fn read_json_list<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(Error::from(e).with_context(format!("opening {}", path.display())))
        }
    };

    file.lock_shared()
        .context(format!("locking {}", path.display()))?;

    let mut contents = String::new();
    let read = (&file).read_to_string(&mut contents);
    file.unlock()
        .context(format!("unlocking {}", path.display()))?;
    read.context(format!("reading {}", path.display()))?;

    if contents.trim().is_empty() {
        return Ok(Some(Vec::new()));
    }

    let items = serde_json::from_str(&contents).context(format!("parsing {}", path.display()))?;
    Ok(Some(items))
}

/// Rewrite `path` with `items` as pretty-printed JSON, creating parent
/// directories on demand.
pub fn write_json_list<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    let file = open_for_update(path)?;
    let written = rewrite(&file, items);
    file.unlock()
        .context(format!("unlocking {}", path.display()))?;
    written.context(format!("writing {}", path.display()))
}

/// Read, modify and rewrite the list at `path` under one exclusive lock.
///
/// A missing or blank file starts as an empty list. The file is rewritten
/// after `apply` returns `Ok`, and left untouched when it returns `Err`.
pub fn update_json_list<T, R, F>(path: &Path, apply: F) -> Result<R>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce(&mut Vec<T>) -> Result<R>,
{
    let file = open_for_update(path)?;

    let updated = (|| -> Result<R> {
        let mut contents = String::new();
        (&file)
            .read_to_string(&mut contents)
            .context(format!("reading {}", path.display()))?;

        let mut items: Vec<T> = if contents.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&contents).context(format!("parsing {}", path.display()))?
        };

        let out = apply(&mut items)?;
        rewrite(&file, &items).context(format!("writing {}", path.display()))?;
        Ok(out)
    })();

    file.unlock()
        .context(format!("unlocking {}", path.display()))?;
    updated
}

/// Open `path` for reading and writing without truncating it, holding an
/// exclusive lock on return.
fn open_for_update(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context(format!("creating {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .context(format!("opening {} for writing", path.display()))?;

    file.lock_exclusive()
        .context(format!("locking {}", path.display()))?;
    Ok(file)
}

/// Replace the contents of an already locked file.
fn rewrite<T: Serialize>(file: &File, items: &[T]) -> Result<()> {
    file.set_len(0)?;
    let mut writer = BufWriter::new(file);
    writer.seek(SeekFrom::Start(0))?;
    serde_json::to_writer_pretty(&mut writer, items)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
