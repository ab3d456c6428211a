//! Snapshot persistence for the in-memory store.
//!
//! A snapshot holds the full table contents. It is written once per load to
//! a temporary file that atomically replaces the previous snapshot; the file
//! existing is what makes the table exist across restarts.
//!
//! Layout: `SATPOS_SNAPSHOT` magic, one version byte, the write time
//! (u64 seconds + u32 nanos, little endian), then the bincode-encoded
//! record list.

use crate::error::{Result, SatposError};
use satpos_types::PositionRecord;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const SNAPSHOT_MAGIC: &[u8] = b"SATPOS_SNAPSHOT";
const SNAPSHOT_VERSION: u8 = 1;

#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read every record. A missing or zero-length file reads as empty.
    pub fn load(&self) -> Result<Vec<PositionRecord>> {
        if !self.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        if file.metadata()?.len() == 0 {
            return Ok(Vec::new());
        }

        let mut reader = BufReader::new(file);

        let mut magic = vec![0u8; SNAPSHOT_MAGIC.len()];
        reader.read_exact(&mut magic)?;
        if magic != SNAPSHOT_MAGIC {
            return Err(SatposError::InvalidFormat(format!(
                "{} is not a satpos snapshot",
                self.path.display()
            )));
        }

        let version = read_u8(&mut reader)?;
        if version != SNAPSHOT_VERSION {
            return Err(SatposError::InvalidFormat(format!(
                "unsupported snapshot version {}",
                version
            )));
        }

        let written_secs = read_u64(&mut reader)?;
        let _written_nanos = read_u32(&mut reader)?;
        log::debug!(
            "reading snapshot {} written at unix {}",
            self.path.display(),
            written_secs
        );

        let records: Vec<PositionRecord> = bincode::deserialize_from(&mut reader)?;
        Ok(records)
    }

    pub fn save(&self, records: &[PositionRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let temp_path = self.temp_path();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;

        let mut writer = BufWriter::new(file);

        writer.write_all(SNAPSHOT_MAGIC)?;
        writer.write_all(&[SNAPSHOT_VERSION])?;

        let written = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| SatposError::InvalidFormat(format!("system clock before epoch: {}", e)))?;
        writer.write_all(&written.as_secs().to_le_bytes())?;
        writer.write_all(&written.subsec_nanos().to_le_bytes())?;

        bincode::serialize_into(&mut writer, records)?;

        writer.flush()?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);

        std::fs::rename(&temp_path, &self.path)?;
        self.sync_parent_dir()?;

        Ok(())
    }

    /// Delete the snapshot. Returns `false` if there was none.
    pub fn remove(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        if let Some(name) = temp.file_name() {
            let mut new_name = name.to_string_lossy().into_owned();
            new_name.push_str(".tmp");
            temp.set_file_name(new_name);
        }
        temp
    }

    fn sync_parent_dir(&self) -> Result<()> {
        if cfg!(unix)
            && let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            File::open(parent)?.sync_all()?;
        }
        Ok(())
    }
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}
