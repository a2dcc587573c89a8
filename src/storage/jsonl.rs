//! JSONL (JSON Lines) storage.
//!
//! Each line is a valid JSON object representing one entity. A line only
//! counts once its trailing newline is on disk: a failed append is truncated
//! back, and an unterminated tail left by a crash is dropped by both the
//! reader and the next append. Rewrites go through a temp file and a rename.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::StorageError;

/// Entity types for JSONL storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Player,
    Team,
    Match,
}

impl EntityType {
    /// Get the filename for this entity type.
    pub fn filename(&self) -> &'static str {
        match self {
            EntityType::Player => "players.jsonl",
            EntityType::Team => "teams.jsonl",
            EntityType::Match => "matches.jsonl",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::Player => write!(f, "player"),
            EntityType::Team => write!(f, "team"),
            EntityType::Match => write!(f, "match"),
        }
    }
}

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    /// Create a new JSONL writer for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Ensure the parent directory exists.
    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Append a single entity to the file.
    ///
    /// On failure the file is truncated back to its previous length.
    pub fn append(&self, entity: &T) -> Result<(), StorageError> {
        self.ensure_dir()?;

        // Serialize before opening so a serialization failure writes nothing.
        let mut line = serde_json::to_string(entity)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&self.path)?;

        let committed = seal_tail(&mut file, &self.path)?;

        let written = file
            .seek(SeekFrom::Start(committed))
            .and_then(|_| file.write_all(line.as_bytes()))
            .and_then(|_| file.sync_data());
        if let Err(e) = written {
            if let Err(undo) = file.set_len(committed) {
                warn!("Could not roll back {:?}: {}", self.path, undo);
            }
            return Err(e.into());
        }

        debug!("Appended entity to {:?}", self.path);
        Ok(())
    }

    /// Write entities, replacing the entire file.
    pub fn write_all(&self, entities: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let tmp_path = tmp_path_for(&self.path);
        let mut buf = String::new();
        for entity in entities {
            buf.push_str(&serde_json::to_string(entity)?);
            buf.push('\n');
        }
        let count = entities.len();

        let mut file = File::create(&tmp_path)?;
        file.write_all(buf.as_bytes())?;
        file.sync_data()?;
        drop(file);
        fs::rename(&tmp_path, &self.path)?;

        info!("Wrote {} entities to {:?}", count, self.path);
        Ok(count)
    }
}

/// Make sure `file` ends on a line boundary and return its length.
///
/// An unterminated tail that is a complete JSON value gets its newline. Any
/// other tail is a torn append and is cut off.
fn seal_tail(file: &mut File, path: &Path) -> Result<u64, StorageError> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(0);
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    if last[0] == b'\n' {
        return Ok(len);
    }

    let mut bytes = Vec::new();
    file.seek(SeekFrom::Start(0))?;
    file.read_to_end(&mut bytes)?;
    let start = bytes
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |pos| pos + 1);

    if serde_json::from_slice::<serde_json::Value>(&bytes[start..]).is_ok() {
        file.seek(SeekFrom::End(0))?;
        file.write_all(b"\n")?;
        return Ok(len + 1);
    }

    warn!("Dropping unterminated tail of {:?}", path);
    file.set_len(start as u64)?;
    Ok(start as u64)
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    /// Create a new JSONL reader for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Read all entities from the file.
    ///
    /// A missing file is an empty table. An unterminated final line is an
    /// uncommitted append and is skipped if it does not parse. Any other line
    /// that fails to parse is reported as [`StorageError::Corrupt`].
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)?;
        let terminated = content.ends_with('\n');
        let lines: Vec<&str> = content.lines().collect();
        let mut entities = Vec::with_capacity(lines.len());

        for (idx, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(line) {
                Ok(entity) => entities.push(entity),
                Err(_) if !terminated && idx + 1 == lines.len() => {
                    warn!("Ignoring unterminated tail of {:?}", self.path);
                }
                Err(source) => {
                    return Err(StorageError::Corrupt {
                        path: self.path.clone(),
                        line: idx + 1,
                        source,
                    })
                }
            }
        }

        debug!("Read {} entities from {:?}", entities.len(), self.path);
        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestEntity {
        id: String,
        name: String,
        value: u32,
    }

    fn entity(id: &str, name: &str, value: u32) -> TestEntity {
        TestEntity {
            id: id.to_string(),
            name: name.to_string(),
            value,
        }
    }

    #[test]
    fn test_jsonl_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.jsonl");

        let entities = vec![entity("1", "First", 100), entity("2", "Second", 200)];

        let writer: JsonlWriter<TestEntity> = JsonlWriter::new(path.clone());
        assert_eq!(writer.write_all(&entities).unwrap(), 2);

        let reader: JsonlReader<TestEntity> = JsonlReader::new(path);
        assert_eq!(reader.read_all().unwrap(), entities);
    }

    #[test]
    fn test_jsonl_append_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("append.jsonl");

        let writer: JsonlWriter<TestEntity> = JsonlWriter::new(path.clone());
        writer.append(&entity("1", "First", 100)).unwrap();
        writer.append(&entity("2", "Second", 200)).unwrap();

        let reader: JsonlReader<TestEntity> = JsonlReader::new(path);
        let entities = reader.read_all().unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[1].name, "Second");
    }

    #[test]
    fn test_jsonl_read_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let reader: JsonlReader<TestEntity> =
            JsonlReader::new(temp_dir.path().join("nonexistent.jsonl"));

        assert!(reader.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_write_all_overwrites_and_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("overwrite.jsonl");

        let writer: JsonlWriter<TestEntity> = JsonlWriter::new(path.clone());
        let reader: JsonlReader<TestEntity> = JsonlReader::new(path.clone());

        writer.write_all(&[entity("1", "Old", 1)]).unwrap();
        writer
            .write_all(&[entity("2", "New1", 2), entity("3", "New2", 3)])
            .unwrap();

        let read = reader.read_all().unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read[0].name, "New1");
        assert!(!tmp_path_for(&path).exists());
    }

    #[test]
    fn test_read_all_rejects_corrupt_line() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad_lines.jsonl");

        std::fs::write(
            &path,
            r#"{"id":"1","name":"Good","value":1}
not-valid-json
"#,
        )
        .unwrap();

        let reader: JsonlReader<TestEntity> = JsonlReader::new(path);
        match reader.read_all() {
            Err(StorageError::Corrupt { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected corrupt error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_all_skips_blank_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("blank_lines.jsonl");

        std::fs::write(
            &path,
            r#"{"id":"1","name":"A","value":1}

{"id":"2","name":"B","value":2}
"#,
        )
        .unwrap();

        let reader: JsonlReader<TestEntity> = JsonlReader::new(path);
        assert_eq!(reader.read_all().unwrap().len(), 2);
    }

    #[test]
    fn test_read_all_ignores_unterminated_tail() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("torn.jsonl");

        std::fs::write(
            &path,
            "{\"id\":\"1\",\"name\":\"A\",\"value\":1}\n{\"id\":\"2\",\"na",
        )
        .unwrap();

        let reader: JsonlReader<TestEntity> = JsonlReader::new(path);
        assert_eq!(reader.read_all().unwrap(), vec![entity("1", "A", 1)]);
    }

    #[test]
    fn test_append_drops_unterminated_tail() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("torn_append.jsonl");

        std::fs::write(
            &path,
            "{\"id\":\"1\",\"name\":\"A\",\"value\":1}\n{\"id\":\"2\",\"na",
        )
        .unwrap();

        let writer: JsonlWriter<TestEntity> = JsonlWriter::new(path.clone());
        writer.append(&entity("3", "C", 3)).unwrap();

        let reader: JsonlReader<TestEntity> = JsonlReader::new(path.clone());
        assert_eq!(
            reader.read_all().unwrap(),
            vec![entity("1", "A", 1), entity("3", "C", 3)]
        );
        assert!(std::fs::read_to_string(&path).unwrap().ends_with("}\n"));
    }

    #[test]
    fn test_append_to_file_with_only_a_torn_line() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("only_torn.jsonl");
        std::fs::write(&path, "{\"id\"").unwrap();

        let writer: JsonlWriter<TestEntity> = JsonlWriter::new(path.clone());
        writer.append(&entity("1", "A", 1)).unwrap();

        let reader: JsonlReader<TestEntity> = JsonlReader::new(path);
        assert_eq!(reader.read_all().unwrap(), vec![entity("1", "A", 1)]);
    }

    #[test]
    fn test_append_keeps_complete_unterminated_line() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("no_newline.jsonl");
        std::fs::write(&path, r#"{"id":"1","name":"A","value":1}"#).unwrap();

        let writer: JsonlWriter<TestEntity> = JsonlWriter::new(path.clone());
        writer.append(&entity("2", "B", 2)).unwrap();

        let reader: JsonlReader<TestEntity> = JsonlReader::new(path);
        assert_eq!(
            reader.read_all().unwrap(),
            vec![entity("1", "A", 1), entity("2", "B", 2)]
        );
    }

    #[test]
    fn test_entity_type_filenames() {
        assert_eq!(EntityType::Player.filename(), "players.jsonl");
        assert_eq!(EntityType::Team.filename(), "teams.jsonl");
        assert_eq!(EntityType::Match.filename(), "matches.jsonl");
        assert_eq!(EntityType::Match.to_string(), "match");
    }
}
