use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::{info, warn};
use thiserror::Error;

use crate::error::Result;

// The score is stored as hex of "jacob.<score>.maughan".
const RECORD_PREFIX: &str = "jacob.";
const RECORD_SUFFIX: &str = ".maughan";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("odd number of hex digits")]
    OddLength,
    #[error("invalid hex digit {0:?}")]
    BadHexDigit(char),
    #[error("decoded bytes are not UTF-8")]
    NotUtf8,
    #[error("author tags missing")]
    MissingTags,
    #[error("score {0:?} is not a number")]
    BadScore(String),
}

pub fn encode_record(score: u32) -> String {
    let plain = format!("{}{}{}", RECORD_PREFIX, score, RECORD_SUFFIX);
    plain.bytes().map(|b| format!("{:02x}", b)).collect()
}

pub fn decode_record(record: &str) -> std::result::Result<u32, RecordError> {
    let digits: Vec<char> = record.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(RecordError::OddLength);
    }

    let bytes = digits
        .chunks(2)
        .map(|pair| -> std::result::Result<u8, RecordError> {
            Ok((hex_value(pair[0])? << 4) | hex_value(pair[1])?)
        })
        .collect::<std::result::Result<Vec<u8>, RecordError>>()?;
    let plain = String::from_utf8(bytes).map_err(|_| RecordError::NotUtf8)?;

    let score = plain
        .strip_prefix(RECORD_PREFIX)
        .and_then(|rest| rest.strip_suffix(RECORD_SUFFIX))
        .ok_or(RecordError::MissingTags)?;

    score.parse().map_err(|_| RecordError::BadScore(score.to_string()))
}

fn hex_value(c: char) -> std::result::Result<u8, RecordError> {
    c.to_digit(16).map(|d| d as u8).ok_or(RecordError::BadHexDigit(c))
}

/// The high-score file, held open for the whole run.
pub struct HighScoreStore {
    file: File,
}

impl HighScoreStore {
    /// Opens (creating if needed) the score file and reads the stored score.
    /// An empty or unreadable record counts as no high score and is wiped.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<(Self, Option<u32>)> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path.as_ref())?;

        let mut raw = Vec::new();
        file.read_to_end(&mut raw)?;

        if raw.iter().all(u8::is_ascii_whitespace) {
            info!("No high score recorded yet");
            return Ok((HighScoreStore { file }, None));
        }

        let decoded = std::str::from_utf8(&raw)
            .map_err(|_| RecordError::NotUtf8)
            .and_then(decode_record);

        match decoded {
            Ok(score) => {
                info!("Loaded high score {}", score);
                Ok((HighScoreStore { file }, Some(score)))
            }
            Err(e) => {
                warn!("Discarding malformed high score file {}: {}", path.as_ref().display(), e);
                file.set_len(0)?;
                Ok((HighScoreStore { file }, None))
            }
        }
    }

    /// Overwrites the record from the start, dropping leftovers of a longer one.
    pub fn save(&mut self, score: u32) -> Result<()> {
        let record = encode_record(score);
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(record.as_bytes())?;
        self.file.set_len(record.len() as u64)?;
        self.file.flush()?;
        Ok(())
    }

    pub fn close(mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    /// A fresh path under the system temp dir; the file itself is not created.
    pub fn scratch_path(name: &str) -> PathBuf {
        let unique = COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut dir = std::env::temp_dir();
        dir.push(format!("gridsnake_{}_{}", std::process::id(), unique));
        fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn record_matches_known_encoding() {
        // "jacob.42.maughan"
        assert_eq!(encode_record(42), "6a61636f622e34322e6d61756768616e");
        assert_eq!(decode_record("6a61636f622e34322e6d61756768616e"), Ok(42));
        assert_eq!(decode_record("6A61636F622E34322E6D61756768616E\n"), Ok(42));
    }

    #[test]
    fn rejects_malformed_records() {
        assert_eq!(decode_record("6a6"), Err(RecordError::OddLength));
        assert_eq!(decode_record("zz"), Err(RecordError::BadHexDigit('z')));
        assert_eq!(decode_record("ff"), Err(RecordError::NotUtf8));
        // "42"
        assert_eq!(decode_record("3432"), Err(RecordError::MissingTags));
        // "jacob.x.maughan"
        let bad = "jacob.x.maughan".bytes().map(|b| format!("{:02x}", b)).collect::<String>();
        assert_eq!(decode_record(&bad), Err(RecordError::BadScore("x".to_string())));
    }

    #[test]
    fn missing_file_is_created_empty() {
        let path = scratch_path("highscore");
        let (_store, score) = HighScoreStore::load_or_create(&path).unwrap();
        assert_eq!(score, None);
        assert!(path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn saved_score_reloads() {
        let path = scratch_path("highscore");
        let (mut store, _) = HighScoreStore::load_or_create(&path).unwrap();
        store.save(42).unwrap();
        store.close().unwrap();

        let (_store, score) = HighScoreStore::load_or_create(&path).unwrap();
        assert_eq!(score, Some(42));
    }

    #[test]
    fn shorter_save_truncates_longer_record() {
        let path = scratch_path("highscore");
        let (mut store, _) = HighScoreStore::load_or_create(&path).unwrap();
        store.save(123456).unwrap();
        store.save(7).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), encode_record(7));
    }

    #[test]
    fn corrupt_file_is_treated_as_absent_and_wiped() {
        let path = scratch_path("highscore");
        fs::write(&path, "not a score at all").unwrap();

        let (_store, score) = HighScoreStore::load_or_create(&path).unwrap();
        assert_eq!(score, None);
        assert_eq!(fs::read(&path).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn binary_garbage_is_treated_as_absent() {
        let path = scratch_path("highscore");
        fs::write(&path, [0xffu8, 0xfe, 0x00]).unwrap();

        let (_store, score) = HighScoreStore::load_or_create(&path).unwrap();
        assert_eq!(score, None);
    }
}
