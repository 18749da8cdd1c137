//! 단일 JSON 문서 파일 저장소.
//! 전체 읽기/전체 쓰기만 지원하며, 쓰기는 임시 파일 + rename으로 교체한다.

use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::error::StorageError;

pub struct JsonFileStore<T> {
    path: PathBuf,
    // 쓰기 직렬화(단일 writer).
    write_lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    /// 파일이 없거나 비어 있으면 기본값을 반환한다.
    /// 손상된 파일은 오류로 돌려 덮어쓰기를 막는다.
    pub fn load(&self) -> Result<T, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(err) => {
                return Err(StorageError(format!(
                    "failed to read {}: {err}",
                    self.path.display()
                )));
            }
        };

        if raw.trim().is_empty() {
            return Ok(T::default());
        }

        serde_json::from_str(&raw).map_err(|err| {
            StorageError(format!(
                "{} is not valid JSON ({err}); fix or move it aside",
                self.path.display()
            ))
        })
    }

    /// 문서 전체를 교체 저장한다.
    pub fn save(&self, value: &T) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError("json file write lock poisoned".to_string()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let content = serde_json::to_vec_pretty(value)
            .map_err(|e| StorageError(format!("failed to serialize {}: {e}", self.path.display())))?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content).map_err(|e| {
            StorageError(format!("failed to write {}: {e}", tmp_path.display()))
        })?;

        if let Err(err) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(StorageError(format!(
                "failed to replace {}: {err}",
                self.path.display()
            )));
        }

        debug!(path = %self.path.display(), "saved json document");
        Ok(())
    }
}
