use async_trait::async_trait;
use history_core::{HistoryError, HistoryResult};
use history_domain::{HistoryEvent, HistoryLog, HistoryRepository};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// 文件历史仓储：每个编排实例一个 JSON 文件
///
/// 读取只做结构化反序列化，旧版本文件缺少的新字段按缺省值处理。
#[derive(Debug)]
pub struct FileHistoryRepository {
    directory: PathBuf,
    /// 串行化同一进程内的读改写
    write_lock: Mutex<()>,
}

impl FileHistoryRepository {
    pub async fn new(directory: impl Into<PathBuf>) -> HistoryResult<Self> {
        let directory = directory.into();
        tokio::fs::create_dir_all(&directory).await.map_err(|e| {
            HistoryError::storage_error(format!(
                "创建历史目录失败 {}: {e}",
                directory.display()
            ))
        })?;
        info!(directory = %directory.display(), "file history repository ready");
        Ok(Self {
            directory,
            write_lock: Mutex::new(()),
        })
    }

    fn instance_path(&self, instance_id: &str) -> HistoryResult<PathBuf> {
        let valid = !instance_id.is_empty()
            && !instance_id.starts_with('.')
            && instance_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(HistoryError::storage_error(format!(
                "无效的实例ID: {instance_id}"
            )));
        }
        Ok(self.directory.join(format!("{instance_id}.json")))
    }

    async fn read_log(path: &Path) -> HistoryResult<Option<HistoryLog>> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(HistoryLog::from_json(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_log(path: &Path, log: &HistoryLog) -> HistoryResult<()> {
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, log.to_json()?).await?;
        tokio::fs::rename(&tmp_path, path).await?;
        Ok(())
    }
}

#[async_trait]
impl HistoryRepository for FileHistoryRepository {
    async fn append(&self, instance_id: &str, events: &[HistoryEvent]) -> HistoryResult<()> {
        let path = self.instance_path(instance_id)?;
        let _guard = self.write_lock.lock().await;

        let mut log = Self::read_log(&path).await?.unwrap_or_default();
        for event in events {
            log.append(event.clone())?;
        }
        Self::write_log(&path, &log).await?;

        debug!(
            instance.id = instance_id,
            appended = events.len(),
            total = log.len(),
            path = %path.display(),
            "history appended to file"
        );
        Ok(())
    }

    async fn load(&self, instance_id: &str) -> HistoryResult<Option<HistoryLog>> {
        let path = self.instance_path(instance_id)?;
        Self::read_log(&path).await
    }

    async fn list_instances(&self) -> HistoryResult<Vec<String>> {
        let mut instances = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.directory).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                instances.push(stem.to_string());
            }
        }
        instances.sort();
        Ok(instances)
    }

    async fn purge(&self, instance_id: &str) -> HistoryResult<bool> {
        let path = self.instance_path(instance_id)?;
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!(instance.id = instance_id, "history purged");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
