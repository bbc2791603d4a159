//! 洞察池的持久化存储

use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use crate::error::InsightError;
use crate::types::{InsightBatch, InsightPool, InsightRecord};

/// 追加式洞察存储
///
/// 整个洞察池以JSON数组保存在单个文件中，每次追加都会整体重写。
/// 读-改-写过程由互斥锁保护，并发追加不会丢失记录。
pub struct InsightStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

/// 批次中应写入洞察池的部分
///
/// 多条记录的批次最后一条是汇总记录，不进入洞察池；单条记录的批次整体写入。
pub fn pool_contribution(batch: &InsightBatch) -> &[InsightRecord] {
    let records = batch.records.as_slice();
    if records.len() > 1 {
        let (kept, dropped) = records.split_at(records.len() - 1);
        if let Some(last) = dropped.first()
            && !last.is_final()
        {
            tracing::warn!(
                kind = %last.kind,
                "dropping trailing record that is not tagged final"
            );
        }
        kept
    } else {
        records
    }
}

impl InsightStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取洞察池，存储不存在时返回空池
    pub async fn load_pool(&self) -> Result<InsightPool, InsightError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(InsightPool::new()),
            Err(e) => return Err(InsightError::Storage(e)),
        };

        if content.trim().is_empty() {
            return Ok(InsightPool::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            InsightError::CorruptPool(format!("{}: {}", self.path.display(), e))
        })
    }

    /// 追加一个批次，返回实际写入的记录数
    ///
    /// 存储已损坏时返回错误，不会覆盖原文件。
    pub async fn append_batch(&self, batch: &InsightBatch) -> Result<usize, InsightError> {
        let _guard = self.write_lock.lock().await;

        let mut pool = self.load_pool().await?;
        let contribution = pool_contribution(batch);
        pool.extend_from_slice(contribution);
        self.write_pool(&pool).await?;

        tracing::info!(
            appended = contribution.len(),
            pool_size = pool.len(),
            "insight pool updated"
        );
        Ok(contribution.len())
    }

    /// 先写临时文件再重命名，避免写到一半的文件
    async fn write_pool(&self, pool: &InsightPool) -> Result<(), InsightError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(pool)
            .map_err(|e| InsightError::Storage(std::io::Error::other(e)))?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, content).await?;
        fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}
