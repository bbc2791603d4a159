use anyhow::Result;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

use crate::config::CacheConfig;

pub mod stats;
pub use stats::{CacheStats, CacheStatsSnapshot};

/// 缓存管理器
///
/// 以内容的MD5作为键，每个条目保存为`cache_dir/<category>/<hash>.json`。
pub struct CacheManager {
    config: CacheConfig,
    stats: CacheStats,
}

/// 缓存条目
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    /// 写入时间（Unix秒）
    pub timestamp: i64,
    /// 缓存键的MD5哈希值
    pub key_hash: String,
}

impl CacheManager {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            stats: CacheStats::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// 生成缓存键的MD5哈希
    pub fn hash_key(&self, key: &str) -> String {
        let mut hasher = Md5::new();
        hasher.update(key.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// 获取缓存文件路径
    fn cache_path(&self, category: &str, hash: &str) -> PathBuf {
        self.config
            .cache_dir
            .join(category)
            .join(format!("{}.json", hash))
    }

    /// 检查缓存是否过期
    fn is_expired(&self, timestamp: i64) -> bool {
        let expire_seconds = (self.config.expire_hours as i64).saturating_mul(3600);
        chrono::Utc::now().timestamp() - timestamp > expire_seconds
    }

    /// 获取缓存
    ///
    /// 读取或反序列化失败都按未命中处理。
    pub async fn get<T>(&self, category: &str, key: &str) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        if !self.config.enabled {
            return None;
        }

        let hash = self.hash_key(key);
        let cache_path = self.cache_path(category, &hash);

        let content = match fs::read_to_string(&cache_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.stats.record_miss(category);
                return None;
            }
            Err(e) => {
                self.stats
                    .record_error(category, &format!("读取文件失败: {}", e));
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry<T>>(&content) {
            Ok(entry) => {
                if self.is_expired(entry.timestamp) {
                    // 删除过期缓存
                    let _ = fs::remove_file(&cache_path).await;
                    self.stats.record_miss(category);
                    return None;
                }
                self.stats.record_hit(category);
                Some(entry.data)
            }
            Err(e) => {
                self.stats
                    .record_error(category, &format!("反序列化失败: {}", e));
                None
            }
        }
    }

    /// 设置缓存
    pub async fn set<T>(&self, category: &str, key: &str, data: T) -> Result<()>
    where
        T: Serialize,
    {
        if !self.config.enabled {
            return Ok(());
        }

        let hash = self.hash_key(key);
        let cache_path = self.cache_path(category, &hash);

        // 确保目录存在
        if let Some(parent) = cache_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let entry = CacheEntry {
            data,
            timestamp: chrono::Utc::now().timestamp(),
            key_hash: hash,
        };

        let content = serde_json::to_string(&entry)?;
        match fs::write(&cache_path, content).await {
            Ok(_) => {
                self.stats.record_write(category);
                Ok(())
            }
            Err(e) => {
                self.stats
                    .record_error(category, &format!("写入文件失败: {}", e));
                Err(e.into())
            }
        }
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }
}
