use aprwatch_core::common::time::TimeProvider;
use aprwatch_core::rate::entity::PersistedState;
use aprwatch_core::store::error::StoreError;
use aprwatch_core::store::port::StateStore;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

/// 默认状态文件名
pub const DEFAULT_STATE_FILE: &str = "last_apr.json";

/// 状态文件的磁盘格式：`{"apr": 4.52, "timestamp": "..."}`
#[derive(Debug, Serialize, Deserialize)]
struct StateRecord {
    #[serde(default)]
    apr: Option<f64>,
    #[serde(default)]
    timestamp: Option<String>,
}

/// StateStore 的 JSON 单文件实现。
///
/// # Summary
/// 把上一次观测到的利率保存在一个 JSON 文件中，每次保存完整覆盖。
///
/// # Invariants
/// * 文件中至多一条记录。
/// * 写入先落到同目录的临时文件，再原子地重命名覆盖目标文件。
/// * 保存时间来自注入的 `TimeProvider`。
pub struct JsonFileStateStore {
    path: PathBuf,
    clock: Arc<dyn TimeProvider>,
}

impl JsonFileStateStore {
    pub fn new(path: impl Into<PathBuf>, clock: Arc<dyn TimeProvider>) -> Self {
        Self {
            path: path.into(),
            clock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_STATE_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// # Summary
/// 解析状态文件中的时间戳。
///
/// # Logic
/// 1. 优先按 RFC 3339 解析。
/// 2. 否则按不带时区的 ISO-8601 解析，并视为 UTC。
/// 3. 都失败时返回 None。
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>().ok().map(|naive| naive.and_utc())
}

/// f64 的 Display 是最短的往返表示，从它解析可以得到页面上原样的十进制数。
fn decimal_from_f64(value: f64) -> Result<Decimal, StoreError> {
    Decimal::from_str(&value.to_string())
        .map_err(|e| StoreError::Deserialize(format!("apr {} out of range: {}", value, e)))
}

#[async_trait]
impl StateStore for JsonFileStateStore {
    /// # Summary
    /// 读取状态文件。
    ///
    /// # Logic
    /// 1. 文件不存在视为首次运行，返回 `Ok(None)`。
    /// 2. 解析 JSON；没有 `apr` 字段同样视为无状态。
    /// 3. 时间戳缺失或无法识别时保留数值，时间记为未知。
    ///
    /// # Returns
    /// * `Result<Option<PersistedState>, StoreError>`
    async fn load(&self) -> Result<Option<PersistedState>, StoreError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::Io(format!(
                    "read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let record: StateRecord = serde_json::from_str(&contents)
            .map_err(|e| StoreError::Deserialize(e.to_string()))?;

        let Some(apr) = record.apr else {
            debug!(path = %self.path.display(), "state file has no apr value");
            return Ok(None);
        };

        let observed_at = record.timestamp.as_deref().and_then(parse_timestamp);
        if observed_at.is_none() {
            debug!(raw = ?record.timestamp, "state timestamp missing or unrecognized");
        }

        Ok(Some(PersistedState {
            value: decimal_from_f64(apr)?,
            observed_at,
        }))
    }

    /// # Summary
    /// 以当前时间保存利率。
    ///
    /// # Logic
    /// 1. 确保父目录存在。
    /// 2. 序列化为带缩进的 JSON 写入临时文件。
    /// 3. 重命名覆盖目标文件。
    ///
    /// # Arguments
    /// * `value` - 本次观测到的利率。
    ///
    /// # Returns
    /// * `Result<PersistedState, StoreError>` - 实际写入的状态。
    async fn save(&self, value: Decimal) -> Result<PersistedState, StoreError> {
        let now = self.clock.now();
        let apr = value
            .to_f64()
            .ok_or_else(|| StoreError::Serialize(format!("apr {} is not representable", value)))?;

        let record = StateRecord {
            apr: Some(apr),
            timestamp: Some(now.to_rfc3339_opts(SecondsFormat::Micros, true)),
        };
        let json =
            serde_json::to_string_pretty(&record).map_err(|e| StoreError::Serialize(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Io(format!("create {}: {}", parent.display(), e)))?;
        }

        let tmp = self.temp_path();
        fs::write(&tmp, json)
            .await
            .map_err(|e| StoreError::Io(format!("write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::Io(format!("rename onto {}: {}", self.path.display(), e)))?;

        Ok(PersistedState {
            value,
            observed_at: Some(now),
        })
    }
}
