use serde::{Deserialize, Serialize};

use crate::error::InsightError;

/// 单通电话的描述信息
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct CallRecord {
    /// 通话录音地址
    #[serde(rename = "call_recording_url", default)]
    pub recording_reference: String,

    /// 通话类型（PNS、C2C等）
    #[serde(rename = "call_type", default)]
    pub call_kind: String,

    /// 通话日期
    #[serde(rename = "call_date", default)]
    pub call_date: String,
}

/// 单次请求的上下文
///
/// 字段名沿用前端约定的请求格式。`transcripts`与`calls`按下标对齐。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct RequestContext {
    /// 客户ID（GLID）
    #[serde(rename = "glid", default)]
    pub customer_id: u64,

    /// 坐席ID
    #[serde(default)]
    pub executive_id: String,

    /// 客户类型：New 或 Existing
    #[serde(default)]
    pub customer_type: String,

    /// 客户所在城市
    #[serde(rename = "customer_city_name", default)]
    pub customer_city: String,

    /// 通话列表
    #[serde(rename = "call_data", default)]
    pub calls: Vec<CallRecord>,

    /// 与通话一一对应的转写文本
    #[serde(rename = "transcription_urlTxt", default)]
    pub transcripts: Vec<String>,

    /// 历史样本数量上限，同时也是汇总阶段读取的记录上限
    #[serde(rename = "max_call_limit", default)]
    pub sample_limit: usize,
}

impl RequestContext {
    /// 校验必填字段，`require_calls`为true时要求至少一通电话
    pub fn validate(&self, require_calls: bool) -> Result<(), InsightError> {
        let mut missing = Vec::new();
        if self.customer_id == 0 {
            missing.push("glid");
        }
        if self.executive_id.trim().is_empty() {
            missing.push("executive_id");
        }
        if self.customer_type.trim().is_empty() {
            missing.push("customer_type");
        }
        if self.customer_city.trim().is_empty() {
            missing.push("customer_city_name");
        }
        if require_calls && self.calls.is_empty() {
            missing.push("call_data");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(InsightError::Validation(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )))
        }
    }

    /// 未指定上限时使用默认值
    pub fn apply_default_sample_limit(&mut self, default_limit: usize) {
        if self.sample_limit == 0 {
            self.sample_limit = default_limit;
        }
    }

    pub fn is_multi_call(&self) -> bool {
        self.calls.len() > 1
    }

    /// 获取第`index`通电话的转写文本，空文本视为缺失
    pub fn transcript(&self, index: usize) -> Option<&str> {
        self.transcripts
            .get(index)
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
    }

    /// 每通电话都已经携带转写文本
    pub fn has_all_transcripts(&self) -> bool {
        !self.calls.is_empty()
            && self.transcripts.len() == self.calls.len()
            && (0..self.calls.len()).all(|i| self.transcript(i).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> RequestContext {
        RequestContext {
            customer_id: 1001,
            executive_id: "EXE-7".to_string(),
            customer_type: "Existing".to_string(),
            customer_city: "Pune".to_string(),
            calls: vec![CallRecord {
                recording_reference: "https://rec/1.mp3".to_string(),
                call_kind: "PNS".to_string(),
                call_date: "2024-11-02".to_string(),
            }],
            transcripts: vec![],
            sample_limit: 0,
        }
    }

    #[test]
    fn test_deserialize_wire_names() {
        let raw = r#"{
            "glid": 42,
            "executive_id": "E1",
            "customer_type": "New",
            "customer_city_name": "Delhi",
            "call_data": [{"call_recording_url": "u", "call_type": "C2C", "call_date": "2024-01-01"}],
            "transcription_urlTxt": ["hello"],
            "max_call_limit": 6
        }"#;
        let request: RequestContext = serde_json::from_str(raw).unwrap();

        assert_eq!(request.customer_id, 42);
        assert_eq!(request.customer_city, "Delhi");
        assert_eq!(request.calls[0].call_kind, "C2C");
        assert_eq!(request.transcripts, vec!["hello".to_string()]);
        assert_eq!(request.sample_limit, 6);
    }

    #[test]
    fn test_validate_reports_every_missing_field() {
        let request = RequestContext::default();
        let err = request.validate(true).unwrap_err();
        let message = err.to_string();

        for field in ["glid", "executive_id", "customer_type", "customer_city_name", "call_data"] {
            assert!(message.contains(field), "{} not reported in {}", field, message);
        }
    }

    #[test]
    fn test_validate_calls_optional_for_summary() {
        let mut request = sample_request();
        request.calls.clear();

        assert!(request.validate(false).is_ok());
        assert!(request.validate(true).is_err());
    }

    #[test]
    fn test_default_sample_limit_only_fills_zero() {
        let mut request = sample_request();
        request.apply_default_sample_limit(10);
        assert_eq!(request.sample_limit, 10);

        request.sample_limit = 3;
        request.apply_default_sample_limit(10);
        assert_eq!(request.sample_limit, 3);
    }

    #[test]
    fn test_transcript_lookup_treats_blank_as_missing() {
        let mut request = sample_request();
        assert!(request.transcript(0).is_none());
        assert!(!request.has_all_transcripts());

        request.transcripts = vec!["   ".to_string()];
        assert!(request.transcript(0).is_none());

        request.transcripts = vec!["customer asked about renewal".to_string()];
        assert_eq!(request.transcript(0), Some("customer asked about renewal"));
        assert!(request.has_all_transcripts());
    }
}
