use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 洞察记录的来源标记：单通电话(`call_<n>`)或汇总(`final`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsightKind {
    Call(usize),
    Final,
}

impl std::fmt::Display for InsightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsightKind::Call(index) => write!(f, "call_{}", index),
            InsightKind::Final => write!(f, "final"),
        }
    }
}

impl std::str::FromStr for InsightKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        if normalized == "final" {
            return Ok(InsightKind::Final);
        }
        normalized
            .strip_prefix("call_")
            .and_then(|index| index.parse::<usize>().ok())
            .filter(|index| *index > 0)
            .map(InsightKind::Call)
            .ok_or_else(|| format!("Unknown insight type: {}", s))
    }
}

impl Serialize for InsightKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for InsightKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// 单条洞察记录，所有文本字段均由LLM生成
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct InsightRecord {
    #[serde(rename = "EnsightType")]
    pub kind: InsightKind,

    #[serde(rename = "Concerns", deserialize_with = "null_as_empty")]
    pub concerns: String,

    #[serde(rename = "Resolution", deserialize_with = "null_as_empty")]
    pub resolution: String,

    #[serde(rename = "NextSteps", deserialize_with = "null_as_empty")]
    pub next_steps: String,

    #[serde(rename = "Alert", deserialize_with = "null_as_empty")]
    pub alert: String,

    #[serde(rename = "Sentiment", deserialize_with = "null_as_empty")]
    pub sentiment: String,

    #[serde(rename = "KeyPoints", deserialize_with = "null_as_empty")]
    pub key_points: String,
}

/// 文本字段为`null`时按空串处理，字段缺失仍然报错
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl InsightRecord {
    pub fn is_final(&self) -> bool {
        self.kind == InsightKind::Final
    }
}

/// 一次请求产出的洞察集合
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct InsightBatch {
    #[serde(rename = "ensights")]
    pub records: Vec<InsightRecord>,
}

impl InsightBatch {
    pub fn new(records: Vec<InsightRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&InsightRecord> {
        self.records.last()
    }
}

/// 持久化的洞察池，只追加不修改
///
/// 存储格式为洞察记录的JSON数组。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct InsightPool {
    records: Vec<InsightRecord>,
}

impl InsightPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[InsightRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InsightRecord> {
        self.records.iter()
    }

    pub(crate) fn extend_from_slice(&mut self, records: &[InsightRecord]) {
        self.records.extend_from_slice(records);
    }
}

impl From<Vec<InsightRecord>> for InsightPool {
    fn from(records: Vec<InsightRecord>) -> Self {
        Self { records }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip_through_text() {
        assert_eq!("final".parse::<InsightKind>().unwrap(), InsightKind::Final);
        assert_eq!(" Final ".parse::<InsightKind>().unwrap(), InsightKind::Final);
        assert_eq!("call_3".parse::<InsightKind>().unwrap(), InsightKind::Call(3));
        assert_eq!("CALL_12".parse::<InsightKind>().unwrap(), InsightKind::Call(12));
        assert_eq!(InsightKind::Call(2).to_string(), "call_2");
        assert_eq!(InsightKind::Final.to_string(), "final");
    }

    #[test]
    fn test_kind_rejects_unknown_tags() {
        assert!("summary".parse::<InsightKind>().is_err());
        assert!("call_".parse::<InsightKind>().is_err());
        assert!("call_0".parse::<InsightKind>().is_err());
        assert!("call_x".parse::<InsightKind>().is_err());
    }

    #[test]
    fn test_batch_decodes_wire_format() {
        let raw = r#"{"ensights":[{"EnsightType":"final","Concerns":"Domain renewal confusion","Resolution":"Explained billing","NextSteps":"Follow up in 2 days","Alert":"","Sentiment":"Neutral","KeyPoints":"renewal"}]}"#;
        let batch: InsightBatch = serde_json::from_str(raw).unwrap();

        assert_eq!(batch.len(), 1);
        assert!(batch.records[0].is_final());
        assert_eq!(batch.records[0].next_steps, "Follow up in 2 days");
        assert_eq!(batch.records[0].alert, "");
    }

    #[test]
    fn test_record_missing_field_fails() {
        let raw = r#"{"EnsightType":"call_1","Concerns":"x","Resolution":"y"}"#;
        assert!(serde_json::from_str::<InsightRecord>(raw).is_err());
    }

    #[test]
    fn test_record_null_text_is_empty() {
        let raw = r#"{"EnsightType":"call_1","Concerns":"Lead quality","Resolution":"Explained filters","NextSteps":"Call back","Alert":null,"Sentiment":"Neutral","KeyPoints":null}"#;
        let record: InsightRecord = serde_json::from_str(raw).unwrap();

        assert_eq!(record.kind, InsightKind::Call(1));
        assert_eq!(record.alert, "");
        assert_eq!(record.key_points, "");
        assert_eq!(record.concerns, "Lead quality");
    }

    #[test]
    fn test_pool_serializes_as_plain_array() {
        let pool = InsightPool::new();
        assert_eq!(serde_json::to_string(&pool).unwrap(), "[]");

        let parsed: InsightPool = serde_json::from_str("[]").unwrap();
        assert!(parsed.is_empty());
    }
}
