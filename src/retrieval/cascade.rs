use rand::Rng;
use rand::seq::SliceRandom;
use std::io::Read;
use std::path::Path;

use crate::error::InsightError;
use crate::types::SampleRecord;

/// 历史样本数据集中的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRow {
    pub customer_id: String,
    pub customer_type: String,
    pub city: String,
    pub transcript: String,
    pub summary: String,
}

impl DatasetRow {
    fn to_sample(&self) -> SampleRecord {
        SampleRecord::new(self.transcript.clone(), self.summary.clone())
    }
}

/// 本地历史通话数据集
///
/// CSV格式，首行为表头，列依次为`glid, customer_type, city, transcript, summary`。
#[derive(Debug, Clone, Default)]
pub struct SampleDataset {
    rows: Vec<DatasetRow>,
}

impl SampleDataset {
    pub fn from_rows(rows: Vec<DatasetRow>) -> Self {
        Self { rows }
    }

    /// 从CSV文件加载
    pub fn from_csv_path(path: &Path) -> Result<Self, InsightError> {
        let file = std::fs::File::open(path).map_err(|e| {
            InsightError::Dataset(format!("cannot open {}: {}", path.display(), e))
        })?;
        Self::from_reader(file)
    }

    /// 从任意CSV数据源加载，字段不足五列的行会被跳过
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, InsightError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        let mut skipped = 0usize;
        for record in csv_reader.records() {
            let record = record.map_err(|e| InsightError::Dataset(e.to_string()))?;
            if record.len() < 5 {
                skipped += 1;
                continue;
            }
            rows.push(DatasetRow {
                customer_id: record[0].trim().to_string(),
                customer_type: record[1].trim().to_string(),
                city: record[2].trim().to_string(),
                transcript: record[3].to_string(),
                summary: record[4].to_string(),
            });
        }

        if skipped > 0 {
            tracing::warn!(skipped, "skipped short rows in sample dataset");
        }
        tracing::debug!(rows = rows.len(), "sample dataset loaded");
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 按身份级联挑选样本：客户ID → 客户类型 → 城市 → 随机补齐
    pub fn fetch_by_identity_cascade(
        &self,
        customer_id: u64,
        customer_type: &str,
        customer_city: &str,
        limit: usize,
    ) -> Vec<SampleRecord> {
        self.fetch_by_identity_cascade_with_rng(
            customer_id,
            customer_type,
            customer_city,
            limit,
            &mut rand::rng(),
        )
    }

    pub fn fetch_by_identity_cascade_with_rng<R: Rng + ?Sized>(
        &self,
        customer_id: u64,
        customer_type: &str,
        customer_city: &str,
        limit: usize,
        rng: &mut R,
    ) -> Vec<SampleRecord> {
        let customer_id = customer_id.to_string();
        let mut used = vec![false; self.rows.len()];
        let mut picked: Vec<usize> = Vec::with_capacity(limit.min(self.rows.len()));

        let stages: [&dyn Fn(&DatasetRow) -> bool; 3] = [
            &|row: &DatasetRow| row.customer_id == customer_id,
            &|row: &DatasetRow| row.customer_type == customer_type,
            &|row: &DatasetRow| row.city == customer_city,
        ];

        for matches in stages {
            for (index, row) in self.rows.iter().enumerate() {
                if picked.len() >= limit {
                    break;
                }
                if !used[index] && matches(row) {
                    used[index] = true;
                    picked.push(index);
                }
            }
        }

        if picked.len() < limit {
            let mut remaining: Vec<usize> = (0..self.rows.len()).filter(|i| !used[*i]).collect();
            remaining.shuffle(rng);
            let wanted = limit - picked.len();
            picked.extend(remaining.into_iter().take(wanted));
        }

        picked
            .into_iter()
            .map(|index| self.rows[index].to_sample())
            .collect()
    }
}
