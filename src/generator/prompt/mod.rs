//! Prompt组装：系统指令、用户请求与汇总请求

use std::fmt::Write;

use crate::types::{
    HistoricalSamples, InsightBatch, InsightKind, InsightPool, InsightRecord, RequestContext,
    SampleRecord,
};

pub mod rules;

/// 构建系统指令
///
/// 输出格式随通话数量变化：多通电话时每通一条`call_<n>`再加一条`final`，单通电话只输出一条`final`。
pub fn compose_system_prompt(request: &RequestContext, samples: &HistoricalSamples) -> String {
    let mut prompt = String::with_capacity(8 * 1024);

    prompt.push_str(rules::ROLE_HEADER);
    prompt.push_str("\n### PROCESSING MODE ###\n");
    if request.is_multi_call() {
        let tags = call_tags(request.calls.len());
        prompt.push_str("MODE: MULTI-CALL ANALYSIS\n");
        prompt.push_str("- Analyze multiple calls for the same seller.\n");
        let _ = writeln!(
            prompt,
            "- Generate individual insight blocks for each call (EnsightType = {}).",
            tags
        );
        prompt.push_str(rules::MULTI_CALL_FINAL_BLOCK);
    } else {
        prompt.push_str(rules::SINGLE_CALL_MODE);
    }

    prompt.push('\n');
    prompt.push_str(rules::RESOLUTION_MATRIX);
    prompt.push('\n');
    prompt.push_str(rules::ALERT_CATEGORIES);
    prompt.push('\n');
    prompt.push_str(rules::OUTPUT_REQUIREMENTS);

    let _ = write!(prompt, "\nJSON STRUCTURE:\n{}\n\n", batch_example());

    prompt.push_str("- Use historical patterns as reference:\n");
    render_samples(&mut prompt, samples);

    prompt.push_str("Ensure the response is strictly valid JSON.");
    prompt
}

/// 构建用户请求：客户信息、逐通通话内容与输出要求
pub fn compose_user_query(request: &RequestContext) -> String {
    let mut query = String::from(rules::USER_QUERY_HEADER);

    query.push_str("### Customer Metadata:\n");
    let _ = writeln!(query, "- GLID: {}", request.customer_id);
    let _ = writeln!(query, "- Executive ID: {}", request.executive_id);
    let _ = writeln!(query, "- Customer Type: {}", request.customer_type);
    let _ = writeln!(query, "- Customer City: {}", request.customer_city);
    let _ = writeln!(query, "- Total Calls Provided: {}\n", request.calls.len());

    query.push_str("### Call Transcripts:\n");
    for (index, call) in request.calls.iter().enumerate() {
        let number = index + 1;
        let _ = writeln!(query, "CALL {}:", number);
        let _ = writeln!(query, "- Call Type: {}", call.call_kind);
        let _ = writeln!(query, "- Call Date: {}", call.call_date);
        match request.transcript(index) {
            Some(text) => {
                let _ = writeln!(query, "Transcript {}:\n{}", number, text);
            }
            None => {
                let _ = writeln!(
                    query,
                    "Transcript {}: [No transcription text available]",
                    number
                );
            }
        }
        query.push('\n');
    }

    query.push_str("### INSTRUCTIONS FOR ANALYSIS ###\n");
    if request.is_multi_call() {
        let _ = writeln!(
            query,
            "- Generate actionable insights for EACH CALL using EnsightType = {}.",
            call_tags(request.calls.len())
        );
        query.push_str(
            "- After all call-level insights, generate ONE aggregated insight using EnsightType = final.\n",
        );
    } else {
        query.push_str("- Only ONE call provided.\n");
        query.push_str("- DO NOT generate call_1 block.\n");
        query.push_str("- Generate ONLY ONE insight block using EnsightType = final.\n");
    }
    query.push_str(rules::USER_QUERY_CLOSING);

    query
}

/// 构建汇总请求，洞察池按顺序最多列出`limit`条
pub fn compose_aggregation_prompt(pool: &InsightPool, limit: usize) -> String {
    let mut prompt = String::from(rules::AGGREGATION_HEADER);

    prompt.push_str("### RAW CALL INSIGHTS ###\n");
    for (index, record) in pool.iter().take(limit).enumerate() {
        let _ = writeln!(prompt, "CALL {}:", index + 1);
        let _ = writeln!(prompt, "- Concerns: {}", record.concerns);
        let _ = writeln!(prompt, "- Resolution: {}", record.resolution);
        let _ = writeln!(prompt, "- NextSteps: {}", record.next_steps);
        let _ = writeln!(prompt, "- Alert: {}", record.alert);
        let _ = writeln!(prompt, "- Sentiment: {}", record.sentiment);
        let _ = writeln!(prompt, "- KeyPoints: {}\n", record.key_points);
    }

    prompt.push_str(rules::AGGREGATION_INSTRUCTIONS);
    let _ = write!(
        prompt,
        "\n### OUTPUT JSON MUST STRICTLY FOLLOW THIS QUANTITATIVE STRUCTURE ###\n{}\n\n",
        aggregation_example()
    );
    prompt.push_str("Return ONLY JSON.");
    prompt
}

/// `call_1, call_2, ..., call_n`
fn call_tags(count: usize) -> String {
    (1..=count)
        .map(|i| InsightKind::Call(i).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_samples(out: &mut String, samples: &HistoricalSamples) {
    match samples {
        HistoricalSamples::Unavailable => {
            out.push_str("  No transcription data available.\n");
        }
        HistoricalSamples::PerTranscript(groups) => {
            for group in groups {
                for (index, sample) in group.iter().enumerate() {
                    render_similarity_sample(out, index + 1, sample);
                    out.push_str(rules::SAMPLE_SEPARATOR);
                }
                out.push('\n');
            }
        }
        HistoricalSamples::ByIdentity(samples) if samples.is_empty() => {
            out.push_str("  No historical samples available.\n");
        }
        HistoricalSamples::ByIdentity(samples) => {
            for sample in samples {
                let _ = writeln!(out, "• Transcript: {}", sample.transcript);
                let _ = write!(out, "• Summary: {}", sample.summary);
                out.push_str(rules::SAMPLE_SEPARATOR);
            }
            out.push('\n');
        }
    }
}

fn render_similarity_sample(out: &mut String, number: usize, sample: &SampleRecord) {
    if sample.metadata_missing {
        let _ = write!(out, "historical_sample_{}: metadata missing", number);
    } else {
        let _ = write!(
            out,
            "historical_sample_{}\nsummary: {:?}\ntranscript: {:?}",
            number, sample.summary, sample.transcript
        );
    }
}

fn example_record() -> InsightRecord {
    InsightRecord {
        kind: InsightKind::Final,
        concerns: "Insufficient buy leads; Irrelevant location leads".to_string(),
        resolution: "Advised bulk filters; Checked location settings".to_string(),
        next_steps: "Executive to call back tomorrow to verify lead quality".to_string(),
        alert: "Upsell Opportunity: Seller wants high quantity leads".to_string(),
        sentiment: "Negative -> Neutral".to_string(),
        key_points: "Buy leads, Location Filter, Upsell".to_string(),
    }
}

fn batch_example() -> String {
    serde_json::to_string_pretty(&InsightBatch::new(vec![example_record()])).unwrap_or_default()
}

fn aggregation_example() -> String {
    let record = InsightRecord {
        kind: InsightKind::Final,
        concerns: "Irrelevant Buyleads (40% of calls); Product Catalogue issues (30% of calls)"
            .to_string(),
        resolution: "4/10 executives failed to update category settings; Need automated bulk lead filter guidance."
            .to_string(),
        next_steps: "Executive: 4/10 need training on lead qualification; Category Manager: Advise categories for SEO work; Product Manager: Simplify catalogue upload journey."
            .to_string(),
        alert: "20% Upsell Opportunity cases identified for Sales Manager follow-up; 10% Executive Inefficiency (rude behavior)."
            .to_string(),
        sentiment: "Negative (60%) -> Neutral (30%) -> Positive (10%)".to_string(),
        key_points: "Buyleads (10), Catalogue (4), Upsell (2), Inefficiency (1)".to_string(),
    };
    serde_json::to_string_pretty(&record).unwrap_or_default()
}
