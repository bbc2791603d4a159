use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::Instrument;

use crate::error::InsightError;
use crate::generator::aggregate::build_final_summary;
use crate::generator::context::PipelineContext;
use crate::generator::prompt::{compose_system_prompt, compose_user_query};
use crate::transcription::TranscriptionRequest;
use crate::types::{InsightBatch, InsightRecord, RequestContext};

/// 时间跟踪作用域
pub struct TimingScope {
    start_time: Instant,
    phase_start_times: HashMap<&'static str, Instant>,
    phase_durations: Vec<(&'static str, Duration)>,
}

impl Default for TimingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingScope {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            phase_start_times: HashMap::new(),
            phase_durations: Vec::new(),
        }
    }

    /// 开始一个新的阶段计时
    pub fn start_phase(&mut self, phase_name: &'static str) {
        self.phase_start_times.insert(phase_name, Instant::now());
    }

    /// 结束一个阶段的计时
    pub fn end_phase(&mut self, phase_name: &'static str) -> Option<Duration> {
        let start_time = self.phase_start_times.remove(phase_name)?;
        let duration = start_time.elapsed();
        self.phase_durations.push((phase_name, duration));
        tracing::debug!(
            phase = phase_name,
            elapsed_ms = duration.as_millis() as u64,
            "phase finished"
        );
        Some(duration)
    }

    /// 获取总执行时间
    pub fn total_duration(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// 按结束顺序返回各阶段耗时
    pub fn phase_durations(&self) -> &[(&'static str, Duration)] {
        &self.phase_durations
    }
}

/// 时间跟踪常量
pub struct TimingKeys;

impl TimingKeys {
    pub const TRANSCRIBE: &'static str = "transcribe";
    pub const RETRIEVE: &'static str = "retrieve";
    pub const GENERATE: &'static str = "generate";
    pub const STORE: &'static str = "store";
    pub const LOAD_POOL: &'static str = "load_pool";
    pub const AGGREGATE: &'static str = "aggregate";
}

/// 第一阶段：转写、检索样本、生成洞察并写入洞察池
///
/// 任一步骤失败都会中止请求，此时洞察池不会被修改。
pub async fn generate_insights(
    context: &PipelineContext,
    request: &mut RequestContext,
    request_id: &str,
) -> Result<InsightBatch, InsightError> {
    let span = tracing::info_span!(
        "generate_insights",
        request_id,
        customer_id = request.customer_id,
        calls = request.calls.len()
    );

    async move {
        request.validate(true)?;
        request.apply_default_sample_limit(context.config.samples.default_limit);
        let mut timing = TimingScope::new();

        timing.start_phase(TimingKeys::TRANSCRIBE);
        transcribe_missing(context, request).await?;
        timing.end_phase(TimingKeys::TRANSCRIBE);

        timing.start_phase(TimingKeys::RETRIEVE);
        let samples = context.retriever.collect(request).await?;
        timing.end_phase(TimingKeys::RETRIEVE);

        timing.start_phase(TimingKeys::GENERATE);
        let system_prompt = compose_system_prompt(request, &samples);
        let user_query = compose_user_query(request);
        let batch = context
            .generator
            .generate_insights(&system_prompt, &user_query)
            .await?;
        timing.end_phase(TimingKeys::GENERATE);

        let expected = expected_batch_size(request);
        if batch.len() != expected {
            tracing::warn!(
                expected,
                received = batch.len(),
                "insight batch size differs from call count"
            );
        }

        timing.start_phase(TimingKeys::STORE);
        context.store.append_batch(&batch).await?;
        timing.end_phase(TimingKeys::STORE);

        tracing::info!(
            samples = samples.total(),
            records = batch.len(),
            elapsed_ms = timing.total_duration().as_millis() as u64,
            "insights generated"
        );
        Ok(batch)
    }
    .instrument(span)
    .await
}

/// 第二阶段：读取洞察池并生成汇总洞察
pub async fn generate_final_summary(
    context: &PipelineContext,
    request: &mut RequestContext,
    request_id: &str,
) -> Result<InsightRecord, InsightError> {
    let span = tracing::info_span!(
        "generate_final_summary",
        request_id,
        customer_id = request.customer_id
    );

    async move {
        request.validate(false)?;
        request.apply_default_sample_limit(context.config.samples.default_limit);
        let mut timing = TimingScope::new();

        timing.start_phase(TimingKeys::LOAD_POOL);
        let pool = context.store.load_pool().await?;
        timing.end_phase(TimingKeys::LOAD_POOL);

        timing.start_phase(TimingKeys::AGGREGATE);
        let record = build_final_summary(&context.generator, &pool, request).await?;
        timing.end_phase(TimingKeys::AGGREGATE);

        tracing::info!(
            pool_size = pool.len(),
            elapsed_ms = timing.total_duration().as_millis() as u64,
            "final summary generated"
        );
        Ok(record)
    }
    .instrument(span)
    .await
}

/// 多通电话为每通一条再加一条汇总，单通电话只有一条
fn expected_batch_size(request: &RequestContext) -> usize {
    if request.is_multi_call() {
        request.calls.len() + 1
    } else {
        1
    }
}

/// 按顺序转写缺少文本的通话，已有文本的通话不再转写
async fn transcribe_missing(
    context: &PipelineContext,
    request: &mut RequestContext,
) -> Result<(), InsightError> {
    if request.has_all_transcripts() {
        tracing::debug!("all transcripts supplied, skipping transcription");
        return Ok(());
    }

    let caller_id = request.customer_id.to_string();
    let mut transcripts = Vec::with_capacity(request.calls.len());
    for (index, call) in request.calls.iter().enumerate() {
        if let Some(text) = request.transcript(index) {
            transcripts.push(text.to_string());
            continue;
        }
        if call.recording_reference.trim().is_empty() {
            return Err(InsightError::Validation(format!(
                "call_data[{}] has neither a transcript nor a call_recording_url",
                index
            )));
        }

        let started = Instant::now();
        let text = context
            .transcriber
            .transcribe(&TranscriptionRequest {
                recording_reference: &call.recording_reference,
                caller_id: caller_id.clone(),
                receiver_id: &request.executive_id,
            })
            .await?;
        tracing::info!(
            call_index = index + 1,
            chars = text.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "call transcribed"
        );
        transcripts.push(text);
    }

    request.transcripts = transcripts;
    Ok(())
}
