//! 洞察池汇总

use crate::error::InsightError;
use crate::generator::insight::InsightGenerator;
use crate::generator::prompt::compose_aggregation_prompt;
use crate::types::{InsightPool, InsightRecord, RequestContext};

/// 把洞察池汇总为一条定量的`final`洞察
///
/// 洞察池为空时直接返回`EmptyPool`，不调用LLM。
pub async fn build_final_summary(
    generator: &InsightGenerator,
    pool: &InsightPool,
    request: &RequestContext,
) -> Result<InsightRecord, InsightError> {
    if pool.is_empty() {
        return Err(InsightError::EmptyPool);
    }

    let prompt = compose_aggregation_prompt(pool, request.sample_limit);
    tracing::info!(
        pool_size = pool.len(),
        included = pool.len().min(request.sample_limit),
        "aggregating insight pool"
    );
    generator.generate_final(&prompt).await
}
