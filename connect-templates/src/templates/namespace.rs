//! Namespace resolution for parallel test runs

use connect_common::{ExecutionContext, NAMESPACE_KEY};

use crate::error::TemplateResult;

/// Namespace that run-scoped helpers (scraper, grants) belong in
///
/// Parallel-namespace tests share the namespace recorded for the run. With a
/// namespace-scoped operator tests never run in parallel, so the resource's
/// own namespace is always right there, whatever the parallel flag says.
/// A parallel test whose run has no shared namespace is an error.
pub fn resolve_namespace(
    context: &dyn ExecutionContext,
    is_parallel_test: bool,
    is_namespace_rbac_scoped: bool,
    fallback_namespace: &str,
) -> TemplateResult<String> {
    if is_parallel_test && !is_namespace_rbac_scoped {
        Ok(context.require(NAMESPACE_KEY)?)
    } else {
        Ok(fallback_namespace.to_string())
    }
}
