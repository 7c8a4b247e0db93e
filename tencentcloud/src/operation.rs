//! Per-operation log id, tracing span and elapsed-time logging

use std::time::Instant;
use tfplug::context::Context;
use tracing::Span;

/// One lifecycle call (`resource.tencentcloud_vpc_local_gateway.create`, ...).
/// Logs its elapsed time when dropped.
pub(crate) struct Operation {
    pub ctx: Context,
    name: String,
    span: Span,
    started: Instant,
}

impl Operation {
    pub async fn start(ctx: Context, kind: &str, type_name: &str, verb: &str) -> Self {
        let ctx = ctx.with_log_id().await;
        let log_id = ctx.log_id().await;
        let name = format!("{}.{}.{}", kind, type_name, verb);
        let span = tracing::info_span!("operation", name = %name, log_id = %log_id);
        Self {
            ctx,
            name,
            span,
            started: Instant::now(),
        }
    }

    pub async fn resource(ctx: Context, type_name: &str, verb: &str) -> Self {
        Self::start(ctx, "resource", type_name, verb).await
    }

    pub async fn data_source(ctx: Context, type_name: &str, verb: &str) -> Self {
        Self::start(ctx, "data_source", type_name, verb).await
    }

    pub fn span(&self) -> Span {
        self.span.clone()
    }
}

impl Drop for Operation {
    fn drop(&mut self) {
        let _enter = self.span.enter();
        tracing::debug!(
            "{} elapsed {} ms",
            self.name,
            self.started.elapsed().as_millis()
        );
    }
}
