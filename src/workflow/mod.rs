pub mod conversion_ctx;
pub mod conversion_flow;

pub use conversion_ctx::ConversionCtx;
pub use conversion_flow::ConversionFlow;
