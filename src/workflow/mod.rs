pub mod category_ctx;
pub mod stage;

pub use category_ctx::CategoryCtx;
pub use stage::ExtractionStage;
