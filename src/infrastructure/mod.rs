pub mod js_executor;
pub mod service_page;

pub use js_executor::JsExecutor;
pub use service_page::{ChromeServicePage, ElementCondition, ServicePage};
