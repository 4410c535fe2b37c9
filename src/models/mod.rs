pub mod category;
pub mod request;
pub mod target;

pub use category::{PortalLayout, ReportCategory, UiStep};
pub use request::{CrawlRequest, Month, Year};
pub use target::DownloadTarget;
