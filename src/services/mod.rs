pub mod download_resolver;
pub mod report_session;

pub use download_resolver::{pick_newest, DownloadResolver, FileSnapshot};
pub use report_session::ReportSession;
