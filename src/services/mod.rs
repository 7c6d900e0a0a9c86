pub mod account_service;
pub mod markdown_service;
pub mod page_finder;
pub mod page_store;
pub mod session_service;

pub use account_service::AccountService;
pub use markdown_service::MarkdownService;
pub use page_finder::PageFinder;
pub use page_store::PageStore;
pub use session_service::SessionService;
