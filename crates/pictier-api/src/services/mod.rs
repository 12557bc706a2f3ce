pub mod download_resolver;
pub mod link_issuer;
pub mod photo_lifecycle;
pub mod upload;

pub use download_resolver::DownloadResolver;
pub use link_issuer::LinkIssuer;
pub use photo_lifecycle::PhotoLifecycleService;
