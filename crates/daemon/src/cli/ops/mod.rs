pub mod delete;
pub mod download;
pub mod health;
pub mod serve;
pub mod upload;
pub mod version;

pub use delete::Delete;
pub use download::Download;
pub use health::Health;
pub use serve::Serve;
pub use upload::Upload;
pub use version::Version;
