//! URL contracts shared by navigation and download handling.

pub mod url;

pub use url::BLANK_URL;
pub use url::CandidateUrl;
