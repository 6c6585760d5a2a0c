//! Terabox 分享链接解析模块

pub mod client;
pub mod download;
pub mod error;
pub mod parser;
pub mod share;
pub mod types;

pub use error::{ResolveError, ResolveFailure};
pub use parser::{extract_surl, parse_cookie_string};
pub use share::resolve_share_link;
pub use types::{Diagnostic, FileDescriptor};
