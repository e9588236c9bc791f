use std::path::PathBuf;

use compact_str::CompactString;

const DEFAULT_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ROOT: &str = "./www";
const DEFAULT_IDENT: &str = "tinyserve/0.1";

/// Startup configuration shared by every connection worker. The document
/// root is read-only from the workers' perspective.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: CompactString,
    pub document_root: PathBuf,
    /// Goes out in the `Server:` header and replaces `<cs371server>`.
    pub server_ident: CompactString,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("TINYSERVE_ADDR")
                .map(CompactString::from)
                .unwrap_or(defaults.bind_addr),
            document_root: std::env::var("TINYSERVE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.document_root),
            server_ident: std::env::var("TINYSERVE_IDENT")
                .map(CompactString::from)
                .unwrap_or(defaults.server_ident),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: CompactString::const_new(DEFAULT_ADDR),
            document_root: PathBuf::from(DEFAULT_ROOT),
            server_ident: CompactString::const_new(DEFAULT_IDENT),
        }
    }
}
