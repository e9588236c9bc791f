use std::path::{Component, Path, PathBuf};

use tokio::fs::File;

use crate::server_impl::request::Request;
use crate::server_impl::server::Method;

/// Outcome of resolving a request target against the document root. The
/// open handle is consumed by the body writer and dropped (closed) on
/// every exit path before the worker finishes.
#[derive(Debug)]
pub enum Resource {
    Found(File),
    /// Missing, unreadable, a directory, a non-GET method, or a target
    /// that escaped the root.
    NotFound,
}

impl Resource {
    pub fn exists(&self) -> bool {
        matches!(self, Resource::Found(_))
    }
}

/// Lexically normalizes the target and pins it under the root. `..` that
/// would climb above the root fails closed, as do absolute components.
pub fn contain(root: &Path, target: &str) -> Option<PathBuf> {
    let relative = target.strip_prefix('/').unwrap_or(target);
    let mut clean = PathBuf::new();

    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::ParentDir => {
                if !clean.pop() {
                    return None;
                }
            }
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    Some(root.join(clean))
}

/// Only `GET` ever touches the filesystem; any other request resolves to
/// [`Resource::NotFound`]. Existence means open-for-read succeeded on a
/// regular file.
pub async fn open_resource(root: &Path, request: &Request<'_>) -> Resource {
    if request.method != Method::GET {
        return Resource::NotFound;
    }

    let Some(path) = contain(root, request.target) else {
        return Resource::NotFound;
    };

    match File::open(&path).await {
        Ok(file) => match file.metadata().await {
            Ok(meta) if meta.is_file() => Resource::Found(file),
            // opened but not a plain file (directory), or stat failed
            _ => Resource::NotFound,
        },
        Err(_) => Resource::NotFound,
    }
}
