//! XInclude expansion
//!
//! The API description is split over many files stitched together with
//! `<xi:include href="..."/>`. The model builder and the linter only ever see
//! the expanded tree; this module produces it.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ApiError, Result};
use crate::xml::{parse_document, XmlElement, MAX_DOCUMENT_DEPTH};

/// Read, parse and expand a document from disk.
pub fn load_document(path: impl AsRef<Path>) -> Result<XmlElement> {
    let path = path.as_ref();
    let mut chain = Vec::new();
    load_expanded(path, &mut chain)
}

/// Expand every include element below `root`, resolving relative hrefs
/// against `base_dir`.
pub fn expand_includes(root: &mut XmlElement, base_dir: &Path) -> Result<()> {
    let mut chain = Vec::new();
    expand_children(root, base_dir, &mut chain)
}

fn load_expanded(path: &Path, chain: &mut Vec<PathBuf>) -> Result<XmlElement> {
    let canonical = fs::canonicalize(path)?;
    if chain.contains(&canonical) {
        return Err(ApiError::IncludeCycle {
            path: canonical.display().to_string(),
        });
    }

    debug!(path = %canonical.display(), "loading document");
    let content = fs::read_to_string(&canonical)?;
    let mut root = parse_document(&content)?;

    let base_dir = canonical
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    chain.push(canonical);
    expand_children(&mut root, &base_dir, chain)?;
    chain.pop();
    Ok(root)
}

fn expand_children(root: &mut XmlElement, base_dir: &Path, chain: &mut Vec<PathBuf>) -> Result<()> {
    let mut pending: Vec<(&mut XmlElement, usize)> = vec![(root, 1)];
    while let Some((element, depth)) = pending.pop() {
        for child in element.children.iter_mut() {
            if is_include(child) {
                let included = load_include(child, base_dir, chain)?;
                if depth + included.height() > MAX_DOCUMENT_DEPTH {
                    return Err(ApiError::Include {
                        href: child.attr("href").unwrap_or_default().to_string(),
                        reason: format!("expanded document nests more than {MAX_DOCUMENT_DEPTH} levels deep"),
                    });
                }
                *child = included;
            } else {
                pending.push((child, depth + 1));
            }
        }
    }
    Ok(())
}

fn load_include(include: &XmlElement, base_dir: &Path, chain: &mut Vec<PathBuf>) -> Result<XmlElement> {
    let href = include.require_attr("href")?;
    match include.attr("parse").unwrap_or("xml") {
        "xml" => {}
        other => {
            return Err(ApiError::Include {
                href: href.to_string(),
                reason: format!("unsupported parse mode {other:?}"),
            });
        }
    }
    load_expanded(&base_dir.join(href), chain).map_err(|err| match err {
        ApiError::Io(io) => ApiError::Include {
            href: href.to_string(),
            reason: io.to_string(),
        },
        other => other,
    })
}

fn is_include(element: &XmlElement) -> bool {
    element.local_name() == "include" && element.attr("href").is_some()
}
