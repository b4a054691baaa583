//! Reading and writing Newick tree files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::newick::{self, WriteOptions};
use crate::domain::{CladeTree, Diagnostics};

/// Extensions written as Newick text.
pub const TEXT_EXTENSIONS: &[&str] = &["nwk", "newick", "nw", "tree", "txt"];

/// Image formats a tree renderer would produce; not supported here.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "pdf", "eps", "bmp"];

/// Check that `path` names a writable tree format and derive write options.
pub fn output_options(path: &Path, annotated: bool) -> ApplicationResult<WriteOptions> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        return Ok(WriteOptions { annotated });
    }

    let reason = if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        format!("rendering .{ext} images is not supported, use a Newick extension")
    } else if ext.is_empty() {
        "missing file extension".to_string()
    } else {
        format!("unknown extension .{ext}")
    };
    Err(ApplicationError::UnsupportedFormat {
        path: path.to_path_buf(),
        reason,
    })
}

/// `dir/base.ext` -> `dir/base-i.ext`
pub fn numbered_path(path: &Path, i: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, i, ext.to_string_lossy()),
        None => format!("{}-{}", stem, i),
    };
    path.with_file_name(name)
}

/// Write trees to `path`, numbering the files when there is more than one.
///
/// Returns the paths written, in tree order.
#[instrument(level = "debug", skip(trees))]
pub fn write_trees(
    trees: &[CladeTree],
    path: &Path,
    options: WriteOptions,
) -> ApplicationResult<Vec<PathBuf>> {
    let targets: Vec<PathBuf> = if trees.len() == 1 {
        vec![path.to_path_buf()]
    } else {
        (0..trees.len()).map(|i| numbered_path(path, i)).collect()
    };

    for (tree, target) in trees.iter().zip(&targets) {
        let mut text = newick::write(tree, options);
        text.push('\n');
        fs::write(target, text).with_path_context("write tree", target)?;
        debug!("wrote {}", target.display());
    }
    Ok(targets)
}

/// Read one Newick tree from `path`.
pub fn read_tree(path: &Path, diag: &mut Diagnostics) -> ApplicationResult<CladeTree> {
    let text = fs::read_to_string(path).with_path_context("read tree", path)?;
    Ok(newick::parse(text.trim(), diag)?)
}
