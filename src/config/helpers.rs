use std::path::{Path, PathBuf};

use crate::SdclError;
use crate::ast::{Document, Expression};
use crate::error::Result;
use crate::lexer::Position;

use super::EXTENSION;

/// Expand a leading `~/` to the user's home directory.
pub(super) fn expand_home(path: &Path) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => {
            let home = dirs::home_dir().ok_or_else(|| SdclError::FileError {
                message: "Could not determine home directory for ~ expansion".into(),
                path: path.to_string_lossy().to_string(),
                hint: Some("Set HOME or use an absolute path".into()),
                code: Some(300),
            })?;
            Ok(home.join(rest))
        }
        Err(_) => Ok(path.to_path_buf()),
    }
}

/// Find `<id>.sdcl` in the `search` directories, then in `<config_dir>/sdcl`.
pub(super) fn find_document(id: &str, search: &[&Path]) -> Option<PathBuf> {
    let file_name = format!("{}.{}", id, EXTENSION);
    let config_dir = dirs::config_dir().map(|dir| dir.join("sdcl"));

    search
        .iter()
        .map(|dir| dir.to_path_buf())
        .chain(config_dir)
        .map(|dir| dir.join(&file_name))
        .find(|candidate| candidate.is_file())
}

/// Source position of the key at the end of a dotted path, following object
/// literals. Stops at the deepest key that exists in the syntax tree.
pub(super) fn key_position(document: &Document, path: &str) -> Option<Position> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let kv = document.pairs().find(|kv| kv.key.name == first)?;

    let mut position = kv.key.position;
    let mut current = &kv.value;
    for segment in segments {
        let Expression::Object(obj) = current else { break };
        let Some(pair) = obj.pairs.iter().find(|p| p.key.name == segment) else { break };
        position = pair.key.position;
        current = &pair.value;
    }
    Some(position)
}

/// Add the source position of `path` to type errors raised while converting
/// its value.
pub(super) fn locate_type_error(error: SdclError, path: &str, document: &Document) -> SdclError {
    match (error, key_position(document, path)) {
        (SdclError::TypeError { message, hint, code, .. }, Some(pos)) => SdclError::TypeError {
            message: format!("{} at `{}`", message, path),
            line: pos.line,
            column: pos.column,
            hint,
            code,
        },
        (other, _) => other,
    }
}
