//! Input discovery and output path planning.
//!
//! Provenance is fixed here, before any parallel work starts: every file
//! gets a `system_id` equal to its position in the expanded list and a
//! `source_id` equal to the position of the argument it came from.

use std::path::{Path, PathBuf};

use datsmith_core::Provenance;

use crate::error::RunError;

/// File extensions recognized as DATs when expanding directories.
const DAT_EXTENSIONS: &[&str] = &["dat", "xml"];

/// One DAT file to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    /// Directory argument this file was found under, if any.
    pub root: Option<PathBuf>,
    pub provenance: Provenance,
}

/// Where per-input outputs go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Under a directory, mirroring each file's path below its root.
    Dir(PathBuf),
    /// Next to the input file.
    InPlace,
}

impl InputFile {
    /// File name without extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Directory of this file relative to its root. Empty for file arguments.
    pub fn relative_dir(&self) -> PathBuf {
        let Some(root) = &self.root else {
            return PathBuf::new();
        };
        self.path
            .parent()
            .and_then(|parent| pathdiff::diff_paths(parent, root))
            .unwrap_or_default()
    }

    /// Output path for this input's derived catalog: `<stem>.dat`.
    ///
    /// In place, an input that already ends in `.dat` is overwritten.
    pub fn output_path(&self, target: &OutputTarget) -> PathBuf {
        let file_name = format!("{}.dat", self.stem());
        match target {
            OutputTarget::Dir(dir) => dir.join(self.relative_dir()).join(file_name),
            OutputTarget::InPlace => self.path.with_file_name(file_name),
        }
    }
}

/// Expand input arguments into DAT files with provenance assigned.
///
/// Directory arguments are searched recursively for `.dat`/`.xml` files,
/// which are taken in sorted path order and share the argument's
/// `source_id`. A missing argument is an error.
pub fn expand_inputs(args: &[PathBuf]) -> Result<Vec<InputFile>, RunError> {
    let mut found: Vec<(PathBuf, Option<PathBuf>, usize)> = Vec::new();

    for (source_id, arg) in args.iter().enumerate() {
        if arg.is_dir() {
            let mut files = Vec::new();
            collect_dat_files(arg, &mut files)?;
            files.sort();
            if files.is_empty() {
                log::warn!("No DAT files found under {}", arg.display());
            }
            found.extend(files.into_iter().map(|f| (f, Some(arg.clone()), source_id)));
        } else if arg.is_file() {
            found.push((arg.clone(), None, source_id));
        } else {
            return Err(RunError::missing_input(arg));
        }
    }

    log::debug!(
        "Expanded {} arguments into {} DAT files",
        args.len(),
        found.len()
    );

    Ok(found
        .into_iter()
        .enumerate()
        .map(|(system_id, (path, root, source_id))| InputFile {
            path,
            root,
            provenance: Provenance::new(system_id as i64, source_id as i64),
        })
        .collect())
}

fn has_dat_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| DAT_EXTENSIONS.iter().any(|d| e.eq_ignore_ascii_case(d)))
        .unwrap_or(false)
}

fn collect_dat_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_dat_files(&path, out)?;
        } else if path.is_file() && has_dat_extension(&path) {
            out.push(path);
        }
    }
    Ok(())
}

/// Turn a DAT name into a file name, replacing characters that are not
/// allowed in paths.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "datsmith".to_string()
    } else {
        trimmed.to_string()
    }
}
