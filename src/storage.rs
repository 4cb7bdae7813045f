use crate::constants::TEMP_FILE_PREFIX;
use crate::error::{RemoveBgError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempPath;

const GLOB_METACHARACTERS: &[char] = &['*', '?', '[', '{'];

/// Filesystem access used by the processor and the compositor.
pub trait Storage {
    fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    fn file_exists(&self, path: &Path) -> bool;

    /// Expands glob patterns (`*`, `**`, `{a,b}`). Literal paths, existing
    /// files whose names contain pattern characters and patterns matching
    /// nothing are returned untouched.
    fn expand_paths(&self, raw_paths: &[String]) -> Result<Vec<PathBuf>>;

    /// `mkdir -p`. An empty path is a no-op.
    fn mkdir_all(&self, path: &Path) -> Result<()>;

    /// Writes `data` to a fresh temp file. The file is removed when the
    /// returned handle is dropped.
    fn create_temp_file(&self, data: &[u8], suffix: &str) -> Result<TempPath>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FileStorage;

impl Storage for FileStorage {
    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        fs::write(path, data)?;
        Ok(())
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn expand_paths(&self, raw_paths: &[String]) -> Result<Vec<PathBuf>> {
        let mut resolved = Vec::new();

        for raw in raw_paths {
            // Names such as `photo[1].jpg` are files, not patterns
            if !is_glob_pattern(raw) || Path::new(raw).is_file() {
                resolved.push(PathBuf::from(raw));
                continue;
            }

            let mut matches = Vec::new();
            for pattern in expand_braces(raw) {
                let entries = glob::glob(&pattern).map_err(|e| RemoveBgError::InvalidGlobPattern {
                    pattern: raw.clone(),
                    message: e.to_string(),
                })?;
                // Unreadable directories are skipped rather than failing the batch
                matches.extend(entries.flatten().filter(|p| p.is_file()));
            }
            matches.sort();
            matches.dedup();

            if matches.is_empty() {
                // Kept so the processor reports it instead of dropping it
                tracing::debug!("No files match {}", raw);
                resolved.push(PathBuf::from(raw));
                continue;
            }

            tracing::debug!("Expanded {} to {} file(s)", raw, matches.len());
            resolved.extend(matches);
        }

        Ok(resolved)
    }

    fn mkdir_all(&self, path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(path)
            .map_err(|_| RemoveBgError::DirectoryCreationFailed(path.to_path_buf()))
    }

    fn create_temp_file(&self, data: &[u8], suffix: &str) -> Result<TempPath> {
        let mut file = tempfile::Builder::new()
            .prefix(TEMP_FILE_PREFIX)
            .suffix(suffix)
            .tempfile()?;
        file.write_all(data)?;
        file.flush()?;
        Ok(file.into_temp_path())
    }
}

pub fn is_glob_pattern(path: &str) -> bool {
    path.contains(GLOB_METACHARACTERS)
}

/// Expands brace alternatives: `a/{b,c}/*.{jpg,png}` becomes four patterns.
///
/// Nested groups are supported. An unbalanced `{` is left as-is.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };

    let mut depth = 0usize;
    let mut close = None;
    let mut separators = vec![open];
    for (offset, c) in pattern[open..].char_indices() {
        let idx = open + offset;
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(idx);
                    break;
                }
            }
            ',' if depth == 1 => separators.push(idx),
            _ => {}
        }
    }

    let Some(close) = close else {
        return vec![pattern.to_string()];
    };
    separators.push(close);

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];

    separators
        .windows(2)
        .flat_map(|w| {
            let alternative = &pattern[w[0] + 1..w[1]];
            expand_braces(&format!("{}{}{}", prefix, alternative, suffix))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn fixture_tree() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested");
        fs::create_dir(&nested).unwrap();

        File::create(temp_dir.path().join("person-in-field.jpg")).unwrap();
        File::create(temp_dir.path().join("nomatch.txt")).unwrap();
        File::create(nested.join("plant.png")).unwrap();

        temp_dir
    }

    fn pattern(dir: &TempDir, suffix: &str) -> String {
        format!("{}/{}", dir.path().display(), suffix)
    }

    #[test]
    fn test_file_exists() {
        let temp_dir = fixture_tree();
        let storage = FileStorage;

        assert!(storage.file_exists(&temp_dir.path().join("person-in-field.jpg")));
        assert!(!storage.file_exists(&temp_dir.path().join("missing.jpg")));
        assert!(!storage.file_exists(&temp_dir.path().join("missing/dir.jpg")));
    }

    #[test]
    fn test_expand_single_star() {
        let temp_dir = fixture_tree();
        let expanded = FileStorage
            .expand_paths(&[pattern(&temp_dir, "*.jpg")])
            .unwrap();

        assert_eq!(expanded, vec![temp_dir.path().join("person-in-field.jpg")]);
    }

    #[test]
    fn test_expand_double_star() {
        let temp_dir = fixture_tree();
        let expanded = FileStorage
            .expand_paths(&[pattern(&temp_dir, "**/*.png")])
            .unwrap();

        assert_eq!(expanded, vec![temp_dir.path().join("nested/plant.png")]);
    }

    #[test]
    fn test_expand_alternatives() {
        let temp_dir = fixture_tree();
        let expanded = FileStorage
            .expand_paths(&[pattern(&temp_dir, "**/*.{jpg,png}")])
            .unwrap();

        assert!(expanded.contains(&temp_dir.path().join("person-in-field.jpg")));
        assert!(expanded.contains(&temp_dir.path().join("nested/plant.png")));
        assert!(!expanded.iter().any(|p| p.ends_with("nomatch.txt")));
    }

    #[test]
    fn test_literal_paths_pass_through() {
        let temp_dir = fixture_tree();
        let existing = temp_dir
            .path()
            .join("person-in-field.jpg")
            .to_string_lossy()
            .into_owned();
        let originals = vec![existing.clone(), "missing/foo/bar.jpg".to_string()];

        let expanded = FileStorage.expand_paths(&originals).unwrap();
        assert_eq!(
            expanded,
            vec![PathBuf::from(existing), PathBuf::from("missing/foo/bar.jpg")]
        );
    }

    #[test]
    fn test_existing_files_with_pattern_characters_are_kept() {
        let temp_dir = TempDir::new().unwrap();
        let bracketed = temp_dir.path().join("photo[1].jpg");
        let question = temp_dir.path().join("img?.jpg");
        File::create(&bracketed).unwrap();
        File::create(&question).unwrap();

        let expanded = FileStorage
            .expand_paths(&[
                bracketed.to_string_lossy().into_owned(),
                question.to_string_lossy().into_owned(),
            ])
            .unwrap();

        assert_eq!(expanded, vec![bracketed, question]);
    }

    #[test]
    fn test_pattern_without_matches_is_kept() {
        let temp_dir = fixture_tree();
        let raw = pattern(&temp_dir, "*.webp");

        let expanded = FileStorage.expand_paths(&[raw.clone()]).unwrap();
        assert_eq!(expanded, vec![PathBuf::from(raw)]);
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let result = FileStorage.expand_paths(&["images/***.jpg".to_string()]);
        assert!(matches!(
            result,
            Err(RemoveBgError::InvalidGlobPattern { .. })
        ));
    }

    #[test]
    fn test_mkdir_all_creates_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("nested1/nested2");
        assert!(!output_dir.is_dir());

        FileStorage.mkdir_all(&output_dir).unwrap();
        assert!(output_dir.is_dir());
    }

    #[test]
    fn test_mkdir_all_empty_path_is_noop() {
        assert!(FileStorage.mkdir_all(Path::new("")).is_ok());
    }

    #[test]
    fn test_write_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("out.png");

        FileStorage.write(&target, b"first version").unwrap();
        FileStorage.write(&target, b"second").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"second");
    }

    #[test]
    fn test_temp_file_removed_on_drop() {
        let temp_path = FileStorage.create_temp_file(b"PK", ".zip").unwrap();
        let path = temp_path.to_path_buf();

        assert!(path.to_string_lossy().ends_with(".zip"));
        assert_eq!(fs::read(&path).unwrap(), b"PK");

        drop(temp_path);
        assert!(!path.exists());
    }

    #[test]
    fn test_expand_braces() {
        assert_eq!(expand_braces("a.jpg"), vec!["a.jpg"]);
        assert_eq!(expand_braces("*.{jpg,png}"), vec!["*.jpg", "*.png"]);
        assert_eq!(
            expand_braces("{a,b}/*.{jpg,png}"),
            vec!["a/*.jpg", "a/*.png", "b/*.jpg", "b/*.png"]
        );
        assert_eq!(expand_braces("x.{jpg,{png,webp}}"), vec!["x.jpg", "x.png", "x.webp"]);
        assert_eq!(expand_braces("broken{a,b"), vec!["broken{a,b"]);
    }

    #[test]
    fn test_is_glob_pattern() {
        assert!(is_glob_pattern("*.jpg"));
        assert!(is_glob_pattern("img?.jpg"));
        assert!(is_glob_pattern("{a,b}.jpg"));
        assert!(!is_glob_pattern("in/nested/image.jpg"));
    }
}
