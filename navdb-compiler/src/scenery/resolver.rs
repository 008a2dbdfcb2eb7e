//! BGL files of a scenery area.

use std::path::{Path, PathBuf};

use navdata_schema::{NavDatabaseOptions, SceneryArea};

use super::{native_path, SceneryError};

/// Area directory, relative paths resolved against the simulator base path.
pub fn area_directory(options: &NavDatabaseOptions, area: &SceneryArea) -> PathBuf {
    let path = native_path(&area.local_path);
    if path.is_relative() {
        options.base_path.join(path)
    } else {
        path
    }
}

fn is_bgl(path: &Path) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case("bgl"))
}

/// Finds the `scenery` sub directory in any case. The area directory itself
/// is used if it is named `scenery`.
fn scenery_directory(area_dir: &Path) -> Option<PathBuf> {
    if area_dir.file_name().is_some_and(|n| n.to_string_lossy().eq_ignore_ascii_case("scenery")) {
        return Some(area_dir.to_path_buf());
    }
    std::fs::read_dir(area_dir)
        .ok()?
        .flatten()
        .map(|e| e.path())
        .find(|p| p.is_dir() && p.file_name().is_some_and(|n| n.to_string_lossy().eq_ignore_ascii_case("scenery")))
}

fn collect(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) -> Result<(), SceneryError> {
    let entries = std::fs::read_dir(dir).map_err(|e| SceneryError::io(dir, e))?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                collect(&path, true, files)?;
            }
        } else if is_bgl(&path) {
            files.push(path);
        }
    }
    Ok(())
}

/// BGL files of the area sorted by path, with include and exclude filters
/// applied. MSFS packages are searched recursively from the package root.
pub fn bgl_files(options: &NavDatabaseOptions, area: &SceneryArea) -> Result<Vec<PathBuf>, SceneryError> {
    let area_dir = area_directory(options, area);
    let (dir, recursive) = if options.simulator.is_msfs() {
        (area_dir, true)
    } else {
        let dir = scenery_directory(&area_dir).ok_or_else(|| SceneryError::MissingDirectory(area_dir.join("scenery")))?;
        (dir, false)
    };
    if !dir.is_dir() {
        return Err(SceneryError::MissingDirectory(dir));
    }

    let mut files = Vec::new();
    collect(&dir, recursive, &mut files)?;
    files.retain(|f| {
        let included = options.is_included_path(&f.to_string_lossy());
        if !included {
            tracing::debug!("Excluded {}", f.display());
        }
        included
    });
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use navdata_schema::SimulatorType;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn finds_bgl_files_in_any_case_scenery_dir() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("Addon/Scenery/b.BGL"));
        touch(&dir.path().join("Addon/Scenery/a.bgl"));
        touch(&dir.path().join("Addon/Scenery/readme.txt"));
        touch(&dir.path().join("Addon/Scenery/sub/c.bgl"));

        let mut options = NavDatabaseOptions::default();
        options.base_path = dir.path().to_path_buf();
        let area = SceneryArea::new(1, 1, "Addon", r"Addon");
        let files = bgl_files(&options, &area).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.file_name().unwrap().to_string_lossy().into_owned()).collect();
        assert_eq!(names, ["a.bgl", "b.BGL"]);
    }

    #[test]
    fn exclude_filter_and_msfs_recursion() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("pkg/scenery/world/airports.bgl"));
        touch(&dir.path().join("pkg/scenery/world/scenery/objects.bgl"));

        let mut options = NavDatabaseOptions::default();
        options.simulator = SimulatorType::Msfs;
        options.set_path_filters(Vec::new(), vec!["*/objects.bgl".into()]).unwrap();
        let area = SceneryArea::new(1, 1, "pkg", dir.path().join("pkg").display().to_string());
        let files = bgl_files(&options, &area).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("airports.bgl"));
    }

    #[test]
    fn missing_directory() {
        let options = NavDatabaseOptions::default();
        let area = SceneryArea::new(1, 1, "Gone", "/does/not/exist");
        assert!(matches!(bgl_files(&options, &area), Err(SceneryError::MissingDirectory(_))));
    }
}
