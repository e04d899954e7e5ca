use std::path::Path;

use walkdir::WalkDir;

use super::{GridFile, ReadError};

pub fn is_netcdf(path: &Path) -> bool {
    matches!(path.extension().and_then(|ext| ext.to_str()), Some("nc"))
}

/// Parses `<site>_<year>_<month>.nc`, returning the year and month when the
/// site prefix matches exactly.
pub fn parse_grid_file_name(file_name: &str, site_name: &str) -> Option<(i32, u32)> {
    let stem = file_name.strip_suffix(".nc")?;
    let mut parts = stem.rsplitn(3, '_');
    let month = parts.next()?.parse::<u32>().ok()?;
    let year = parts.next()?.parse::<i32>().ok()?;
    let prefix = parts.next()?;

    (prefix == site_name && (1..=12).contains(&month)).then_some((year, month))
}

/// Recursively finds the gridded files of a site under `base_dir`, sorted
/// by year, month and path.
pub fn find_grid_files(base_dir: &Path, site_name: &str) -> Result<Vec<GridFile>, ReadError> {
    if !base_dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(base_dir) {
        let entry = entry.map_err(|e| ReadError::Io {
            path: base_dir.display().to_string(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() || !is_netcdf(entry.path()) {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        if let Some((year, month)) = parse_grid_file_name(&file_name, site_name) {
            files.push(GridFile {
                year,
                month,
                path: entry.path().to_path_buf(),
            });
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_grid_file_name() {
        assert_eq!(
            parse_grid_file_name("Tamanrasset_TMP_2019_7.nc", "Tamanrasset_TMP"),
            Some((2019, 7))
        );
        assert_eq!(
            parse_grid_file_name("Tamanrasset_TMP_2019_12.nc", "Tamanrasset_TMP"),
            Some((2019, 12))
        );
        // Prefix must match the whole site name
        assert_eq!(
            parse_grid_file_name("Tamanrasset_TMP_2019_7.nc", "Tamanrasset"),
            None
        );
        assert_eq!(parse_grid_file_name("Tamanrasset_TMP_2019_13.nc", "Tamanrasset_TMP"), None);
        assert_eq!(parse_grid_file_name("Tamanrasset_TMP_2019.nc", "Tamanrasset_TMP"), None);
        assert_eq!(parse_grid_file_name("Tamanrasset_TMP_2019_7.tif", "Tamanrasset_TMP"), None);
    }

    #[test]
    fn test_find_grid_files_recursively() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("2019");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("Dakar_2019_2.nc"), b"").unwrap();
        fs::write(dir.path().join("Dakar_2018_12.nc"), b"").unwrap();
        fs::write(dir.path().join("Dakar_Belair_2018_12.nc"), b"").unwrap();
        fs::write(dir.path().join("Dakar_2018_11.txt"), b"").unwrap();

        let files = find_grid_files(dir.path(), "Dakar").unwrap();
        let keys: Vec<String> = files.iter().map(|f| f.year_month()).collect();
        assert_eq!(keys, vec!["201812", "201902"]);
    }

    #[test]
    fn test_missing_base_dir() {
        let files = find_grid_files(Path::new("/nonexistent/grids"), "Dakar").unwrap();
        assert!(files.is_empty());
    }
}
