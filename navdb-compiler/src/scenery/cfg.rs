//! `scenery.cfg` reader and the MSFS package directory scan.
//!
//! ```text
//! [Area.001]
//! Title=Default Terrain
//! Local=Scenery\World
//! Layer=1
//! Active=TRUE
//! Required=TRUE
//! ```

use std::path::Path;

use encoding_rs::{Encoding, WINDOWS_1252};
use ini::{Ini, ParseOption};
use navdata_schema::SceneryArea;

use super::SceneryError;

#[derive(Debug, Clone, Default)]
pub struct SceneryCfg {
    areas: Vec<SceneryArea>,
}

/// Files are UTF-8, UTF-16 with BOM or plain ANSI depending on the tool that
/// last wrote them.
fn decode(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return text.into_owned();
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => WINDOWS_1252.decode_without_bom_handling(bytes).0.into_owned(),
    }
}

fn parse_bool(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

impl SceneryCfg {
    pub fn read(path: &Path) -> Result<Self, SceneryError> {
        let bytes = std::fs::read(path).map_err(|e| SceneryError::io(path, e))?;
        let cfg = Self::parse(&decode(&bytes))
            .map_err(|source| SceneryError::Ini { path: path.to_path_buf(), source })?;
        if cfg.areas.is_empty() {
            return Err(SceneryError::NoAreas(path.to_path_buf()));
        }
        tracing::info!("Read {} scenery areas from {}", cfg.areas.len(), path.display());
        Ok(cfg)
    }

    /// Parses the file content. Areas are returned sorted by layer.
    pub fn parse(text: &str) -> Result<Self, ini::ParseError> {
        // Backslashes in paths are not escapes
        let option = ParseOption { enabled_escape: false, enabled_quote: false, ..ParseOption::default() };
        let ini = Ini::load_from_str_opt(text, option)?;

        let mut cfg = Self::default();
        for (section, props) in ini.iter() {
            let Some(section) = section else { continue };
            let Some(number) = section
                .split_once('.')
                .filter(|(prefix, _)| prefix.eq_ignore_ascii_case("area"))
                .and_then(|(_, num)| num.trim().parse::<i32>().ok())
            else {
                continue;
            };

            let mut area = SceneryArea { area_number: number, layer: number, ..SceneryArea::default() };
            for (key, value) in props.iter() {
                match key.to_ascii_lowercase().as_str() {
                    "title" => area.title = value.trim().to_string(),
                    "local" => area.local_path = value.trim().to_string(),
                    "remote" => area.remote_path = value.trim().to_string(),
                    "layer" => area.layer = value.trim().parse().unwrap_or(number),
                    "active" => area.active = parse_bool(value),
                    "required" => area.required = parse_bool(value),
                    _ => {}
                }
            }
            if area.local_path.is_empty() {
                tracing::warn!("Scenery area {number} \"{}\" has no local path", area.title);
                continue;
            }
            cfg.areas.push(area);
        }
        cfg.sort_areas();
        Ok(cfg)
    }

    /// MSFS has no `scenery.cfg`. Every package below `Official` and
    /// `Community` is an area, community packages loaded last.
    pub fn from_msfs_packages(base_path: &Path) -> Result<Self, SceneryError> {
        let mut cfg = Self::default();
        let mut number = 0;
        for (dir, addon) in [(base_path.join("Official"), false), (base_path.join("Community"), true)] {
            if !dir.is_dir() {
                tracing::warn!("{} does not exist", dir.display());
                continue;
            }
            let mut packages = Vec::new();
            // Official packages sit one level deeper below the store name
            let stores = if addon { vec![dir.clone()] } else { list_dirs(&dir)? };
            for store in stores {
                packages.extend(list_dirs(&store)?);
            }
            packages.sort();

            for package in packages {
                number += 1;
                let title = package.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
                let mut area = SceneryArea::new(number, number, title.clone(), package.display().to_string());
                area.addon = addon;
                area.navdata = title.contains("navdata");
                area.msfs_navigraph_navdata = title.starts_with("navigraph-navdata");
                cfg.areas.push(area);
            }
        }
        if cfg.areas.is_empty() {
            return Err(SceneryError::NoAreas(base_path.to_path_buf()));
        }
        Ok(cfg)
    }

    pub fn areas(&self) -> &[SceneryArea] {
        &self.areas
    }

    pub fn append_area(&mut self, area: SceneryArea) {
        self.areas.push(area);
    }

    pub fn sort_areas(&mut self) {
        self.areas.sort_by_key(|a| (a.layer, a.area_number));
    }

    pub fn max_area_number(&self) -> i32 {
        self.areas.iter().map(|a| a.area_number).max().unwrap_or(0)
    }

    pub fn max_layer(&self) -> i32 {
        self.areas.iter().map(|a| a.layer).max().unwrap_or(0)
    }
}

fn list_dirs(dir: &Path) -> Result<Vec<std::path::PathBuf>, SceneryError> {
    let entries = std::fs::read_dir(dir).map_err(|e| SceneryError::io(dir, e))?;
    let mut dirs: Vec<_> = entries.flatten().map(|e| e.path()).filter(|p| p.is_dir()).collect();
    dirs.sort();
    Ok(dirs)
}
