//! Prepar3D `add-on.xml` packages.
//!
//! ```xml
//! <SimBase.Document Type="AddOnXml" version="4,0" id="add-on">
//!   <AddOn.Name>Sample</AddOn.Name>
//!   <AddOn.Component>
//!     <Category>Scenery</Category>
//!     <Path>Scenery</Path>
//!     <Name>Sample Airport</Name>
//!     <Layer>120</Layer>
//!   </AddOn.Component>
//! </SimBase.Document>
//! ```

use std::path::{Path, PathBuf};

use navdata_schema::{NavDatabaseOptions, SceneryArea, SimulatorType};
use quick_xml::events::Event;
use quick_xml::Reader;

use super::{native_path, SceneryCfg, SceneryError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddOnComponent {
    pub category: String,
    pub name: String,
    pub path: String,
    /// `None` when the package does not ask for a layer.
    pub layer: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct AddOnPackage {
    pub name: String,
    pub description: String,
    /// Directory containing `add-on.xml`.
    pub base_directory: PathBuf,
    pub components: Vec<AddOnComponent>,
}

impl AddOnPackage {
    pub fn read(path: &Path) -> Result<Self, SceneryError> {
        let content = std::fs::read_to_string(path).map_err(|e| SceneryError::io(path, e))?;
        let mut package = Self::parse(&content).map_err(|source| SceneryError::Xml { path: path.to_path_buf(), source })?;
        package.base_directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(package)
    }

    pub fn parse(content: &str) -> Result<Self, quick_xml::Error> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        let mut package = Self::default();
        let mut component: Option<AddOnComponent> = None;
        let mut cur_tag = String::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                    if tag == "AddOn.Component" {
                        component = Some(AddOnComponent::default());
                    }
                    cur_tag = tag;
                }
                Event::Text(e) => {
                    let text = e.unescape()?.trim().to_string();
                    match (cur_tag.as_str(), component.as_mut()) {
                        ("AddOn.Name", None) => package.name = text,
                        ("AddOn.Description", None) => package.description = text,
                        ("Category", Some(c)) => c.category = text,
                        ("Name", Some(c)) => c.name = text,
                        ("Path", Some(c)) => c.path = text,
                        ("Layer", Some(c)) => c.layer = text.parse().ok(),
                        _ => {}
                    }
                }
                Event::End(e) => {
                    if e.local_name().as_ref() == b"AddOn.Component" {
                        package.components.extend(component.take());
                    }
                    cur_tag.clear();
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        Ok(package)
    }

    pub fn scenery_components(&self) -> impl Iterator<Item = &AddOnComponent> {
        self.components.iter().filter(|c| c.category.eq_ignore_ascii_case("scenery"))
    }

    /// Absolute component path with a trailing `scenery` directory removed.
    pub fn component_path(&self, component: &AddOnComponent) -> PathBuf {
        let path = native_path(&component.path);
        let mut path = if path.is_relative() { self.base_directory.join(path) } else { path };
        if path.file_name().is_some_and(|n| n.to_string_lossy().eq_ignore_ascii_case("scenery")) {
            path.pop();
        }
        path
    }
}

/// Default package directories below the user documents folder.
fn default_addon_directories(simulator: SimulatorType) -> Vec<PathBuf> {
    let version = if simulator == SimulatorType::P3dV3 { 3 } else { 4 };
    let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) else {
        return Vec::new();
    };
    let documents = PathBuf::from(home).join("Documents");
    vec![
        documents.join(format!("Prepar3D v{version} Add-ons")),
        documents.join(format!("Prepar3D v{version} Files")).join("add-ons"),
    ]
}

/// Appends the scenery components of all packages found in the add-on
/// directories. Components without layer go on top of everything else.
pub fn add_packages(cfg: &mut SceneryCfg, options: &NavDatabaseOptions) {
    let dirs = if options.addon_directories.is_empty() {
        default_addon_directories(options.simulator)
    } else {
        options.addon_directories.clone()
    };

    let mut area_number = cfg.max_area_number();
    let mut no_layer = Vec::new();

    for dir in dirs {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => {
                tracing::debug!("{} does not exist", dir.display());
                continue;
            }
        };
        let mut package_dirs: Vec<_> = entries.flatten().map(|e| e.path()).filter(|p| p.is_dir()).collect();
        package_dirs.sort();

        for package_dir in package_dirs {
            let file = package_dir.join("add-on.xml");
            if !file.is_file() {
                tracing::warn!("{} does not exist", file.display());
                continue;
            }
            let package = match AddOnPackage::read(&file) {
                Ok(package) => package,
                Err(err) => {
                    tracing::warn!("{err}");
                    continue;
                }
            };
            tracing::info!("Found add-on package \"{}\" in {}", package.name, file.display());

            for component in package.scenery_components() {
                let path = package.component_path(component);
                if !path.exists() {
                    tracing::warn!("Add-on path {} does not exist", path.display());
                }
                area_number += 1;
                match component.layer {
                    Some(layer) => {
                        let mut area = SceneryArea::new(area_number, layer, &component.name, path.display().to_string());
                        area.addon = true;
                        cfg.append_area(area);
                    }
                    None => no_layer.push((component.name.clone(), path)),
                }
            }
        }
    }

    cfg.sort_areas();

    let mut area_number = cfg.max_area_number();
    let mut layer = cfg.max_layer();
    for (name, path) in no_layer {
        area_number += 1;
        layer += 1;
        let mut area = SceneryArea::new(area_number, layer, name, path.display().to_string());
        area.addon = true;
        cfg.append_area(area);
    }
}
