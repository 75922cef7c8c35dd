//! Project-level context: the target UI framework and discovery of the
//! project's string resource file

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use walkdir::{DirEntry, WalkDir};

/// The UI framework the analyzed project targets. Several rules only apply
/// to one framework, and hard-coded string fixes differ per framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProjectFramework {
    /// Not determined; framework-specific rules stay silent
    #[default]
    Unknown,
    Uwp,
    Wpf,
    XamarinForms,
}

impl FromStr for ProjectFramework {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uwp" => Ok(ProjectFramework::Uwp),
            "wpf" => Ok(ProjectFramework::Wpf),
            "xamarin" | "xamarin-forms" | "xamarinforms" => Ok(ProjectFramework::XamarinForms),
            "unknown" | "auto" => Ok(ProjectFramework::Unknown),
            other => Err(format!(
                "unknown framework '{}' (expected uwp, wpf, xamarin-forms, or unknown)",
                other
            )),
        }
    }
}

impl fmt::Display for ProjectFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProjectFramework::Unknown => "unknown",
            ProjectFramework::Uwp => "uwp",
            ProjectFramework::Wpf => "wpf",
            ProjectFramework::XamarinForms => "xamarin-forms",
        };
        write!(f, "{}", name)
    }
}

impl ProjectFramework {
    /// The resource file extension the framework uses, if any
    pub fn resource_extension(&self) -> Option<&'static str> {
        match self {
            ProjectFramework::Uwp => Some("resw"),
            ProjectFramework::Wpf | ProjectFramework::XamarinForms => Some("resx"),
            ProjectFramework::Unknown => None,
        }
    }
}

/// Locates project resources for rules that need them. Implementations are
/// free to answer from the filesystem, a project model, or nothing at all.
pub trait ProjectResolver: Send + Sync {
    /// The project's default string resource file, if one exists
    fn find_resource_file(&self, framework: ProjectFramework) -> Option<PathBuf>;

    /// Culture code of the document's language variant, when the project
    /// keeps per-culture copies such as `MainPage.es-ES.xaml`
    fn find_language_variant(&self, _document: &Path) -> Option<String> {
        None
    }

    /// Project-wide xmlns aliases known outside the document itself, alias
    /// to declared namespace
    fn xmlns_aliases(&self, _document: &Path) -> HashMap<String, String> {
        HashMap::new()
    }
}

/// A resolver that never finds anything. Appropriate when analyzing a bare
/// file with no project around it.
#[derive(Debug, Default)]
pub struct NullResolver;

impl ProjectResolver for NullResolver {
    fn find_resource_file(&self, _framework: ProjectFramework) -> Option<PathBuf> {
        None
    }
}

/// Resolver that walks the project directory looking for resource files.
#[derive(Debug)]
pub struct FileSystemResolver {
    root: PathBuf,
}

impl FileSystemResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

fn is_search_candidate(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    if entry.file_type().is_dir() {
        return !name.starts_with('.') && name != "bin" && name != "obj" && name != "target";
    }
    true
}

impl ProjectResolver for FileSystemResolver {
    fn find_resource_file(&self, framework: ProjectFramework) -> Option<PathBuf> {
        let wanted = framework.resource_extension()?;

        let mut candidates: Vec<PathBuf> = WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(is_search_candidate)
            .filter_map(Result::ok)
            .filter(|e| {
                e.file_type().is_file()
                    && e.path()
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
            })
            .map(|e| e.into_path())
            .collect();

        candidates.sort();

        // Prefer the conventional default over localized or secondary files
        candidates
            .iter()
            .find(|p| {
                p.file_stem()
                    .is_some_and(|s| s.eq_ignore_ascii_case("Resources"))
            })
            .cloned()
            .or_else(|| candidates.into_iter().next())
    }

    fn find_language_variant(&self, document: &Path) -> Option<String> {
        let stem = document.file_stem()?.to_string_lossy();
        let (_, candidate) = stem.rsplit_once('.')?;
        if is_culture_code(candidate) {
            Some(candidate.to_string())
        } else {
            None
        }
    }
}

/// `es`, `es-ES`, `sr-Latn` and the like
fn is_culture_code(segment: &str) -> bool {
    let (lang, region) = match segment.split_once('-') {
        Some((l, r)) => (l, Some(r)),
        None => (segment, None),
    };
    lang.len() == 2
        && lang.chars().all(|c| c.is_ascii_lowercase())
        && region.is_none_or(|r| {
            (2..=4).contains(&r.len()) && r.chars().all(|c| c.is_ascii_alphanumeric())
        })
}

/// Derive the resource class accessor for a WPF or Xamarin.Forms resx file:
/// the file stem, e.g. `Resources` for `Properties/Resources.resx`.
pub fn resource_class_name(resource_file: &Path) -> String {
    resource_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Resources".to_string())
}

/// Derive the xmlns alias for referencing the resource class, from the
/// resx file's parent directory, e.g. `properties` for `Properties/`.
pub fn resource_namespace_alias(resource_file: &Path) -> String {
    resource_file
        .parent()
        .and_then(|p| p.file_name())
        .map(|s| s.to_string_lossy().to_lowercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "properties".to_string())
}

/// The clr-namespace declaration value for referencing the resource class.
/// Without a project model the containing directory stands in for the
/// code namespace, which matches the usual `Properties/Resources.resx`
/// layout.
pub fn resource_clr_namespace(resource_file: &Path) -> String {
    let dir = resource_file
        .parent()
        .and_then(|p| p.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Properties".to_string());
    format!("clr-namespace:{}", dir)
}
