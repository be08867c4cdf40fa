//! Script registry and directory discovery

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};

use pictor_script_api::Script;

use crate::loader::UnitLoader;

/// Creates fresh script instances from a loaded unit.
///
/// Implemented by loaders; also implemented for any
/// `Fn() -> Box<dyn Script>` closure, which is how hosts register
/// built-in scripts without going through a loader.
pub trait ScriptFactory: Send + Sync {
    /// Create a new instance of the script.
    fn instantiate(&self) -> Box<dyn Script>;
}

impl<F> ScriptFactory for F
where
    F: Fn() -> Box<dyn Script> + Send + Sync,
{
    fn instantiate(&self) -> Box<dyn Script> {
        self()
    }
}

/// One loaded-but-uninstantiated script plus its origin path.
pub struct ScriptDescriptor {
    factory: Box<dyn ScriptFactory>,
    origin: PathBuf,
}

impl ScriptDescriptor {
    /// Pair a factory with the path of the unit that produced it.
    pub fn new(factory: Box<dyn ScriptFactory>, origin: PathBuf) -> Self {
        Self { factory, origin }
    }

    /// Create a fresh instance of the script.
    pub fn instantiate(&self) -> Box<dyn Script> {
        self.factory.instantiate()
    }

    /// Path of the unit this script came from.
    pub fn origin(&self) -> &Path {
        &self.origin
    }
}

/// Immutable list of discovered scripts, in discovery order.
///
/// Populated once by [`ScriptRegistry::discover`] (or assembled directly
/// from descriptors) and shared read-only by every session built from it.
#[derive(Default)]
pub struct ScriptRegistry {
    descriptors: Vec<ScriptDescriptor>,
}

impl ScriptRegistry {
    /// Scan a directory for script units.
    ///
    /// Every regular file directly inside `dir` is read and handed to
    /// the loader; no recursion, no extension filtering. Files are
    /// visited in name order so repeated scans of an unchanged
    /// directory produce the same registry. A missing directory yields
    /// an empty registry.
    ///
    /// A file that cannot be read or loaded contributes zero
    /// descriptors: the failure is logged and the scan continues. One
    /// broken unit never aborts discovery of the rest.
    pub fn discover(dir: &Path, loader: &dyn UnitLoader) -> Self {
        let mut registry = Self::default();

        if !dir.exists() {
            return registry;
        }

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Cannot read script directory");
                return registry;
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| entry.path())
            .collect();
        paths.sort();

        for path in paths {
            registry.load_file(&path, loader);
        }

        registry
    }

    /// Assemble a registry directly from descriptors, bypassing the
    /// file-system scan.
    pub fn from_descriptors(descriptors: Vec<ScriptDescriptor>) -> Self {
        Self { descriptors }
    }

    /// Load one unit file, appending a descriptor per exported script.
    fn load_file(&mut self, path: &Path, loader: &dyn UnitLoader) {
        let source = match std::fs::read(path) {
            Ok(source) => source,
            Err(e) => {
                tracing::error!(unit = %path.display(), error = %e, "Cannot read script unit");
                return;
            }
        };

        // Unit top-level code runs inside the loader; isolate its panics too.
        let loaded = catch_unwind(AssertUnwindSafe(|| loader.load_unit(&source, path)));

        match loaded {
            Ok(Ok(factories)) => {
                for factory in factories {
                    self.descriptors
                        .push(ScriptDescriptor::new(factory, path.to_path_buf()));
                }
            }
            Ok(Err(e)) => {
                tracing::error!(unit = %path.display(), error = %e, "Error loading script unit");
            }
            Err(_) => {
                tracing::error!(unit = %path.display(), "Script unit panicked during load");
            }
        }
    }

    /// Descriptors in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &ScriptDescriptor> {
        self.descriptors.iter()
    }

    /// Number of discovered scripts.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether discovery found nothing.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use pictor_script_api::{Processed, ScriptContext, ScriptError};
    use serde_json::Value;
    use tempfile::TempDir;

    struct StubScript {
        title: String,
    }

    impl Script for StubScript {
        fn title(&self) -> String {
            self.title.clone()
        }

        fn run(
            &mut self,
            _ctx: &mut ScriptContext,
            _args: &[Value],
        ) -> Result<Option<Processed>, ScriptError> {
            Ok(None)
        }
    }

    /// Parses units of the form `script <Title>` per line. A line
    /// reading `broken` fails the unit; `panic` panics it.
    struct TextLoader;

    impl UnitLoader for TextLoader {
        fn load_unit(
            &self,
            source: &[u8],
            _origin: &Path,
        ) -> Result<Vec<Box<dyn ScriptFactory>>, LoadError> {
            let text = std::str::from_utf8(source)
                .map_err(|e| LoadError::Malformed(e.to_string()))?;

            let mut factories: Vec<Box<dyn ScriptFactory>> = Vec::new();
            for line in text.lines() {
                if line == "broken" {
                    return Err(LoadError::Malformed("broken unit".to_string()));
                }
                if line == "panic" {
                    panic!("unit top-level code panicked");
                }
                if let Some(title) = line.strip_prefix("script ") {
                    let title = title.to_string();
                    factories.push(Box::new(move || {
                        Box::new(StubScript {
                            title: title.clone(),
                        }) as Box<dyn Script>
                    }));
                }
            }
            Ok(factories)
        }
    }

    #[test]
    fn test_discover_missing_directory_is_empty() {
        let registry =
            ScriptRegistry::discover(Path::new("/nonexistent/scripts"), &TextLoader);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_discover_skips_broken_units() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a_bad.txt"), "broken").unwrap();
        std::fs::write(dir.path().join("b_good.txt"), "script Upscale").unwrap();

        let registry = ScriptRegistry::discover(dir.path(), &TextLoader);

        assert_eq!(registry.len(), 1);
        let descriptor = registry.iter().next().unwrap();
        assert!(descriptor.origin().ends_with("b_good.txt"));
        assert_eq!(descriptor.instantiate().title(), "Upscale");
    }

    #[test]
    fn test_discover_isolates_unit_panics() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a_panics.txt"), "panic").unwrap();
        std::fs::write(dir.path().join("b_good.txt"), "script Outpaint").unwrap();

        let registry = ScriptRegistry::discover(dir.path(), &TextLoader);

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_discover_multiple_scripts_share_origin() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("pair.txt"), "script One\nscript Two").unwrap();

        let registry = ScriptRegistry::discover(dir.path(), &TextLoader);

        assert_eq!(registry.len(), 2);
        let origins: Vec<_> = registry.iter().map(|d| d.origin().to_path_buf()).collect();
        assert_eq!(origins[0], origins[1]);
    }

    #[test]
    fn test_discover_is_not_recursive() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("inner.txt"), "script Hidden").unwrap();
        std::fs::write(dir.path().join("top.txt"), "script Top").unwrap();

        let registry = ScriptRegistry::discover(dir.path(), &TextLoader);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.iter().next().unwrap().instantiate().title(), "Top");
    }

    #[test]
    fn test_discover_order_is_stable() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.txt"), "script B").unwrap();
        std::fs::write(dir.path().join("a.txt"), "script A").unwrap();
        std::fs::write(dir.path().join("c.txt"), "script C").unwrap();

        let titles = |registry: &ScriptRegistry| -> Vec<String> {
            registry.iter().map(|d| d.instantiate().title()).collect()
        };

        let first = ScriptRegistry::discover(dir.path(), &TextLoader);
        let second = ScriptRegistry::discover(dir.path(), &TextLoader);

        assert_eq!(titles(&first), vec!["A", "B", "C"]);
        assert_eq!(titles(&first), titles(&second));
    }

    #[test]
    fn test_from_descriptors() {
        let factory: Box<dyn ScriptFactory> = Box::new(|| {
            Box::new(StubScript {
                title: "Builtin".to_string(),
            }) as Box<dyn Script>
        });
        let registry = ScriptRegistry::from_descriptors(vec![ScriptDescriptor::new(
            factory,
            PathBuf::from("<builtin>"),
        )]);

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.iter().next().unwrap().instantiate().title(),
            "Builtin"
        );
    }
}
