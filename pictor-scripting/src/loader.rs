//! Unit loading - the boundary that turns a script file into factories

use libloading::{Library, Symbol};
use std::ffi::c_void;
use std::path::Path;
use std::sync::Arc;

use pictor_script_api::{API_VERSION, Script};

use crate::error::LoadError;
use crate::registry::ScriptFactory;

/// Turns one script unit (a file's bytes plus its path) into script
/// factories.
///
/// Discovery reads each candidate file and hands it here; a returned
/// error (or a panic) makes that file contribute nothing without
/// stopping the scan. Implementations decide what the bytes mean - the
/// built-in [`DylibLoader`] loads the origin path as a dynamic library,
/// test loaders may parse the bytes directly.
pub trait UnitLoader {
    /// Load one unit, producing a factory per script it exports.
    fn load_unit(
        &self,
        source: &[u8],
        origin: &Path,
    ) -> Result<Vec<Box<dyn ScriptFactory>>, LoadError>;
}

type CreateFn = extern "C" fn(usize) -> *mut c_void;

/// Loads script units as native dynamic libraries.
///
/// Units are built against `pictor-script-api` and use its
/// `export_scripts!` macro to generate the entry points this loader
/// resolves: an API-version handshake, a script count, and an indexed
/// create function.
pub struct DylibLoader;

impl UnitLoader for DylibLoader {
    fn load_unit(
        &self,
        _source: &[u8],
        origin: &Path,
    ) -> Result<Vec<Box<dyn ScriptFactory>>, LoadError> {
        // SAFETY: We're loading a unit from the host's script directory.
        // The unit is expected to follow the export_scripts! contract.
        let library = unsafe { Library::new(origin)? };

        // SAFETY: Calling C functions exported by the unit.
        let found = {
            let api_version: Symbol<extern "C" fn() -> u32> =
                unsafe { library.get(b"_pictor_script_api_version")? };
            api_version()
        };
        if found != API_VERSION {
            return Err(LoadError::ApiVersionMismatch {
                expected: API_VERSION,
                found,
            });
        }

        let count = {
            let count: Symbol<extern "C" fn() -> usize> =
                unsafe { library.get(b"_pictor_script_count")? };
            count()
        };

        // The raw create pointer stays valid as long as the library is
        // alive; each factory holds the library through an Arc.
        let create = {
            let create: Symbol<CreateFn> = unsafe { library.get(b"_pictor_script_create")? };
            *create
        };

        let library = Arc::new(library);
        Ok((0..count)
            .map(|index| {
                Box::new(DylibScriptFactory {
                    _library: library.clone(),
                    create,
                    index,
                }) as Box<dyn ScriptFactory>
            })
            .collect())
    }
}

/// Factory for one script type exported by a loaded library.
struct DylibScriptFactory {
    /// Keep the library loaded for as long as instances can be created.
    _library: Arc<Library>,
    create: CreateFn,
    index: usize,
}

impl ScriptFactory for DylibScriptFactory {
    fn instantiate(&self) -> Box<dyn Script> {
        let ptr = (self.create)(self.index);
        // export_scripts! only returns null for an out-of-range index,
        // and `index` was bounded by the unit's own count at load time.
        assert!(
            !ptr.is_null(),
            "script unit returned null for exported script {}",
            self.index
        );
        // SAFETY: export_scripts! produced this pointer via
        // Box::into_raw on a Box<Box<dyn Script>>.
        unsafe { *Box::from_raw(ptr as *mut Box<dyn Script>) }
    }
}
