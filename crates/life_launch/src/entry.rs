use log::debug;
use std::sync::Arc;

use crate::{error::Result, library::LoadedLibrary};

/// Library identifier of the engine, as passed to `loadLibrary`.
pub const ENGINE_LIBRARY: &str = "LifeEngine";

/// Symbol exported by the engine library for the launcher to call.
pub const ENTRY_SYMBOL: &str = "AndroidMain";

/// Engine entry point: C calling convention, no parameters, nothing returned.
///
/// The callee either returns control to the caller once the engine is up, or keeps it for as long
/// as it owns the main loop. See [`crate::EntryMode`] for how the launcher deals with both.
pub type EngineMainFn = unsafe extern "C" fn();

/// Something the launcher can call on a start transition.
pub trait EntryPoint: Send + Sync {
    fn invoke(&self);

    fn name(&self) -> &str;
}

/// The engine's exported entry point, bound to the library it lives in.
pub struct NativeEntryPoint {
    symbol: String,
    main_fn: EngineMainFn,
    // Keeps `main_fn` mapped.
    _library: Arc<LoadedLibrary>,
}

impl NativeEntryPoint {
    /// Resolve `symbol` in `library`.
    ///
    /// # Safety
    ///
    /// The symbol must be a function with the [`EngineMainFn`] signature.
    pub unsafe fn bind(library: Arc<LoadedLibrary>, symbol: &str) -> Result<Self> {
        let address = library.find_symbol(symbol)?;
        // SAFETY: `address` is a non-null function exported by the loaded library and the caller
        // guarantees it has the `EngineMainFn` signature.
        let main_fn: EngineMainFn = unsafe { std::mem::transmute(address.as_ptr()) };
        debug!(
            "Bound {} at {:p} in {}",
            symbol,
            address,
            library.path().display()
        );
        Ok(Self {
            symbol: symbol.to_string(),
            main_fn,
            _library: library,
        })
    }
}

impl EntryPoint for NativeEntryPoint {
    fn invoke(&self) {
        // SAFETY: `bind` checked the signature contract and `_library` keeps the code mapped.
        unsafe { (self.main_fn)() }
    }

    fn name(&self) -> &str {
        &self.symbol
    }
}
