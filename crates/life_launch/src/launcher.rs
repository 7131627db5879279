use log::{debug, error, info};
use once_cell::sync::OnceCell;
use std::{
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
};

use crate::{
    config::{EntryMode, LaunchConfig},
    entry::{EntryPoint, NativeEntryPoint},
    error::{LaunchError, Result},
    library,
};

static ENGINE: OnceCell<Launcher> = OnceCell::new();

/// Load the engine library once per process.
///
/// The first successful call loads the library and binds the entry point; every later call hands
/// back the same launcher and ignores `config`. A failed call leaves nothing behind, so the host
/// can report the error and stop.
pub fn initialize_engine(config: &LaunchConfig) -> Result<&'static Launcher> {
    let mut loaded_now = false;
    let launcher = ENGINE.get_or_try_init(|| {
        loaded_now = true;
        Launcher::load(config)
    })?;
    if !loaded_now {
        debug!("Engine already initialized, nothing to load");
    }
    Ok(launcher)
}

/// The process-wide launcher, if [`initialize_engine`] has succeeded.
pub fn engine() -> Option<&'static Launcher> {
    ENGINE.get()
}

/// Bridges host start transitions to the engine entry point.
pub struct Launcher<E: EntryPoint + 'static = NativeEntryPoint> {
    entry: Arc<E>,
    mode: EntryMode,
    starts: AtomicU64,
    engine_thread: Mutex<Option<JoinHandle<()>>>,
}

impl Launcher<NativeEntryPoint> {
    pub fn load(config: &LaunchConfig) -> Result<Self> {
        let source = config.source();
        info!("Loading engine library {}", source);
        // SAFETY: the engine library is shipped with the application and its initialization
        // routines are trusted.
        let library = Arc::new(unsafe { library::resolve(&source, &config.search_paths)? });
        // SAFETY: the configured symbol is the engine's `extern "C" fn()` entry point.
        let entry = unsafe { NativeEntryPoint::bind(library, &config.entry_symbol)? };
        Ok(Launcher::new(entry, config.entry_mode))
    }
}

impl<E: EntryPoint + 'static> Launcher<E> {
    pub fn new(entry: E, mode: EntryMode) -> Self {
        Self {
            entry: Arc::new(entry),
            mode,
            starts: AtomicU64::new(0),
            engine_thread: Mutex::new(None),
        }
    }

    /// Host start transition. Calls the entry point exactly once.
    ///
    /// In [`EntryMode::DedicatedThread`] a start that arrives while the previous run is still alive
    /// is refused with [`LaunchError::EngineRunning`], makes no call and is not counted.
    pub fn on_start(&self) -> Result<()> {
        match self.mode {
            EntryMode::Inline => {
                let start = self.starts.fetch_add(1, Ordering::SeqCst) + 1;
                info!("Start #{}: calling {}", start, self.entry.name());
                self.entry.invoke();
                info!("{} returned", self.entry.name());
                Ok(())
            }
            EntryMode::DedicatedThread => {
                let mut engine_thread = self
                    .engine_thread
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                if engine_thread
                    .as_ref()
                    .is_some_and(|handle| !handle.is_finished())
                {
                    return Err(LaunchError::EngineRunning(self.entry.name().to_string()));
                }
                if let Some(finished) = engine_thread.take() {
                    reap(finished);
                }

                let start = self.starts.fetch_add(1, Ordering::SeqCst) + 1;
                info!(
                    "Start #{}: calling {} on the engine thread",
                    start,
                    self.entry.name()
                );
                let entry = self.entry.clone();
                let handle = thread::Builder::new()
                    .name("engine-main".into())
                    .spawn(move || {
                        entry.invoke();
                        info!("{} returned", entry.name());
                    })?;
                *engine_thread = Some(handle);
                Ok(())
            }
        }
    }

    /// Wait for the engine thread, if one is running.
    pub fn join(&self) {
        let handle = self
            .engine_thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            reap(handle);
        }
    }

    /// Whether an engine thread started by [`Launcher::on_start`] has not returned yet.
    pub fn is_running(&self) -> bool {
        self.engine_thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn starts(&self) -> u64 {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn mode(&self) -> EntryMode {
        self.mode
    }

    pub fn entry(&self) -> &E {
        &self.entry
    }
}

fn reap(handle: JoinHandle<()>) {
    if handle.join().is_err() {
        error!("Engine thread panicked");
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::{Condvar, atomic::AtomicUsize};

    #[derive(Default)]
    struct CountingEntry {
        calls: AtomicUsize,
    }

    impl EntryPoint for CountingEntry {
        fn invoke(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &str {
            "CountingEntry"
        }
    }

    #[derive(Default)]
    struct GatedEntry {
        calls: AtomicUsize,
        gate: Mutex<bool>,
        opened: Condvar,
    }

    impl GatedEntry {
        fn open(&self) {
            *self.gate.lock().unwrap() = true;
            self.opened.notify_all();
        }
    }

    impl EntryPoint for GatedEntry {
        fn invoke(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut open = self.gate.lock().unwrap();
            while !*open {
                open = self.opened.wait(open).unwrap();
            }
        }

        fn name(&self) -> &str {
            "GatedEntry"
        }
    }

    #[test]
    fn one_start_one_call() {
        let launcher = Launcher::new(CountingEntry::default(), EntryMode::Inline);
        launcher.on_start().unwrap();
        assert!(!launcher.is_running());
        assert_eq!(launcher.entry().calls.load(Ordering::SeqCst), 1);
        assert_eq!(launcher.starts(), 1);
    }

    #[test]
    fn every_start_calls_again() {
        let launcher = Launcher::new(CountingEntry::default(), EntryMode::Inline);
        launcher.on_start().unwrap();
        launcher.on_start().unwrap();
        assert_eq!(launcher.entry().calls.load(Ordering::SeqCst), 2);
        assert_eq!(launcher.starts(), 2);
    }

    #[test]
    fn no_start_no_call() {
        let launcher = Launcher::new(CountingEntry::default(), EntryMode::Inline);
        assert_eq!(launcher.entry().calls.load(Ordering::SeqCst), 0);
        assert_eq!(launcher.starts(), 0);
    }

    #[test]
    fn dedicated_thread_runs_entry() {
        let launcher = Launcher::new(CountingEntry::default(), EntryMode::DedicatedThread);
        launcher.on_start().unwrap();
        launcher.join();
        launcher.on_start().unwrap();
        launcher.join();
        assert_eq!(launcher.entry().calls.load(Ordering::SeqCst), 2);
        assert_eq!(launcher.starts(), 2);
    }

    #[test]
    fn dedicated_thread_refuses_overlapping_start() {
        let launcher = Launcher::new(GatedEntry::default(), EntryMode::DedicatedThread);
        launcher.on_start().unwrap();
        assert!(launcher.is_running());
        assert!(matches!(
            launcher.on_start(),
            Err(LaunchError::EngineRunning(name)) if name == "GatedEntry"
        ));
        assert_eq!(launcher.starts(), 1);

        launcher.entry().open();
        launcher.join();
        assert!(!launcher.is_running());
        launcher.on_start().unwrap();
        launcher.join();
        assert_eq!(launcher.entry().calls.load(Ordering::SeqCst), 2);
        assert_eq!(launcher.starts(), 2);
    }
}
