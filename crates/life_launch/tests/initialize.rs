// One test owns the process-wide launcher, so the steps run in order.
#[cfg(all(target_os = "linux", target_env = "gnu"))]
#[test]
fn initialize_once_then_start() {
    use life_launch::{LaunchConfig, LaunchError, engine, initialize_engine};

    let missing = LaunchConfig {
        library: "LifeEngineDoesNotExist".into(),
        ..LaunchConfig::default()
    };
    assert!(matches!(
        initialize_engine(&missing),
        Err(LaunchError::LibraryNotFound { .. })
    ));
    assert!(engine().is_none());

    // `sync` is a parameterless void function, a stand-in for the engine entry point.
    let libc = LaunchConfig {
        library_path: Some("libc.so.6".into()),
        entry_symbol: "sync".into(),
        ..LaunchConfig::default()
    };
    let first = initialize_engine(&libc).unwrap();
    let second = initialize_engine(&missing).unwrap();
    assert!(std::ptr::eq(first, second));
    assert!(std::ptr::eq(first, engine().unwrap()));

    first.on_start().unwrap();
    first.on_start().unwrap();
    assert_eq!(first.starts(), 2);
}
