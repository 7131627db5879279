#[cfg(target_os = "android")]
mod lib {
    use android_activity::{AndroidApp, MainEvent, PollEvent};
    use anyhow::Context;
    use log::{error, info, warn};

    use life_launch::{DEFAULT_CONFIG_PATH, LaunchConfig, Launcher, initialize_engine};

    fn launch_config(app: &AndroidApp) -> anyhow::Result<LaunchConfig> {
        match app.internal_data_path() {
            Some(data_path) => LaunchConfig::load_or_default(data_path.join(DEFAULT_CONFIG_PATH))
                .context("Failed to load the launch config"),
            None => Ok(LaunchConfig::default()),
        }
    }

    fn load_engine(app: &AndroidApp) -> anyhow::Result<&'static Launcher> {
        let config = launch_config(app)?;
        initialize_engine(&config).context("Failed to initialize the engine")
    }

    #[unsafe(no_mangle)]
    fn android_main(app: AndroidApp) {
        android_logger::init_once(
            android_logger::Config::default()
                .with_tag("lifeEngine")
                .with_max_level(log::LevelFilter::Info),
        );
        info!("Android main called");

        // Nothing can run without the engine library.
        let launcher = match load_engine(&app) {
            Ok(launcher) => launcher,
            Err(e) => {
                error!("{:#}", e);
                std::process::abort();
            }
        };

        let mut quit = false;
        while !quit {
            app.poll_events(None, |event| {
                if let PollEvent::Main(main_event) = event {
                    match main_event {
                        MainEvent::Start => {
                            if let Err(e) = launcher.on_start() {
                                warn!("Start ignored: {}", e);
                            }
                        }
                        MainEvent::Destroy => quit = true,
                        _ => {}
                    }
                }
            });
        }
        info!("Activity destroyed after {} starts", launcher.starts());
        // Not joined, an engine that owns its loop never returns.
        if launcher.is_running() {
            warn!("Engine thread is still running and outlives the activity");
        }
    }
}
