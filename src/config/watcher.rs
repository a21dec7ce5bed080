use anyhow::Result;
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::Duration;
use tracing::{error, info};

/// Watches the profile directory and invokes a reload callback on changes.
pub struct ProfileWatcher {
    _watcher: RecommendedWatcher,
}

impl ProfileWatcher {
    pub fn new<F>(dir: &Path, on_change: F) -> Result<Self>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let (tx, rx) = channel();

        // The notification back-end is selected based on the platform.
        let mut watcher = RecommendedWatcher::new(tx, Config::default())?;
        watcher.watch(dir, RecursiveMode::Recursive)?;
        info!("Watching profile directory: {}", dir.display());

        // Spawn a thread to handle events
        std::thread::spawn(move || {
            loop {
                match rx.recv() {
                    Ok(Ok(_event)) => {
                        // Editors fire several events per save; let them settle.
                        std::thread::sleep(Duration::from_millis(200));
                        while rx.try_recv().is_ok() {}
                        info!("Profile directory changed, reloading profiles...");
                        on_change();
                    }
                    Ok(Err(e)) => error!("Watch error: {:?}", e),
                    Err(e) => {
                        error!("Watch channel error: {:?}", e);
                        break;
                    }
                }
            }
        });

        Ok(Self { _watcher: watcher })
    }
}
