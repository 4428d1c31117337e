//! Demo TUI for rat-router leave guards.
//!
//! Usage: `rat-router-demo [config.toml]`
//!
//! Without an argument, `rat-router.toml` is read from the working directory
//! or from the crate directory when present.

mod app;
mod pages;

use crate::app::{Root, Routes};
use rat_router::{Application, MemoryHistory, RouterConfig, init_logging};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "rat-router.toml";

fn default_config_path() -> Option<PathBuf> {
    [
        PathBuf::from(CONFIG_FILE),
        Path::new(env!("CARGO_MANIFEST_DIR")).join(CONFIG_FILE),
    ]
    .into_iter()
    .find(|path| path.is_file())
}

fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1).map(PathBuf::from).or_else(default_config_path) {
        Some(path) => RouterConfig::load(&path)?,
        None => RouterConfig::default(),
    };
    let _log_guard = init_logging(&config.logging)?;

    let routes = Routes::new();
    let history = MemoryHistory::new(routes.table(), &config.initial_path)?;
    tracing::info!(initial = %config.initial_path, "starting rat-router demo");

    let app = Application::new(history).with_config(config);
    app.run(move |cx| {
        cx.set_root(Root::new(routes))?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipped_config_is_found_and_valid() {
        let path = default_config_path().expect("rat-router.toml ships with the demo");
        let config = RouterConfig::load(&path).unwrap();
        assert_eq!(config.initial_path, "/");
        assert_eq!(config.logging.file_name, "rat-router-demo.log");
    }
}
