// web-server/src/static_files.rs
use actix_files::Files;
use actix_web::web;
use common::StaticFilesConfig;
use std::path::PathBuf;

/// Public assets (stylesheets, scripts, images) for the rendered pages
#[derive(Debug, Clone)]
pub struct StaticAssets {
    pub root_path: PathBuf,
}

impl StaticAssets {
    /// `None` when the configured directory does not exist
    pub fn from_config(config: &StaticFilesConfig) -> Option<Self> {
        let root_path = PathBuf::from(&config.path);
        if root_path.is_dir() {
            Some(Self { root_path })
        } else {
            tracing::warn!(
                "Static assets directory {} not found, not serving assets",
                root_path.display()
            );
            None
        }
    }
}

/// Mount assets at `/`. Must be registered after every route so it only
/// sees requests nothing else matched.
pub fn configure(cfg: &mut web::ServiceConfig, assets: &StaticAssets) {
    cfg.service(
        Files::new("/", &assets.root_path)
            .prefer_utf8(true)
            .use_etag(true)
            .use_last_modified(true),
    );
}
