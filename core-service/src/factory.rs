//! Platform factory
//!
//! Maps a [`PlatformKind`] to a ready controller wired with its connector
//! and image profile.

use core_sync::{
    ControllerDeps, ControllerSettings, PlatformController, PlatformKind, PlatformRun,
};
use provider_flickr::{FlickrConnector, FlickrProfile};
use provider_pixelfed::{PixelfedConnector, PixelfedProfile};
use std::sync::Arc;

use crate::error::Result;
use crate::CoreDependencies;

pub struct PlatformFactory {
    deps: CoreDependencies,
    controller_deps: ControllerDeps,
    settings: ControllerSettings,
}

impl PlatformFactory {
    pub fn new(
        deps: CoreDependencies,
        controller_deps: ControllerDeps,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            deps,
            controller_deps,
            settings,
        }
    }

    /// Build the controller for one platform.
    pub fn build(&self, kind: PlatformKind) -> Result<Box<dyn PlatformRun>> {
        let http = Arc::clone(&self.deps.http_client);
        let fs = Arc::clone(&self.deps.filesystem);
        let catalog = Arc::clone(&self.controller_deps.catalog);

        let controller: Box<dyn PlatformRun> = match kind {
            PlatformKind::Flickr => Box::new(PlatformController::new(
                FlickrConnector::new(http, catalog, fs),
                Arc::new(FlickrProfile),
                self.controller_deps.clone(),
                self.settings.clone(),
            )?),
            PlatformKind::Pixelfed => Box::new(PlatformController::new(
                PixelfedConnector::new(http, catalog, fs),
                Arc::new(PixelfedProfile),
                self.controller_deps.clone(),
                self.settings.clone(),
            )?),
        };

        Ok(controller)
    }
}
