use super::Engine;

use crate::{
    api::LocationAPI,
    entities::Location,
    error::{not_found_error, Error},
};

impl LocationAPI for Engine {
    fn locations(&self) -> Vec<Location> {
        self.locations.all().cloned().collect()
    }

    #[tracing::instrument(skip(self))]
    fn resolve_location(&self, name: &str) -> Result<Location, Error> {
        self.locations
            .resolve(name)
            .cloned()
            .ok_or_else(|| not_found_error("location"))
    }
}
