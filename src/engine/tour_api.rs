use super::Engine;

use async_trait::async_trait;

use crate::{api::TourAPI, entities::Tour, error::Error};

#[async_trait]
impl TourAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn tours(&self) -> Result<Vec<Tour>, Error> {
        self.call("all_tours", self.store.all_tours()).await
    }

    #[tracing::instrument(skip(self))]
    async fn find_tour(&self, id: &str) -> Result<Tour, Error> {
        self.call("find_tour", self.store.find_tour(id)).await
    }
}
