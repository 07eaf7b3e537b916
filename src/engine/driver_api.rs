use super::Engine;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{api::DriverAPI, entities::Driver, error::Error};

#[async_trait]
impl DriverAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn find_driver(&self, id: Uuid) -> Result<Driver, Error> {
        self.call("find_driver", self.store.find_driver(id)).await
    }

    #[tracing::instrument(skip(self))]
    async fn toggle_blocked_date(&self, id: Uuid, date: String) -> Result<Driver, Error> {
        let mut driver = self.call("find_driver", self.store.find_driver(id)).await?;

        let blocked = driver.toggle_blocked_date(&date)?;
        tracing::info!(blocked, "toggled {:?}", date);

        self.call("update_driver", self.store.update_driver(&driver))
            .await?;
        self.signal.emit();

        Ok(driver)
    }

    #[tracing::instrument(skip(self))]
    async fn update_driver_rate(
        &self,
        id: Uuid,
        price_per_km: f64,
        base_price: f64,
    ) -> Result<Driver, Error> {
        let mut driver = self.call("find_driver", self.store.find_driver(id)).await?;

        driver.update_rates(price_per_km, base_price)?;

        self.call("update_driver", self.store.update_driver(&driver))
            .await?;
        self.signal.emit();

        Ok(driver)
    }
}
