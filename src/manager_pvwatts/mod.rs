pub mod errors;
pub mod models;

use std::time::Duration;
use log::{debug, warn};
use reqwest::Client;
use crate::initialization::PvWattsConfig;
use crate::manager_pvwatts::errors::PvWattsError;
use crate::manager_pvwatts::models::{message_text, ArraySetup, PvWattsResponse};
use crate::models::NormalizedInput;

/// NREL PVWatts manager
///
pub struct PvWatts {
    client: Client,
    api_url: String,
    api_key: String,
}

impl PvWatts {

    /// Returns a new instance of PvWatts
    ///
    /// # Arguments
    ///
    /// * 'config' - PVWatts configuration, holding endpoint, key and request timeout
    pub fn new(config: &PvWattsConfig) -> Result<Self, PvWattsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, api_url: config.api_url.to_string(), api_key: config.api_key.to_string() })
    }

    /// Requests an annual production estimate for the given location and system capacity
    ///
    /// The HTTP status is only used for error reporting when the body can't be parsed, since
    /// the API reports invalid input as a json document with an errors field.
    ///
    /// See https://developer.nrel.gov/docs/solar/pvwatts/v8/
    ///
    /// # Arguments
    ///
    /// * 'input' - normalized location and capacity
    /// * 'array' - physical parameters of the panel array
    pub async fn get_production(&self, input: &NormalizedInput, array: &ArraySetup) -> Result<PvWattsResponse, PvWattsError> {
        debug!("requesting {} lat={} lon={} system_capacity={}", self.api_url, input.lat, input.lon, input.capacity_kw);

        let req = self.client.get(&self.api_url)
            .query(&[
                ("api_key", self.api_key.clone()),
                ("lat", input.lat.to_string()),
                ("lon", input.lon.to_string()),
                ("system_capacity", input.capacity_kw.to_string()),
                ("azimuth", array.azimuth.to_string()),
                ("tilt", array.tilt.to_string()),
                ("module_type", array.module_type.to_string()),
                ("losses", array.losses.to_string()),
                ("array_type", array.array_type.to_string()),
            ])
            .send().await?;

        let status = req.status();
        let json = req.text().await?;

        let pvwatts_res: PvWattsResponse = serde_json::from_str(&json)
            .map_err(|e| {
                if status.is_success() {
                    PvWattsError::from(e)
                } else {
                    PvWattsError::Document(format!("{:?}: {}", status, e))
                }
            })?;

        pvwatts_res.warnings.iter()
            .for_each(|w| warn!("PVWatts warning: {}", message_text(w)));

        Ok(pvwatts_res)
    }
}
