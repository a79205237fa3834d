use std::sync::Arc;

use tracing::debug;

use psychologist_cell::models::Psychologist;
use psychologist_cell::store::PsychologistDirectory;
use shared_models::error::ScheduleError;

use crate::models::ConsultationChannel;

/// The psychologist's price for the channel. An unset price stays `None`.
pub fn resolve_price(psychologist: &Psychologist, channel: ConsultationChannel) -> Option<f64> {
    match channel {
        ConsultationChannel::Chat => psychologist.price_chat,
        ConsultationChannel::Video => psychologist.price_video,
    }
}

pub struct PricingService {
    directory: Arc<dyn PsychologistDirectory>,
}

impl PricingService {
    pub fn new(directory: Arc<dyn PsychologistDirectory>) -> Self {
        Self { directory }
    }

    /// Looks up the psychologist, failing with `NotFound` when absent.
    pub async fn psychologist(&self, psychologist_id: &str) -> Result<Psychologist, ScheduleError> {
        self.directory
            .find_psychologist(psychologist_id)
            .await?
            .ok_or_else(|| ScheduleError::NotFound("Psychologist".to_string()))
    }

    pub async fn quote(
        &self,
        psychologist_id: &str,
        channel: ConsultationChannel,
    ) -> Result<Option<f64>, ScheduleError> {
        let psychologist = self.psychologist(psychologist_id).await?;
        let price = resolve_price(&psychologist, channel);
        debug!("Resolved {} price for psychologist {}: {:?}", channel, psychologist_id, price);
        Ok(price)
    }
}
