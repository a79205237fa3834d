pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod store;

pub use models::*;
pub use services::{
    ConflictDetectionService, ConsultationBookingService, ConsultationLifecycleService, PricingService,
};
pub use store::{ConsultationStore, MemoryConsultationStore, SupabaseConsultationStore};
