pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod store;

pub use models::*;
pub use services::AvailabilityService;
pub use store::{
    AvailabilityStore, MemoryAvailabilityStore, MemoryPsychologistDirectory, PsychologistDirectory,
    SupabaseAvailabilityStore, SupabasePsychologistDirectory,
};
