pub mod booking;
pub mod conflict;
pub mod lifecycle;
pub mod pricing;

pub use booking::ConsultationBookingService;
pub use conflict::ConflictDetectionService;
pub use lifecycle::ConsultationLifecycleService;
pub use pricing::{resolve_price, PricingService};
