//! Role and ownership predicates shared by every scheduling operation.

use shared_models::auth::{Actor, Role};

/// Anything that names a patient and a psychologist.
pub trait ConsultationParties {
    fn patient_id(&self) -> &str;
    fn psychologist_id(&self) -> &str;
}

/// Admins, or the psychologist who owns the resource.
pub fn is_admin_or_owner(actor: &Actor, owner_psychologist_id: &str) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Psychologist => actor.id == owner_psychologist_id,
        Role::Patient => false,
    }
}

/// Admins, or any actor whose id is the booked patient or psychologist.
/// The id match does not depend on the actor's role.
pub fn can_see_consultation<C: ConsultationParties + ?Sized>(actor: &Actor, consultation: &C) -> bool {
    actor.is_admin() || actor.id == consultation.patient_id() || actor.id == consultation.psychologist_id()
}

/// Admins, or the booked patient. The owning psychologist cannot cancel.
pub fn can_cancel_consultation<C: ConsultationParties + ?Sized>(actor: &Actor, consultation: &C) -> bool {
    actor.is_admin() || actor.id == consultation.patient_id()
}

pub fn can_book(actor: &Actor) -> bool {
    matches!(actor.role, Role::Patient | Role::Admin)
}
