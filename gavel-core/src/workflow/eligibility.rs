//! Eligibility gates for starting a new submission.
//!
//! Pure predicates over the registry; the engine consults them before
//! publishing anything and refuses silently when they fail.

use super::record::UserId;
use super::registry::RecordRegistry;

/// Any moderator-equivalent caller may issue a reprimand against any
/// subject at any time; concurrent pending reprimands are permitted.
pub fn can_start_reprimand(_user: &UserId) -> bool {
    true
}

/// A remediation may be started only while the user holds a grant from an
/// approved reprimand. Grants are never consumed, so this stays true
/// across repeated submissions (see DESIGN.md).
pub fn can_start_remediation(registry: &RecordRegistry, user: &UserId) -> bool {
    registry.grant_exists_for(user)
}

/// An appeal may be started only if the user has no appeal record at all,
/// pending or terminal. Stricter than the remediation gate, and permanent
/// once any appeal is filed (see DESIGN.md).
pub fn can_start_appeal(registry: &RecordRegistry, user: &UserId) -> bool {
    registry.find_appeals_by_user(user).is_empty()
}
