//! Student domain entities: profile, academic record, finance ledger and
//! certificate metadata.

pub mod academic;
pub mod certificate;
pub mod finance;
pub mod model;

pub use academic::{AcademicPatch, AcademicRecord, Subject};
pub use certificate::Certificate;
pub use finance::{FinancePatch, FinanceRecord};
pub use model::{CreateStudentProfile, ParentContacts, ProfilePatch, StudentProfile};
