pub mod office;
pub mod profile;

pub use office::{Office, OfficeId};
pub use profile::{AccessLevel, AccessProfile, ProfileTemplate};
