//! unitrack-core: domain model for university-application tracking
//!
//! Profiles hold exactly one role; students and teachers carry optional
//! specialization rows; parents and teachers are paired with students through
//! link tables. Storage lives in `unitrack-db`.

pub mod config;
pub mod error;
pub mod hipo;
pub mod link;
pub mod pagination;
pub mod profile;
pub mod role;
pub mod student;
pub mod teacher;
pub mod university;
pub mod validation;

pub use config::{DatabaseConfig, LoggingConfig, UnitrackConfig};
pub use error::{CoreError, Result};
pub use hipo::HipoRecord;
pub use link::{LinkKind, ParentLink, TeacherStudentLink};
pub use pagination::{Paginated, Pagination};
pub use profile::{NewProfile, Profile, ProfileUpdate, RoleProfile};
pub use role::Role;
pub use student::{StudentProfile, StudentProfileUpdate};
pub use teacher::{NewTeacherProfile, TeacherProfile, TeacherProfileUpdate};
pub use university::{
    CountryCode, CountryCount, NewUniversity, SortOrder, University, UniversityFilter,
    UniversitySort, UniversitySummary, UniversityUpdate,
};
pub use validation::ValidationError;
