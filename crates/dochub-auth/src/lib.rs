//! # dochub-auth
//!
//! Authorization for DocHub folders. Authentication happens upstream; every
//! call here receives an already-identified user.
//!
//! ## Modules
//!
//! - `acl` — effective access resolution from ownership and grants, and the
//!   read / write / owner guards services call before acting.

pub mod acl;

pub use acl::{AccessResolver, FolderAccess};
