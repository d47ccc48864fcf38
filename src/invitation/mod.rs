//! Invitation-based onboarding
//!
//! Invitations bind an email address to a role and a space and are
//! redeemed once through a magic link.

mod model;
mod role;
pub mod service;
pub mod token;

pub use model::{
    Invitation, InvitationLinks, InvitationPreview, InvitationStatus, InvitationView,
    RedeemRejection,
};
pub use role::{Role, Space};
