//! Business logic services.

pub mod dashboard;
pub mod labels;
pub mod qase_client;
pub mod scope;
pub mod selection;
pub mod session;
pub mod stats;
pub mod suite_tree;

pub use qase_client::QaseClient;
pub use session::{DashboardSession, SessionStore};
