//! Business services.

pub mod account;
pub mod address;
pub mod case;
pub mod cities;
pub mod directory;
pub mod session;
pub mod workflow;

pub use account::{
    AccountService, RegisterOrgInput, RegisterUserInput, UpdateOrgProfileInput,
    UpdateUserProfileInput,
};
pub use address::{Address, AddressService};
pub use case::{CaseService, SubmitReportInput, SubmitRescueInput};
pub use cities::CityCatalog;
pub use directory::DirectoryService;
pub use session::{Session, SessionService};
pub use workflow::WorkflowService;
