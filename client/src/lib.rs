//! Job board browsing client
//!
//! Debounced, address-synchronized filter state, infinite-scroll paging
//! over a job transport, the saved-jobs store and the application form.

pub mod address;
pub mod debounce;
pub mod detail;
pub mod error;
pub mod filters;
pub mod form;
pub mod http;
pub mod scroll;
pub mod session;
pub mod store;
pub mod transport;

pub use address::{AddressBar, MemoryAddress};
pub use debounce::Debouncer;
pub use detail::{DetailView, load_detail};
pub use error::{ClientError, Result};
pub use filters::{FilterConfig, FilterSnapshot, FilterSync};
pub use form::{ApplicationForm, ResumeFile};
pub use http::HttpTransport;
pub use scroll::{Completion, PageRequest, ScrollCoordinator, ScrollState};
pub use session::{BrowseSession, ListView, SessionEvent, VisibilitySensor};
pub use store::SavedJobsStore;
pub use transport::{JobTransport, SimulatedTransport, TransportDelays};
