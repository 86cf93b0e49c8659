pub mod book_availability_store;
pub mod loan_repository;
pub mod member_lookup;
pub mod notification_inbox;
pub mod notification_sink;

pub use book_availability_store::{Adjustment, BookAvailabilityStore};
pub use loan_repository::{LoanFilter, LoanRepository};
pub use member_lookup::MemberLookup;
pub use notification_inbox::NotificationInbox;
pub use notification_sink::{NotificationOutcome, NotificationSink};
