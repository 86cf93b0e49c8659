pub mod book_store;
pub mod loan_repository;
pub mod member_lookup;
pub mod notification_sink;

pub use book_store::BookStore;
pub use loan_repository::LoanRepository;
pub use member_lookup::MemberLookup;
pub use notification_sink::NotificationSink;
