pub mod book_store;
pub mod loan_repository;
pub mod member_lookup;
pub mod notification_sink;

// パブリックに型を再エクスポート
pub use book_store::BookStore as PostgresBookStore;
pub use loan_repository::LoanRepository as PostgresLoanRepository;
pub use member_lookup::MemberLookup as PostgresMemberLookup;
pub use notification_sink::NotificationSink as PostgresNotificationSink;
