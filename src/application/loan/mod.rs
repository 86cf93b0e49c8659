pub mod availability_ledger;
mod errors;
mod loan_service;
mod member_notifications;
mod overdue_detection;

pub use errors::{ErrorKind, LoanApplicationError, Result};
pub use loan_service::{
    LoanReport, LoanStats, ServiceDependencies, create_loan, get_loan, list_loans, loan_report,
    loan_stats, return_loan,
};
pub use member_notifications::{
    DEFAULT_NOTIFICATION_LIMIT, MemberNotifications, delete_notification,
    list_member_notifications, mark_all_notifications_read, mark_notification_read,
};
pub use overdue_detection::{check_and_notify_overdue, run_overdue_sweeper};
