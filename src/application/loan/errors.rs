use thiserror::Error;

/// エラーの分類
///
/// 呼び出し側（API層）はこの分類でレスポンスを決める。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 書籍・会員・貸出が存在しない
    NotFound,
    /// 現在の状態と矛盾する操作（貸出不可、無効会員、返却済み）
    Conflict,
    /// 入力が不正
    Validation,
    /// ストレージなどの障害
    Internal,
}

/// 貸出管理アプリケーション層のエラー
///
/// メッセージは呼び出し側にそのまま表示されるため、変更しないこと。
#[derive(Debug, Error)]
pub enum LoanApplicationError {
    /// 書籍が存在しない
    #[error("Book not found")]
    BookNotFound,

    /// 書籍が貸出不可（貸出可能数が0）
    #[error("Book is not available for loan")]
    BookUnavailable,

    /// 会員が存在しない
    #[error("Member not found")]
    MemberNotFound,

    /// 会員が無効
    #[error("Member is not active")]
    MemberInactive,

    /// 貸出が見つからない
    #[error("Loan not found")]
    LoanNotFound,

    /// 通知が見つからない（存在しないか、他の会員のもの）
    #[error("Notification not found")]
    NotificationNotFound,

    /// 既に返却済み
    #[error("Loan has already been returned")]
    AlreadyReturned,

    /// 入力が不正
    #[error("Invalid input: {0}")]
    Validation(String),

    /// BookAvailabilityStoreのエラー
    #[error("Book store error")]
    BookStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// LoanRepositoryのエラー
    #[error("Loan repository error")]
    LoanRepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// MemberLookupのエラー
    #[error("Member lookup error")]
    MemberLookupError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// NotificationInboxのエラー
    #[error("Notification inbox error")]
    NotificationError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LoanApplicationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoanApplicationError::BookNotFound
            | LoanApplicationError::MemberNotFound
            | LoanApplicationError::LoanNotFound
            | LoanApplicationError::NotificationNotFound => ErrorKind::NotFound,
            LoanApplicationError::BookUnavailable
            | LoanApplicationError::MemberInactive
            | LoanApplicationError::AlreadyReturned => ErrorKind::Conflict,
            LoanApplicationError::Validation(_) => ErrorKind::Validation,
            LoanApplicationError::BookStoreError(_)
            | LoanApplicationError::LoanRepositoryError(_)
            | LoanApplicationError::MemberLookupError(_)
            | LoanApplicationError::NotificationError(_) => ErrorKind::Internal,
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LoanApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(LoanApplicationError::LoanNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(
            LoanApplicationError::NotificationNotFound.kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            LoanApplicationError::NotificationError("boom".into()).kind(),
            ErrorKind::Internal
        );
        assert_eq!(LoanApplicationError::BookUnavailable.kind(), ErrorKind::Conflict);
        assert_eq!(LoanApplicationError::MemberInactive.kind(), ErrorKind::Conflict);
        assert_eq!(LoanApplicationError::AlreadyReturned.kind(), ErrorKind::Conflict);
        assert_eq!(
            LoanApplicationError::Validation("bad".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            LoanApplicationError::LoanRepositoryError("boom".into()).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_error_messages_are_stable() {
        assert_eq!(
            LoanApplicationError::BookUnavailable.to_string(),
            "Book is not available for loan"
        );
        assert_eq!(
            LoanApplicationError::AlreadyReturned.to_string(),
            "Loan has already been returned"
        );
    }
}
