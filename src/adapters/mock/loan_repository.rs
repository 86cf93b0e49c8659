use crate::domain::{
    LoanId,
    loan::{Loan, LoanStatus},
};
use crate::ports::loan_repository::{
    LoanFilter, LoanRepository as LoanRepositoryTrait, Result,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// LoanRepositoryのインメモリ実装
///
/// 条件付き更新（close）はロック内でステータスを確認してから書き換える。
pub struct LoanRepository {
    loans: Mutex<HashMap<LoanId, Loan>>,
}

impl LoanRepository {
    pub fn new() -> Self {
        Self {
            loans: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for LoanRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    async fn insert(&self, loan: &Loan) -> Result<()> {
        self.loans.lock().unwrap().insert(loan.loan_id, loan.clone());
        Ok(())
    }

    async fn delete(&self, loan_id: LoanId) -> Result<()> {
        self.loans.lock().unwrap().remove(&loan_id);
        Ok(())
    }

    async fn get_by_id(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        Ok(self.loans.lock().unwrap().get(&loan_id).cloned())
    }

    async fn close(&self, returned: &Loan) -> Result<bool> {
        let mut loans = self.loans.lock().unwrap();
        match loans.get_mut(&returned.loan_id) {
            Some(current) if current.status == LoanStatus::Active => {
                *current = returned.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn reopen(&self, original: &Loan) -> Result<()> {
        self.loans
            .lock()
            .unwrap()
            .insert(original.loan_id, original.clone());
        Ok(())
    }

    async fn find(&self, filter: &LoanFilter) -> Result<Vec<Loan>> {
        let loans = self.loans.lock().unwrap();
        let mut found: Vec<Loan> = loans.values().filter(|l| filter.matches(l)).cloned().collect();
        found.sort_by(|a, b| b.borrowed_at.cmp(&a.borrowed_at));
        Ok(found)
    }

    async fn find_overdue_candidates(&self, cutoff: DateTime<Utc>) -> Result<Vec<Loan>> {
        let loans = self.loans.lock().unwrap();
        let mut found: Vec<Loan> = loans
            .values()
            .filter(|l| l.status == LoanStatus::Active && l.due_date < cutoff)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.due_date.cmp(&b.due_date));
        Ok(found)
    }

    async fn count_active(&self) -> Result<i64> {
        let loans = self.loans.lock().unwrap();
        Ok(loans.values().filter(|l| l.status == LoanStatus::Active).count() as i64)
    }

    async fn count_overdue(&self, cutoff: DateTime<Utc>) -> Result<i64> {
        let loans = self.loans.lock().unwrap();
        Ok(loans
            .values()
            .filter(|l| l.status == LoanStatus::Active && l.due_date < cutoff)
            .count() as i64)
    }
}
