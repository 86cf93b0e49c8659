use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// 延滞1日あたりの延滞料金（通貨単位）
pub const FINE_PER_DAY: i64 = 1000;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// 純粋関数：延滞日数
///
/// 返却期限を過ぎていなければ0。1日未満の端数は切り上げる
/// （1時間の延滞でも1日として数える）。
pub fn days_overdue(due_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    if now <= due_date {
        return 0;
    }

    let overdue = now - due_date;
    let seconds = overdue.num_seconds();
    let days = seconds / SECONDS_PER_DAY;

    // 秒未満の延滞も端数として扱う
    if seconds % SECONDS_PER_DAY != 0 || overdue.subsec_nanos() != 0 {
        days + 1
    } else {
        days
    }
}

/// 純粋関数：延滞料金を計算する
///
/// 返却処理と延滞検出バッチの両方で同一の計算を使う。
pub fn compute_fine(due_date: DateTime<Utc>, now: DateTime<Utc>) -> Decimal {
    Decimal::from(days_overdue(due_date, now) * FINE_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn due() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_no_fine_at_due_date() {
        assert_eq!(compute_fine(due(), due()), Decimal::ZERO);
    }

    #[test]
    fn test_no_fine_before_due_date() {
        let now = due() - Duration::days(3);
        assert_eq!(compute_fine(due(), now), Decimal::ZERO);
        assert_eq!(days_overdue(due(), now), 0);
    }

    #[test]
    fn test_one_hour_late_is_one_full_day() {
        let now = due() + Duration::hours(1);
        assert_eq!(compute_fine(due(), now), Decimal::from(FINE_PER_DAY));
    }

    #[test]
    fn test_one_second_late_is_one_full_day() {
        let now = due() + Duration::seconds(1);
        assert_eq!(days_overdue(due(), now), 1);
    }

    #[test]
    fn test_sub_second_late_is_one_full_day() {
        let now = due() + Duration::milliseconds(10);
        assert_eq!(days_overdue(due(), now), 1);
    }

    #[test]
    fn test_exact_two_days_late() {
        let now = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
        assert_eq!(compute_fine(due(), now), Decimal::from(2 * FINE_PER_DAY));
    }

    #[test]
    fn test_partial_day_rounds_up() {
        let now = due() + Duration::days(2) + Duration::minutes(1);
        assert_eq!(days_overdue(due(), now), 3);
        assert_eq!(compute_fine(due(), now), Decimal::from(3 * FINE_PER_DAY));
    }
}
