use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Count Mon-Fri days in `[from, to]`, inclusive. No holiday table; the
/// system deliberately uses plain weekday counting.
pub fn business_days_inclusive(from: NaiveDate, to: NaiveDate) -> f64 {
    if to < from {
        return 0.0;
    }
    let mut days = 0u32;
    let mut cur = from;
    while cur <= to {
        if !matches!(cur.weekday(), Weekday::Sat | Weekday::Sun) {
            days += 1;
        }
        cur = match cur.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    f64::from(days)
}
