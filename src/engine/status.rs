use crate::types::Status;

use super::WEEKLY_TARGET;

/// Maps a week total to its status. Total over all non-negative totals.
pub fn classify(week_total: u32) -> Status {
    match week_total {
        0 => Status::Missing,
        total if total < WEEKLY_TARGET => Status::Incompleted,
        _ => Status::Completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_missing() {
        assert_eq!(classify(0), Status::Missing);
    }

    #[test]
    fn below_target_is_incompleted() {
        assert_eq!(classify(1), Status::Incompleted);
        assert_eq!(classify(39), Status::Incompleted);
    }

    #[test]
    fn target_and_above_is_completed() {
        assert_eq!(classify(40), Status::Completed);
        assert_eq!(classify(41), Status::Completed);
        assert_eq!(classify(u32::MAX), Status::Completed);
    }
}
