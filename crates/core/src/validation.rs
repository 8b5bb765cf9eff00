//! Business rules shared by the services.
//!
//! Pure checks return `AppResult<()>` so the services can run them before
//! touching the database.

use arena_common::{AppError, AppResult};
use arena_db::entities::request_to_group::RequestStatus;
use serde::{Deserialize, Deserializer};

/// Deserialize a field that distinguishes "absent" from "null".
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`:
/// an absent field stays `None`, an explicit `null` becomes `Some(None)`.
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Fail with `key` when `conflict` names a row other than `current_id`.
pub fn check_unique(conflict: Option<i32>, current_id: Option<i32>, key: &str) -> AppResult<()> {
    match conflict {
        Some(id) if Some(id) != current_id => Err(AppError::bad_request(key)),
        _ => Ok(()),
    }
}

/// Fail with `key` when a referenced row is missing.
pub fn check_reference(exists: bool, key: &str) -> AppResult<()> {
    if exists {
        Ok(())
    } else {
        Err(AppError::bad_request(key))
    }
}

/// A group's age bounds must not be inverted.
pub fn check_age_range(min_age: i32, max_age: i32) -> AppResult<()> {
    if min_age > max_age {
        return Err(AppError::bad_request("invalid_age_range"));
    }
    Ok(())
}

/// Order total for `quantity` units at `price`.
pub fn order_total(price: i64, quantity: i32) -> AppResult<i64> {
    price
        .checked_mul(i64::from(quantity))
        .ok_or_else(|| AppError::Validation("total_price overflows".to_string()))
}

/// Check a request-to-group update against the review workflow.
///
/// `checked_by` is the update's reviewer field: `None` when absent,
/// `Some(None)` when explicitly cleared. A reviewed request always keeps a
/// reviewer, and returning it to review requires clearing the reviewer.
pub fn check_status_transition(
    current_status: RequestStatus,
    current_checker: Option<i32>,
    new_status: Option<RequestStatus>,
    checked_by: Option<Option<i32>>,
) -> AppResult<()> {
    let target = new_status.unwrap_or(current_status);
    let checker_after = checked_by.unwrap_or(current_checker);

    if target.is_reviewed() && checker_after.is_none() {
        return Err(AppError::bad_request("checker_required_for_status_change"));
    }

    if current_status.is_reviewed()
        && target == RequestStatus::Unreviewed
        && checked_by != Some(None)
    {
        return Err(AppError::bad_request("cannot_reset_reviewed_request"));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use RequestStatus::{Accepted, Rejected, Unreviewed};

    fn key(result: AppResult<()>) -> Option<String> {
        result.err().map(|e| e.message_key().to_string())
    }

    #[test]
    fn test_accept_requires_checker() {
        assert_eq!(
            key(check_status_transition(Unreviewed, None, Some(Accepted), None)).as_deref(),
            Some("checker_required_for_status_change")
        );
        assert!(check_status_transition(Unreviewed, None, Some(Accepted), Some(Some(7))).is_ok());
        assert!(check_status_transition(Unreviewed, Some(7), Some(Rejected), None).is_ok());
    }

    #[test]
    fn test_accept_with_cleared_checker_is_rejected() {
        assert_eq!(
            key(check_status_transition(Unreviewed, Some(7), Some(Accepted), Some(None))).as_deref(),
            Some("checker_required_for_status_change")
        );
    }

    #[test]
    fn test_reset_requires_clearing_checker() {
        assert_eq!(
            key(check_status_transition(Accepted, Some(7), Some(Unreviewed), None)).as_deref(),
            Some("cannot_reset_reviewed_request")
        );
        assert_eq!(
            key(check_status_transition(Rejected, Some(7), Some(Unreviewed), Some(Some(8))))
                .as_deref(),
            Some("cannot_reset_reviewed_request")
        );
        assert!(check_status_transition(Accepted, Some(7), Some(Unreviewed), Some(None)).is_ok());
    }

    #[test]
    fn test_switch_between_reviewed_states() {
        assert!(check_status_transition(Accepted, Some(7), Some(Rejected), None).is_ok());
        assert!(check_status_transition(Rejected, Some(7), Some(Accepted), Some(Some(9))).is_ok());
    }

    #[test]
    fn test_update_without_status_change() {
        assert!(check_status_transition(Unreviewed, None, None, Some(Some(3))).is_ok());
        assert!(check_status_transition(Unreviewed, None, Some(Unreviewed), None).is_ok());
        assert!(check_status_transition(Accepted, Some(7), None, Some(Some(8))).is_ok());
        assert_eq!(
            key(check_status_transition(Accepted, Some(7), None, Some(None))).as_deref(),
            Some("checker_required_for_status_change")
        );
    }

    #[test]
    fn test_check_unique() {
        assert!(check_unique(None, None, "dup").is_ok());
        assert!(check_unique(Some(4), Some(4), "dup").is_ok());
        assert_eq!(key(check_unique(Some(4), None, "dup")).as_deref(), Some("dup"));
        assert_eq!(key(check_unique(Some(4), Some(5), "dup")).as_deref(), Some("dup"));
    }

    #[test]
    fn test_age_range() {
        assert!(check_age_range(6, 6).is_ok());
        assert!(check_age_range(6, 10).is_ok());
        assert!(check_age_range(11, 10).is_err());
    }

    #[test]
    fn test_order_total() {
        assert_eq!(order_total(1500, 3).ok(), Some(4500));
        assert!(order_total(i64::MAX, 2).is_err());
    }

    #[test]
    fn test_double_option() {
        #[derive(Deserialize)]
        struct Body {
            #[serde(default, deserialize_with = "double_option")]
            checked_by: Option<Option<i32>>,
        }

        let absent: Body = serde_json::from_str("{}").unwrap();
        let cleared: Body = serde_json::from_str(r#"{"checked_by":null}"#).unwrap();
        let set: Body = serde_json::from_str(r#"{"checked_by":3}"#).unwrap();
        assert_eq!(absent.checked_by, None);
        assert_eq!(cleared.checked_by, Some(None));
        assert_eq!(set.checked_by, Some(Some(3)));
    }
}
