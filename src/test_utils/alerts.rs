use crate::alert::{AlertType, Notices};

/// Assert that `notices` holds exactly one alert, an error with `message`.
#[track_caller]
pub(crate) fn assert_error_alert(notices: &Notices, message: &str) {
    let alerts = notices.drain();

    assert_eq!(alerts.len(), 1, "expected one alert, got {alerts:?}");
    assert_eq!(alerts[0].alert_type, AlertType::Error);
    assert_eq!(alerts[0].message, message);
}

/// Assert that `notices` holds exactly one alert, a success with `message`.
#[track_caller]
pub(crate) fn assert_success_alert(notices: &Notices, message: &str) {
    let alerts = notices.drain();

    assert_eq!(alerts.len(), 1, "expected one alert, got {alerts:?}");
    assert_eq!(alerts[0].alert_type, AlertType::Success);
    assert_eq!(alerts[0].message, message);
}
