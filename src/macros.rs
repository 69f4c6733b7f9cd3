/// Log an Info event.
///
/// The message is formatted on the calling thread and the call site is
/// captured where the macro is expanded. Without `logger:` the event goes
/// to the process-wide logger.
///
/// ```no_run
/// use daily_log_sink::log_info;
///
/// log_info!("user {} logged in", "alice");
/// ```
#[macro_export]
macro_rules! log_info {
    (logger: $logger:expr, $($arg:tt)+) => {
        ($logger).info($crate::call_site!(), ::std::format!($($arg)+))
    };
    ($($arg:tt)+) => {
        if let ::std::option::Option::Some(logger) = $crate::global() {
            logger.info($crate::call_site!(), ::std::format!($($arg)+));
        }
    };
}

/// Log an Error event, optionally carrying an error value.
///
/// With `err = value` the error is borrowed, rendered into the event and,
/// if it was raised through [`located!`](crate::located), the event is
/// attributed to where it was raised rather than to this call.
///
/// ```no_run
/// use daily_log_sink::{located, log_error, Located};
///
/// fn g() -> Result<(), Located> {
///     Err(located!("boom"))
/// }
///
/// if let Err(e) = g() {
///     log_error!(err = e, "failed op");
/// }
/// log_error!("quota exceeded for {}", "bob");
/// ```
#[macro_export]
macro_rules! log_error {
    (logger: $logger:expr, err = $err:expr, $($arg:tt)+) => {{
        use $crate::AsErrorObject as _;
        ($logger).error_with(($err).as_error_object(), $crate::call_site!(), ::std::format!($($arg)+))
    }};
    (logger: $logger:expr, err = $err:expr $(,)?) => {{
        use $crate::AsErrorObject as _;
        ($logger).error_with(($err).as_error_object(), $crate::call_site!(), ::std::string::String::new())
    }};
    (logger: $logger:expr, $($arg:tt)+) => {
        ($logger).error($crate::call_site!(), ::std::format!($($arg)+))
    };
    (err = $err:expr, $($arg:tt)+) => {{
        use $crate::AsErrorObject as _;
        if let ::std::option::Option::Some(logger) = $crate::global() {
            logger.error_with(($err).as_error_object(), $crate::call_site!(), ::std::format!($($arg)+));
        }
    }};
    (err = $err:expr $(,)?) => {{
        use $crate::AsErrorObject as _;
        if let ::std::option::Option::Some(logger) = $crate::global() {
            logger.error_with(($err).as_error_object(), $crate::call_site!(), ::std::string::String::new());
        }
    }};
    ($($arg:tt)+) => {
        if let ::std::option::Option::Some(logger) = $crate::global() {
            logger.error($crate::call_site!(), ::std::format!($($arg)+));
        }
    };
}
