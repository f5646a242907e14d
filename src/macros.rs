#[doc(hidden)]
#[macro_export]
macro_rules! __logf {
    ($level:expr, $($arg:tt)+) => {
        $crate::global::log_fmt(
            $level,
            $crate::CallSite::new(file!(), line!()).with_function(module_path!()),
            format_args!($($arg)+),
        )
    };
}

/// Log a formatted message at debug level through the global logger.
///
/// ```no_run
/// toolkit_logger::debugf!("cache warm, {} entries", 12);
/// ```
#[macro_export]
macro_rules! debugf {
    ($($arg:tt)+) => { $crate::__logf!($crate::Level::Debug, $($arg)+) };
}

/// Log a formatted message at info level through the global logger.
#[macro_export]
macro_rules! infof {
    ($($arg:tt)+) => { $crate::__logf!($crate::Level::Info, $($arg)+) };
}

#[macro_export]
macro_rules! warnf {
    ($($arg:tt)+) => { $crate::__logf!($crate::Level::Warn, $($arg)+) };
}

#[macro_export]
macro_rules! errorf {
    ($($arg:tt)+) => { $crate::__logf!($crate::Level::Error, $($arg)+) };
}

#[macro_export]
macro_rules! fatalf {
    ($($arg:tt)+) => { $crate::__logf!($crate::Level::Fatal, $($arg)+) };
}
