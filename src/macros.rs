/// Similar to `info!` macro in tracing.
/// You can pass in the starting time and it will print how long it took from starting time to now.
/// ```ignore
/// info_time!("str {}, {}", 1, 2);
/// let time = Local::now();
/// info_time!(time, "str {}, {}", 1, 2);
/// ```
#[macro_export]
macro_rules! info_time {
    ($strfm:literal $(,)? $($arg:expr),*) => {{
        println!("{}", $crate::macros::stamped(None, &format!($strfm, $($arg),*)));
    }};
    ($time:expr, $strfm:literal $(,)? $($arg:expr),*) => {{
        let local_now = ::chrono::Local::now();
        let run_time = (local_now - $time)
                .num_microseconds()
                .map(|n| n as f64 / 1_000_000.0)
                .unwrap_or(0.0);
        let res = format!("{}\nRUNTIME: {} sec", $crate::macros::stamped(None, &format!($strfm, $($arg),*)), run_time);
        println!("{}", res);
    }};
}

/// Same layout as `info_time!`, with a `WARN` marker in front of the message.
/// Goes to stdout like every other operator message.
#[macro_export]
macro_rules! warn_time {
    ($strfm:literal $(,)? $($arg:expr),*) => {{
        println!("{}", $crate::macros::stamped(Some("WARN"), &format!($strfm, $($arg),*)));
    }};
}

#[doc(hidden)]
pub fn stamped(marker: Option<&str>, message: &str) -> String {
    let local_now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();
    match marker {
        Some(marker) => format!("{:<30} : {marker} {message}", local_now),
        None => format!("{:<30} : {message}", local_now),
    }
}
