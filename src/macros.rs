#[cfg(all(feature = "log", not(feature = "defmt")))]
macro_rules! ptp_log {
    (trace, $($arg:expr),*) => { log::trace!($($arg),*) };
    (debug, $($arg:expr),*) => { log::debug!($($arg),*) };
    (info, $($arg:expr),*) => { log::info!($($arg),*) };
    (warn, $($arg:expr),*) => { log::warn!($($arg),*) };
}

#[cfg(feature = "defmt")]
macro_rules! ptp_log {
    (trace, $($arg:expr),*) => { defmt::trace!($($arg),*) };
    (debug, $($arg:expr),*) => { defmt::debug!($($arg),*) };
    (info, $($arg:expr),*) => { defmt::info!($($arg),*) };
    (warn, $($arg:expr),*) => { defmt::warn!($($arg),*) };
}

#[cfg(not(any(feature = "log", feature = "defmt")))]
macro_rules! ptp_log {
    ($level:ident, $($arg:expr),*) => {{ $( let _ = $arg; )* }}
}

macro_rules! ptp_trace {
    ($($arg:expr),*) => (ptp_log!(trace, $($arg),*));
}

macro_rules! ptp_debug {
    ($($arg:expr),*) => (ptp_log!(debug, $($arg),*));
}

macro_rules! ptp_info {
    ($($arg:expr),*) => (ptp_log!(info, $($arg),*));
}

macro_rules! ptp_warn {
    ($($arg:expr),*) => (ptp_log!(warn, $($arg),*));
}
