//! Optional logging front-end
//!
//! Host builds forward to the `log` facade, firmware builds to `defmt`, and
//! builds with neither compile every call site away. Format strings must stay
//! within the subset both backends accept (`{}`, `{:?}`, `{:x}`).

#[cfg(feature = "log")]
macro_rules! link_error {
    ($($arg:tt)*) => { log::error!($($arg)*) };
}

#[cfg(all(feature = "defmt", not(feature = "log")))]
macro_rules! link_error {
    ($($arg:tt)*) => { defmt::error!($($arg)*) };
}

#[cfg(not(any(feature = "log", feature = "defmt")))]
macro_rules! link_error {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! link_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(all(feature = "defmt", not(feature = "log")))]
macro_rules! link_warn {
    ($($arg:tt)*) => { defmt::warn!($($arg)*) };
}

#[cfg(not(any(feature = "log", feature = "defmt")))]
macro_rules! link_warn {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! link_info {
    ($($arg:tt)*) => { log::info!($($arg)*) };
}

#[cfg(all(feature = "defmt", not(feature = "log")))]
macro_rules! link_info {
    ($($arg:tt)*) => { defmt::info!($($arg)*) };
}

#[cfg(not(any(feature = "log", feature = "defmt")))]
macro_rules! link_info {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! link_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(all(feature = "defmt", not(feature = "log")))]
macro_rules! link_debug {
    ($($arg:tt)*) => { defmt::debug!($($arg)*) };
}

#[cfg(not(any(feature = "log", feature = "defmt")))]
macro_rules! link_debug {
    ($($arg:tt)*) => {};
}
