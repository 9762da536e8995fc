//! Execution-time logging around message resolution.
//!
//! [`TimedMessageSource`] wraps any [`MessageSource`] and logs the duration of
//! every call. With `DEBUG` enabled for this module the log line also carries
//! the call arguments and the result, abbreviated to a configurable length.

use std::time::Instant;

use tracing::Level;

use crate::format::MessageArg;
use crate::locale::Locale;
use crate::source::{
    MessageSource,
    MessageSourceResolvable,
    ResolveError,
};

/// Default cap for logged arguments and results.
pub const DEFAULT_MAX_LOGGED_LENGTH: usize = 120;

/// Marker appended to abbreviated log values.
const ELLIPSIS: &str = "...";

/// Nanoseconds per unit.
const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SECOND: u64 = 1_000_000_000;
const NANOS_PER_MINUTE: u64 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: u64 = 60 * NANOS_PER_MINUTE;

/// [`MessageSource`] decorator that logs how long each call took.
#[derive(Debug, Clone)]
pub struct TimedMessageSource<M> {
    /// Wrapped source.
    inner: M,
    /// Short type name of the wrapped source, used as the log's `class`.
    class: &'static str,
    /// Cap for logged arguments and results.
    max_logged_length: usize,
}

impl<M: MessageSource> TimedMessageSource<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self::with_max_logged_length(inner, DEFAULT_MAX_LOGGED_LENGTH)
    }

    #[must_use]
    pub fn with_max_logged_length(inner: M, max_logged_length: usize) -> Self {
        Self { inner, class: short_type_name::<M>(), max_logged_length }
    }

    #[must_use]
    pub const fn inner(&self) -> &M {
        &self.inner
    }

    /// Runs `call`, logging its duration. `describe_args` is only evaluated at `DEBUG`.
    fn timed(
        &self,
        method: &'static str,
        describe_args: impl FnOnce() -> String,
        call: impl FnOnce() -> Result<String, ResolveError>,
    ) -> Result<String, ResolveError> {
        let start = Instant::now();
        let result = call();

        if tracing::enabled!(Level::INFO) {
            let nanos = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
            let time = format_duration(nanos);

            if tracing::enabled!(Level::DEBUG) {
                tracing::debug!(
                    class = self.class,
                    method,
                    time = %time,
                    nanos,
                    arguments = %abbreviate(&describe_args(), self.max_logged_length),
                    result = %abbreviate(&format!("{result:?}"), self.max_logged_length),
                    "Timed call"
                );
            } else {
                tracing::info!(class = self.class, method, time = %time, nanos, "Timed call");
            }
        }

        result
    }
}

impl<M: MessageSource> MessageSource for TimedMessageSource<M> {
    fn get_message(
        &self,
        code: &str,
        args: &[MessageArg],
        default_message: Option<&str>,
        locale: &Locale,
    ) -> Result<String, ResolveError> {
        self.timed(
            "get_message",
            || format!("code={code:?}, args={args:?}, default={default_message:?}, locale={locale}"),
            || self.inner.get_message(code, args, default_message, locale),
        )
    }

    fn get_message_without_default(
        &self,
        code: &str,
        args: &[MessageArg],
        locale: &Locale,
    ) -> Result<String, ResolveError> {
        self.timed(
            "get_message_without_default",
            || format!("code={code:?}, args={args:?}, locale={locale}"),
            || self.inner.get_message_without_default(code, args, locale),
        )
    }

    fn get_message_resolvable(
        &self,
        resolvable: &MessageSourceResolvable,
        locale: &Locale,
    ) -> Result<String, ResolveError> {
        self.timed(
            "get_message_resolvable",
            || format!("resolvable={resolvable:?}, locale={locale}"),
            || self.inner.get_message_resolvable(resolvable, locale),
        )
    }
}

/// Formats a nanosecond duration as `HH:MM:SS.mmmms uuuus nnnns`.
///
/// # Examples
/// ```
/// use db_message_source::timing::format_duration;
///
/// assert_eq!(format_duration(1_234_567_890), "00:00:01.234ms 567us 890ns");
/// ```
#[must_use]
pub fn format_duration(nanos: u64) -> String {
    let hours = nanos / NANOS_PER_HOUR;
    let minutes = nanos % NANOS_PER_HOUR / NANOS_PER_MINUTE;
    let seconds = nanos % NANOS_PER_MINUTE / NANOS_PER_SECOND;
    let millis = nanos % NANOS_PER_SECOND / NANOS_PER_MILLI;
    let micros = nanos % NANOS_PER_MILLI / NANOS_PER_MICRO;
    let rest = nanos % NANOS_PER_MICRO;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}ms {micros:03}us {rest:03}ns")
}

/// Truncates `text` to at most `max_len` chars, marking the cut with `...`.
///
/// Below 3 chars there is no room for the marker, so the text is cut bare.
#[must_use]
pub fn abbreviate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else if max_len < ELLIPSIS.len() {
        text.chars().take(max_len).collect()
    } else {
        let truncated: String = text.chars().take(max_len - ELLIPSIS.len()).collect();
        format!("{truncated}{ELLIPSIS}")
    }
}

/// Last path segment of a type name, generics stripped.
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
