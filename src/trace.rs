//! Pipeline instrumentation.
//!
//! Spans cover the long-running stages (`extract`, `build_index`,
//! `classify`); events mark cache hits and misses, per-image corner counts
//! and the winning match. Everything routes through `tracing` when the
//! `tracing` feature is on and disappears otherwise.

/// Opens an info-level span for a pipeline stage; pair with `.entered()`.
#[cfg(feature = "tracing")]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        tracing::info_span!($name $(, $($field)*)?)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        $crate::trace::StageGuard
    };
}

/// Records a stage outcome with at least one `key = value` field.
#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::info!(name: $name, $($key = $value),+)
    };
}

// Field values are borrowed so call sites keep them in use.
#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        let _ = ($(&$value,)+);
    };
}

pub(crate) use trace_event;
pub(crate) use trace_span;

/// Inert stage guard returned by `trace_span!` without the `tracing` feature.
#[cfg(not(feature = "tracing"))]
pub struct StageGuard;

#[cfg(not(feature = "tracing"))]
impl StageGuard {
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}
