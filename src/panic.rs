use std::any::Any;

use crate::Error;

/// Turns the payload of a caught panic into a rejection reason.
///
/// `panic_any(())` maps to [`Error::PanicNil`], error payloads to
/// [`Error::PanicError`], and anything else (including the strings that
/// `panic!` produces) to [`Error::PanicUnknown`].
pub(crate) fn recover(payload: Box<dyn Any + Send>) -> Error {
    if payload.is::<()>() {
        Error::PanicNil
    } else if let Some(err) = payload.downcast_ref::<Error>() {
        Error::PanicError(err.to_string())
    } else if let Some(err) = payload.downcast_ref::<Box<dyn std::error::Error + Send + Sync>>() {
        Error::PanicError(err.to_string())
    } else if let Some(msg) = payload.downcast_ref::<&'static str>() {
        Error::PanicUnknown((*msg).to_owned())
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        Error::PanicUnknown(msg.clone())
    } else {
        // Same placeholder the default panic hook prints.
        Error::PanicUnknown("Box<dyn Any>".to_owned())
    }
}
