use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::error;

use crate::error::Result;

pub const FALLBACK_MESSAGE: &str = "Something went wrong while rendering this page.";

/// Run a page render, replacing a failed or panicking render with a fallback
/// frame so the rest of the shell keeps drawing.
pub fn guard<F>(render: F) -> String
where
    F: FnOnce() -> Result<String>,
{
    match panic::catch_unwind(AssertUnwindSafe(render)) {
        Ok(Ok(frame)) => frame,
        Ok(Err(err)) => {
            error!(error = %err, "page render failed");
            fallback(&err.to_string())
        }
        Err(payload) => {
            let detail = panic_message(payload.as_ref());
            error!(panic = %detail, "page render panicked");
            fallback(&detail)
        }
    }
}

fn fallback(detail: &str) -> String {
    format!("{}\n{}", FALLBACK_MESSAGE, detail)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
