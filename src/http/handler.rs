//! The handler capability wrapped by the request logger.

use std::fmt;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::Request;

use crate::http::context::Context;
use crate::http::writer::ResponseWriter;

/// A unit of work that answers one request by writing to a [`ResponseWriter`].
pub trait Handler: Send + Sync {
    type Error;

    fn serve(
        &self,
        cx: &Context,
        w: &mut dyn ResponseWriter,
        req: &Request<Bytes>,
    ) -> Result<(), Self::Error>;
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    type Error = H::Error;

    fn serve(
        &self,
        cx: &Context,
        w: &mut dyn ResponseWriter,
        req: &Request<Bytes>,
    ) -> Result<(), Self::Error> {
        (**self).serve(cx, w, req)
    }
}

/// Handler built from a closure. See [`handler_fn`].
#[derive(Clone, Copy)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F> fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerFn")
            .field("f", &std::any::type_name::<F>())
            .finish()
    }
}

/// Turn a closure into a [`Handler`].
///
/// ```
/// use axum::http::StatusCode;
/// use served_log::http::{handler_fn, Handler};
///
/// let ping = handler_fn(|_cx, w, _req| w.write_status(StatusCode::NO_CONTENT));
/// # fn assert_handler<H: Handler>(_: &H) {}
/// # assert_handler(&ping);
/// ```
pub fn handler_fn<F, E>(f: F) -> HandlerFn<F>
where
    F: Fn(&Context, &mut dyn ResponseWriter, &Request<Bytes>) -> Result<(), E> + Send + Sync,
{
    HandlerFn { f }
}

impl<F, E> Handler for HandlerFn<F>
where
    F: Fn(&Context, &mut dyn ResponseWriter, &Request<Bytes>) -> Result<(), E> + Send + Sync,
{
    type Error = E;

    fn serve(
        &self,
        cx: &Context,
        w: &mut dyn ResponseWriter,
        req: &Request<Bytes>,
    ) -> Result<(), E> {
        (self.f)(cx, w, req)
    }
}
