use std::cell::RefCell;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::{Rc, Weak};
use std::time::Duration;

use futures::channel::oneshot;
use log::{error, trace};

use crate::error::SignalError;

type Handler<T> = Rc<dyn Fn(T)>;

struct SignalState<T> {
    handlers: Vec<(u64, Handler<T>)>,
    next_id: u64,
    destroyed: bool,
}

impl<T> SignalState<T> {
    fn new() -> Self {
        Self {
            handlers: Vec::new(),
            next_id: 0,
            destroyed: false,
        }
    }
}

/// Type-erased access to a signal's subscriber list, used by [`Connection`].
trait Disconnect {
    fn disconnect(&self, id: u64);
    fn is_connected(&self, id: u64) -> bool;
}

impl<T> Disconnect for RefCell<SignalState<T>> {
    fn disconnect(&self, id: u64) {
        let removed = {
            let mut state = self.borrow_mut();
            let index = state
                .handlers
                .iter()
                .position(|(handler_id, _)| *handler_id == id);
            index.map(|index| state.handlers.remove(index))
        };
        // handler dropped here, outside the borrow
        drop(removed);
    }

    fn is_connected(&self, id: u64) -> bool {
        self.borrow()
            .handlers
            .iter()
            .any(|(handler_id, _)| *handler_id == id)
    }
}

/// Revocation handle returned by [`Signal::connect`] and [`Signal::once`].
#[derive(Clone)]
pub struct Connection {
    id: u64,
    state: Weak<dyn Disconnect>,
}

impl Connection {
    /// Removes the handler. Calling it again, or after the signal is gone,
    /// does nothing.
    pub fn disconnect(&self) {
        if let Some(state) = self.state.upgrade() {
            state.disconnect(self.id);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state
            .upgrade()
            .is_some_and(|state| state.is_connected(self.id))
    }

    /// Ties the handler's lifetime to the returned guard.
    pub fn scoped(self) -> ScopedConnection {
        ScopedConnection(self)
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Disconnects when dropped. Returned by [`Connection::scoped`].
#[must_use = "the handler is disconnected as soon as this is dropped"]
pub struct ScopedConnection(Connection);

impl Drop for ScopedConnection {
    fn drop(&mut self) {
        self.0.disconnect();
    }
}

/// Subscriber side of a signal.
///
/// Handlers run synchronously inside [`SignalEmitter::emit`], in the order
/// they were connected.
pub struct Signal<T> {
    state: Rc<RefCell<SignalState<T>>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T: Clone + 'static> Signal<T> {
    fn register(&self, handler: Handler<T>) -> Result<Connection, SignalError> {
        let mut state = self.state.borrow_mut();
        if state.destroyed {
            return Err(SignalError::Destroyed);
        }
        let id = state.next_id;
        state.next_id += 1;
        state.handlers.push((id, handler));
        let weak: Weak<RefCell<SignalState<T>>> = Rc::downgrade(&self.state);
        Ok(Connection { id, state: weak })
    }

    /// Registers `handler` for every future emission.
    pub fn connect(&self, handler: impl Fn(T) + 'static) -> Result<Connection, SignalError> {
        self.register(Rc::new(handler))
    }

    /// Registers `handler` for the next emission only.
    pub fn once(&self, handler: impl FnOnce(T) + 'static) -> Result<Connection, SignalError> {
        let slot = Rc::new(RefCell::new(Some(handler)));
        let connection_slot: Rc<RefCell<Option<Connection>>> = Rc::new(RefCell::new(None));

        let self_connection = Rc::clone(&connection_slot);
        let connection = self.register(Rc::new(move |value: T| {
            if let Some(connection) = self_connection.borrow_mut().take() {
                connection.disconnect();
            }
            let handler = slot.borrow_mut().take();
            if let Some(handler) = handler {
                handler(value);
            }
        }))?;
        *connection_slot.borrow_mut() = Some(connection.clone());
        Ok(connection)
    }

    /// Subscribes now and resolves with the next emitted value.
    ///
    /// Resolves to `None` when `timeout` elapses first or the signal is
    /// destroyed while waiting. Awaiting requires a tokio runtime with the
    /// timer enabled when a timeout is given.
    pub fn wait(
        &self,
        timeout: Option<Duration>,
    ) -> Result<impl Future<Output = Option<T>>, SignalError> {
        let (sender, receiver) = oneshot::channel();
        let connection = self.once(move |value| {
            let _ = sender.send(value);
        })?;
        let guard = connection.scoped();

        Ok(async move {
            let _guard = guard;
            receive(receiver, timeout).await
        })
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.borrow().destroyed
    }

    pub fn connection_count(&self) -> usize {
        self.state.borrow().handlers.len()
    }
}

/// Owner side of a signal: the only handle that can emit or destroy it.
pub struct SignalEmitter<T> {
    state: Rc<RefCell<SignalState<T>>>,
}

/// Creates a connected emitter/subscriber pair.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let (emitter, signal) = framekit::signal::channel::<i32>();
/// let total = Rc::new(Cell::new(0));
/// let sink = Rc::clone(&total);
/// signal.connect(move |n| sink.set(sink.get() + n)).unwrap();
/// emitter.emit(2).unwrap();
/// emitter.emit(3).unwrap();
/// assert_eq!(total.get(), 5);
/// ```
pub fn channel<T: Clone + 'static>() -> (SignalEmitter<T>, Signal<T>) {
    let state = Rc::new(RefCell::new(SignalState::new()));
    (
        SignalEmitter {
            state: Rc::clone(&state),
        },
        Signal { state },
    )
}

impl<T: Clone + 'static> SignalEmitter<T> {
    /// Subscriber view of this emitter's signal.
    pub fn signal(&self) -> Signal<T> {
        Signal {
            state: Rc::clone(&self.state),
        }
    }

    /// Calls every handler registered at the time of the call. A handler that
    /// panics is logged and skipped; delivery to the rest continues.
    pub fn emit(&self, value: T) -> Result<(), SignalError> {
        let handlers: Vec<Handler<T>> = {
            let state = self.state.borrow();
            if state.destroyed {
                return Err(SignalError::Destroyed);
            }
            state.handlers.iter().map(|(_, h)| Rc::clone(h)).collect()
        };

        trace!("emitting to {} handler(s)", handlers.len());
        for handler in handlers {
            let value = value.clone();
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| handler(value))) {
                error!("signal handler panicked: {}", panic_message(payload.as_ref()));
            }
        }
        Ok(())
    }

    /// Drops every handler and marks the signal destroyed. Pending waits
    /// resolve to `None`. Destroying twice is a no-op.
    pub fn destroy(&self) {
        let handlers = {
            let mut state = self.state.borrow_mut();
            if state.destroyed {
                return;
            }
            state.destroyed = true;
            std::mem::take(&mut state.handlers)
        };
        trace!("destroyed signal with {} handler(s)", handlers.len());
        drop(handlers);
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.borrow().destroyed
    }
}

/// Awaits a one-shot value, giving up after `timeout`. A dropped sender or
/// an elapsed timeout both yield `None`.
pub(crate) async fn receive<T>(
    receiver: oneshot::Receiver<T>,
    timeout: Option<Duration>,
) -> Option<T> {
    match timeout {
        Some(duration) => match tokio::time::timeout(duration, receiver).await {
            Ok(result) => result.ok(),
            Err(_) => {
                trace!("wait timed out after {:?}", duration);
                None
            }
        },
        None => receiver.await.ok(),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
