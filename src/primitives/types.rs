//! Primitive types - Attributes and handlers.
//!
//! Attributes are a closed tagged union resolved when a node is built:
//! a plain string rendered as a platform attribute, or an event handler
//! registered as a listener. The reconciler branches on the tag and never
//! pattern-matches attribute names during a pass.

use std::fmt;
use std::rc::Rc;

use crate::error::{Result, VdomError};
use crate::types::Event;

// =============================================================================
// Callback Types
// =============================================================================

/// Event handler callback (Rc for shared ownership in closures).
///
/// Rc<dyn Fn> lets a view hand the same callback to several nodes, and lets
/// the reconciler tell an unchanged handler from a new one by allocation.
pub type EventCallback = Rc<dyn Fn(&Event)>;

/// Reserved prefix for handler attribute names.
pub const HANDLER_PREFIX: &str = "on";

/// Event name carried by a handler attribute name (`onclick` -> `click`).
///
/// Returns None for plain attribute names. Case-sensitive: `onClick` yields
/// `Click`.
pub fn handler_event_name(name: &str) -> Option<&str> {
    let event = name.strip_prefix(HANDLER_PREFIX)?;
    let is_word = !event.is_empty()
        && event.chars().all(|c| c.is_alphanumeric() || c == '_');
    is_word.then_some(event)
}

// =============================================================================
// Event Handler
// =============================================================================

/// A listener bound to one event name.
#[derive(Clone)]
pub struct EventHandler {
    event: String,
    callback: EventCallback,
}

impl EventHandler {
    pub fn new(event: impl Into<String>, callback: impl Fn(&Event) + 'static) -> Self {
        Self::from_rc(event, Rc::new(callback))
    }

    pub fn from_rc(event: impl Into<String>, callback: EventCallback) -> Self {
        Self {
            event: event.into(),
            callback,
        }
    }

    /// Event name this handler listens for.
    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn callback(&self) -> &EventCallback {
        &self.callback
    }

    /// Invoke the callback.
    pub fn call(&self, event: &Event) {
        (self.callback)(event)
    }

    /// Same event and same callback allocation.
    pub fn same_as(&self, other: &EventHandler) -> bool {
        self.event == other.event && Rc::ptr_eq(&self.callback, &other.callback)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("event", &self.event)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Attribute
// =============================================================================

/// A resolved attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// Rendered as a platform attribute.
    Plain(String),
    /// Registered as a listener, never rendered.
    Handler(EventHandler),
}

impl Attribute {
    pub fn as_plain(&self) -> Option<&str> {
        match self {
            Attribute::Plain(value) => Some(value),
            Attribute::Handler(_) => None,
        }
    }

    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            Attribute::Plain(_) => None,
            Attribute::Handler(handler) => Some(handler),
        }
    }

    pub fn is_handler(&self) -> bool {
        matches!(self, Attribute::Handler(_))
    }
}

// =============================================================================
// Attribute Value - Unresolved input
// =============================================================================

/// Attribute value as supplied by a caller, before it is resolved
/// against its name.
#[derive(Clone)]
pub enum AttrValue {
    Text(String),
    Callback(EventCallback),
}

impl AttrValue {
    /// Build from any closure.
    pub fn callback(f: impl Fn(&Event) + 'static) -> Self {
        AttrValue::Callback(Rc::new(f))
    }

    /// Resolve against the attribute name.
    ///
    /// `on<Event>` names must carry a callback and every other name must
    /// carry a string.
    pub fn resolve(self, name: &str) -> Result<Attribute> {
        match (handler_event_name(name), self) {
            (Some(event), AttrValue::Callback(callback)) => {
                Ok(Attribute::Handler(EventHandler::from_rc(event, callback)))
            }
            (Some(_), AttrValue::Text(_)) => Err(VdomError::InvalidAttribute {
                name: name.to_string(),
                reason: "handler attribute needs a callback",
            }),
            (None, AttrValue::Text(value)) => {
                if name.is_empty() {
                    return Err(VdomError::InvalidAttribute {
                        name: String::new(),
                        reason: "attribute name is empty",
                    });
                }
                Ok(Attribute::Plain(value))
            }
            (None, AttrValue::Callback(_)) => Err(VdomError::InvalidAttribute {
                name: name.to_string(),
                reason: "callbacks need an on<Event> attribute name",
            }),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        AttrValue::Text(value.clone())
    }
}

impl From<EventCallback> for AttrValue {
    fn from(callback: EventCallback) -> Self {
        AttrValue::Callback(callback)
    }
}

impl fmt::Debug for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Text(value) => f.debug_tuple("Text").field(value).finish(),
            AttrValue::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
