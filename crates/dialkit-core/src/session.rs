//! Drag sessions and document-scope pointer listeners.
//!
//! While a widget is being dragged it listens for move/up events on the whole
//! document, not just its own surface, so the drag survives the pointer
//! leaving the widget. The registration lives inside the [`DragSession`] and is
//! released when the session is dropped, whichever way the drag ends.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::{Rc, Weak};

use kurbo::Rect;

use crate::resolver::WidgetCenter;
use crate::WidgetId;

type ListenerSet = RefCell<HashSet<WidgetId>>;

/// Widgets currently listening for document-scope pointer events.
///
/// Cloning yields another handle to the same registry.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    listeners: Rc<ListenerSet>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` until the returned guard is dropped.
    pub fn register(&self, id: WidgetId) -> ListenerGuard {
        self.listeners.borrow_mut().insert(id);
        ListenerGuard {
            id,
            registry: Rc::downgrade(&self.listeners),
        }
    }

    pub fn is_listening(&self, id: WidgetId) -> bool {
        self.listeners.borrow().contains(&id)
    }

    /// Snapshot of the listening widgets.
    pub fn listeners(&self) -> Vec<WidgetId> {
        self.listeners.borrow().iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }
}

/// Keeps a widget registered in a [`ListenerRegistry`]; unregisters on drop.
#[derive(Debug)]
pub struct ListenerGuard {
    id: WidgetId,
    registry: Weak<ListenerSet>,
}

impl ListenerGuard {
    pub fn id(&self) -> WidgetId {
        self.id
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(listeners) = self.registry.upgrade() {
            listeners.borrow_mut().remove(&self.id);
        }
    }
}

/// State held only while the pointer is down on a widget.
#[derive(Debug)]
pub struct DragSession {
    center: WidgetCenter,
    _listener: ListenerGuard,
}

impl DragSession {
    /// Start a drag: capture the widget center and register listeners.
    pub fn begin(id: WidgetId, bounds: Rect, registry: &ListenerRegistry) -> Self {
        Self {
            center: WidgetCenter::from_bounds(bounds),
            _listener: registry.register(id),
        }
    }

    pub fn center(&self) -> WidgetCenter {
        self.center
    }
}
