use std::fmt;

use indexmap::IndexMap;
use tracing::trace;

use crate::item::{AnnotationItem, ItemId, LayerId};

/// Structured notification published by a layer about one of its items.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemEvent {
    Added(ItemId),
    Selected(ItemId),
    Deselected(ItemId),
    GeometryChanged(ItemId),
    LabelChanged {
        item: ItemId,
        label: Option<String>,
    },
    HoverEnter(ItemId),
    HoverLeave(ItemId),
    Removed(ItemId),
}

impl ItemEvent {
    #[must_use]
    pub fn item(&self) -> ItemId {
        match self {
            ItemEvent::Added(id)
            | ItemEvent::Selected(id)
            | ItemEvent::Deselected(id)
            | ItemEvent::GeometryChanged(id)
            | ItemEvent::HoverEnter(id)
            | ItemEvent::HoverLeave(id)
            | ItemEvent::Removed(id) => *id,
            ItemEvent::LabelChanged { item, .. } => *item,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u64);

type Listener = Box<dyn FnMut(&ItemEvent)>;

/// Ordered collection of items. The layer is the only owner of its items; paint order is
/// insertion order, last on top.
pub struct Layer {
    id: LayerId,
    name: Option<String>,
    pub(crate) items: IndexMap<ItemId, AnnotationItem>,
    listeners: Vec<(SubscriptionToken, Listener)>,
    next_token: u64,
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("items", &self.items.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Layer {
    pub(crate) fn new(id: LayerId, name: Option<String>) -> Self {
        Self {
            id,
            name,
            items: IndexMap::new(),
            listeners: Vec::new(),
            next_token: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> LayerId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&AnnotationItem> {
        self.items.get(&id)
    }

    /// Items bottom to top.
    pub fn items(&self) -> impl DoubleEndedIterator<Item = &AnnotationItem> {
        self.items.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Register `listener` for every event this layer publishes.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionToken
    where
        F: FnMut(&ItemEvent) + 'static,
    {
        let token = SubscriptionToken(self.next_token);
        self.next_token += 1;
        self.listeners.push((token, Box::new(listener)));
        token
    }

    /// Returns false when the token was not registered.
    pub fn unsubscribe(&mut self, token: SubscriptionToken) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(t, _)| *t != token);
        self.listeners.len() != before
    }

    pub(crate) fn emit(&mut self, event: ItemEvent) {
        trace!(layer = %self.id, ?event, "item event");
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }
}
