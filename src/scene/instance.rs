use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::channel::oneshot;
use log::{debug, trace};

use super::attributes::AttributeValue;
use super::object3d::Spatial;
use crate::error::{InstanceError, InstanceResult};
use crate::signal::signal::receive;
use crate::signal::{channel, Signal, SignalEmitter};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Class name every lineage ends with.
pub const BASE_CLASS: &str = "Instance";

/// Builds a lineage `[class_name, bases..., "Instance"]` without repeats.
pub(crate) fn class_lineage(class_name: &str, bases: &[&str]) -> Vec<String> {
    let mut lineage = vec![class_name.to_owned()];
    for base in bases.iter().copied().chain(std::iter::once(BASE_CLASS)) {
        if !lineage.iter().any(|c| c == base) {
            lineage.push(base.to_owned());
        }
    }
    lineage
}

struct InstanceEvents {
    ancestry_changed: SignalEmitter<(Instance, Option<Instance>)>,
    attribute_changed: SignalEmitter<String>,
    changed: SignalEmitter<String>,
    child_added: SignalEmitter<Instance>,
    child_removed: SignalEmitter<Instance>,
    descendant_added: SignalEmitter<Instance>,
    descendant_removing: SignalEmitter<Instance>,
    destroying: SignalEmitter<()>,
}

impl InstanceEvents {
    fn new() -> Self {
        Self {
            ancestry_changed: channel().0,
            attribute_changed: channel().0,
            changed: channel().0,
            child_added: channel().0,
            child_removed: channel().0,
            descendant_added: channel().0,
            descendant_removing: channel().0,
            destroying: channel().0,
        }
    }

    fn destroy_all(&self) {
        self.ancestry_changed.destroy();
        self.attribute_changed.destroy();
        self.changed.destroy();
        self.child_added.destroy();
        self.child_removed.destroy();
        self.descendant_added.destroy();
        self.descendant_removing.destroy();
        self.destroying.destroy();
    }
}

struct InstanceData {
    name: String,
    parent: Option<Weak<InstanceInner>>,
    children: Vec<Instance>,
    /// Nearest parent first.
    ancestors: Vec<Weak<InstanceInner>>,
    /// Every transitive child, pre-order.
    descendants: Vec<Instance>,
    attributes: HashMap<String, AttributeValue>,
    property_signals: HashMap<String, Rc<SignalEmitter<()>>>,
    destroyed: bool,
}

struct InstanceInner {
    id: u64,
    lineage: Vec<String>,
    data: RefCell<InstanceData>,
    events: InstanceEvents,
    spatial: Option<RefCell<Spatial>>,
}

/// Shared handle to a node in the scene tree.
///
/// Cloning the handle does not copy the node. Parents hold their children
/// strongly and children point back weakly, so a subtree lives as long as its
/// root is held somewhere. Handlers connected to a node's events should
/// capture a [`WeakInstance`] rather than an `Instance` to avoid keeping the
/// node alive through its own signals.
#[derive(Clone)]
pub struct Instance {
    inner: Rc<InstanceInner>,
}

/// Non-owning counterpart of [`Instance`].
#[derive(Clone)]
pub struct WeakInstance {
    inner: Weak<InstanceInner>,
}

impl WeakInstance {
    pub fn upgrade(&self) -> Option<Instance> {
        self.inner.upgrade().map(|inner| Instance { inner })
    }
}

/// Emits on a node's own signal. Signals are only destroyed together with
/// their node, so a failure here just means the node went away mid-update.
fn notify<T: Clone + 'static>(emitter: &SignalEmitter<T>, value: T) {
    if let Err(err) = emitter.emit(value) {
        debug!("skipped notification: {}", err);
    }
}

fn upgrade_all(nodes: &[Weak<InstanceInner>]) -> Vec<Instance> {
    nodes
        .iter()
        .filter_map(|weak| weak.upgrade().map(|inner| Instance { inner }))
        .collect()
}

impl Instance {
    /// Creates a detached node named after its class.
    pub fn new(class_name: impl Into<String>) -> Self {
        let class_name = class_name.into();
        Self::with_lineage(class_lineage(&class_name, &[]), None)
    }

    pub(crate) fn with_lineage(lineage: Vec<String>, spatial: Option<Spatial>) -> Self {
        let name = lineage.first().cloned().unwrap_or_else(|| BASE_CLASS.to_owned());
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        trace!("created {} #{}", name, id);
        Self {
            inner: Rc::new(InstanceInner {
                id,
                lineage,
                data: RefCell::new(InstanceData {
                    name,
                    parent: None,
                    children: Vec::new(),
                    ancestors: Vec::new(),
                    descendants: Vec::new(),
                    attributes: HashMap::new(),
                    property_signals: HashMap::new(),
                    destroyed: false,
                }),
                events: InstanceEvents::new(),
                spatial: spatial.map(RefCell::new),
            }),
        }
    }

    pub(crate) fn spatial(&self) -> Option<&RefCell<Spatial>> {
        self.inner.spatial.as_ref()
    }

    pub fn downgrade(&self) -> WeakInstance {
        WeakInstance {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Process-unique identifier, stable for the node's lifetime.
    pub fn unique_id(&self) -> u64 {
        self.inner.id
    }

    pub fn class_name(&self) -> &str {
        self.inner
            .lineage
            .first()
            .map(String::as_str)
            .unwrap_or(BASE_CLASS)
    }

    /// True when `class_name` is this node's class or one of its bases.
    pub fn is_a(&self, class_name: &str) -> bool {
        self.inner.lineage.iter().any(|c| c == class_name)
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.data.borrow().destroyed
    }

    pub(crate) fn ensure_alive(&self) -> InstanceResult<()> {
        if self.is_destroyed() {
            Err(InstanceError::Destroyed { name: self.name() })
        } else {
            Ok(())
        }
    }

    pub fn name(&self) -> String {
        self.inner.data.borrow().name.clone()
    }

    pub fn set_name(&self, name: impl Into<String>) -> InstanceResult<()> {
        self.ensure_alive()?;
        let name = name.into();
        {
            let mut data = self.inner.data.borrow_mut();
            if data.name == name {
                return Ok(());
            }
            data.name = name;
        }
        self.property_changed("Name");
        Ok(())
    }

    pub fn parent(&self) -> Option<Instance> {
        self.inner
            .data
            .borrow()
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Instance { inner })
    }

    fn ancestors(&self) -> Vec<Instance> {
        upgrade_all(&self.inner.data.borrow().ancestors)
    }

    pub fn get_children(&self) -> Vec<Instance> {
        self.inner.data.borrow().children.clone()
    }

    /// All transitive children in pre-order.
    pub fn get_descendants(&self) -> Vec<Instance> {
        self.inner.data.borrow().descendants.clone()
    }

    /// Dot-separated names from the root down to this node.
    pub fn get_full_name(&self) -> String {
        let mut names: Vec<String> = self.ancestors().iter().rev().map(Instance::name).collect();
        names.push(self.name());
        names.join(".")
    }

    pub fn is_ancestor_of(&self, other: &Instance) -> bool {
        other
            .inner
            .data
            .borrow()
            .ancestors
            .iter()
            .any(|weak| std::ptr::eq(weak.as_ptr(), Rc::as_ptr(&self.inner)))
    }

    pub fn is_descendant_of(&self, other: &Instance) -> bool {
        other.is_ancestor_of(self)
    }

    /// Moves this node under `parent`, or detaches it with `None`.
    ///
    /// Every affected cache is rebuilt before any event fires. Events then
    /// go out in this order: `ChildRemoved` on the old parent,
    /// `DescendantRemoving` on each old ancestor (nearest first), `ChildAdded`
    /// on the new parent, `Changed("Parent")`, `AncestryChanged` on this node,
    /// `DescendantAdded` on each new ancestor (nearest first), and
    /// `AncestryChanged` on every descendant in pre-order.
    ///
    /// # Errors
    /// Fails when either node is destroyed, when `parent` is this node, or when
    /// `parent` is one of this node's descendants. Re-assigning the current
    /// parent is a no-op.
    pub fn set_parent(&self, parent: Option<&Instance>) -> InstanceResult<()> {
        self.ensure_alive()?;
        if let Some(new_parent) = parent {
            if new_parent == self {
                return Err(InstanceError::ParentToSelf { name: self.name() });
            }
            new_parent.ensure_alive()?;
            if self.is_ancestor_of(new_parent) {
                return Err(InstanceError::CyclicParent {
                    name: self.name(),
                    parent: new_parent.name(),
                });
            }
        }

        let old_parent = self.parent();
        if old_parent.as_ref() == parent {
            return Ok(());
        }
        let old_ancestors = self.ancestors();

        if let Some(old) = &old_parent {
            old.inner.data.borrow_mut().children.retain(|child| child != self);
        }
        self.inner.data.borrow_mut().parent = parent.map(|p| Rc::downgrade(&p.inner));
        if let Some(new_parent) = parent {
            new_parent.inner.data.borrow_mut().children.push(self.clone());
        }

        Self::refresh_descendants_upward(old_parent.clone());
        Self::refresh_descendants_upward(parent.cloned());
        self.refresh_ancestors_downward();
        debug!(
            "reparented {} from {:?} to {:?}",
            self.name(),
            old_parent.as_ref().map(Instance::name),
            parent.map(Instance::name)
        );

        if let Some(old) = &old_parent {
            notify(&old.inner.events.child_removed, self.clone());
            for ancestor in &old_ancestors {
                notify(&ancestor.inner.events.descendant_removing, self.clone());
            }
        }
        if let Some(new_parent) = parent {
            notify(&new_parent.inner.events.child_added, self.clone());
        }
        self.property_changed("Parent");
        notify(
            &self.inner.events.ancestry_changed,
            (self.clone(), parent.cloned()),
        );
        for ancestor in self.ancestors() {
            notify(&ancestor.inner.events.descendant_added, self.clone());
        }
        for descendant in self.get_descendants() {
            notify(
                &descendant.inner.events.ancestry_changed,
                (self.clone(), parent.cloned()),
            );
        }
        Ok(())
    }

    fn refresh_descendants(&self) {
        let children = self.get_children();
        let mut descendants = Vec::new();
        for child in children {
            let nested = child.get_descendants();
            descendants.push(child);
            descendants.extend(nested);
        }
        self.inner.data.borrow_mut().descendants = descendants;
    }

    /// Rebuilds the descendant cache of `start` and each of its ancestors.
    fn refresh_descendants_upward(start: Option<Instance>) {
        let mut node = start;
        while let Some(current) = node {
            current.refresh_descendants();
            node = current.parent();
        }
    }

    /// Rebuilds the ancestor cache of this node and its whole subtree.
    fn refresh_ancestors_downward(&self) {
        let ancestors = match self.parent() {
            Some(parent) => {
                let mut chain = vec![Rc::downgrade(&parent.inner)];
                chain.extend(parent.inner.data.borrow().ancestors.iter().cloned());
                chain
            }
            None => Vec::new(),
        };
        trace!("{} now has {} ancestor(s)", self.name(), ancestors.len());
        self.inner.data.borrow_mut().ancestors = ancestors;
        for child in self.get_children() {
            child.refresh_ancestors_downward();
        }
    }

    /// Fires `Changed(property)` and the property's own changed signal.
    pub(crate) fn property_changed(&self, property: &str) {
        notify(&self.inner.events.changed, property.to_owned());
        let emitter = self.inner.data.borrow().property_signals.get(property).cloned();
        if let Some(emitter) = emitter {
            notify(&*emitter, ());
        }
    }

    /// Signal fired whenever `property` changes on this node.
    pub fn get_property_changed_signal(&self, property: &str) -> InstanceResult<Signal<()>> {
        self.ensure_alive()?;
        let mut data = self.inner.data.borrow_mut();
        let emitter = data
            .property_signals
            .entry(property.to_owned())
            .or_insert_with(|| Rc::new(channel().0));
        Ok(emitter.signal())
    }

    pub fn get_attribute(&self, name: &str) -> Option<AttributeValue> {
        self.inner.data.borrow().attributes.get(name).cloned()
    }

    /// Stores `value` under `name` and fires `AttributeChanged(name)`.
    pub fn set_attribute(
        &self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> InstanceResult<()> {
        self.ensure_alive()?;
        let name = name.into();
        self.inner
            .data
            .borrow_mut()
            .attributes
            .insert(name.clone(), value.into());
        notify(&self.inner.events.attribute_changed, name);
        Ok(())
    }

    /// Removes an attribute, returning its old value.
    pub fn remove_attribute(&self, name: &str) -> InstanceResult<Option<AttributeValue>> {
        self.ensure_alive()?;
        let removed = self.inner.data.borrow_mut().attributes.remove(name);
        if removed.is_some() {
            notify(&self.inner.events.attribute_changed, name.to_owned());
        }
        Ok(removed)
    }

    /// Snapshot of every attribute.
    pub fn get_attributes(&self) -> HashMap<String, AttributeValue> {
        self.inner.data.borrow().attributes.clone()
    }

    /// Destroys every child.
    pub fn clear_all_children(&self) -> InstanceResult<()> {
        self.ensure_alive()?;
        for child in self.get_children() {
            child.destroy();
        }
        Ok(())
    }

    /// Fires `Destroying`, destroys all descendants, detaches from the parent,
    /// releases every event channel and marks the node inert. Destroying twice
    /// does nothing.
    pub fn destroy(&self) {
        if self.is_destroyed() {
            return;
        }
        notify(&self.inner.events.destroying, ());
        for child in self.get_children() {
            child.destroy();
        }
        if let Err(err) = self.set_parent(None) {
            debug!("could not detach {} while destroying: {}", self.name(), err);
        }

        let (descendants, attributes, property_signals) = {
            let mut data = self.inner.data.borrow_mut();
            data.children.clear();
            (
                std::mem::take(&mut data.descendants),
                std::mem::take(&mut data.attributes),
                std::mem::take(&mut data.property_signals),
            )
        };
        for emitter in property_signals.values() {
            emitter.destroy();
        }
        self.inner.events.destroy_all();
        drop((descendants, attributes, property_signals));

        self.inner.data.borrow_mut().destroyed = true;
        debug!("destroyed {} #{}", self.name(), self.inner.id);
    }

    fn first_where<'a>(
        nodes: impl IntoIterator<Item = &'a Instance>,
        predicate: impl Fn(&Instance) -> bool,
    ) -> Option<Instance> {
        nodes.into_iter().find(|node| predicate(*node)).cloned()
    }

    fn search(&self, recursive: bool, predicate: impl Fn(&Instance) -> bool) -> Option<Instance> {
        let data = self.inner.data.borrow();
        if recursive {
            Self::first_where(&data.descendants, predicate)
        } else {
            Self::first_where(&data.children, predicate)
        }
    }

    pub fn find_first_child(&self, name: &str, recursive: bool) -> Option<Instance> {
        self.search(recursive, |node| node.name() == name)
    }

    pub fn find_first_child_of_class(&self, class_name: &str, recursive: bool) -> Option<Instance> {
        self.search(recursive, |node| node.class_name() == class_name)
    }

    pub fn find_first_child_which_is_a(&self, class_name: &str, recursive: bool) -> Option<Instance> {
        self.search(recursive, |node| node.is_a(class_name))
    }

    pub fn find_first_descendant(&self, name: &str) -> Option<Instance> {
        self.find_first_child(name, true)
    }

    pub fn find_first_descendant_of_class(&self, class_name: &str) -> Option<Instance> {
        self.find_first_child_of_class(class_name, true)
    }

    pub fn find_first_descendant_which_is_a(&self, class_name: &str) -> Option<Instance> {
        self.find_first_child_which_is_a(class_name, true)
    }

    pub fn find_first_ancestor(&self, name: &str) -> Option<Instance> {
        Self::first_where(&self.ancestors(), |node| node.name() == name)
    }

    pub fn find_first_ancestor_of_class(&self, class_name: &str) -> Option<Instance> {
        Self::first_where(&self.ancestors(), |node| node.class_name() == class_name)
    }

    pub fn find_first_ancestor_which_is_a(&self, class_name: &str) -> Option<Instance> {
        Self::first_where(&self.ancestors(), |node| node.is_a(class_name))
    }

    /// Resolves with the first child (or descendant, when `recursive`) named
    /// `name`, immediately if one already exists. Resolves to `None` once
    /// `timeout` elapses or this node is destroyed.
    ///
    /// Awaiting requires a tokio runtime with the timer enabled when a
    /// timeout is given.
    pub fn wait_for_child(
        &self,
        name: &str,
        recursive: bool,
        timeout: Option<Duration>,
    ) -> InstanceResult<impl Future<Output = Option<Instance>>> {
        let name = name.to_owned();
        self.wait_for_match(recursive, timeout, move |node| node.name() == name)
    }

    /// Like [`Instance::wait_for_child`], matching on the exact class name.
    /// Needs a timer-enabled tokio runtime when a timeout is given.
    pub fn wait_for_child_of_class(
        &self,
        class_name: &str,
        recursive: bool,
        timeout: Option<Duration>,
    ) -> InstanceResult<impl Future<Output = Option<Instance>>> {
        let class_name = class_name.to_owned();
        self.wait_for_match(recursive, timeout, move |node| node.class_name() == class_name)
    }

    /// Like [`Instance::wait_for_child`], matching the class or any of its
    /// bases. Needs a timer-enabled tokio runtime when a timeout is given.
    pub fn wait_for_child_which_is_a(
        &self,
        class_name: &str,
        recursive: bool,
        timeout: Option<Duration>,
    ) -> InstanceResult<impl Future<Output = Option<Instance>>> {
        let class_name = class_name.to_owned();
        self.wait_for_match(recursive, timeout, move |node| node.is_a(&class_name))
    }

    fn wait_for_match(
        &self,
        recursive: bool,
        timeout: Option<Duration>,
        matches: impl Fn(&Instance) -> bool + 'static,
    ) -> InstanceResult<impl Future<Output = Option<Instance>>> {
        self.ensure_alive()?;
        let existing = self.search(recursive, &matches);

        let pending = match existing {
            Some(_) => None,
            None => {
                let (sender, receiver) = oneshot::channel();
                let sender = RefCell::new(Some(sender));
                let signal = if recursive {
                    self.descendant_added()
                } else {
                    self.child_added()
                };
                let connection = signal.connect(move |added: Instance| {
                    let found = if matches(&added) {
                        Some(added)
                    } else if recursive {
                        // a whole subtree may arrive at once
                        added.get_descendants().into_iter().find(|node| matches(node))
                    } else {
                        None
                    };
                    if let Some(found) = found {
                        if let Some(sender) = sender.borrow_mut().take() {
                            let _ = sender.send(found);
                        }
                    }
                })?;
                Some((receiver, connection.scoped()))
            }
        };

        Ok(async move {
            if existing.is_some() {
                return existing;
            }
            let (receiver, _connection) = pending?;
            receive(receiver, timeout).await
        })
    }

    pub fn ancestry_changed(&self) -> Signal<(Instance, Option<Instance>)> {
        self.inner.events.ancestry_changed.signal()
    }

    /// Fires with the attribute name.
    pub fn attribute_changed(&self) -> Signal<String> {
        self.inner.events.attribute_changed.signal()
    }

    /// Fires with the property name.
    pub fn changed(&self) -> Signal<String> {
        self.inner.events.changed.signal()
    }

    pub fn child_added(&self) -> Signal<Instance> {
        self.inner.events.child_added.signal()
    }

    pub fn child_removed(&self) -> Signal<Instance> {
        self.inner.events.child_removed.signal()
    }

    pub fn descendant_added(&self) -> Signal<Instance> {
        self.inner.events.descendant_added.signal()
    }

    pub fn descendant_removing(&self) -> Signal<Instance> {
        self.inner.events.descendant_removing.signal()
    }

    pub fn destroying(&self) -> Signal<()> {
        self.inner.events.destroying.signal()
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Instance {}

impl Hash for Instance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class_name", &self.class_name())
            .field("name", &self.name())
            .field("id", &self.inner.id)
            .finish()
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.get_full_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn record<T: 'static>(sink: &Rc<RefCell<Vec<String>>>, tag: &'static str) -> impl Fn(T) + 'static {
        let sink = Rc::clone(sink);
        move |_| sink.borrow_mut().push(tag.to_owned())
    }

    fn recorder() -> (Rc<RefCell<Vec<String>>>, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        (Rc::clone(&log), log)
    }

    #[test]
    fn test_lineage_and_is_a() {
        let lineage = class_lineage("Part", &["BasePart", "Object3D"]);
        assert_eq!(lineage, vec!["Part", "BasePart", "Object3D", "Instance"]);
        let node = Instance::new("Folder");
        assert!(node.is_a("Folder"));
        assert!(node.is_a("Instance"));
        assert!(!node.is_a("Part"));
        assert_eq!(node.name(), "Folder");
    }

    #[test]
    fn test_unique_ids_differ() {
        assert_ne!(Instance::new("A").unique_id(), Instance::new("A").unique_id());
    }

    #[test]
    fn test_caches_follow_reparent() {
        let a = Instance::new("A");
        let b = Instance::new("B");
        let c = Instance::new("C");
        c.set_parent(Some(&b)).unwrap();
        b.set_parent(Some(&a)).unwrap();

        assert_eq!(a.get_descendants(), vec![b.clone(), c.clone()]);
        assert_eq!(c.get_full_name(), "A.B.C");
        assert_eq!(c.find_first_ancestor("A"), Some(a.clone()));
        assert!(a.is_ancestor_of(&c));
        assert!(c.is_descendant_of(&a));

        c.set_parent(Some(&a)).unwrap();
        assert_eq!(b.get_descendants(), Vec::<Instance>::new());
        assert_eq!(a.get_descendants(), vec![b.clone(), c.clone()]);
        assert_eq!(c.get_full_name(), "A.C");
    }

    #[test]
    fn test_rename_shows_in_full_name() {
        let a = Instance::new("A");
        let b = Instance::new("B");
        b.set_parent(Some(&a)).unwrap();
        a.set_name("Root").unwrap();
        assert_eq!(b.get_full_name(), "Root.B");
    }

    #[test]
    fn test_invalid_parents_rejected() {
        let a = Instance::new("A");
        let b = Instance::new("B");
        b.set_parent(Some(&a)).unwrap();
        assert_eq!(
            a.set_parent(Some(&a)),
            Err(InstanceError::ParentToSelf { name: "A".into() })
        );
        assert_eq!(
            a.set_parent(Some(&b)),
            Err(InstanceError::CyclicParent {
                name: "A".into(),
                parent: "B".into()
            })
        );
    }

    #[test]
    fn test_reparent_event_order() {
        let old_root = Instance::new("OldRoot");
        let old_parent = Instance::new("OldParent");
        let new_parent = Instance::new("NewParent");
        let node = Instance::new("Node");
        let child = Instance::new("Child");
        old_parent.set_parent(Some(&old_root)).unwrap();
        node.set_parent(Some(&old_parent)).unwrap();
        child.set_parent(Some(&node)).unwrap();

        let (sink, log) = recorder();
        old_parent.child_removed().connect(record(&sink, "child_removed")).unwrap();
        old_parent
            .descendant_removing()
            .connect(record(&sink, "removing:old_parent"))
            .unwrap();
        old_root
            .descendant_removing()
            .connect(record(&sink, "removing:old_root"))
            .unwrap();
        new_parent.child_added().connect(record(&sink, "child_added")).unwrap();
        node.changed().connect(record(&sink, "changed")).unwrap();
        node.ancestry_changed().connect(record(&sink, "ancestry:node")).unwrap();
        new_parent
            .descendant_added()
            .connect(record(&sink, "descendant_added"))
            .unwrap();
        child.ancestry_changed().connect(record(&sink, "ancestry:child")).unwrap();

        node.set_parent(Some(&new_parent)).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                "child_removed",
                "removing:old_parent",
                "removing:old_root",
                "child_added",
                "changed",
                "ancestry:node",
                "descendant_added",
                "ancestry:child",
            ]
        );
    }

    #[test]
    fn test_handlers_observe_updated_tree() {
        let a = Instance::new("A");
        let b = Instance::new("B");
        let seen = Rc::new(RefCell::new(String::new()));
        let sink = Rc::clone(&seen);
        let weak_b = b.downgrade();
        a.child_added()
            .connect(move |_| {
                if let Some(b) = weak_b.upgrade() {
                    *sink.borrow_mut() = b.get_full_name();
                }
            })
            .unwrap();
        b.set_parent(Some(&a)).unwrap();
        assert_eq!(*seen.borrow(), "A.B");
    }

    #[test]
    fn test_same_parent_is_noop() {
        let a = Instance::new("A");
        let b = Instance::new("B");
        b.set_parent(Some(&a)).unwrap();
        let count = Rc::new(Cell::new(0));
        let sink = Rc::clone(&count);
        a.child_added().connect(move |_| sink.set(sink.get() + 1)).unwrap();
        b.set_parent(Some(&a)).unwrap();
        assert_eq!(count.get(), 0);
        assert_eq!(a.get_children().len(), 1);
    }

    #[test]
    fn test_attributes() {
        let node = Instance::new("Node");
        let (sink, log) = recorder();
        node.attribute_changed()
            .connect(move |name| sink.borrow_mut().push(name))
            .unwrap();
        node.set_attribute("Health", 100).unwrap();
        assert_eq!(node.get_attribute("Health"), Some(AttributeValue::Number(100.0)));
        assert_eq!(node.get_attributes().len(), 1);
        assert_eq!(
            node.remove_attribute("Health").unwrap(),
            Some(AttributeValue::Number(100.0))
        );
        assert_eq!(node.remove_attribute("Health").unwrap(), None);
        assert_eq!(*log.borrow(), vec!["Health", "Health"]);
    }

    #[test]
    fn test_property_changed_signal() {
        let node = Instance::new("Node");
        let count = Rc::new(Cell::new(0));
        let sink = Rc::clone(&count);
        node.get_property_changed_signal("Name")
            .unwrap()
            .connect(move |_| sink.set(sink.get() + 1))
            .unwrap();
        node.set_name("Renamed").unwrap();
        node.set_name("Renamed").unwrap();
        node.set_parent(Some(&Instance::new("Other"))).unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_lookups() {
        let root = Instance::new("Root");
        let folder = Instance::new("Folder");
        let leaf = Instance::with_lineage(class_lineage("Leaf", &["Object3D"]), None);
        folder.set_parent(Some(&root)).unwrap();
        leaf.set_parent(Some(&folder)).unwrap();

        assert_eq!(root.find_first_child("Leaf", false), None);
        assert_eq!(root.find_first_child("Leaf", true), Some(leaf.clone()));
        assert_eq!(root.find_first_descendant_of_class("Leaf"), Some(leaf.clone()));
        assert_eq!(root.find_first_descendant_which_is_a("Object3D"), Some(leaf.clone()));
        assert_eq!(root.find_first_child_of_class("Folder", false), Some(folder.clone()));
        assert_eq!(leaf.find_first_ancestor_of_class("Root"), Some(root.clone()));
        assert_eq!(leaf.find_first_ancestor_which_is_a("Instance"), Some(folder.clone()));
    }

    #[test]
    fn test_destroy_releases_everything() {
        let parent = Instance::new("Parent");
        let node = Instance::new("Node");
        node.set_parent(Some(&parent)).unwrap();
        let destroying = Rc::new(Cell::new(false));
        let flag = Rc::clone(&destroying);
        node.destroying().connect(move |_| flag.set(true)).unwrap();
        let signal = node.changed();

        node.destroy();
        node.destroy();
        assert!(destroying.get());
        assert!(node.is_destroyed());
        assert!(parent.get_children().is_empty());
        assert!(node.parent().is_none());
        assert!(signal.is_destroyed());
        assert!(matches!(
            node.set_name("x"),
            Err(InstanceError::Destroyed { .. })
        ));
        assert!(parent.set_parent(Some(&node)).is_err());
        assert!(node.get_property_changed_signal("Name").is_err());
    }

    #[test]
    fn test_clear_all_children() {
        let root = Instance::new("Root");
        let a = Instance::new("A");
        let b = Instance::new("B");
        a.set_parent(Some(&root)).unwrap();
        b.set_parent(Some(&a)).unwrap();
        root.clear_all_children().unwrap();
        assert!(root.get_descendants().is_empty());
        assert!(a.is_destroyed() && b.is_destroyed());
    }
}
