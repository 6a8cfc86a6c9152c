use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use framekit::prelude::*;

fn named(class_name: &str, name: &str) -> anyhow::Result<Instance> {
    let node = Instance::new(class_name);
    node.set_name(name)?;
    Ok(node)
}

#[test]
fn test_parent_and_unparent() -> anyhow::Result<()> {
    let a = named("Folder", "A")?;
    let b = named("Folder", "B")?;
    b.set_parent(Some(&a))?;
    assert!(a.get_descendants().contains(&b));
    assert_eq!(b.get_full_name(), "A.B");

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let _removed = a
        .child_removed()
        .connect(move |child: Instance| sink.borrow_mut().push(format!("ChildRemoved {}", child.name())))?
        .scoped();
    let sink = Rc::clone(&events);
    let _removing = a
        .descendant_removing()
        .connect(move |node: Instance| sink.borrow_mut().push(format!("DescendantRemoving {}", node.name())))?
        .scoped();

    b.set_parent(None)?;
    assert!(a.get_descendants().is_empty());
    assert_eq!(b.get_full_name(), "B");
    assert_eq!(
        *events.borrow(),
        vec!["ChildRemoved B".to_owned(), "DescendantRemoving B".to_owned()]
    );
    Ok(())
}

#[test]
fn test_destroy_chain_makes_every_node_inert() -> anyhow::Result<()> {
    let a = named("Folder", "A")?;
    let b = named("Folder", "B")?;
    let c = named("Folder", "C")?;
    b.set_parent(Some(&a))?;
    c.set_parent(Some(&b))?;

    a.destroy();
    for node in [&a, &b, &c] {
        assert!(node.is_destroyed());
        assert!(matches!(
            node.set_attribute("Health", 10),
            Err(InstanceError::Destroyed { .. })
        ));
    }
    assert!(a.child_added().connect(|_| {}).is_err());
    Ok(())
}

#[test]
fn test_parenting_to_self_fails() {
    let a = Instance::new("Folder");
    assert!(matches!(
        a.set_parent(Some(&a)),
        Err(InstanceError::ParentToSelf { .. })
    ));
}

#[test]
fn test_parts_in_a_scene() -> anyhow::Result<()> {
    let scene = Scene::new()?;
    let model = Object3D::new("Model");
    let part = Part::new();
    part.set_size((2.0, 2.0, 2.0))?;
    part.set_parent(Some(model.instance()))?;
    scene.add(&model)?;

    let parts = scene.parts();
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].size(), Vector3::new(2.0, 2.0, 2.0));
    assert_eq!(
        scene.workspace().find_first_descendant_which_is_a("BasePart"),
        Some(part.instance().clone())
    );
    assert!(scene.camera_uniform().is_ok());
    Ok(())
}

#[tokio::test]
async fn test_wait_for_child_resolves_when_added() -> anyhow::Result<()> {
    let parent = Instance::new("Folder");
    let pending = parent.wait_for_child("Target", false, Some(Duration::from_secs(1)))?;
    let child = named("Folder", "Target")?;
    child.set_parent(Some(&parent))?;
    assert_eq!(pending.await, Some(child));
    Ok(())
}

#[tokio::test]
async fn test_recursive_wait_sees_nested_arrivals() -> anyhow::Result<()> {
    let root = Instance::new("Folder");
    let pending = root.wait_for_child_which_is_a("BasePart", true, Some(Duration::from_secs(1)))?;

    let model = Object3D::new("Model");
    let part = Part::new();
    part.set_parent(Some(model.instance()))?;
    model.set_parent(Some(&root))?;
    assert_eq!(pending.await, Some(part.instance().clone()));
    Ok(())
}

#[tokio::test]
async fn test_wait_for_child_times_out() -> anyhow::Result<()> {
    let parent = Instance::new("Folder");
    let pending = parent.wait_for_child_of_class("Part", false, Some(Duration::from_millis(20)))?;
    assert_eq!(pending.await, None);
    Ok(())
}

#[tokio::test]
async fn test_existing_child_resolves_immediately() -> anyhow::Result<()> {
    let parent = Instance::new("Folder");
    let child = named("Folder", "Here")?;
    child.set_parent(Some(&parent))?;
    let found = parent.wait_for_child("Here", false, None)?.await;
    assert_eq!(found, Some(child));
    Ok(())
}
