//! Integration tests for the document tree engine

use std::cell::RefCell;
use std::rc::Rc;

use manuscript_aom::{Aom, ArticleMeta, Event, EventKind, Kind};

fn article_with_chain(aom: &mut Aom, depth: usize) -> (String, Vec<String>) {
    let article = aom.build(Kind::Article(ArticleMeta::default()));
    let mut chain = Vec::new();
    let mut parent = article.clone();
    for _ in 0..depth {
        let node = aom.build(Kind::Node);
        aom.append_children(&parent, &[node.clone()]).unwrap();
        chain.push(node.clone());
        parent = node;
    }
    (article, chain)
}

#[test]
fn child_event_chain_reaches_the_root() {
    // appending four levels deep fires the root's childEvent listener
    // exactly once, with three nested childEvent wrappers terminating in
    // the original appendChild event
    let mut aom = Aom::new();
    let (article, chain) = article_with_chain(&mut aom, 3);
    let deepest = chain[2].clone();

    let received: Rc<RefCell<Vec<Event>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = received.clone();
    aom.add_event_listener(
        &article,
        EventKind::ChildEvent,
        Rc::new(move |_, event: &Event| {
            sink.borrow_mut().push(event.clone());
        }),
    )
    .unwrap();

    let leaf = aom.build(Kind::Text {
        text: "leaf".into(),
    });
    aom.append_children(&deepest, &[leaf]).unwrap();

    let events = received.borrow();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.kind, EventKind::ChildEvent);
    assert_eq!(event.depth(), 3);
    let original = event.original();
    assert_eq!(original.kind, EventKind::AppendChild);
    assert_eq!(original.target, deepest);
}

#[test]
fn intermediate_nodes_see_their_own_wrapping() {
    let mut aom = Aom::new();
    let (article, chain) = article_with_chain(&mut aom, 2);

    let depths: Rc<RefCell<Vec<(String, usize)>>> = Rc::new(RefCell::new(Vec::new()));
    for id in chain.iter().chain([&article]) {
        let sink = depths.clone();
        let listener_id = id.clone();
        aom.add_event_listener(
            id,
            EventKind::ChildEvent,
            Rc::new(move |_, event: &Event| {
                sink.borrow_mut().push((listener_id.clone(), event.depth()));
            }),
        )
        .unwrap();
    }

    let leaf = aom.build(Kind::Node);
    aom.append_children(&chain[1], &[leaf]).unwrap();

    // chain[1] gets the original event (AppendChild, not ChildEvent);
    // chain[0] sees one wrapper, the article two
    assert_eq!(
        &*depths.borrow(),
        &[(chain[0].clone(), 1), (article.clone(), 2)]
    );
}

#[test]
fn readonly_rejects_mutation_everywhere_beneath_the_root() {
    let mut aom = Aom::new();
    let (article, chain) = article_with_chain(&mut aom, 3);

    aom.set_readonly(&article, true).unwrap();
    let snapshot = aom.serialise(&article).unwrap();

    let orphan = aom.build(Kind::Paragraph);
    for target in chain.iter().chain([&article]) {
        let err = aom
            .append_children(target, std::slice::from_ref(&orphan))
            .unwrap_err();
        assert!(matches!(
            err,
            manuscript_aom::AomError::ReadonlyViolation { .. }
        ));
    }

    // deep before/after comparison: nothing changed anywhere
    assert_eq!(aom.serialise(&article).unwrap(), snapshot);
}

#[test]
fn id_collision_leaves_first_registration_intact() {
    let mut aom = Aom::new();
    aom.build_with_id(Kind::Text { text: "one".into() }, "shared").unwrap();
    let err = aom
        .build_with_id(Kind::Text { text: "two".into() }, "shared")
        .unwrap_err();
    assert!(matches!(err, manuscript_aom::AomError::IdCollision { .. }));
    assert_eq!(
        aom.kind("shared").unwrap(),
        &Kind::Text { text: "one".into() }
    );
}

#[test]
fn detached_subtree_is_fully_deregistered_and_restorable() {
    let mut aom = Aom::new();
    let parent = aom.build(Kind::Document);
    let section = aom.build(Kind::Section { title: "S".into() });
    let para = aom.build(Kind::Paragraph);
    let text = aom.build(Kind::Text { text: "t".into() });
    aom.append_children(&para, &[text.clone()]).unwrap();
    aom.append_children(&section, &[para.clone()]).unwrap();
    aom.append_children(&parent, &[section.clone()]).unwrap();

    let registered_before = aom.len();
    let detached = aom.remove_child(&parent, &section).unwrap();

    // the whole subtree left the index
    assert_eq!(aom.len(), registered_before - 3);
    assert!(!aom.contains(&section));
    assert!(!aom.contains(&para));
    assert!(!aom.contains(&text));
    assert_eq!(detached.ids().len(), 3);

    // and comes back wholesale
    let restored = aom.restore(detached).unwrap();
    assert_eq!(restored, section);
    assert_eq!(aom.len(), registered_before);
    assert!(aom.contains(&text));
    aom.append_children(&parent, &[restored]).unwrap();
    assert_eq!(aom.parent(&section), Some(parent));
}

#[test]
fn splice_returns_removed_children_in_order() {
    let mut aom = Aom::new();
    let parent = aom.build(Kind::Paragraph);
    let children: Vec<String> = (0..5)
        .map(|i| {
            aom.build(Kind::Text {
                text: format!("c{i}"),
            })
        })
        .collect();
    aom.append_children(&parent, &children).unwrap();

    let a = aom.build(Kind::Text { text: "a".into() });
    let b = aom.build(Kind::Text { text: "b".into() });
    let removed = aom
        .splice_children(&parent, 1, Some(2), &[a.clone(), b.clone()])
        .unwrap();

    assert_eq!(
        removed.iter().map(|d| d.id.clone()).collect::<Vec<_>>(),
        vec![children[1].clone(), children[2].clone()]
    );
    assert_eq!(
        aom.children(&parent).unwrap().to_vec(),
        vec![
            children[0].clone(),
            a,
            b,
            children[3].clone(),
            children[4].clone()
        ]
    );
}

#[test]
fn splice_dispatches_one_event_for_the_whole_operation() {
    let mut aom = Aom::new();
    let parent = aom.build(Kind::Paragraph);
    let children: Vec<String> = (0..3)
        .map(|i| {
            aom.build(Kind::Text {
                text: format!("c{i}"),
            })
        })
        .collect();
    aom.append_children(&parent, &children).unwrap();

    let count = Rc::new(RefCell::new(0usize));
    let sink = count.clone();
    aom.add_event_listener(
        &parent,
        EventKind::SpliceChildren,
        Rc::new(move |_, event: &Event| {
            *sink.borrow_mut() += 1;
            match &event.payload {
                manuscript_aom::EventPayload::Splice { start, removed, inserted } => {
                    assert_eq!(*start, 0);
                    assert_eq!(removed.len(), 2);
                    assert!(inserted.is_empty());
                }
                other => panic!("unexpected payload {other:?}"),
            }
        }),
    )
    .unwrap();

    aom.splice_children(&parent, 0, Some(2), &[]).unwrap();
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn listeners_survive_detach_and_restore() {
    let mut aom = Aom::new();
    let parent = aom.build(Kind::Paragraph);
    let child = aom.build(Kind::Node);
    aom.append_children(&parent, &[child.clone()]).unwrap();

    let fired = Rc::new(RefCell::new(0usize));
    let sink = fired.clone();
    aom.add_event_listener(
        &child,
        EventKind::AppendChild,
        Rc::new(move |_, _| {
            *sink.borrow_mut() += 1;
        }),
    )
    .unwrap();

    let detached = aom.remove_child(&parent, &child).unwrap();
    let restored = aom.restore(detached).unwrap();

    let leaf = aom.build(Kind::Node);
    aom.append_children(&restored, &[leaf]).unwrap();
    assert_eq!(*fired.borrow(), 1);
}
