//! Message bus delivery guarantees

use lexdraft::realtime::{MessageBus, Subscription};
use lexdraft::shared::{InboundMessage, SharedError};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

fn error(text: &str) -> InboundMessage {
    InboundMessage::Error {
        message: text.to_string(),
    }
}

fn text_of(message: &InboundMessage) -> String {
    match message {
        InboundMessage::Error { message } => message.clone(),
        other => other.kind().to_string(),
    }
}

#[test]
fn test_unsubscribe_mid_dispatch() {
    let bus = MessageBus::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

    let killer_log = log.clone();
    let killer_victim = victim.clone();
    let _killer = bus.subscribe(move |message| {
        killer_log.borrow_mut().push(format!("killer:{}", text_of(message)));
        killer_victim.borrow_mut().take();
        Ok(())
    });

    let victim_log = log.clone();
    *victim.borrow_mut() = Some(bus.subscribe(move |message| {
        victim_log.borrow_mut().push(format!("victim:{}", text_of(message)));
        Ok(())
    }));

    let bystander_log = log.clone();
    let _bystander = bus.subscribe(move |message| {
        bystander_log
            .borrow_mut()
            .push(format!("bystander:{}", text_of(message)));
        Ok(())
    });

    bus.publish(error("one"));
    bus.publish(error("two"));

    assert_eq!(
        *log.borrow(),
        vec!["killer:one", "bystander:one", "killer:two", "bystander:two"]
    );
    assert_eq!(bus.listener_count(), 2);
}

#[test]
fn test_listener_failure_does_not_corrupt_registry() {
    let bus = MessageBus::new();
    let seen = Rc::new(RefCell::new(0));

    let _failing = bus.subscribe(|message| match message {
        InboundMessage::Error { .. } => Err(SharedError::message("cannot handle errors")),
        _ => Ok(()),
    });
    let counter = seen.clone();
    let _counting = bus.subscribe(move |_| {
        *counter.borrow_mut() += 1;
        Ok(())
    });

    assert_eq!(bus.publish(error("x")), 1);
    assert_eq!(bus.publish(InboundMessage::Unknown), 2);
    assert_eq!(*seen.borrow(), 2);

    let _late = bus.subscribe(|_| Ok(()));
    assert_eq!(bus.listener_count(), 3);
}

#[test]
fn test_arrival_order_is_preserved() {
    let bus = MessageBus::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    let _listener = bus.subscribe(move |message| {
        sink.borrow_mut().push(text_of(message));
        Ok(())
    });

    for n in 0..50 {
        bus.publish(error(&n.to_string()));
    }
    let expected: Vec<String> = (0..50).map(|n| n.to_string()).collect();
    assert_eq!(*log.borrow(), expected);
}

#[test]
fn test_handles_share_one_registry() {
    let bus = MessageBus::new();
    let other = bus.clone();
    let _listener = other.subscribe(|_| Ok(()));
    assert_eq!(bus.listener_count(), 1);
    assert_eq!(bus.publish(InboundMessage::Unknown), 1);
}

#[test]
fn test_subscription_outliving_bus() {
    let bus = MessageBus::new();
    let subscription = bus.subscribe(|_| Ok(()));
    drop(bus);
    assert!(!subscription.is_active());
    subscription.unsubscribe();
}
