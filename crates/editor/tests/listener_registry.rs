use std::cell::RefCell;
use std::rc::Rc;

use simple_prose::{Listeners, UPDATE};

#[test]
fn handlers_fire_in_registration_order() {
    let listeners: Listeners<u32> = Listeners::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    for name in ["one", "two", "three"] {
        let log = Rc::clone(&log);
        listeners.add(UPDATE, move |value: &u32| {
            log.borrow_mut().push(format!("{name}:{value}"));
        });
    }
    listeners.trigger(UPDATE, &7);
    assert_eq!(*log.borrow(), vec!["one:7", "two:7", "three:7"]);
}

#[test]
fn handlers_added_mid_trigger_wait_for_the_next_pass() {
    let listeners: Rc<Listeners<u32>> = Rc::new(Listeners::new());
    let log = Rc::new(RefCell::new(Vec::new()));

    let registry = Rc::clone(&listeners);
    let outer_log = Rc::clone(&log);
    listeners.add(UPDATE, move |value: &u32| {
        outer_log.borrow_mut().push(format!("outer:{value}"));
        let inner_log = Rc::clone(&outer_log);
        registry.add(UPDATE, move |value: &u32| {
            inner_log.borrow_mut().push(format!("inner:{value}"));
        });
    });

    listeners.trigger(UPDATE, &1);
    assert_eq!(*log.borrow(), vec!["outer:1"]);

    listeners.trigger(UPDATE, &2);
    assert_eq!(*log.borrow(), vec!["outer:1", "outer:2", "inner:2"]);
}

#[test]
fn removed_handlers_stop_firing() {
    let listeners: Listeners<u32> = Listeners::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    let keep_log = Rc::clone(&log);
    listeners.add(UPDATE, move |value: &u32| {
        keep_log.borrow_mut().push(format!("keep:{value}"));
    });
    let drop_log = Rc::clone(&log);
    let id = listeners.add(UPDATE, move |value: &u32| {
        drop_log.borrow_mut().push(format!("drop:{value}"));
    });
    assert_eq!(listeners.count(UPDATE), 2);

    assert!(listeners.remove(UPDATE, id));
    assert!(!listeners.remove(UPDATE, id));
    assert_eq!(listeners.count(UPDATE), 1);

    listeners.trigger(UPDATE, &5);
    assert_eq!(*log.borrow(), vec!["keep:5"]);
}

#[test]
fn events_are_isolated_by_name() {
    let listeners: Listeners<u32> = Listeners::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    let update_log = Rc::clone(&log);
    listeners.add(UPDATE, move |value: &u32| {
        update_log.borrow_mut().push(format!("update:{value}"));
    });
    let focus_log = Rc::clone(&log);
    listeners.add("focus", move |value: &u32| {
        focus_log.borrow_mut().push(format!("focus:{value}"));
    });

    listeners.trigger("focus", &3);
    assert_eq!(*log.borrow(), vec!["focus:3"]);
    assert_eq!(listeners.count(UPDATE), 1);
    assert_eq!(listeners.count("focus"), 1);
    assert_eq!(listeners.count("blur"), 0);
}
