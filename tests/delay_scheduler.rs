//! Delay tasks: exactly one terminal state, trigger filtering, chat trigger wiring.

mod common;

use common::{chat, core_with_surface, step, Recorder};
use realmkit::delay::{DelayBuilder, DelayState, Trigger};
use realmkit::event::{Disposition, EntityId, Event, Position};

#[test]
fn damage_cancels_before_completion() {
    let (core, _surface) = core_with_surface();
    let e = EntityId::new();
    let success = Recorder::<EntityId>::new();
    let cancel = Recorder::<EntityId>::new();
    let (s, c) = (success.clone(), cancel.clone());
    let handle = core.delays().start(
        DelayBuilder::new(e)
            .ticks(3)
            .cancel_on(Trigger::Damage)
            .on_success(move |who| s.push(who))
            .on_cancel(move |who| c.push(who))
            .build()
            .expect("task"),
    );

    core.handle(&Event::Tick);
    core.handle(&Event::Tick);
    core.handle(&Event::Damage {
        entity: e,
        amount: 2.0,
    });
    assert_eq!(handle.state(), DelayState::Cancelled);
    assert_eq!(cancel.calls(), vec![e]);

    core.handle(&Event::Tick);
    core.handle(&Event::Tick);
    assert_eq!(handle.state(), DelayState::Cancelled);
    assert_eq!(success.count(), 0);
    assert_eq!(cancel.count(), 1);
    assert_eq!(core.delays().pending_count(), 0);
}

#[test]
fn completes_after_duration() {
    let (core, _surface) = core_with_surface();
    let e = EntityId::new();
    let success = Recorder::<EntityId>::new();
    let s = success.clone();
    let handle = core.delays().start(
        DelayBuilder::new(e)
            .ticks(2)
            .on_success(move |who| s.push(who))
            .build()
            .expect("task"),
    );
    core.handle(&Event::Tick);
    assert_eq!(handle.state(), DelayState::Scheduled);
    assert_eq!(core.delays().remaining(handle.id()), Some(1));
    core.handle(&Event::Tick);
    assert_eq!(handle.state(), DelayState::Completed);
    assert_eq!(success.calls(), vec![e]);

    // Late triggers and cancels are no-ops.
    assert!(!handle.cancel());
    core.handle(&Event::Leave { entity: e });
    assert_eq!(handle.state(), DelayState::Completed);
    assert_eq!(success.count(), 1);
}

#[test]
fn unconfigured_trigger_has_no_effect() {
    let (core, _surface) = core_with_surface();
    let e = EntityId::new();
    let handle = core.delays().start(
        DelayBuilder::new(e)
            .ticks(5)
            .cancel_on(Trigger::Damage)
            .build()
            .expect("task"),
    );
    core.handle(&chat(e, "hi"));
    core.handle(&step(e, (0.0, 64.0, 0.0), (20.0, 64.0, 0.0)));
    core.handle(&Event::WorldChange {
        entity: e,
        from: "world".into(),
        to: "nether".into(),
    });
    core.handle(&Event::Leave { entity: e });
    assert_eq!(handle.state(), DelayState::Scheduled);
    assert!(core.delays().has_pending(e));
}

#[test]
fn chat_trigger_cancels_without_suppressing() {
    let (core, _surface) = core_with_surface();
    let e = EntityId::new();
    let cancel = Recorder::<EntityId>::new();
    let c = cancel.clone();
    let handle = core.delays().start(
        DelayBuilder::new(e)
            .ticks(10)
            .cancel_on(Trigger::Chat)
            .on_cancel(move |who| c.push(who))
            .build()
            .expect("task"),
    );
    // No pending chat request, so the message is still broadcast.
    assert_eq!(core.handle(&chat(e, "wait")), Disposition::Pass);
    assert_eq!(handle.state(), DelayState::Cancelled);
    assert_eq!(cancel.count(), 1);
    core.handle(&chat(e, "again"));
    assert_eq!(cancel.count(), 1);
}

#[test]
fn completed_task_drops_its_chat_subscription() {
    let (core, _surface) = core_with_surface();
    let e = EntityId::new();
    let cancel = Recorder::<EntityId>::new();
    let c = cancel.clone();
    let handle = core.delays().start(
        DelayBuilder::new(e)
            .ticks(1)
            .cancel_on(Trigger::Chat)
            .on_cancel(move |who| c.push(who))
            .build()
            .expect("task"),
    );
    core.handle(&Event::Tick);
    assert_eq!(handle.state(), DelayState::Completed);
    core.handle(&chat(e, "after"));
    assert_eq!(cancel.count(), 0);
    assert_eq!(handle.state(), DelayState::Completed);
}

#[test]
fn chat_trigger_and_chat_request_coexist() {
    let (core, _surface) = core_with_surface();
    let e = EntityId::new();
    let replies = Recorder::<String>::new();
    let r = replies.clone();
    core.chat().request_input(e, move |reply| r.push(reply));
    let handle = core.delays().start(
        DelayBuilder::new(e)
            .ticks(10)
            .cancel_on(Trigger::Chat)
            .build()
            .expect("task"),
    );
    assert_eq!(core.handle(&chat(e, "yes")), Disposition::Cancel);
    assert_eq!(replies.calls(), vec!["yes".to_string()]);
    assert_eq!(handle.state(), DelayState::Cancelled);
}

#[test]
fn chat_trigger_survives_leave_and_rejoin() {
    let (core, _surface) = core_with_surface();
    let e = EntityId::new();
    let cancel = Recorder::<EntityId>::new();
    let c = cancel.clone();
    let handle = core.delays().start(
        DelayBuilder::new(e)
            .ticks(10)
            .triggers([Trigger::Chat])
            .on_cancel(move |who| c.push(who))
            .build()
            .expect("task"),
    );
    core.handle(&Event::Leave { entity: e });
    core.handle(&Event::Join { entity: e });
    assert_eq!(handle.state(), DelayState::Scheduled);

    core.handle(&chat(e, "back"));
    assert_eq!(handle.state(), DelayState::Cancelled);
    assert_eq!(cancel.calls(), vec![e]);
}

#[test]
fn movement_measured_from_first_position() {
    let (core, _surface) = core_with_surface();
    let e = EntityId::new();
    let handle = core.delays().start(
        DelayBuilder::new(e)
            .ticks(10)
            .cancel_on(Trigger::Movement)
            .build()
            .expect("task"),
    );
    // Small steps that never stray more than one block from the first `from`.
    core.handle(&step(e, (0.0, 64.0, 0.0), (0.4, 64.0, 0.0)));
    core.handle(&step(e, (0.4, 64.0, 0.0), (0.8, 64.0, 0.0)));
    core.handle(&step(e, (0.8, 64.0, 0.0), (0.2, 64.0, 0.3)));
    assert_eq!(handle.state(), DelayState::Scheduled);
    core.handle(&step(e, (0.2, 64.0, 0.3), (1.5, 64.0, 0.0)));
    assert_eq!(handle.state(), DelayState::Cancelled);
}

#[test]
fn movement_into_other_world_cancels() {
    let (core, _surface) = core_with_surface();
    let e = EntityId::new();
    let handle = core.delays().start(
        DelayBuilder::new(e)
            .ticks(10)
            .cancel_on(Trigger::Movement)
            .origin(Position::new("world", 0.0, 64.0, 0.0))
            .build()
            .expect("task"),
    );
    core.handle(&Event::Move {
        entity: e,
        from: Position::new("world", 0.0, 64.0, 0.0),
        to: Position::new("nether", 0.0, 64.0, 0.0),
    });
    assert_eq!(handle.state(), DelayState::Cancelled);
}

#[test]
fn default_builder_cancels_on_disconnect() {
    let (core, _surface) = core_with_surface();
    let e = EntityId::new();
    let cancel = Recorder::<EntityId>::new();
    let c = cancel.clone();
    let task = core
        .delays()
        .builder(e)
        .ticks(20)
        .on_cancel(move |who| c.push(who))
        .build()
        .expect("task");
    assert!(task.triggers().contains(&Trigger::Disconnect));
    let handle = core.delays().start(task);
    core.handle(&Event::Leave { entity: e });
    assert_eq!(handle.state(), DelayState::Cancelled);
    assert_eq!(cancel.calls(), vec![e]);
}

#[test]
fn multiple_tasks_per_entity_are_independent() {
    let (core, _surface) = core_with_surface();
    let e = EntityId::new();
    let damage_only = core.delays().start(
        DelayBuilder::new(e)
            .ticks(5)
            .cancel_on(Trigger::Damage)
            .build()
            .expect("task"),
    );
    let world_only = core.delays().start(
        DelayBuilder::new(e)
            .ticks(5)
            .cancel_on(Trigger::WorldChange)
            .build()
            .expect("task"),
    );
    assert_eq!(
        core.delays().tasks_for(e),
        vec![damage_only.id(), world_only.id()]
    );
    core.handle(&Event::Damage {
        entity: e,
        amount: 1.0,
    });
    assert_eq!(damage_only.state(), DelayState::Cancelled);
    assert_eq!(world_only.state(), DelayState::Scheduled);
    assert_eq!(core.delays().tasks_for(e), vec![world_only.id()]);
}

#[test]
fn other_entities_are_unaffected() {
    let (core, _surface) = core_with_surface();
    let a = EntityId::new();
    let b = EntityId::new();
    let handle = core.delays().start(
        DelayBuilder::new(a)
            .ticks(5)
            .cancel_on(Trigger::Damage)
            .build()
            .expect("task"),
    );
    core.handle(&Event::Damage {
        entity: b,
        amount: 4.0,
    });
    assert_eq!(handle.state(), DelayState::Scheduled);
}

#[test]
fn racing_cancels_fire_once() {
    let (core, _surface) = core_with_surface();
    let core = std::sync::Arc::new(core);
    for _ in 0..50 {
        let e = EntityId::new();
        let success = Recorder::<EntityId>::new();
        let cancel = Recorder::<EntityId>::new();
        let (s, c) = (success.clone(), cancel.clone());
        let handle = core.delays().start(
            DelayBuilder::new(e)
                .ticks(1)
                .cancel_on(Trigger::Chat)
                .on_success(move |who| s.push(who))
                .on_cancel(move |who| c.push(who))
                .build()
                .expect("task"),
        );
        let chat_core = core.clone();
        let chatter = std::thread::spawn(move || {
            chat_core.handle(&chat(e, "now"));
        });
        core.handle(&Event::Tick);
        chatter.join().expect("thread");
        assert_eq!(success.count() + cancel.count(), 1);
        assert!(handle.state().is_terminal());
    }
}
