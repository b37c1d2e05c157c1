//! End-to-end scenarios through `Core::handle`.

mod common;

use common::{chat, click, core_with_surface, deliver, Recorder};
use realmkit::delay::{DelayBuilder, DelayState, Trigger};
use realmkit::event::{ClickAction, Disposition, EntityId, Event};
use realmkit::menu::{Menu, MenuItem, Visual};

#[test]
fn replaced_chat_request_only_calls_latest() {
    let (core, _surface) = core_with_surface();
    let e = EntityId::new();
    let c1 = Recorder::<String>::new();
    let c2 = Recorder::<String>::new();
    let r1 = c1.clone();
    core.chat().request_input(e, move |reply| r1.push(reply));
    let r2 = c2.clone();
    core.chat().request_input(e, move |reply| r2.push(reply));

    assert_eq!(core.handle(&chat(e, "hello")), Disposition::Cancel);
    assert_eq!(c2.calls(), vec!["hello".to_string()]);
    assert!(c1.calls().is_empty());
}

#[test]
fn damage_after_two_ticks_cancels_three_tick_delay() {
    let (core, _surface) = core_with_surface();
    let e = EntityId::new();
    let done = Recorder::<EntityId>::new();
    let cancelled = Recorder::<EntityId>::new();
    let (d, c) = (done.clone(), cancelled.clone());
    let handle = core.delays().start(
        DelayBuilder::new(e)
            .ticks(3)
            .cancel_on(Trigger::Damage)
            .on_success(move |who| d.push(who))
            .on_cancel(move |who| c.push(who))
            .build()
            .expect("task"),
    );
    core.handle(&Event::Tick);
    core.handle(&Event::Tick);
    core.handle(&Event::Damage {
        entity: e,
        amount: 3.5,
    });
    core.handle(&Event::Tick);

    assert_eq!(handle.state(), DelayState::Cancelled);
    assert_eq!(cancelled.count(), 1);
    assert_eq!(done.count(), 0);
    let snap = core.metrics();
    assert_eq!(snap.delays_started, 1);
    assert_eq!(snap.delays_cancelled, 1);
    assert_eq!(snap.delays_completed, 0);
}

#[test]
fn menu_button_at_five_empty_six() {
    let (core, surface) = core_with_surface();
    let e = EntityId::new();
    let slots = Recorder::<usize>::new();
    let s = slots.clone();
    let menu = Menu::builder("Menu M")
        .rows(1)
        .item(
            5,
            MenuItem::button(Visual::new("emerald"), move |ctx| s.push(ctx.slot())),
        )
        .build()
        .expect("menu");
    let m = core.menus().open(e, menu).expect("open");

    let six = deliver(&core, &surface, click(e, m, Some(m), 6, ClickAction::Pickup));
    assert_eq!(six, Disposition::Cancel);
    assert!(slots.calls().is_empty());

    let five = deliver(&core, &surface, click(e, m, Some(m), 5, ClickAction::Pickup));
    assert_eq!(five, Disposition::Cancel);
    assert_eq!(slots.calls(), vec![5]);
}

#[test]
fn button_starts_a_cooldown_guarded_teleport() {
    let (core, surface) = core_with_surface();
    let e = EntityId::new();
    let teleports = Recorder::<EntityId>::new();
    let t = teleports.clone();
    let menu = Menu::builder("Homes")
        .rows(1)
        .item(
            0,
            MenuItem::button(Visual::new("bed"), move |ctx| {
                let who = ctx.entity();
                if ctx.cooldowns().in_cooldown(who, "home") || ctx.delays().has_pending(who) {
                    return;
                }
                let t = t.clone();
                let task = ctx
                    .delays()
                    .builder(who)
                    .ticks(2)
                    .cancel_on(Trigger::Damage)
                    .on_success(move |who| t.push(who))
                    .build()
                    .expect("task");
                ctx.delays().start(task);
                ctx.cooldowns()
                    .set(who, "home", std::time::Duration::from_secs(30));
                ctx.close_menu();
            }),
        )
        .build()
        .expect("menu");
    let m = core.menus().open(e, menu).expect("open");
    deliver(&core, &surface, click(e, m, Some(m), 0, ClickAction::Pickup));
    assert!(core.delays().has_pending(e));
    assert!(core.cooldowns().in_cooldown(e, "home"));
    assert!(core.menus().menu_for(e).is_none());

    core.handle(&Event::Tick);
    core.handle(&Event::Tick);
    assert_eq!(teleports.calls(), vec![e]);
}

#[test]
fn unrelated_events_pass_through() {
    let (core, _surface) = core_with_surface();
    let e = EntityId::new();
    for event in [
        Event::Join { entity: e },
        chat(e, "hi"),
        Event::Damage {
            entity: e,
            amount: 1.0,
        },
        Event::Tick,
        Event::Leave { entity: e },
    ] {
        assert_eq!(core.handle(&event), Disposition::Pass, "{}", event.kind());
    }
}
