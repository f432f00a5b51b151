//! Integration tests for snapshot export/import round-trips.

use habitgrid_core::model::{Calendar, Habit};
use habitgrid_core::snapshot::{export, import};
use habitgrid_core::{HabitDb, Identity, Snapshot};

fn seed_fitness(db: &HabitDb, caller: &Identity) -> (Calendar, Habit) {
    let cal = Calendar::new(caller.user_id(), "Fitness", "red").with_position(1);
    db.create_calendar(caller, &cal).unwrap();
    let habit = Habit::new(caller.user_id(), &cal.id, "Run").with_position(1);
    db.create_habit(caller, &habit).unwrap();
    (cal, habit)
}

#[test]
fn export_matches_the_documented_shape() {
    let db = HabitDb::open_memory().unwrap();
    let me = Identity::new("user-1").unwrap();
    let (_, habit) = seed_fitness(&db, &me);
    let t1 = 1_700_000_000_000;
    let t2 = 1_700_086_400_000;
    db.mark_completion(&me, &habit.id, t1).unwrap();
    db.mark_completion(&me, &habit.id, t2).unwrap();

    let snapshot = export(&db, &me).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "calendars": [{
                "name": "Fitness",
                "colorTheme": "red",
                "position": 1,
                "habits": [{
                    "name": "Run",
                    "position": 1,
                    "completions": [
                        {"completedAt": t1},
                        {"completedAt": t2}
                    ]
                }]
            }]
        })
    );
}

#[test]
fn reimport_into_same_account_does_not_grow_the_store() {
    let db = HabitDb::open_memory().unwrap();
    let me = Identity::new("user-1").unwrap();
    let (cal, habit) = seed_fitness(&db, &me);
    db.mark_completion(&me, &habit.id, 1000).unwrap();
    db.mark_completion(&me, &habit.id, 2000).unwrap();

    let snapshot = export(&db, &me).unwrap();
    import(&db, &me, &snapshot).unwrap();

    let cals = db.list_calendars(&me).unwrap();
    assert_eq!(cals.len(), 1);
    assert_eq!(cals[0].id, cal.id);
    let habits = db.list_habits(&me, Some(&cal.id)).unwrap();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0].id, habit.id);
    assert_eq!(
        db.list_habit_completions(&me, &habit.id).unwrap().len(),
        2
    );
}

#[test]
fn roundtrip_into_empty_account_reproduces_the_graph() {
    let db = HabitDb::open_memory().unwrap();
    let alice = Identity::new("alice").unwrap();
    let bob = Identity::new("bob").unwrap();

    let fitness = Calendar::new(alice.user_id(), "Fitness", "red").with_position(1);
    db.create_calendar(&alice, &fitness).unwrap();
    let mind = Calendar::new(alice.user_id(), "Mind", "violet").with_position(2);
    db.create_calendar(&alice, &mind).unwrap();
    let run = Habit::new(alice.user_id(), &fitness.id, "Run").with_position(1);
    db.create_habit(&alice, &run).unwrap();
    let meditate = Habit::new(alice.user_id(), &mind.id, "Meditate")
        .with_position(1)
        .with_timer(10);
    db.create_habit(&alice, &meditate).unwrap();
    db.mark_completion(&alice, &run.id, 1000).unwrap();
    db.mark_completion(&alice, &run.id, 2000).unwrap();
    db.mark_completion(&alice, &meditate.id, 3000).unwrap();

    let exported = export(&db, &alice).unwrap();
    import(&db, &bob, &exported).unwrap();
    let reexported = export(&db, &bob).unwrap();

    // Ids differ but the snapshot projection matches exactly.
    assert_eq!(reexported, exported);

    // And Bob's copies are new records owned by Bob.
    let bobs = db.list_calendars(&bob).unwrap();
    assert_eq!(bobs.len(), 2);
    assert!(bobs.iter().all(|c| c.user_id == "bob"));
    assert!(bobs.iter().all(|c| c.id != fitness.id && c.id != mind.id));
}

#[test]
fn import_parses_the_external_json_contract() {
    let db = HabitDb::open_memory().unwrap();
    let me = Identity::new("user-1").unwrap();
    let snapshot = Snapshot::from_json(
        r#"{
            "calendars": [{
                "name": "Fitness",
                "colorTheme": "red",
                "position": 1,
                "habits": [{
                    "name": "Run",
                    "timerDuration": 25,
                    "position": 1,
                    "completions": [{"completedAt": 1700000000000}]
                }]
            }]
        }"#,
    )
    .unwrap();

    import(&db, &me, &snapshot).unwrap();

    let cals = db.list_calendars(&me).unwrap();
    let habits = db.list_habits(&me, Some(&cals[0].id)).unwrap();
    assert_eq!(habits[0].timer_duration_min, Some(25));
    let times: Vec<i64> = db
        .list_habit_completions(&me, &habits[0].id)
        .unwrap()
        .into_iter()
        .map(|c| c.completed_at)
        .collect();
    assert_eq!(times, vec![1_700_000_000_000]);
}
