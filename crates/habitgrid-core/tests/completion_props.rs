//! Property tests for completion toggling and import idempotence.

use proptest::collection::vec;
use proptest::prelude::*;

use habitgrid_core::model::{Calendar, Habit};
use habitgrid_core::snapshot::{import, CalendarSnapshot, CompletionSnapshot, HabitSnapshot, Snapshot};
use habitgrid_core::{HabitDb, Identity};

fn seeded_habit(db: &HabitDb, caller: &Identity) -> Habit {
    let cal = Calendar::new(caller.user_id(), "Fitness", "red").with_position(1);
    db.create_calendar(caller, &cal).unwrap();
    let habit = Habit::new(caller.user_id(), &cal.id, "Run").with_position(1);
    db.create_habit(caller, &habit).unwrap();
    habit
}

proptest! {
    #[test]
    fn double_toggle_restores_the_completion_set(timestamps in vec(0i64..2_000_000_000_000, 1..20)) {
        let db = HabitDb::open_memory().unwrap();
        let me = Identity::new("user-1").unwrap();
        let habit = seeded_habit(&db, &me);

        let before: Vec<i64> = db
            .list_habit_completions(&me, &habit.id)
            .unwrap()
            .into_iter()
            .map(|c| c.completed_at)
            .collect();

        for &t in &timestamps {
            db.mark_completion(&me, &habit.id, t).unwrap();
        }
        for &t in &timestamps {
            db.mark_completion(&me, &habit.id, t).unwrap();
        }

        let after: Vec<i64> = db
            .list_habit_completions(&me, &habit.id)
            .unwrap()
            .into_iter()
            .map(|c| c.completed_at)
            .collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn importing_twice_never_duplicates_completions(timestamps in vec(0i64..2_000_000_000_000, 0..30)) {
        let db = HabitDb::open_memory().unwrap();
        let me = Identity::new("user-1").unwrap();
        let snapshot = Snapshot {
            calendars: vec![CalendarSnapshot {
                name: "Fitness".into(),
                color_theme: "red".into(),
                position: Some(1),
                habits: vec![HabitSnapshot {
                    name: "Run".into(),
                    timer_duration: None,
                    position: Some(1),
                    completions: timestamps
                        .iter()
                        .map(|&completed_at| CompletionSnapshot { completed_at })
                        .collect(),
                }],
            }],
        };

        import(&db, &me, &snapshot).unwrap();
        import(&db, &me, &snapshot).unwrap();

        let cals = db.list_calendars(&me).unwrap();
        prop_assert_eq!(cals.len(), 1);
        let habits = db.list_habits(&me, Some(&cals[0].id)).unwrap();
        prop_assert_eq!(habits.len(), 1);

        let mut distinct = timestamps.clone();
        distinct.sort_unstable();
        distinct.dedup();
        let stored = db.list_habit_completions(&me, &habits[0].id).unwrap();
        prop_assert_eq!(stored.len(), distinct.len());
    }
}
