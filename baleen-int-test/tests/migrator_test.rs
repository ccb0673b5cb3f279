use baleen::collection::Collection;
use baleen::errors::ErrorKind;
use baleen::runner::{Direction, RunOptions};
use baleen::version::VersionId;
use baleen_int_test::test_util::{
    create_context_with, run_in_context, run_test, runs, Journal, Script, ScriptedMigration,
};

#[ctor::ctor]
fn init() {
    colog::init();
}

const NAMES: [&str; 4] = [
    "app::migrations::V004AddIndex",
    "app::migrations::V001CreateUsers",
    "app::migrations::V003AddEmail",
    "app::migrations::V002CreatePosts",
];

fn id(name: &str) -> String {
    VersionId::from_name(name).to_string()
}

fn short(name: &str) -> String {
    name.rsplit("::").next().unwrap_or(name).to_string()
}

fn names(collection: &Collection) -> Vec<String> {
    collection.iter().map(|v| short(&v.name())).collect()
}

fn applied(collection: &Collection) -> Vec<String> {
    names(&collection.applied())
}

#[test]
fn test_fresh_status() {
    run_test(&NAMES, |ctx| {
        let status = ctx.migrator()?.status()?;
        assert_eq!(
            names(&status),
            vec!["V001CreateUsers", "V002CreatePosts", "V003AddEmail", "V004AddIndex"]
        );
        assert!(applied(&status).is_empty());
        assert!(!ctx.path().exists());
        Ok(())
    })
}

#[test]
fn test_up_to_latest_is_recorded() {
    run_test(&NAMES, |ctx| {
        let changed = ctx.migrator()?.up("latest", &RunOptions::up())?;

        assert_eq!(changed.len(), 4);
        assert_eq!(
            runs(ctx.journal()),
            vec![
                "up:app::migrations::V001CreateUsers",
                "up:app::migrations::V002CreatePosts",
                "up:app::migrations::V003AddEmail",
                "up:app::migrations::V004AddIndex",
            ]
        );
        assert_eq!(
            ctx.stored_ids(),
            vec![
                id(NAMES[1]),
                id(NAMES[3]),
                id(NAMES[2]),
                id(NAMES[0]),
            ]
        );

        // a new migrator sees the recorded state
        let status = ctx.migrator()?.status()?;
        assert_eq!(applied(&status).len(), 4);
        Ok(())
    })
}

#[test]
fn test_up_is_idempotent_across_runs() {
    run_test(&NAMES, |ctx| {
        ctx.migrator()?.up("latest", &RunOptions::up())?;
        ctx.journal().clear();

        let changed = ctx.migrator()?.up("latest", &RunOptions::up())?;
        assert!(changed.is_empty());
        assert!(runs(ctx.journal()).is_empty());

        let changed = ctx
            .migrator()?
            .up("latest", &RunOptions::up().with_forced(true))?;
        assert_eq!(changed.len(), 4);
        assert_eq!(runs(ctx.journal()).len(), 4);
        Ok(())
    })
}

#[test]
fn test_step_back_and_forth_with_head() {
    run_test(&NAMES, |ctx| {
        let migrator = ctx.migrator()?;
        migrator.up("latest", &RunOptions::up())?;

        let changed = migrator.go("HEAD~2", &RunOptions::up())?;
        assert_eq!(names(&changed), vec!["V003AddEmail", "V004AddIndex"]);
        assert_eq!(applied(&migrator.status()?), vec!["V001CreateUsers", "V002CreatePosts"]);
        assert_eq!(ctx.stored_ids(), vec![id(NAMES[1]), id(NAMES[3])]);

        let changed = migrator.go("HEAD+", &RunOptions::up())?;
        assert_eq!(names(&changed), vec!["V003AddEmail"]);
        assert_eq!(
            applied(&migrator.status()?),
            vec!["V001CreateUsers", "V002CreatePosts", "V003AddEmail"]
        );
        Ok(())
    })
}

#[test]
fn test_down_to_first_reverts_everything() {
    run_test(&NAMES, |ctx| {
        let migrator = ctx.migrator()?;
        migrator.up("latest", &RunOptions::up())?;
        ctx.journal().clear();

        let changed = migrator.down("first", &RunOptions::down())?;

        assert_eq!(changed.len(), 4);
        assert_eq!(
            runs(ctx.journal()),
            vec![
                "down:app::migrations::V004AddIndex",
                "down:app::migrations::V003AddEmail",
                "down:app::migrations::V002CreatePosts",
                "down:app::migrations::V001CreateUsers",
            ]
        );
        assert!(ctx.stored_ids().is_empty());
        Ok(())
    })
}

#[test]
fn test_go_by_id_prefix() {
    run_test(&NAMES, |ctx| {
        let migrator = ctx.migrator()?;
        let status = migrator.status()?;
        let second = status.get_by_position(2).map(|v| v.id().to_string()).unwrap_or_default();

        // find the shortest unambiguous prefix
        let prefix = (1..=second.len())
            .map(|n| &second[..n])
            .find(|p| status.iter().filter(|v| v.id().as_str().starts_with(p)).count() == 1)
            .unwrap_or(&second)
            .to_string();

        migrator.go(&prefix, &RunOptions::up())?;
        assert_eq!(applied(&migrator.status()?), vec!["V001CreateUsers", "V002CreatePosts"]);
        Ok(())
    })
}

#[test]
fn test_go_by_file_name() {
    let journal = Journal::new();
    let migrations = vec![
        ScriptedMigration::new("app::V1", &journal)
            .file("migrations/V1_create_users.rs")
            .shared(),
        ScriptedMigration::new("app::V2", &journal)
            .file("migrations/V2_add_email.rs")
            .shared(),
        ScriptedMigration::new("app::V3", &journal)
            .file("migrations/V3_add_index.rs")
            .shared(),
    ];

    run_in_context(create_context_with(migrations, journal), |ctx| {
        let migrator = ctx.migrator()?;
        migrator.go("V2_add_email.rs", &RunOptions::up())?;
        assert_eq!(
            runs(ctx.journal()),
            vec!["up:app::V1", "up:app::V2"]
        );

        let error = migrator.go("add_email.rs", &RunOptions::up()).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::NotFound);
        Ok(())
    })
}

#[test]
fn test_unknown_alias_changes_nothing() {
    run_test(&NAMES, |ctx| {
        let error = ctx.migrator()?.up("no-such-version", &RunOptions::up()).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::NotFound);
        assert!(error.changed.is_empty());
        assert!(runs(ctx.journal()).is_empty());
        assert!(!ctx.path().exists());
        Ok(())
    })
}

#[test]
fn test_execute_single_migration() {
    run_test(&NAMES, |ctx| {
        let migrator = ctx.migrator()?;
        let target = id(NAMES[2]);

        let result = migrator.execute(&target, Direction::Up, &RunOptions::default())?;
        assert!(result.is_changed());
        assert_eq!(ctx.stored_ids(), vec![target.clone()]);
        assert_eq!(applied(&migrator.status()?), vec!["V003AddEmail"]);

        let error = migrator
            .execute(&target, Direction::Up, &RunOptions::default())
            .unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::RefuseToRun);

        let result = migrator.execute(
            &target,
            Direction::Up,
            &RunOptions::default().with_exception_on_skip(false),
        )?;
        assert!(result.is_skipped());

        migrator.execute(&target, Direction::Down, &RunOptions::default())?;
        assert!(ctx.stored_ids().is_empty());
        Ok(())
    })
}

#[test]
fn test_dry_run_leaves_storage_untouched() {
    run_test(&NAMES, |ctx| {
        let migrator = ctx.migrator()?;
        let changed = migrator.up("latest", &RunOptions::up().with_dry_run(true))?;

        assert_eq!(changed.len(), 4);
        assert!(runs(ctx.journal()).is_empty());
        assert!(!ctx.path().exists());
        assert!(applied(&migrator.status()?).is_empty());
        Ok(())
    })
}

#[test]
fn test_failure_records_completed_migrations() {
    let journal = Journal::new();
    let migrations = vec![
        ScriptedMigration::new("app::V1", &journal).shared(),
        ScriptedMigration::new("app::V2", &journal).shared(),
        ScriptedMigration::new("app::V3", &journal)
            .script(Script::FailUp)
            .shared(),
        ScriptedMigration::new("app::V4", &journal).shared(),
    ];

    run_in_context(create_context_with(migrations, journal), |ctx| {
        let migrator = ctx.migrator()?;
        let error = migrator.up("latest", &RunOptions::up()).unwrap_err();

        assert_eq!(error.kind(), &ErrorKind::MigrationFailed);
        assert_eq!(names(&error.changed), vec!["V1", "V2"]);
        assert_eq!(ctx.stored_ids(), vec![id("app::V1"), id("app::V2")]);

        // the next run resumes at the failed migration
        ctx.journal().clear();
        let error = ctx.migrator()?.up("latest", &RunOptions::up()).unwrap_err();
        assert!(error.changed.is_empty());
        assert_eq!(runs(ctx.journal()), vec!["up:app::V3"]);
        Ok(())
    })
}
