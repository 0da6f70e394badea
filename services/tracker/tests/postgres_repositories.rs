//! Repository checks against a live PostgreSQL configured through `DATABASE_URL`

use chrono::{Duration, Utc};
use common::database::{self, DatabaseConfig};
use uuid::Uuid;

use tracker::{
    clock::Day,
    models::{NewInterval, NewUser},
    repositories::{
        IntervalRepository, PgIntervalRepository, PgUserRepository, UserRepository,
        postgres::MIGRATOR,
    },
};

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_interval_lifecycle() -> anyhow::Result<()> {
    let pool = database::init_pool(&DatabaseConfig::from_env()?).await?;
    database::run_migrations(&pool, &MIGRATOR).await?;

    let users = PgUserRepository::new(pool.clone());
    let intervals = PgIntervalRepository::new(pool);

    let username = format!("it-{}", Uuid::new_v4());
    let user = users
        .create(&NewUser {
            username: username.clone(),
            password: "secret".to_string(),
        })
        .await?;
    assert!(users.find_by_username(&username).await?.unwrap().verify_password("secret"));

    let now = Utc::now();
    let created = intervals.create(&NewInterval::open(user.id, now)).await?;
    assert!(created.is_open());
    assert_eq!(intervals.find_most_recent(user.id).await?, Some(created.clone()));

    let mut closed = created.clone();
    closed.stop = Some(now + Duration::minutes(5));
    assert!(intervals.update(&closed).await?);

    let stored = intervals.find_by_id(created.id).await?.unwrap();
    assert_eq!(stored.duration(), Duration::minutes(5));
    assert_eq!(intervals.count_for_owner(user.id).await?, 1);

    let day = Day::in_timezone(now.date_naive(), &Utc);
    assert_eq!(intervals.find_for_day(user.id, &day).await?.len(), 1);

    Ok(())
}
