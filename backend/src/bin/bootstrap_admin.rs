//! Create or promote the first administrator in the directory store.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;

use clap::Parser;
use color_eyre::eyre::{Context, Result, bail, eyre};
use tokio::runtime::Builder;
use zeroize::Zeroizing;

use coursework::domain::ports::UserDirectory;
use coursework::domain::{DisplayName, EmailAddress, NewUser, Role, User, UserId, UserPatch};
use coursework::outbound::auth::hash_password;
use coursework::outbound::persistence::{
    DbPool, DieselUserDirectory, PoolConfig, run_pending_migrations,
};

const DATABASE_URL_ENV: &str = "COURSEWORK_DATABASE_URL";

/// `bootstrap-admin` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "bootstrap-admin",
    about = "Create or promote an administrator account",
    version
)]
struct CliArgs {
    /// Email the administrator signs in with.
    #[arg(long, value_name = "email")]
    email: String,
    /// Name shown for a newly created account.
    #[arg(long = "display-name", value_name = "name", default_value = "Administrator")]
    display_name: String,
    /// Environment variable holding the password.
    #[arg(
        long = "password-env",
        value_name = "var",
        default_value = "COURSEWORK_ADMIN_PASSWORD"
    )]
    password_env: String,
    /// Database connection URL. Falls back to `COURSEWORK_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Proceed even when an administrator already exists.
    #[arg(long)]
    force: bool,
}

/// What the tool did to the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Created(UserId),
    Promoted(UserId),
}

struct AdminRequest {
    email: EmailAddress,
    display_name: DisplayName,
    password: Zeroizing<String>,
    force: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    let args = CliArgs::parse();
    let password = Zeroizing::new(
        env::var(&args.password_env)
            .map_err(|_| eyre!("set {} to the administrator password", args.password_env))?,
    );
    let request = AdminRequest {
        email: EmailAddress::new(&args.email).wrap_err("invalid --email")?,
        display_name: DisplayName::new(&args.display_name).wrap_err("invalid --display-name")?,
        password,
        force: args.force,
    };

    let database_url = match args.database_url {
        Some(url) => url,
        None => env::var(DATABASE_URL_ENV)
            .map_err(|_| eyre!("pass --database-url or set {DATABASE_URL_ENV}"))?,
    };
    run_pending_migrations(&database_url)
        .await
        .wrap_err("failed to migrate database")?;
    let pool = DbPool::new(PoolConfig::new(&database_url).with_max_size(1))
        .await
        .wrap_err("failed to create database pool")?;
    let directory = DieselUserDirectory::new(pool);

    match bootstrap(&directory, request).await? {
        Outcome::Created(id) => println!("created administrator {id}"),
        Outcome::Promoted(id) => println!("promoted {id} to administrator"),
    }
    Ok(())
}

async fn bootstrap(directory: &dyn UserDirectory, request: AdminRequest) -> Result<Outcome> {
    if request.password.trim().is_empty() {
        bail!("administrator password must not be empty");
    }
    let admins = directory.count_admins().await?;
    if admins > 0 && !request.force {
        bail!("{admins} administrator(s) already exist; rerun with --force to continue");
    }

    let password_hash = hash_password(&request.password)?;
    if let Some(existing) = directory.find_by_email(&request.email).await? {
        let patch = UserPatch {
            role: Some(Role::Admin),
            ..UserPatch::default()
        };
        directory
            .update(existing.id, &patch)
            .await?
            .ok_or_else(|| eyre!("user {} vanished during promotion", existing.id))?;
        directory
            .set_password_hash(existing.id, &password_hash)
            .await?;
        return Ok(Outcome::Promoted(existing.id));
    }

    let user = User {
        id: UserId::random(),
        email: request.email,
        display_name: request.display_name,
        role: Role::Admin,
        student_number: None,
        department_id: None,
    };
    let created = directory
        .create(&NewUser {
            user,
            password_hash,
        })
        .await?;
    Ok(Outcome::Created(created.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursework::outbound::auth::verify_password;
    use coursework::outbound::memory::InMemoryStore;
    use rstest::rstest;

    fn request(email: &str, force: bool) -> AdminRequest {
        AdminRequest {
            email: EmailAddress::new(email).expect("valid email"),
            display_name: DisplayName::new("Registrar").expect("valid name"),
            password: Zeroizing::new("correct horse".to_owned()),
            force,
        }
    }

    async fn stored_hash(store: &InMemoryStore, email: &str) -> String {
        let email = EmailAddress::new(email).expect("valid email");
        store
            .find_credentials(&email)
            .await
            .expect("lookup succeeds")
            .expect("credentials stored")
            .password_hash
    }

    #[rstest]
    #[tokio::test]
    async fn creates_the_first_administrator() {
        let store = InMemoryStore::new();

        let outcome = bootstrap(&store, request("root@uni.test", false))
            .await
            .expect("bootstrap succeeds");

        let Outcome::Created(id) = outcome else {
            panic!("expected a new account, got {outcome:?}");
        };
        let user = store
            .find_by_id(id)
            .await
            .expect("lookup succeeds")
            .expect("user stored");
        assert_eq!(user.role, Role::Admin);
        assert!(verify_password(
            "correct horse",
            &stored_hash(&store, "root@uni.test").await
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn refuses_when_an_admin_exists_without_force() {
        let store = InMemoryStore::new();
        bootstrap(&store, request("root@uni.test", false))
            .await
            .expect("first bootstrap succeeds");

        let err = bootstrap(&store, request("second@uni.test", false))
            .await
            .expect_err("second bootstrap refused");

        assert!(err.to_string().contains("--force"));
        assert_eq!(store.count_admins().await.expect("count"), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn force_promotes_an_existing_user() {
        let store = InMemoryStore::new();
        bootstrap(&store, request("root@uni.test", false))
            .await
            .expect("first bootstrap succeeds");
        let instructor = User {
            id: UserId::random(),
            email: EmailAddress::new("ada@uni.test").expect("valid email"),
            display_name: DisplayName::new("Ada").expect("valid name"),
            role: Role::Instructor,
            student_number: None,
            department_id: None,
        };
        store.seed_user(instructor.clone());

        let outcome = bootstrap(&store, request("ada@uni.test", true))
            .await
            .expect("forced bootstrap succeeds");

        assert_eq!(outcome, Outcome::Promoted(instructor.id));
        assert_eq!(store.count_admins().await.expect("count"), 2);
        assert!(verify_password(
            "correct horse",
            &stored_hash(&store, "ada@uni.test").await
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn blank_passwords_are_rejected() {
        let store = InMemoryStore::new();
        let mut blank = request("root@uni.test", false);
        blank.password = Zeroizing::new("   ".to_owned());

        let err = bootstrap(&store, blank).await.expect_err("blank refused");

        assert!(err.to_string().contains("must not be empty"));
        assert_eq!(store.count_admins().await.expect("count"), 0);
    }
}
