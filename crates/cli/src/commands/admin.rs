//! Admin account management commands.

use tracing::info;

use coursehaven_server::db::{self, PgStore};
use coursehaven_server::services::auth::{AuthService, Signup};

use super::{CommandError, database_url};

/// Create a new admin account.
///
/// # Errors
///
/// Returns an error if the database is unreachable, the fields fail
/// validation, or the email is already registered.
pub async fn create(
    email: &str,
    password: &str,
    first_name: &str,
    last_name: &str,
) -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    let pool = db::create_pool(&database_url()?).await?;
    let store = PgStore::new(pool);
    let auth = AuthService::new(&store);

    let admin = auth
        .register_admin(Signup {
            first_name: Some(first_name),
            last_name: Some(last_name),
            email: Some(email),
            password: Some(password),
        })
        .await?;

    info!(admin_id = %admin.id, email = %admin.email, "Admin account created");
    Ok(())
}
