//! Employee bootstrap.
//!
//! The API only lets admins create employees, so the first admin has to come
//! from here. The password is read from `STOCKROOM_EMPLOYEE_PASSWORD` when set,
//! otherwise from the first line of stdin.

use std::io::BufRead;

use secrecy::{ExposeSecret, SecretString};

use stockroom_api::services::auth::{AuthService, Registration};
use stockroom_core::EmployeeRole;

use super::{CommandError, connect};

const PASSWORD_ENV: &str = "STOCKROOM_EMPLOYEE_PASSWORD";

pub struct NewEmployeeArgs {
    pub username: String,
    pub email: String,
    pub name: String,
    pub role: EmployeeRole,
    pub contact: String,
    pub address: String,
}

/// Create an employee. The new id is logged.
pub async fn create(args: &NewEmployeeArgs) -> Result<(), CommandError> {
    let password = read_password()?;
    let pool = connect().await?;

    tracing::info!("Creating employee: {} ({})", args.username, args.role);

    let employee = AuthService::new(&pool)
        .register(&Registration {
            username: &args.username,
            email: &args.email,
            password: password.expose_secret(),
            name: &args.name,
            contact: &args.contact,
            address: &args.address,
            role: args.role,
        })
        .await?;

    tracing::info!(
        employee_id = %employee.id,
        username = %employee.username,
        role = %employee.role,
        "Employee created"
    );
    Ok(())
}

fn read_password() -> Result<SecretString, CommandError> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(password));
    }

    tracing::info!("{PASSWORD_ENV} not set, reading password from stdin");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(SecretString::from(
        line.trim_end_matches(['\r', '\n']).to_string(),
    ))
}
