use std::env;
use std::io::{self, BufRead};

use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use rand_core::OsRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Prints an argon2 PHC string for `admin_password_hash` in config.yaml.
/// The password comes from the first argument, or from stdin so it stays out
/// of the shell history.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let password = match env::args().nth(1) {
        Some(password) => password,
        None => {
            info!("Reading password from stdin");
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };
    if password.is_empty() {
        return Err("password must not be empty".into());
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| format!("hashing failed: {}", err))?;
    println!("{}", hash);
    Ok(())
}
