//! `passvault generate`: print a random password.

use crate::crypto::{generate_password, PasswordOptions};
use crate::errors::Result;

/// Execute the `generate` command.
pub fn execute(options: &PasswordOptions) -> Result<()> {
    let password = generate_password(options)?;
    println!("{}", password.as_str());
    Ok(())
}
