use super::read_password;
use crate::services::{AuthError, SignUpOutcome};
use crate::state::SharedState;

pub async fn cmd_signup(
    state: &SharedState,
    email: &str,
    password: Option<String>,
) -> anyhow::Result<()> {
    let password = read_password(password)?;

    match state.auth.sign_up(email, &password).await {
        Ok(SignUpOutcome::SignedIn(user)) => {
            println!("✓ Account created. Signed in as {} ({})", user.name, user.email);
        }
        Ok(SignUpOutcome::ConfirmationRequired { email }) => {
            println!("✓ Account created for {email}");
            println!("Please check your email for confirmation link");
        }
        Err(AuthError::ProfileNotFound) => {
            println!("⚠ Account created but the profile is not ready yet.");
            println!("Try 'animedash login {email}' in a moment.");
        }
        Err(e) => {
            println!("✗ Sign up failed: {e}");
        }
    }

    Ok(())
}

pub async fn cmd_login(
    state: &SharedState,
    email: &str,
    password: Option<String>,
) -> anyhow::Result<()> {
    let password = read_password(password)?;

    match state.auth.sign_in(email, &password).await {
        Ok(user) => println!("✓ Signed in as {} ({})", user.name, user.email),
        Err(AuthError::ProfileNotFound) => {
            println!("✗ User profile issue. Please try again in a moment.");
        }
        Err(e) => println!("✗ Sign in failed: {e}"),
    }

    Ok(())
}

pub async fn cmd_logout(state: &SharedState) -> anyhow::Result<()> {
    if matches!(state.auth.restore_session().await, Ok(None)) {
        println!("Not signed in.");
        return Ok(());
    }

    state.auth.sign_out().await?;
    println!("✓ Signed out");
    Ok(())
}

pub async fn cmd_whoami(state: &SharedState) -> anyhow::Result<()> {
    match state.auth.restore_session().await? {
        Some(user) => {
            println!("Name:    {}", user.name);
            println!("Email:   {}", user.email);
            println!("ID:      {}", user.id);
            println!("Since:   {}", user.created_at.format("%Y-%m-%d"));
        }
        None => {
            println!("Not signed in.");
            println!("Sign in with: animedash login <email>");
        }
    }
    Ok(())
}

pub async fn cmd_reset_password(
    state: &SharedState,
    email: &str,
    redirect_to: Option<&str>,
) -> anyhow::Result<()> {
    match state.auth.reset_password(email, redirect_to).await {
        Ok(()) => println!("✓ Password reset email sent to {email}"),
        Err(e) => println!("✗ Password reset failed: {e}"),
    }
    Ok(())
}
