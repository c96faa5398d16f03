//! Shell env file holding the credentials produced by setup

use ig_poster_domain::SetupOutcome;
use secrecy::ExposeSecret;
use std::fs;
use std::io;
use std::path::Path;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Variable names the env file assigns
#[derive(Debug, Clone)]
pub struct EnvKeys {
    pub page_id: String,
    pub account_id: String,
    pub access_token: String,
}

/// Render setup results as `export KEY=value` lines
pub fn render(outcome: &SetupOutcome, keys: &EnvKeys, generated_at: OffsetDateTime) -> String {
    let generated = generated_at
        .format(&Rfc3339)
        .unwrap_or_else(|_| generated_at.unix_timestamp().to_string());

    let username = outcome
        .account
        .username
        .as_deref()
        .map(|u| format!("@{}", u))
        .unwrap_or_else(|| outcome.account.id.clone());

    let mut out = String::new();
    out.push_str("# Instagram business account configuration\n");
    out.push_str(&format!("# Generated: {}\n", generated));
    out.push_str(&format!("# Facebook page: {}\n", outcome.page_name));
    out.push_str(&format!("# Instagram account: {}\n", username));
    push_export(&mut out, &keys.page_id, &outcome.page_id);
    push_export(&mut out, &keys.account_id, &outcome.account.id);
    push_export(
        &mut out,
        &keys.access_token,
        outcome.access_token.expose_secret(),
    );
    out
}

fn push_export(out: &mut String, key: &str, value: &str) {
    out.push_str(&format!("export {}={}\n", key, shell_quote(value)));
}

fn shell_quote(value: &str) -> String {
    let plain = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':'));
    if plain && !value.is_empty() {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

/// Write the env file, refusing to replace an existing one unless `force`
pub fn write(path: &Path, content: &str, force: bool) -> io::Result<()> {
    if path.exists() && !force {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", path.display()),
        ));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, content)?;
    restrict_permissions(path)?;

    tracing::info!(path = %path.display(), "Wrote credentials file");
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}
