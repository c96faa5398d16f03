//! Doctor command - validate configuration and show status

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    account: CheckResult,
    access_token: CheckResult,
    app: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        account: CheckResult::error("Not checked"),
        access_token: CheckResult::error("Not checked"),
        app: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    // Check config
    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => {
            report.config = CheckResult::ok(format!(
                "Configuration loaded (API {}, {})",
                c.graph.api_version, c.graph.base_url
            ));
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.account = check_account(config);
        report.access_token = check_access_token(config);
        report.app = check_app(config);
    }

    // The app check only matters for setup, so it never fails the report
    let checks = [&report.config, &report.account, &report.access_token];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    // Output report
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

fn check_account(config: &AppConfig) -> CheckResult {
    let page_id = config.graph.page_id.trim();
    let account_id = config.graph.account_id.trim();

    match (page_id.is_empty(), account_id.is_empty()) {
        (_, false) => CheckResult::ok(format!("Instagram account ID: {}", account_id)),
        (false, true) => CheckResult::ok(format!(
            "Facebook page ID: {} (account ID resolved on first use)",
            page_id
        )),
        (true, true) => {
            CheckResult::error("Neither graph.page_id nor graph.account_id is configured")
        }
    }
}

fn check_access_token(config: &AppConfig) -> CheckResult {
    let env_var = &config.graph.access_token_env;

    if env_var.is_empty() {
        return CheckResult::error("No access token env var configured");
    }

    match std::env::var(env_var) {
        Ok(val) if !val.trim().is_empty() => {
            CheckResult::ok(format!("Access token: {} (set)", env_var))
        }
        _ => CheckResult::error(format!("Access token: {} (not set)", env_var)),
    }
}

fn check_app(config: &AppConfig) -> CheckResult {
    if config.app.app_id.trim().is_empty() {
        return CheckResult::warn("No app ID configured (setup skips the long-lived token exchange)");
    }

    let env_var = &config.app.app_secret_env;
    match std::env::var(env_var) {
        Ok(val) if !val.trim().is_empty() => CheckResult::ok(format!(
            "App ID: {}, App secret: {} (set)",
            config.app.app_id, env_var
        )),
        _ => CheckResult::warn(format!(
            "App ID: {}, App secret: {} (not set)",
            config.app.app_id, env_var
        )),
    }
}

fn print_report(report: &DoctorReport) {
    println!("ig-poster Doctor Report");
    println!("=======================");
    println!();

    print_check("Config", &report.config);
    print_check("Account", &report.account);
    print_check("Access Token", &report.access_token);
    print_check("Facebook App", &report.app);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall == "ok" {
        println!();
        println!("Ready to post! Try: ig-poster me");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
