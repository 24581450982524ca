use crate::cli::args::{AddArgs, CliArgs, Command, UploadArgs};
use crate::model::PolicyKind;
use crate::output::OutputFormat;

fn count_set(values: &[bool]) -> usize {
    values.iter().filter(|v| **v).count()
}

fn parse_policy(flag: &str, raw: &str) -> Result<PolicyKind, String> {
    PolicyKind::parse(raw)
        .ok_or_else(|| format!("invalid {flag} '{raw}', expected terms, cookie or privacy"))
}

fn validate_add(args: &AddArgs) -> Result<(), String> {
    let terms = count_set(&[
        args.terms_text.is_some(),
        args.terms_file.is_some(),
        args.terms_url.is_some(),
        args.auto_fetch,
    ]);
    if terms > 1 {
        return Err(
            "use only one of --terms-text, --terms-file, --terms-url or --auto-fetch".to_string(),
        );
    }
    for (label, values) in [
        (
            "cookie",
            [
                args.cookie_text.is_some(),
                args.cookie_file.is_some(),
                args.cookie_url.is_some(),
            ],
        ),
        (
            "privacy",
            [
                args.privacy_text.is_some(),
                args.privacy_file.is_some(),
                args.privacy_url.is_some(),
            ],
        ),
    ] {
        if count_set(&values) > 1 {
            return Err(format!(
                "use only one of --{label}-text, --{label}-file or --{label}-url"
            ));
        }
    }
    Ok(())
}

fn validate_upload(args: &UploadArgs) -> Result<(), String> {
    let kind = parse_policy("--policy", &args.policy)?;
    if kind == PolicyKind::Terms {
        return Err("only cookie and privacy policies can be uploaded separately".to_string());
    }
    let sources = count_set(&[args.text.is_some(), args.file.is_some(), args.url.is_some()]);
    if sources != 1 {
        return Err("provide exactly one of --text, --file or --url".to_string());
    }
    Ok(())
}

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.api_url.as_deref() {
        let url = reqwest::Url::parse(raw).map_err(|e| format!("invalid --api-url '{raw}': {e}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!("invalid --api-url '{raw}', expected http or https"));
        }
    }
    match &args.command {
        Some(Command::Show { tab, .. }) => {
            parse_policy("--tab", tab)?;
        }
        Some(Command::Analyze { policy, .. }) => {
            parse_policy("--policy", policy)?;
        }
        Some(Command::Add(add)) => validate_add(add)?,
        Some(Command::Upload(upload)) => validate_upload(upload)?,
        Some(Command::Report {
            format: Some(raw), ..
        }) => {
            OutputFormat::parse(raw)
                .ok_or_else(|| format!("invalid --format '{raw}', expected text, json or html"))?;
        }
        _ => {}
    }
    Ok(())
}
