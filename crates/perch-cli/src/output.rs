use anyhow::Result;
use colored::Colorize;
use perch_resolver::{ClearOutcome, Resolved};
use serde_json::{Value, json};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_resolved(resolved: &Resolved, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let value = json!({
                "source": resolved.source,
                "user": resolved.user,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Table => {
            println!("{}", user_table(resolved));
            println!("{} {}", "Source:".cyan(), resolved.source);
        }
    }
    if let Some(err) = &resolved.persist_error {
        print_warning(&format!("user was not written back: {err}"));
    }
    Ok(())
}

pub fn print_cleared(id: &str, outcome: &ClearOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let value = json!({ "id": id, "cleared_from": outcome.cleared_from });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Table => {
            if outcome.is_empty() {
                println!("{id} was not cached in the requested tiers.");
            } else {
                let tiers: Vec<String> = outcome.cleared_from.iter().map(ToString::to_string).collect();
                print_success(&format!("Cleared {id} from {}", tiers.join(", ")));
            }
        }
    }
    Ok(())
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

fn user_table(resolved: &Resolved) -> String {
    let user = &resolved.user;
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    builder.push_record(["id", user.id.as_str()]);
    builder.push_record(["username", user.username.as_str()]);
    builder.push_record(["display_name", user.display_name.as_str()]);
    builder.push_record(["avatar", user.avatar.as_str()]);
    builder.push_record(["bot".to_string(), user.bot.to_string()]);
    builder.push_record(["status", user.status.as_str()]);
    if !user.flags.is_empty() {
        let flags: Vec<&str> = user.flags.iter().map(String::as_str).collect();
        builder.push_record(["flags".to_string(), flags.join(", ")]);
    }
    for (key, value) in &user.extra_data {
        let rendered = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        builder.push_record([format!("extra.{key}"), rendered]);
    }
    builder.build().with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use perch_core::PlatformUser;
    use perch_resolver::ResolutionSource;

    #[test]
    fn test_user_table() {
        let resolved = Resolved {
            user: PlatformUser::new("123456789012345678", "ada")
                .with_display_name("Ada")
                .with_flag("verified")
                .with_extra("nickname", "countess")
                .with_extra("preferred_guild", true),
            source: ResolutionSource::LiveState,
            persist_error: None,
        };

        let table = user_table(&resolved);

        assert!(table.contains("123456789012345678"));
        assert!(table.contains("verified"));
        assert!(table.contains("extra.nickname"));
        assert!(table.contains("countess"));
        assert!(table.contains("extra.preferred_guild"));
        assert!(table.contains("offline"));
    }
}
