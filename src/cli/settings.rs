use std::path::Path;

use crate::config::{load_settings, save_settings};

use super::render::{KeyValueRow, render_output};
use super::{Cli, ConfigCmd};

pub(super) fn run_config(cli: &Cli, path: &Path, cmd: ConfigCmd) -> anyhow::Result<()> {
    match cmd {
        ConfigCmd::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCmd::Show => {
            let settings = load_settings(path)?;
            let base_url = cli
                .base_url
                .clone()
                .unwrap_or_else(|| settings.base_url().to_string());
            let locale = cli.locale.unwrap_or_else(|| settings.locale());
            render_output(
                cli,
                vec![
                    KeyValueRow::new("path", path.display().to_string()),
                    KeyValueRow::new("base_url", base_url),
                    KeyValueRow::new("locale", locale.name()),
                    KeyValueRow::new(
                        "timeout_seconds",
                        settings.timeout().as_secs().to_string(),
                    ),
                ],
            )
        }
        ConfigCmd::Set(args) => {
            if args.default_base_url.is_none()
                && args.default_locale.is_none()
                && args.timeout_seconds.is_none()
            {
                anyhow::bail!(
                    "nothing to set; pass --default-base-url, --default-locale or --timeout-seconds"
                );
            }

            let mut settings = load_settings(path)?;
            if let Some(url) = args.default_base_url {
                let url = url.trim().trim_end_matches('/').to_string();
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    anyhow::bail!("base url must start with http:// or https://");
                }
                settings.base_url = Some(url);
            }
            if let Some(locale) = args.default_locale {
                settings.locale = Some(locale);
            }
            if let Some(secs) = args.timeout_seconds {
                if secs == 0 {
                    anyhow::bail!("timeout must be at least one second");
                }
                settings.timeout_seconds = Some(secs);
            }

            if cli.dry_run {
                println!("dry-run: would write {}:", path.display());
                println!("{}", serde_json::to_string_pretty(&settings)?);
                return Ok(());
            }
            save_settings(path, &settings)?;
            eprintln!("Saved {}", path.display());
            Ok(())
        }
    }
}
