use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde_json::Value as JsonValue;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{info, warn};

use blinko_client::{ClientConfig, Clipper, FileUpload};
use blinko_core::{
    clean_domain_url, resolve_prompt_template, EventBus, JsonFileStore, PageContent, Settings,
    SettingsManager, SubmitResult,
};

use crate::cli::{
    Cli, Command, PageArgs, RuleCommand, SettingsCommand, SourceArgs, TemplateCommand,
};

/// Settings file used when neither `--settings` nor `BLINKO_SETTINGS` is given.
pub fn default_settings_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("blinko-clip").join("settings.json"))
        .context("Could not determine the user config directory")
}

pub async fn run(cli: Cli) -> Result<()> {
    let path = match cli.settings {
        Some(path) => path,
        None => default_settings_path()?,
    };
    info!(subsystem = "cli", settings_path = %path.display(), "Using settings file");

    let mut manager = SettingsManager::new(Arc::new(JsonFileStore::new(path)), EventBus::default());
    let loaded = manager.load().await;
    if let Some(e) = loaded.error {
        warn!(subsystem = "cli", error = %e, "Stored settings unusable, running with defaults");
    }

    let clipper = Clipper::new(&ClientConfig::from_env())?;

    match cli.command {
        Command::Note { text, source } => {
            let page = source_page(source);
            let settings = manager.settings();
            report(clipper.save_quick_note(&text, Some(&page), settings).await)
        }
        Command::Summarize { page, save } => {
            let page = read_page(page).await?;
            if save {
                report(clipper.save_summary(&page, manager.settings()).await)
            } else {
                let summary = clipper
                    .summarizer()
                    .summarize_page(&page.content, &page.url, manager.settings())
                    .await?;
                println!("{}", summary);
                Ok(())
            }
        }
        Command::Extract { page } => {
            let page = read_page(page).await?;
            report(clipper.save_extract(&page, manager.settings()).await)
        }
        Command::Upload {
            file,
            mime_type,
            caption,
            source,
        } => {
            let mut upload = FileUpload::from_path(&file).await?;
            if let Some(mime) = mime_type {
                upload = upload.with_mime_type(mime);
            }
            let page = PageContent {
                content: caption,
                ..source_page(source)
            };
            report(clipper.save_image(upload, &page, manager.settings()).await)
        }
        Command::FetchConfig { apply } => {
            let config = clipper.notes().fetch_ai_config(manager.settings()).await?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            if apply {
                manager.apply_ai_config(&config).await?;
                println!("Applied AI config from {}", clean_domain_url(&manager.settings().target_url));
            }
            Ok(())
        }
        Command::Resolve { url } => {
            match resolve_prompt_template(&url, manager.settings()) {
                Some(template) => println!("{}\t{}", template.id, template.name),
                None => println!("(no templates)"),
            }
            Ok(())
        }
        Command::Settings(cmd) => settings_command(&mut manager, cmd).await,
        Command::Template(cmd) => template_command(&mut manager, cmd).await,
        Command::Rule(cmd) => rule_command(&mut manager, cmd).await,
    }
}

type Manager = SettingsManager<JsonFileStore>;

async fn settings_command(manager: &mut Manager, cmd: SettingsCommand) -> Result<()> {
    match cmd {
        SettingsCommand::Show => {
            println!("{}", serde_json::to_string_pretty(manager.settings())?);
        }
        SettingsCommand::Set { key, value } => {
            let updated = set_field(manager.settings(), &key, &value)?;
            manager.save(updated).await?;
            println!("Saved {}", key);
        }
        SettingsCommand::Reset => {
            manager.reset().await?;
            println!("Settings reset to defaults");
        }
    }
    Ok(())
}

async fn template_command(manager: &mut Manager, cmd: TemplateCommand) -> Result<()> {
    match cmd {
        TemplateCommand::List => {
            let settings = manager.settings();
            for template in &settings.prompt_templates {
                let marker = if template.id == settings.active_prompt_template_id {
                    "*"
                } else {
                    " "
                };
                println!("{} {}\t{}", marker, template.id, template.name);
            }
        }
        TemplateCommand::Add { name, content } => {
            let id = manager.add_template(&name, &content).await?;
            println!("{}", id);
        }
        TemplateCommand::Update { id, content } => {
            manager.update_template_content(&id, &content).await?;
        }
        TemplateCommand::Delete { id } => {
            let removed = manager.delete_template(&id).await?;
            println!("Deleted {}", removed.name);
        }
        TemplateCommand::Activate { id } => {
            manager.set_active_template(&id).await?;
        }
    }
    Ok(())
}

async fn rule_command(manager: &mut Manager, cmd: RuleCommand) -> Result<()> {
    match cmd {
        RuleCommand::List => {
            let settings = manager.settings();
            for rule in &settings.domain_prompt_mappings {
                println!(
                    "{}\t{}\t{}",
                    rule.id,
                    rule.domain_pattern,
                    settings.template_label(&rule.template_id)
                );
            }
        }
        RuleCommand::Add {
            domain,
            template_id,
        } => {
            let id = manager.add_domain_rule(&domain, &template_id).await?;
            println!("{}", id);
        }
        RuleCommand::Delete { id } => {
            manager.delete_domain_rule(&id).await?;
        }
    }
    Ok(())
}

fn report(result: SubmitResult) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&result)?);
    if !result.success {
        bail!(result.error.unwrap_or_else(|| "Save failed".to_string()));
    }
    Ok(())
}

fn source_page(source: SourceArgs) -> PageContent {
    PageContent {
        content: String::new(),
        title: source.title,
        url: source.url,
    }
}

async fn read_page(args: PageArgs) -> Result<PageContent> {
    let content = match (args.text, args.file) {
        (Some(text), _) => text,
        (None, Some(file)) => tokio::fs::read_to_string(&file)
            .await
            .with_context(|| format!("Failed to read {}", file.display()))?,
        (None, None) => read_text(tokio::io::stdin())
            .await
            .context("Failed to read page text from stdin")?,
    };
    Ok(PageContent {
        content,
        ..source_page(args.source)
    })
}

async fn read_text<R: AsyncRead + Unpin>(mut reader: R) -> std::io::Result<String> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf).await?;
    Ok(buf)
}

/// Return a copy of `settings` with one stored field replaced.
///
/// `raw` is parsed as JSON first; if that does not fit the field it is
/// used as a plain string.
pub fn set_field(settings: &Settings, key: &str, raw: &str) -> Result<Settings> {
    let record = serde_json::to_value(settings)?;
    if record.get(key).is_none() {
        bail!("Unknown setting: {}", key);
    }

    let candidates = match serde_json::from_str::<JsonValue>(raw) {
        Ok(parsed) => vec![parsed, JsonValue::String(raw.to_string())],
        Err(_) => vec![JsonValue::String(raw.to_string())],
    };

    let mut last_err = None;
    for value in candidates {
        let mut attempt = record.clone();
        attempt[key] = value;
        match serde_json::from_value::<Settings>(attempt) {
            Ok(mut updated) => {
                updated.normalize();
                return Ok(updated);
            }
            Err(e) => last_err = Some(e),
        }
    }
    match last_err {
        Some(e) => Err(e).with_context(|| format!("Invalid value for {}", key)),
        None => bail!("Invalid value for {}", key),
    }
}
