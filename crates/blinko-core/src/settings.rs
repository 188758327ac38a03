//! Settings store adapter: load/merge/migrate, save, reset, and the template
//! and domain-rule operations behind the settings UI.
//!
//! Loading never fails. A missing record yields defaults; a record that
//! cannot be read or decoded also yields defaults, with the error handed back
//! in [`Loaded::error`] so the caller can show it.

use serde_json::{json, Map, Value as JsonValue};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::defaults::{
    DEFAULT_TEMPLATE_ID, MIGRATED_TEMPLATE_ID, MIGRATED_TEMPLATE_NAME, MODEL_NAME, SETTINGS_KEY,
    SUPPORTED_AI_PROVIDER, TEMPERATURE, UNKNOWN_TEMPLATE_LABEL,
};
use crate::error::{Error, Result};
use crate::events::{EventBus, SettingsEvent};
use crate::models::{
    default_prompt_templates, BlinkoAiConfig, DomainPromptMapping, PromptTemplate, Settings,
};
use crate::store::SettingsStore;

/// Key of the single prompt string used before template lists existed.
pub const LEGACY_PROMPT_KEY: &str = "promptTemplate";

const TEMPLATES_KEY: &str = "promptTemplates";
const ACTIVE_TEMPLATE_KEY: &str = "activePromptTemplateId";

fn new_id() -> String {
    Uuid::now_v7().to_string()
}

// =============================================================================
// RECORD DECODING
// =============================================================================

/// Fold a legacy `promptTemplate` string into a one-entry template list.
///
/// The legacy key is always removed. A template list is only synthesized
/// when the stored list is absent or empty. Returns true if the record changed.
pub fn migrate_legacy_prompt(record: &mut Map<String, JsonValue>) -> bool {
    let Some(legacy) = record.remove(LEGACY_PROMPT_KEY) else {
        return false;
    };

    let templates_missing = match record.get(TEMPLATES_KEY) {
        None | Some(JsonValue::Null) => true,
        Some(JsonValue::Array(list)) => list.is_empty(),
        Some(_) => false,
    };

    if let (JsonValue::String(prompt), true) = (legacy, templates_missing) {
        info!(
            subsystem = "settings",
            component = "migration",
            op = "legacy_prompt",
            "Migrating single prompt template to template list"
        );
        record.insert(
            TEMPLATES_KEY.to_string(),
            json!([{
                "id": MIGRATED_TEMPLATE_ID,
                "name": MIGRATED_TEMPLATE_NAME,
                "content": prompt,
            }]),
        );
        record.insert(
            ACTIVE_TEMPLATE_KEY.to_string(),
            JsonValue::String(MIGRATED_TEMPLATE_ID.to_string()),
        );
    }
    true
}

/// Recursively overlay `overlay` onto `base`. Objects merge key by key;
/// everything else (arrays included) is replaced. `null` leaves `base` as is.
pub fn merge_over(base: &mut JsonValue, overlay: JsonValue) {
    match (base, overlay) {
        (_, JsonValue::Null) => {}
        (JsonValue::Object(base_map), JsonValue::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_over(existing, value),
                    None => {
                        if !value.is_null() {
                            base_map.insert(key, value);
                        }
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Decode a stored record: migrate, merge over defaults, repair invariants.
///
/// The bool is true when migration changed the record.
pub fn settings_from_record(raw: JsonValue) -> Result<(Settings, bool)> {
    let JsonValue::Object(mut record) = raw else {
        return Err(Error::Serialization(
            "settings record is not a JSON object".to_string(),
        ));
    };
    let migrated = migrate_legacy_prompt(&mut record);

    let mut merged = serde_json::to_value(Settings::default())?;
    merge_over(&mut merged, JsonValue::Object(record));

    let mut settings: Settings = serde_json::from_value(merged)?;
    settings.normalize();
    Ok((settings, migrated))
}

// =============================================================================
// RECORD OPERATIONS
// =============================================================================

impl Settings {
    /// Repair values the UI relies on. Returns true if anything changed.
    ///
    /// Guarantees at least one template and an active id that resolves.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;

        if self.prompt_templates.is_empty() {
            warn!(
                subsystem = "settings",
                op = "normalize",
                "Template list empty, restoring defaults"
            );
            self.prompt_templates = default_prompt_templates();
            self.active_prompt_template_id = DEFAULT_TEMPLATE_ID.to_string();
            changed = true;
        }

        if self.active_template().is_none() {
            self.active_prompt_template_id = if self.template(DEFAULT_TEMPLATE_ID).is_some() {
                DEFAULT_TEMPLATE_ID.to_string()
            } else {
                self.prompt_templates[0].id.clone()
            };
            debug!(
                subsystem = "settings",
                op = "normalize",
                template_id = %self.active_prompt_template_id,
                "Active template id repaired"
            );
            changed = true;
        }

        if self.model_name.trim().is_empty() {
            self.model_name = MODEL_NAME.to_string();
            changed = true;
        }

        if !self.temperature.is_finite() {
            self.temperature = TEMPERATURE;
            changed = true;
        } else if !(0.0..=1.0).contains(&self.temperature) {
            self.temperature = self.temperature.clamp(0.0, 1.0);
            changed = true;
        }

        changed
    }

    /// Append a template and make it active. Returns the new id.
    pub fn add_template(&mut self, name: &str, content: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("Template name cannot be empty".to_string()));
        }
        let template = PromptTemplate::new(new_id(), name, content);
        let id = template.id.clone();
        self.prompt_templates.push(template);
        self.active_prompt_template_id = id.clone();
        Ok(id)
    }

    /// Remove a template. The last remaining template cannot be deleted.
    ///
    /// If the removed template was active, the first remaining one becomes active.
    pub fn delete_template(&mut self, id: &str) -> Result<PromptTemplate> {
        if self.prompt_templates.len() <= 1 {
            return Err(Error::Validation(
                "At least one prompt template must remain".to_string(),
            ));
        }
        let idx = self
            .prompt_templates
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::Validation(format!("Template not found: {}", id)))?;
        let removed = self.prompt_templates.remove(idx);

        if self.active_prompt_template_id == removed.id {
            self.active_prompt_template_id = self
                .prompt_templates
                .first()
                .map(|t| t.id.clone())
                .unwrap_or_default();
        }
        Ok(removed)
    }

    /// Replace the prompt text of an existing template (not trimmed).
    pub fn update_template_content(&mut self, id: &str, content: &str) -> Result<()> {
        let template = self
            .prompt_templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::Validation(format!("Template not found: {}", id)))?;
        template.content = content.to_string();
        Ok(())
    }

    pub fn set_active_template(&mut self, id: &str) -> Result<()> {
        if self.template(id).is_none() {
            return Err(Error::Validation(format!("Template not found: {}", id)));
        }
        self.active_prompt_template_id = id.to_string();
        Ok(())
    }

    /// Route pages whose host contains `pattern` to `template_id`. Returns the rule id.
    pub fn add_domain_rule(&mut self, pattern: &str, template_id: &str) -> Result<String> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(Error::Validation("Domain pattern cannot be empty".to_string()));
        }
        if self.template(template_id).is_none() {
            return Err(Error::Validation(format!(
                "Template not found: {}",
                template_id
            )));
        }
        let rule = DomainPromptMapping {
            id: new_id(),
            domain_pattern: pattern.to_string(),
            template_id: template_id.to_string(),
        };
        let id = rule.id.clone();
        self.domain_prompt_mappings.push(rule);
        Ok(id)
    }

    pub fn delete_domain_rule(&mut self, id: &str) -> Result<DomainPromptMapping> {
        let idx = self
            .domain_prompt_mappings
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| Error::Validation(format!("Domain rule not found: {}", id)))?;
        Ok(self.domain_prompt_mappings.remove(idx))
    }

    /// Display name of a template, or "Unknown template" for dangling ids.
    pub fn template_label(&self, id: &str) -> &str {
        self.template(id)
            .map(|t| t.name.as_str())
            .unwrap_or(UNKNOWN_TEMPLATE_LABEL)
    }

    /// Copy the LLM endpoint, key and model from Blinko's server config.
    pub fn apply_ai_config(&mut self, config: &BlinkoAiConfig) -> Result<()> {
        if config.ai_model_provider != SUPPORTED_AI_PROVIDER {
            return Err(Error::Config(format!(
                "Unsupported AI provider: {}",
                config.ai_model_provider
            )));
        }
        self.model_url = config.ai_api_endpoint.clone().unwrap_or_default();
        self.api_key = config.ai_api_key.clone().unwrap_or_default();
        self.model_name = config.ai_model.clone().unwrap_or_default();
        Ok(())
    }
}

// =============================================================================
// STATE CONTAINER
// =============================================================================

/// Result of [`SettingsManager::load`]. `error` is set when the stored
/// record could not be used and defaults were substituted.
#[derive(Debug)]
pub struct Loaded {
    pub settings: Settings,
    pub error: Option<Error>,
}

/// Run [`Settings::normalize`] before a write, logging when the record needed it.
fn repair_before_save(settings: &mut Settings) {
    if settings.normalize() {
        warn!(
            subsystem = "settings",
            op = "save",
            template_id = %settings.active_prompt_template_id,
            "Settings record repaired before saving"
        );
    }
}

/// Persist `settings` wholesale and notify open views of floating-ball state.
///
/// The stored record is always normalized, even if `settings` is not.
pub async fn persist_settings<S>(store: &S, events: &EventBus, settings: &Settings) -> Result<()>
where
    S: SettingsStore + ?Sized,
{
    let mut settings = settings.clone();
    repair_before_save(&mut settings);
    let value = serde_json::to_value(&settings)?;
    store.set(SETTINGS_KEY, value).await?;
    info!(
        subsystem = "settings",
        component = "store",
        op = "save",
        "Settings saved"
    );
    events.emit(SettingsEvent::FloatingBallState {
        enabled: settings.enable_floating_ball,
    });
    events.emit(SettingsEvent::FloatingBallSize {
        size: settings.floating_ball_size,
    });
    Ok(())
}

/// Owns the in-memory settings record together with its store and event bus.
pub struct SettingsManager<S: SettingsStore + ?Sized> {
    store: Arc<S>,
    events: EventBus,
    settings: Settings,
}

impl<S: SettingsStore + ?Sized> SettingsManager<S> {
    /// Create a manager holding default settings; call [`load`](Self::load) next.
    pub fn new(store: Arc<S>, events: EventBus) -> Self {
        Self {
            store,
            events,
            settings: Settings::default(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Mutable access for field-by-field edits; persist with [`persist`](Self::persist).
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Read, migrate and repair the stored record.
    pub async fn load(&mut self) -> Loaded {
        let outcome = match self.store.get(SETTINGS_KEY).await {
            Ok(None) => {
                debug!(subsystem = "settings", op = "load", "No stored settings, using defaults");
                Ok((Settings::default(), false))
            }
            Ok(Some(raw)) => settings_from_record(raw),
            Err(e) => Err(e),
        };

        match outcome {
            Ok((settings, migrated)) => {
                self.settings = settings;
                if migrated {
                    if let Err(e) = self.write_record().await {
                        warn!(
                            subsystem = "settings",
                            op = "load",
                            error = %e,
                            "Failed to persist migrated settings"
                        );
                    }
                }
                Loaded {
                    settings: self.settings.clone(),
                    error: None,
                }
            }
            Err(e) => {
                warn!(
                    subsystem = "settings",
                    op = "load",
                    error = %e,
                    "Failed to load settings, falling back to defaults"
                );
                self.settings = Settings::default();
                Loaded {
                    settings: self.settings.clone(),
                    error: Some(e),
                }
            }
        }
    }

    async fn write_record(&self) -> Result<()> {
        let value = serde_json::to_value(&self.settings)?;
        self.store.set(SETTINGS_KEY, value).await
    }

    /// Replace the record and persist it wholesale.
    pub async fn save(&mut self, record: Settings) -> Result<()> {
        self.settings = record;
        self.persist().await
    }

    /// Repair and persist the current in-memory record.
    pub async fn persist(&mut self) -> Result<()> {
        repair_before_save(&mut self.settings);
        persist_settings(self.store.as_ref(), &self.events, &self.settings).await
    }

    /// Drop the stored record and return to a fresh copy of the defaults.
    pub async fn reset(&mut self) -> Result<()> {
        self.store.remove(SETTINGS_KEY).await?;
        self.settings = Settings::default();
        info!(subsystem = "settings", op = "reset", "Settings reset to defaults");
        self.events.emit(SettingsEvent::SettingsReset);
        Ok(())
    }

    pub async fn add_template(&mut self, name: &str, content: &str) -> Result<String> {
        let id = self.settings.add_template(name, content)?;
        debug!(subsystem = "settings", op = "add_template", template_id = %id, "Template added");
        self.persist().await?;
        Ok(id)
    }

    pub async fn delete_template(&mut self, id: &str) -> Result<PromptTemplate> {
        let removed = self.settings.delete_template(id)?;
        debug!(subsystem = "settings", op = "delete_template", template_id = %id, "Template deleted");
        self.persist().await?;
        Ok(removed)
    }

    pub async fn update_template_content(&mut self, id: &str, content: &str) -> Result<()> {
        self.settings.update_template_content(id, content)?;
        self.persist().await
    }

    pub async fn set_active_template(&mut self, id: &str) -> Result<()> {
        self.settings.set_active_template(id)?;
        self.persist().await
    }

    pub async fn add_domain_rule(&mut self, pattern: &str, template_id: &str) -> Result<String> {
        let id = self.settings.add_domain_rule(pattern, template_id)?;
        debug!(
            subsystem = "settings",
            op = "add_domain_rule",
            domain_pattern = %pattern.trim(),
            template_id = %template_id,
            "Domain rule added"
        );
        self.persist().await?;
        Ok(id)
    }

    pub async fn delete_domain_rule(&mut self, id: &str) -> Result<DomainPromptMapping> {
        let removed = self.settings.delete_domain_rule(id)?;
        self.persist().await?;
        Ok(removed)
    }

    pub async fn apply_ai_config(&mut self, config: &BlinkoAiConfig) -> Result<()> {
        self.settings.apply_ai_config(config)?;
        self.persist().await
    }
}
