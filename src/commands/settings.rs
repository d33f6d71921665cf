use crate::error::{Result, StatsError};
use crate::models::metric::Metric;
use crate::render::figlet::{Direction, Spacing};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const SETTINGS_SCHEMA_VERSION: i64 = 1;
const DEFAULT_FICTION_URL: &str = "https://www.royalroad.com/fiction/48116/the-bureau-of-isekai-affairs";

#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveSettings {
    pub fiction_url: String,
    pub primary_metric: Metric,
    pub figlet_font: Option<String>,
    pub figlet_direction: Direction,
    pub figlet_spacing: Spacing,
    pub chart_enabled: bool,
    pub chart_rows_divisor: u16,
    pub watch_debounce: Duration,
}

impl Default for EffectiveSettings {
    fn default() -> Self {
        effective_from_value(&migrate_settings(json!({})))
    }
}

/// `<config dir>/rr_stats/settings.json`
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rr_stats")
        .join("settings.json")
}

pub fn load_effective_settings(path: &Path) -> Result<EffectiveSettings> {
    let settings = load_settings_from_disk(path)?;
    Ok(effective_from_value(&settings))
}

fn effective_from_value(settings: &Value) -> EffectiveSettings {
    let primary_metric = settings
        .get("primaryMetric")
        .and_then(Value::as_str)
        .and_then(Metric::from_key)
        .unwrap_or(Metric::TotalViews);

    let figlet_font = settings
        .get("figletFont")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|font| !font.is_empty())
        .map(str::to_string);

    EffectiveSettings {
        fiction_url: settings
            .get("fictionUrl")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_FICTION_URL)
            .to_string(),
        primary_metric,
        figlet_font,
        figlet_direction: settings
            .get("figletDirection")
            .and_then(Value::as_str)
            .and_then(Direction::from_key)
            .unwrap_or_default(),
        figlet_spacing: settings
            .get("figletSpacing")
            .and_then(Value::as_str)
            .and_then(Spacing::from_key)
            .unwrap_or_default(),
        chart_enabled: settings
            .get("chartEnabled")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        chart_rows_divisor: settings
            .get("chartRowsDivisor")
            .and_then(Value::as_u64)
            .unwrap_or(6)
            .clamp(1, 20) as u16,
        watch_debounce: Duration::from_millis(
            settings
                .get("watchDebounceMs")
                .and_then(Value::as_u64)
                .unwrap_or(500)
                .clamp(50, 10_000),
        ),
    }
}

/// Read, migrate and sanitize the settings file, writing it back when the
/// stored document was missing or differed.
pub fn load_settings_from_disk(path: &Path) -> Result<Value> {
    let original = if path.exists() {
        let raw = fs::read_to_string(path)?;
        serde_json::from_str::<Value>(&raw).unwrap_or_else(|e| {
            log::warn!("ignoring unreadable settings {}: {e}", path.display());
            json!({})
        })
    } else {
        json!({})
    };

    let migrated = migrate_settings(original.clone());
    if migrated != original || !path.exists() {
        write_settings_file(path, &migrated)?;
    }

    Ok(migrated)
}

/// Apply `updates` (a JSON object) on top of the stored settings and persist
/// the sanitized result.
pub fn save_settings_to_disk(path: &Path, updates: Value) -> Result<Value> {
    if !updates.is_object() {
        return Err(StatsError::Settings(format!(
            "settings updates must be a JSON object, got {updates}"
        )));
    }

    let mut merged = load_settings_from_disk(path)?;
    overlay(&mut merged, &updates, Overlay::Replace);

    let migrated = migrate_settings(merged);
    write_settings_file(path, &migrated)?;
    Ok(migrated)
}

/// `key=value` → `{"key": value}`; the value is taken as JSON when it parses,
/// otherwise as a plain string.
pub fn parse_assignment(assignment: &str) -> Result<Value> {
    let (key, raw) = assignment
        .split_once('=')
        .ok_or_else(|| StatsError::Settings(format!("expected key=value, got {assignment:?}")))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(StatsError::Settings(format!("empty key in {assignment:?}")));
    }

    let value = serde_json::from_str::<Value>(raw.trim()).unwrap_or_else(|_| json!(raw.trim()));
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Ok(Value::Object(map))
}

fn write_settings_file(path: &Path, settings: &Value) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let raw = serde_json::to_string_pretty(settings)
        .map_err(|e| StatsError::Settings(format!("failed to serialize settings: {e}")))?;
    fs::write(path, raw)?;
    Ok(())
}

fn migrate_settings(input: Value) -> Value {
    let defaults = default_settings();
    let mut out = match input {
        Value::Object(map) => Value::Object(map),
        _ => Value::Object(Map::new()),
    };

    overlay(&mut out, &defaults, Overlay::FillMissing);
    sanitize_settings(&mut out);
    if let Some(obj) = out.as_object_mut() {
        obj.insert("schema_version".to_string(), json!(SETTINGS_SCHEMA_VERSION));
    }

    out
}

fn default_settings() -> Value {
    json!({
        "schema_version": SETTINGS_SCHEMA_VERSION,
        "fictionUrl": DEFAULT_FICTION_URL,
        "primaryMetric": Metric::TotalViews.key(),
        "figletFont": "",
        "figletDirection": Direction::default().key(),
        "figletSpacing": Spacing::default().key(),
        "chartEnabled": true,
        "chartRowsDivisor": 6,
        "watchDebounceMs": 500
    })
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Overlay {
    /// Only add keys the target lacks (defaults under stored values).
    FillMissing,
    /// Source values win (user updates over stored values).
    Replace,
}

/// Recursively lay `source` over `target`. Nested objects are merged key by
/// key; any other pair resolves by `mode`.
fn overlay(target: &mut Value, source: &Value, mode: Overlay) {
    let (Some(target_map), Some(source_map)) = (target.as_object_mut(), source.as_object()) else {
        if mode == Overlay::Replace {
            *target = source.clone();
        }
        return;
    };

    for (key, value) in source_map {
        match target_map.get_mut(key) {
            Some(existing) => overlay(existing, value, mode),
            None => {
                target_map.insert(key.clone(), value.clone());
            }
        }
    }
}

fn sanitize_settings(settings: &mut Value) {
    let Some(obj) = settings.as_object_mut() else {
        return;
    };

    clamp_u64(obj, "chartRowsDivisor", 1, 20, 6);
    clamp_u64(obj, "watchDebounceMs", 50, 10_000, 500);

    let metric_keys: Vec<&str> = Metric::ALL.iter().map(|m| m.key()).collect();
    sanitize_enum(obj, "primaryMetric", &metric_keys, Metric::TotalViews.key());

    let direction_keys: Vec<&str> = Direction::ALL.iter().map(|d| d.key()).collect();
    sanitize_enum(obj, "figletDirection", &direction_keys, Direction::default().key());
    let spacing_keys: Vec<&str> = Spacing::ALL.iter().map(|s| s.key()).collect();
    sanitize_enum(obj, "figletSpacing", &spacing_keys, Spacing::default().key());

    ensure_bool(obj, "chartEnabled", true);
    ensure_string(obj, "fictionUrl", DEFAULT_FICTION_URL);
    ensure_string(obj, "figletFont", "");
}

fn clamp_u64(map: &mut Map<String, Value>, key: &str, min: u64, max: u64, default: u64) {
    let raw = map.get(key).and_then(Value::as_u64).unwrap_or(default);
    map.insert(key.to_string(), json!(raw.clamp(min, max)));
}

fn sanitize_enum(map: &mut Map<String, Value>, key: &str, allowed: &[&str], default: &str) {
    let valid = map
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| allowed.contains(value))
        .unwrap_or(default)
        .to_string();
    map.insert(key.to_string(), json!(valid));
}

fn ensure_bool(map: &mut Map<String, Value>, key: &str, default: bool) {
    let value = map.get(key).and_then(Value::as_bool).unwrap_or(default);
    map.insert(key.to_string(), json!(value));
}

fn ensure_string(map: &mut Map<String, Value>, key: &str, default: &str) {
    let value = map
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string();
    map.insert(key.to_string(), json!(value));
}
