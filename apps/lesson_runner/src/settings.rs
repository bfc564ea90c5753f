use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

pub const SETTINGS_FILE: &str = "lesson_runner.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub lessons_dir: PathBuf,
    pub log_filter: String,
    pub autoplay_step_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lessons_dir: PathBuf::from("lessons"),
            log_filter: "info".into(),
            autoplay_step_ms: 1500,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    lessons_dir: Option<PathBuf>,
    log_filter: Option<String>,
    autoplay_step_ms: Option<u64>,
}

/// Defaults, then `lesson_runner.toml` in the working directory, then `LESSON_RUNNER__*` variables.
pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if file.exists() {
        let raw = fs::read_to_string(file)
            .with_context(|| format!("failed to read settings file '{}'", file.display()))?;
        let file_cfg: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", file.display()))?;
        if let Some(v) = file_cfg.lessons_dir {
            settings.lessons_dir = v;
        }
        if let Some(v) = file_cfg.log_filter {
            settings.log_filter = v;
        }
        if let Some(v) = file_cfg.autoplay_step_ms {
            settings.autoplay_step_ms = v;
        }
    }

    if let Some(v) = env("LESSON_RUNNER__LESSONS_DIR") {
        settings.lessons_dir = PathBuf::from(v);
    }
    if let Some(v) = env("LESSON_RUNNER__LOG_FILTER") {
        settings.log_filter = v;
    }
    if let Some(v) = env("LESSON_RUNNER__AUTOPLAY_STEP_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.autoplay_step_ms = parsed;
        }
    }

    Ok(settings)
}

pub fn resolve_lesson_path(settings: &Settings, lesson: &str) -> PathBuf {
    let direct = PathBuf::from(lesson);
    if direct.exists() {
        return direct;
    }

    let mut in_dir = settings.lessons_dir.join(lesson);
    if in_dir.extension().is_none() {
        in_dir.set_extension("toml");
    }
    in_dir
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
