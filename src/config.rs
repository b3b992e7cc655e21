use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub double: bool,
    pub magnify: bool,
    pub watch: bool,
    pub no_images: bool,
    pub perf: bool,
    pub force_half_cell: bool,
    pub narrow_width: Option<u16>,
    pub covers: Vec<String>,
    pub render_debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            double: self.double || other.double,
            magnify: self.magnify || other.magnify,
            watch: self.watch || other.watch,
            no_images: self.no_images || other.no_images,
            perf: self.perf || other.perf,
            force_half_cell: self.force_half_cell || other.force_half_cell,
            narrow_width: other.narrow_width.or(self.narrow_width),
            covers: if other.covers.is_empty() {
                self.covers.clone()
            } else {
                other.covers.clone()
            },
            render_debug_log: other
                .render_debug_log
                .clone()
                .or_else(|| self.render_debug_log.clone()),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("folio").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("folio")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("folio").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join("folio").join("config");
        }
    }

    PathBuf::from(".foliorc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".foliorc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# folio defaults (saved with --save)".to_string());
    if flags.double {
        lines.push("--double".to_string());
    }
    if flags.magnify {
        lines.push("--magnify".to_string());
    }
    if flags.watch {
        lines.push("--watch".to_string());
    }
    if flags.no_images {
        lines.push("--no-images".to_string());
    }
    if let Some(width) = flags.narrow_width {
        lines.push(format!("--narrow-width {width}"));
    }
    for marker in &flags.covers {
        lines.push(format!("--cover {marker}"));
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(path) = &flags.render_debug_log {
        lines.push(format!("--render-debug-log {}", path.display()));
    }
    if flags.force_half_cell {
        lines.push("--force-half-cell".to_string());
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "--double" {
            flags.double = true;
        } else if token == "--magnify" {
            flags.magnify = true;
        } else if token == "--watch" || token == "-w" {
            flags.watch = true;
        } else if token == "--no-images" {
            flags.no_images = true;
        } else if token == "--perf" {
            flags.perf = true;
        } else if token == "--force-half-cell" {
            flags.force_half_cell = true;
        } else if token == "--narrow-width" {
            if let Some(next) = tokens.get(i + 1) {
                flags.narrow_width = next.parse().ok();
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--narrow-width=") {
            flags.narrow_width = value.parse().ok();
        } else if token == "--cover" {
            if let Some(next) = tokens.get(i + 1) {
                flags.covers.push(next.clone());
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--cover=") {
            flags.covers.push(value.to_string());
        } else if token == "--render-debug-log" {
            if let Some(next) = tokens.get(i + 1) {
                flags.render_debug_log = Some(PathBuf::from(next));
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--render-debug-log=") {
            flags.render_debug_log = Some(PathBuf::from(value));
        }
        i += 1;
    }
    flags
}
