//! Configuration module for the organisation profile, assets, fonts and render settings.
//!
//! Configuration is read from a TOML file and mapped field by field onto the built-in
//! defaults, so a file only needs to name what it changes. Unknown keys are ignored and
//! values of the wrong type fall back to the default.
//!
//! # Configuration Structure
//!
//! - `[organization]` - the issuing organisation printed on every certificate
//! - `[assets]` - the logo image and the signature font file
//! - `[fonts]` - extra font directories and preferred families for raster output
//! - `[render]` - raster scale, JPEG quality and the default design
//! - `[access]` - allow-listed usernames (lowest priority after `ALLOWED_USERS`)
//!
//! # Configuration Example
//!
//! ```toml
//! [organization]
//! name = "ACME TRAINING LTD."
//! display_name = "Acme Training Ltd."
//! signatory = "Jane Doe"
//!
//! [assets]
//! logo = "branding/logo.png"
//!
//! [render]
//! scale = 3.0
//! default_design = "modern"
//!
//! [access]
//! allowed_users = ["jane@acme.test", "ops@acme.test"]
//! ```
//!
//! Relative paths in a configuration file are resolved against the directory that
//! contains the file.

use crate::fonts::FontConfig;
use crate::theme::DesignStyle;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use toml::Value;

/// Configuration source for the generator.
#[derive(Debug, Clone)]
pub enum ConfigSource<'a> {
    /// Use the built-in configuration
    Default,
    /// Load configuration from a file path
    File(&'a str),
    /// Use an in-memory TOML string
    Embedded(&'a str),
}

/// The organisation that issues the certificates.
#[derive(Debug, Clone, PartialEq)]
pub struct Organization {
    /// Upper-case name printed under the logo.
    pub name: String,
    /// Name used inside the default description sentences.
    pub display_name: String,
    pub signatory: String,
    pub signatory_title: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub address: String,
}

impl Default for Organization {
    fn default() -> Self {
        Organization {
            name: "TECHPATH RESEARCH AND DEVELOPMENT PVT.".to_string(),
            display_name: "Techpath Research and Development PVT.".to_string(),
            signatory: "Sanjeev Kumar".to_string(),
            signatory_title: "Director".to_string(),
            email: "sanjeev@techpath.biz".to_string(),
            phone: "+91 8299708052".to_string(),
            website: "www.techpath.biz".to_string(),
            address: "Circus Road, Mughalsarai, Chandauli, India - 232101".to_string(),
        }
    }
}

/// Files loaded at startup. A missing file is not an error: the layout falls back.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetConfig {
    pub logo: Option<PathBuf>,
    pub signature_font: Option<PathBuf>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        AssetConfig {
            logo: Some(PathBuf::from("single-p.png")),
            signature_font: Some(PathBuf::from("DancingScript-Regular.ttf")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    /// Device-pixel ratio of raster exports.
    pub scale: f32,
    /// JPEG quality in percent.
    pub jpeg_quality: u8,
    pub default_design: DesignStyle,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            scale: 2.0,
            jpeg_quality: 95,
            default_design: DesignStyle::Classic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccessSettings {
    pub allowed_users: Vec<String>,
}

/// Complete generator configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CertgenConfig {
    pub organization: Organization,
    pub assets: AssetConfig,
    pub fonts: FontConfig,
    pub render: RenderSettings,
    pub access: AccessSettings,
}

fn get_string(table: &Value, key: &str) -> Option<String> {
    table.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn get_number(table: &Value, key: &str) -> Option<f64> {
    let value = table.get(key)?;
    value.as_float().or_else(|| value.as_integer().map(|i| i as f64))
}

fn resolve_path(raw: &str, base_dir: Option<&Path>) -> PathBuf {
    let path = PathBuf::from(raw);
    match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path,
    }
}

/// Reads an optional path. An empty string disables the asset.
fn parse_optional_path(
    table: &Value,
    key: &str,
    default: Option<PathBuf>,
    base_dir: Option<&Path>,
) -> Option<PathBuf> {
    match table.get(key).and_then(|v| v.as_str()) {
        Some(raw) if raw.trim().is_empty() => None,
        Some(raw) => Some(resolve_path(raw, base_dir)),
        None => default,
    }
}

fn parse_organization(value: Option<&Value>, default: Organization) -> Organization {
    let mut org = default;
    if let Some(table) = value {
        if let Some(v) = get_string(table, "name") {
            org.name = v;
        }
        if let Some(v) = get_string(table, "display_name") {
            org.display_name = v;
        }
        if let Some(v) = get_string(table, "signatory") {
            org.signatory = v;
        }
        if let Some(v) = get_string(table, "signatory_title") {
            org.signatory_title = v;
        }
        if let Some(v) = get_string(table, "email") {
            org.email = v;
        }
        if let Some(v) = get_string(table, "phone") {
            org.phone = v;
        }
        if let Some(v) = get_string(table, "website") {
            org.website = v;
        }
        if let Some(v) = get_string(table, "address") {
            org.address = v;
        }
    }
    org
}

fn parse_assets(value: Option<&Value>, default: AssetConfig, base_dir: Option<&Path>) -> AssetConfig {
    match value {
        Some(table) => AssetConfig {
            logo: parse_optional_path(table, "logo", default.logo, base_dir),
            signature_font: parse_optional_path(
                table,
                "signature_font",
                default.signature_font,
                base_dir,
            ),
        },
        None => default,
    }
}

fn parse_fonts(value: Option<&Value>, default: FontConfig, base_dir: Option<&Path>) -> FontConfig {
    let mut fonts = default;
    if let Some(table) = value {
        if let Some(paths) = table.get("paths").and_then(|v| v.as_array()) {
            fonts.custom_paths = paths
                .iter()
                .filter_map(|p| p.as_str())
                .map(|p| resolve_path(p, base_dir))
                .collect();
        }
        if let Some(v) = get_string(table, "sans") {
            fonts.sans_family = Some(v);
        }
        if let Some(v) = get_string(table, "serif") {
            fonts.serif_family = Some(v);
        }
        if let Some(v) = get_string(table, "mono") {
            fonts.mono_family = Some(v);
        }
        if let Some(v) = get_string(table, "script") {
            fonts.script_family = v;
        }
    }
    fonts
}

fn parse_render(value: Option<&Value>, default: RenderSettings) -> RenderSettings {
    let mut render = default;
    if let Some(table) = value {
        if let Some(scale) = get_number(table, "scale") {
            if scale > 0.0 && scale <= 8.0 {
                render.scale = scale as f32;
            } else {
                warn!("Ignoring render.scale = {} (expected 0 < scale <= 8)", scale);
            }
        }
        if let Some(quality) = table.get("jpeg_quality").and_then(|v| v.as_integer()) {
            render.jpeg_quality = quality.clamp(1, 100) as u8;
        }
        if let Some(design) = get_string(table, "default_design") {
            match design.parse() {
                Ok(style) => render.default_design = style,
                Err(e) => warn!("Ignoring render.default_design: {}", e),
            }
        }
    }
    render
}

/// `allowed_users` may be an array of strings or a single comma-separated string.
fn parse_access(value: Option<&Value>, default: AccessSettings) -> AccessSettings {
    let Some(users) = value.and_then(|t| t.get("allowed_users")) else {
        return default;
    };
    let allowed_users = if let Some(list) = users.as_array() {
        list.iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect()
    } else if let Some(raw) = users.as_str() {
        raw.split(',').map(str::to_string).collect()
    } else {
        return default;
    };
    AccessSettings { allowed_users }
}

fn parse_config_with_base(config_str: &str, base_dir: Option<&Path>) -> CertgenConfig {
    let config: Value = match toml::from_str(config_str) {
        Ok(v) => v,
        Err(e) => {
            warn!("Invalid configuration, using defaults: {}", e);
            return CertgenConfig::default();
        }
    };

    let default = CertgenConfig::default();
    CertgenConfig {
        organization: parse_organization(config.get("organization"), default.organization),
        assets: parse_assets(config.get("assets"), default.assets, base_dir),
        fonts: parse_fonts(config.get("fonts"), default.fonts, base_dir),
        render: parse_render(config.get("render"), default.render),
        access: parse_access(config.get("access"), default.access),
    }
}

/// Parses a TOML configuration string on top of the defaults.
///
/// # Example
/// ```rust
/// use certgen::config::parse_config_string;
/// use certgen::theme::DesignStyle;
///
/// let config = parse_config_string(r#"
/// [organization]
/// signatory = "Jane Doe"
///
/// [render]
/// scale = 3
/// default_design = "modern"
/// "#);
/// assert_eq!(config.organization.signatory, "Jane Doe");
/// assert_eq!(config.organization.signatory_title, "Director");
/// assert_eq!(config.render.scale, 3.0);
/// assert_eq!(config.render.default_design, DesignStyle::Modern);
/// ```
pub fn parse_config_string(config_str: &str) -> CertgenConfig {
    parse_config_with_base(config_str, None)
}

/// Loads the configuration from `source`. Unreadable files fall back to the defaults.
pub fn load_config_from_source(source: ConfigSource) -> CertgenConfig {
    match source {
        ConfigSource::Default => CertgenConfig::default(),
        ConfigSource::File(path) => {
            let config_path = Path::new(path);
            let config_str = match fs::read_to_string(config_path) {
                Ok(s) => s,
                Err(e) => {
                    warn!("Could not read configuration {}: {}", path, e);
                    return CertgenConfig::default();
                }
            };
            debug!("Loaded configuration from {}", path);
            parse_config_with_base(&config_str, config_path.parent())
        }
        ConfigSource::Embedded(content) => parse_config_string(content),
    }
}

/// Per-user configuration location, e.g. `~/.config/certgen/config.toml` on Linux.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("certgen").join("config.toml"))
}

fn toml_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

fn toml_path(path: &Option<PathBuf>) -> String {
    toml_string(
        &path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
    )
}

/// The built-in configuration as a commented TOML document.
pub fn default_config_toml() -> String {
    let config = CertgenConfig::default();
    let org = &config.organization;
    let mut out = String::new();
    out.push_str("# certgen configuration\n\n");
    out.push_str("[organization]\n");
    out.push_str(&format!("name = {}\n", toml_string(&org.name)));
    out.push_str(&format!("display_name = {}\n", toml_string(&org.display_name)));
    out.push_str(&format!("signatory = {}\n", toml_string(&org.signatory)));
    out.push_str(&format!("signatory_title = {}\n", toml_string(&org.signatory_title)));
    out.push_str(&format!("email = {}\n", toml_string(&org.email)));
    out.push_str(&format!("phone = {}\n", toml_string(&org.phone)));
    out.push_str(&format!("website = {}\n", toml_string(&org.website)));
    out.push_str(&format!("address = {}\n\n", toml_string(&org.address)));

    out.push_str("[assets]\n");
    out.push_str("# An empty string disables the asset.\n");
    out.push_str(&format!("logo = {}\n", toml_path(&config.assets.logo)));
    out.push_str(&format!(
        "signature_font = {}\n\n",
        toml_path(&config.assets.signature_font)
    ));

    out.push_str("[fonts]\n");
    out.push_str("paths = []\n");
    out.push_str("# sans = \"Liberation Sans\"\n");
    out.push_str("# serif = \"Liberation Serif\"\n");
    out.push_str("# mono = \"Liberation Mono\"\n");
    out.push_str(&format!(
        "script = {}\n\n",
        toml_string(&config.fonts.script_family)
    ));

    out.push_str("[render]\n");
    out.push_str(&format!("scale = {:.1}\n", config.render.scale));
    out.push_str(&format!("jpeg_quality = {}\n", config.render.jpeg_quality));
    out.push_str(&format!(
        "default_design = {}\n\n",
        toml_string(config.render.default_design.key())
    ));

    out.push_str("[access]\n");
    out.push_str("# Overridden by the ALLOWED_USERS environment variable.\n");
    out.push_str("allowed_users = []\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips() {
        let parsed = parse_config_string(&default_config_toml());
        assert_eq!(parsed, CertgenConfig::default());
    }

    #[test]
    fn test_invalid_toml_falls_back() {
        let config = parse_config_string("this is not valid toml {{{");
        assert_eq!(config, CertgenConfig::default());
    }

    #[test]
    fn test_partial_organization() {
        let config = parse_config_string(
            r#"
            [organization]
            name = "ACME TRAINING LTD."
            phone = "+1 555 0100"
            "#,
        );
        assert_eq!(config.organization.name, "ACME TRAINING LTD.");
        assert_eq!(config.organization.phone, "+1 555 0100");
        assert_eq!(config.organization.signatory, "Sanjeev Kumar");
    }

    #[test]
    fn test_invalid_render_values_are_ignored() {
        let config = parse_config_string(
            r#"
            [render]
            scale = -1.0
            jpeg_quality = 400
            default_design = "neon"
            "#,
        );
        assert_eq!(config.render.scale, 2.0);
        assert_eq!(config.render.jpeg_quality, 100);
        assert_eq!(config.render.default_design, DesignStyle::Classic);
    }

    #[test]
    fn test_assets_can_be_disabled() {
        let config = parse_config_string(
            r#"
            [assets]
            logo = ""
            "#,
        );
        assert_eq!(config.assets.logo, None);
        assert_eq!(
            config.assets.signature_font,
            Some(PathBuf::from("DancingScript-Regular.ttf"))
        );
    }

    #[test]
    fn test_access_accepts_list_or_string() {
        let list = parse_config_string("[access]\nallowed_users = [\"a@x.test\", \"b@x.test\"]");
        assert_eq!(list.access.allowed_users, vec!["a@x.test", "b@x.test"]);

        let joined = parse_config_string("[access]\nallowed_users = \"a@x.test, b@x.test\"");
        assert_eq!(joined.access.allowed_users, vec!["a@x.test", " b@x.test"]);
    }

    #[test]
    fn test_relative_paths_resolve_against_config_dir() {
        let dir = std::env::temp_dir().join("certgen_config_test");
        let _ = fs::create_dir_all(&dir);
        let file = dir.join("certgen.toml");
        fs::write(
            &file,
            "[assets]\nlogo = \"brand/logo.png\"\n[fonts]\npaths = [\"fonts\", \"/abs/fonts\"]\n",
        )
        .unwrap();

        let config = load_config_from_source(ConfigSource::File(file.to_str().unwrap()));
        assert_eq!(config.assets.logo, Some(dir.join("brand/logo.png")));
        assert_eq!(
            config.fonts.custom_paths,
            vec![dir.join("fonts"), PathBuf::from("/abs/fonts")]
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = load_config_from_source(ConfigSource::File("nonexistent-certgen.toml"));
        assert_eq!(config, CertgenConfig::default());
    }
}
