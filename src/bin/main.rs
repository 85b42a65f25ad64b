use certgen::access::{AccessGate, AccessState, AllowList, Identity, USER_ENV};
use certgen::config::{CertgenConfig, ConfigSource};
use certgen::export::{ExportFormat, Exporter, Workflow};
use certgen::form::{load_request_file, CertificateForm, AVAILABLE_COURSES, SAMPLE_STUDENTS};
use certgen::request::{CertificateKind, CourseEntry};
use certgen::theme::{all_themes, DesignStyle};
use certgen::{validation, CertError};
use clap::{Arg, ArgAction, ArgMatches, Command};
use log::{debug, error, info, warn};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

const LOCAL_CONFIG: &str = "certgen.toml";

/// Verbosity level for output
#[derive(Debug, Clone, Copy, PartialEq)]
enum Verbosity {
    Quiet,   // No output except errors
    Normal,  // Standard output
    Verbose, // Detailed output
}

/// Resolves the configuration file.
///
/// Priority order:
/// 1. `--config`
/// 2. `certgen.toml` in the current directory
/// 3. the per-user configuration file
/// 4. built-in defaults
fn get_config_path(matches: &ArgMatches) -> Option<String> {
    if let Some(config_file) = matches.get_one::<String>("config") {
        return Some(config_file.to_string());
    }
    if Path::new(LOCAL_CONFIG).exists() {
        return Some(LOCAL_CONFIG.to_string());
    }
    certgen::config::user_config_path()
        .filter(|p| p.exists())
        .map(|p| p.display().to_string())
}

fn load_config(matches: &ArgMatches) -> CertgenConfig {
    let path = get_config_path(matches);
    let source = match &path {
        Some(p) => ConfigSource::File(p),
        None => ConfigSource::Default,
    };
    debug!("Configuration source: {:?}", source);
    certgen::config::load_config_from_source(source)
}

/// The signed-in identity from `--user` or `CERTGEN_USER`.
fn get_identity(matches: &ArgMatches) -> Option<Identity> {
    let username = matches
        .get_one::<String>("user")
        .cloned()
        .or_else(|| env::var(USER_ENV).ok())
        .filter(|u| !u.trim().is_empty())?;
    let display_name = matches.get_one::<String>("display-name").cloned();
    Some(Identity::new(username, display_name))
}

fn get_output_dir(matches: &ArgMatches) -> Result<PathBuf, CertError> {
    let current_dir = env::current_dir().map_err(|e| CertError::IoError {
        message: e.to_string(),
        path: ".".to_string(),
        suggestion: "Run certgen from an existing directory".to_string(),
    })?;
    Ok(matches
        .get_one::<String>("output-dir")
        .map(|p| current_dir.join(p))
        .unwrap_or(current_dir))
}

fn get_formats(matches: &ArgMatches) -> Result<Vec<ExportFormat>, CertError> {
    let mut formats = Vec::new();
    for raw in matches.get_many::<String>("format").into_iter().flatten() {
        let format: ExportFormat = raw
            .parse()
            .map_err(|e: String| CertError::validation("Format", e))?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    if formats.is_empty() {
        formats.push(ExportFormat::Png);
    }
    Ok(formats)
}

/// Parses `--course "NAME|START|END"`.
fn parse_course(raw: &str) -> Result<CourseEntry, CertError> {
    let parts: Vec<&str> = raw.split('|').map(str::trim).collect();
    match parts.as_slice() {
        [name, start, end] => Ok(CourseEntry::new(*name, *start, *end)),
        _ => Err(CertError::validation(
            "Course",
            format!("expected \"NAME|START|END\", got \"{}\"", raw),
        )),
    }
}

fn text_arg(matches: &ArgMatches, id: &str) -> String {
    matches.get_one::<String>(id).cloned().unwrap_or_default()
}

/// Builds the form from a request file, a sample, or the individual flags. Flags given
/// alongside a request file override the file's values.
fn build_form(matches: &ArgMatches, config: &CertgenConfig) -> Result<CertificateForm, CertError> {
    let mut form = if let Some(path) = matches.get_one::<String>("request") {
        load_request_file(Path::new(path))?
    } else {
        let mut form = CertificateForm::new();
        form.set_design(config.render.default_design);
        form
    };

    if let Some(index) = matches.get_one::<usize>("sample") {
        form.load_sample(*index)?;
        form.close_preview();
    }
    if let Some(kind) = matches.get_one::<String>("kind") {
        form.set_kind(
            kind.parse::<CertificateKind>()
                .map_err(|e| CertError::validation("Kind", e))?,
        );
    }
    if let Some(design) = matches.get_one::<String>("design") {
        form.set_design(
            design
                .parse::<DesignStyle>()
                .map_err(|e| CertError::validation("Design", e))?,
        );
    }
    if let Some(name) = matches.get_one::<String>("name") {
        form.set_recipient_name(name.as_str());
    }
    for raw in matches.get_many::<String>("course").into_iter().flatten() {
        form.set_draft(parse_course(raw)?);
        if !form.add_course() {
            return Err(CertError::validation(
                "Course",
                format!("\"{}\" needs a name, a start date and an end date", raw),
            ));
        }
    }

    match form.kind() {
        CertificateKind::Course => {}
        CertificateKind::Internship => {
            let fields = form.internship_mut();
            override_field(&mut fields.department, matches, "department");
            override_field(&mut fields.start_date, matches, "start");
            override_field(&mut fields.end_date, matches, "end");
            override_field(&mut fields.project, matches, "project");
        }
        CertificateKind::Experience => {
            let fields = form.experience_mut();
            override_field(&mut fields.designation, matches, "designation");
            override_field(&mut fields.department, matches, "department");
            override_field(&mut fields.start_date, matches, "start");
            override_field(&mut fields.end_date, matches, "end");
            override_field(&mut fields.responsibilities, matches, "responsibilities");
        }
    }

    if matches.contains_id("id") {
        form.set_certificate_id(text_arg(matches, "id"));
    }
    if matches.contains_id("description") {
        form.set_custom_description(text_arg(matches, "description"));
    }
    if let Some(date) = matches.get_one::<String>("issue-date") {
        form.set_issue_date(Some(date.to_string()));
    }
    Ok(form)
}

fn override_field(field: &mut String, matches: &ArgMatches, id: &str) {
    if let Some(value) = matches.get_one::<String>(id) {
        *field = value.to_string();
    }
}

/// Resolves the signed-in user against the allow-list. Only an authorized user gets
/// past this point.
fn check_access(matches: &ArgMatches, config: &CertgenConfig) -> Result<Identity, CertError> {
    let allow_list = AllowList::resolve(
        matches.get_one::<String>("allowed-users").map(String::as_str),
        &config.access.allowed_users,
    );
    let mut gate = AccessGate::new(allow_list);
    if let AccessState::SignedOut = gate.resolve(get_identity(matches)) {
        return Err(CertError::validation(
            "User",
            format!("sign in first: pass --user or set {}", USER_ENV),
        ));
    }
    gate.require_authorized().cloned()
}

fn write_file(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, CertError> {
    let path = dir.join(file_name);
    fs::write(&path, bytes).map_err(|e| CertError::ExportError {
        message: e.to_string(),
        path: Some(path.display().to_string()),
        suggestion: Some("Check that the output directory is writable".to_string()),
    })?;
    Ok(path)
}

fn run(matches: &ArgMatches) -> Result<(), CertError> {
    let verbosity = if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };
    let dry_run = matches.get_flag("dry-run");

    let config = load_config(matches);
    let identity = check_access(matches, &config)?;
    if verbosity != Verbosity::Quiet {
        println!("{}", identity.welcome_message());
    }

    let formats = get_formats(matches)?;
    let output_dir = get_output_dir(matches)?;

    let mut form = build_form(matches, &config)?;
    if !form.can_generate() {
        warn!("The form is missing required fields for a {} certificate", form.kind());
    }
    let request = form.generate()?;

    let exporter = Exporter::new(&config);
    let warnings = validation::validate_request(&request, &exporter);
    if verbosity == Verbosity::Verbose || dry_run {
        if verbosity == Verbosity::Verbose {
            info!("Pre-flight validation:");
        }
        for warning in &warnings {
            println!("⚠️  {}", warning);
        }
    }
    if dry_run {
        if verbosity != Verbosity::Quiet {
            println!("✓ Dry-run complete. No certificate generated.");
            if warnings.is_empty() {
                println!("✓ No issues detected.");
            } else {
                println!("{} warning(s) found.", warnings.len());
            }
        }
        return Ok(());
    }

    if !output_dir.is_dir() {
        fs::create_dir_all(&output_dir).map_err(|e| CertError::IoError {
            message: format!("Could not create output directory: {}", e),
            path: output_dir.display().to_string(),
            suggestion: "Pass an existing directory with --output-dir".to_string(),
        })?;
    }

    let mut workflow = Workflow::new();
    for format in formats {
        workflow.preview(&exporter, request.clone());
        if verbosity == Verbosity::Verbose {
            if let Some(layout) = workflow.preview_layout() {
                info!(
                    "Layout: {:.0}x{:.0} pt, {} draw commands",
                    layout.width,
                    layout.height,
                    layout.commands.len()
                );
            }
        }
        let file = workflow.export(&exporter, format)?;
        let path = write_file(&output_dir, &file.file_name, &file.bytes)?;
        if verbosity != Verbosity::Quiet {
            println!("✅ Saved {}", path.display());
            if verbosity == Verbosity::Verbose {
                let size_kb = file.bytes.len() as f64 / 1024.0;
                println!("   Size: {:.1} KB ({})", size_kb, file.format.mime_type());
            }
        }
    }
    form.close_preview();
    Ok(())
}

fn build_cli() -> Command {
    Command::new("certgen")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate course, internship and experience certificates as PNG, JPEG or PDF")
        .after_help(
            "EXAMPLES:\n  \
            certgen --user alice@acme.test --name \"Bharti Kumari\" --course \"ADCA|12/06/2024|31/12/2024\"\n  \
            certgen --user alice@acme.test --kind internship --name \"Asha Singh\" --department \"Web Development\" -f pdf\n  \
            certgen --user alice@acme.test --request request.toml -f png -f pdf -o out/\n  \
            certgen --user alice@acme.test --sample 0 --dry-run -v\n",
        )
        .arg(
            Arg::new("user")
                .short('u')
                .long("user")
                .value_name("USERNAME")
                .help("Signed-in username (defaults to $CERTGEN_USER)"),
        )
        .arg(
            Arg::new("display-name")
                .long("display-name")
                .value_name("NAME")
                .help("Display name shown in the welcome line"),
        )
        .arg(
            Arg::new("allowed-users")
                .long("allowed-users")
                .value_name("LIST")
                .help("Comma-separated allow-list (overrides $ALLOWED_USERS and the config file)"),
        )
        .arg(
            Arg::new("kind")
                .short('k')
                .long("kind")
                .value_name("KIND")
                .help("Certificate kind: course, internship or experience (default: course)"),
        )
        .arg(
            Arg::new("name")
                .short('n')
                .long("name")
                .value_name("NAME")
                .help("Recipient name"),
        )
        .arg(
            Arg::new("course")
                .long("course")
                .value_name("NAME|START|END")
                .help(format!(
                    "Completed course, can be given multiple times (e.g. {})",
                    AVAILABLE_COURSES.join(", ")
                ))
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("department")
                .long("department")
                .value_name("TEXT")
                .help("Department or domain (internship, experience)"),
        )
        .arg(
            Arg::new("designation")
                .long("designation")
                .value_name("TEXT")
                .help("Job title (experience)"),
        )
        .arg(
            Arg::new("start")
                .long("start")
                .value_name("DATE")
                .help("Start date (internship, experience)"),
        )
        .arg(
            Arg::new("end")
                .long("end")
                .value_name("DATE")
                .help("End date (internship, experience)"),
        )
        .arg(
            Arg::new("project")
                .long("project")
                .value_name("TEXT")
                .help("Project worked on (internship)"),
        )
        .arg(
            Arg::new("responsibilities")
                .long("responsibilities")
                .value_name("TEXT")
                .help("Key responsibilities, one per line (experience)"),
        )
        .arg(
            Arg::new("description")
                .long("description")
                .value_name("TEXT")
                .help("Replaces the default description paragraph"),
        )
        .arg(
            Arg::new("id")
                .long("id")
                .value_name("CERTIFICATE_ID")
                .help("Certificate ID printed in the top-right corner"),
        )
        .arg(
            Arg::new("issue-date")
                .long("issue-date")
                .value_name("DATE")
                .help("Issue date to print (default: today)"),
        )
        .arg(
            Arg::new("design")
                .short('d')
                .long("design")
                .value_name("DESIGN")
                .help("Design theme: classic or modern"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .help("Output format: png, jpg or pdf (can be specified multiple times, default: png)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("request")
                .short('r')
                .long("request")
                .value_name("REQUEST_FILE")
                .help("Read the certificate fields from a TOML request file")
                .conflicts_with("sample"),
        )
        .arg(
            Arg::new("sample")
                .long("sample")
                .value_name("INDEX")
                .help(format!(
                    "Prefill a sample course certificate ({})",
                    SAMPLE_STUDENTS
                        .iter()
                        .enumerate()
                        .map(|(i, s)| format!("{}: {}", i, s.name))
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Directory to write certificates to (defaults to the current directory)"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("CONFIG_FILE")
                .help("Path to configuration file (TOML format). Auto-detects certgen.toml if not specified"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Show detailed output including validation warnings and file size")
                .action(ArgAction::SetTrue)
                .conflicts_with("quiet"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Suppress all output except errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Validate the certificate without writing any file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-designs")
                .long("list-designs")
                .help("List the available design themes and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("get-default-configuration")
                .long("get-default-configuration")
                .help("Print a default certgen.toml to stdout and exit")
                .action(ArgAction::SetTrue),
        )
}

fn main() {
    // Initialize logger with environment variable control (RUST_LOG)
    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();

    let matches = build_cli().get_matches();

    if matches.get_flag("get-default-configuration") {
        println!("{}", certgen::config::default_config_toml());
        process::exit(0);
    }

    if matches.get_flag("list-designs") {
        for theme in all_themes() {
            println!("{:<8} {} - {}", theme.style.key(), theme.name, theme.tagline);
        }
        process::exit(0);
    }

    if let Err(e) = run(&matches) {
        error!("{}", e);
        match e {
            CertError::AccessDenied { .. } => {
                eprintln!("Access Denied");
                eprintln!("{}", e);
            }
            other => eprintln!("{}", other.user_message()),
        }
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(args: &[&str]) -> ArgMatches {
        let mut argv = vec!["certgen"];
        argv.extend_from_slice(args);
        build_cli().get_matches_from(argv)
    }

    #[test]
    fn test_parse_course() {
        let course = parse_course("ADCA | 12/06/2024 | 31/12/2024").unwrap();
        assert_eq!(course, CourseEntry::new("ADCA", "12/06/2024", "31/12/2024"));
        assert!(parse_course("ADCA|12/06/2024").is_err());
    }

    #[test]
    fn test_formats_default_and_dedup() {
        assert_eq!(get_formats(&matches(&[])).unwrap(), vec![ExportFormat::Png]);
        let formats = get_formats(&matches(&["-f", "pdf", "-f", "jpeg", "-f", "jpg"])).unwrap();
        assert_eq!(formats, vec![ExportFormat::Pdf, ExportFormat::Jpeg]);
        assert!(get_formats(&matches(&["-f", "gif"])).is_err());
    }

    #[test]
    fn test_output_dir_default_and_custom() {
        let default_dir = get_output_dir(&matches(&[])).unwrap();
        assert_eq!(default_dir, env::current_dir().unwrap());
        let custom = get_output_dir(&matches(&["-o", "out"])).unwrap();
        assert!(custom.ends_with("out"));
    }

    #[test]
    fn test_build_form_from_flags() {
        let m = matches(&[
            "--kind",
            "experience",
            "--name",
            "Ravi Verma",
            "--designation",
            "Engineer",
            "--start",
            "01/01/2023",
        ]);
        let mut form = build_form(&m, &CertgenConfig::default()).unwrap();
        assert_eq!(form.kind(), CertificateKind::Experience);
        assert_eq!(form.experience().start_date, "01/01/2023");
        assert_eq!(form.generate().unwrap().recipient(), "Ravi Verma");
    }

    #[test]
    fn test_incomplete_course_flag_is_rejected() {
        let m = matches(&["--name", "Priya", "--course", "ADCA||31/12/2024"]);
        assert!(build_form(&m, &CertgenConfig::default()).is_err());
    }

    #[test]
    fn test_access_requires_listed_user() {
        let config = CertgenConfig::default();
        let denied = check_access(
            &matches(&["--user", "eve@acme.test", "--allowed-users", "alice@acme.test"]),
            &config,
        );
        assert!(matches!(denied, Err(CertError::AccessDenied { .. })));

        let allowed = check_access(
            &matches(&["--user", "Alice@Acme.test", "--allowed-users", "alice@acme.test"]),
            &config,
        )
        .unwrap();
        assert_eq!(allowed.username, "Alice@Acme.test");
    }
}
